pub mod apikey;
pub mod configure_dns;
pub mod install_ca;
pub mod run;
pub mod status;
pub mod uninstall;
