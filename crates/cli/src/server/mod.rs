pub mod admin;
pub mod dns;
pub mod http;
pub mod https;
