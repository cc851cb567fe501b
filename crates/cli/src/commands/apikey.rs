//! `dnshield apikey {generate,list,revoke}`: local key management
//! against `api_keys.json`, with no HTTP surface of its own (§4.13).

use dnshield_application::use_cases::{CreateApiKeyUseCase, ListApiKeysUseCase, RevokeApiKeyUseCase};
use dnshield_domain::{AppConfig, DnshieldError, Role};
use dnshield_infrastructure::api_keys::FileApiKeyStore;
use std::sync::Arc;

pub enum ApikeyCommand {
    Generate { label: String, role: String },
    List,
    Revoke { id: String },
}

pub async fn execute(config: &AppConfig, command: ApikeyCommand) -> anyhow::Result<()> {
    let store = Arc::new(FileApiKeyStore::load_or_create(config.admin.api_keys_path.clone())?);

    match command {
        ApikeyCommand::Generate { label, role } => {
            let role = parse_role(&role)?;
            let use_case = CreateApiKeyUseCase::new(store);
            let (record, token) = use_case.execute(label, role).await?;
            println!("Generated {:?} key {} ({})", record.role, record.id, record.label);
            println!("Token (shown once, store it now): {token}");
        }
        ApikeyCommand::List => {
            let use_case = ListApiKeysUseCase::new(store);
            for record in use_case.execute() {
                let state = if record.revoked { "revoked" } else { "active" };
                println!("{}  {:<8}  {:<8}  {}  created {}", record.id, format!("{:?}", record.role), state, record.label, record.created_at.to_rfc3339());
            }
        }
        ApikeyCommand::Revoke { id } => {
            let use_case = RevokeApiKeyUseCase::new(store);
            use_case.execute(&id).await?;
            println!("Revoked key {id}");
        }
    }

    Ok(())
}

fn parse_role(raw: &str) -> Result<Role, DnshieldError> {
    match raw.to_ascii_lowercase().as_str() {
        "viewer" => Ok(Role::Viewer),
        "operator" => Ok(Role::Operator),
        "admin" => Ok(Role::Admin),
        other => Err(DnshieldError::config(format!("unknown role {other:?}, expected viewer/operator/admin"))),
    }
}
