//! Create user command handler

use crate::api::ApiError;
use crate::api::validation::{
    Validator, validate_address, validate_email, validate_name, validate_password, validate_role,
};
use crate::config::Config;
use crate::db::Storage;
use crate::models::NewUser;
use crate::services::auth_service_impl::create_account;

pub struct CreateUserArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: String,
}

pub async fn cmd_create_user(config: &Config, args: CreateUserArgs) -> anyhow::Result<()> {
    let mut v = Validator::new();
    v.check("name", validate_name(&args.name));
    v.check("email", validate_email(args.email.trim()));
    v.check("password", validate_password(&args.password));
    v.check("address", validate_address(&args.address));
    let role = v.check("role", validate_role(&args.role));
    v.finish().map_err(|err| match err {
        ApiError::ValidationError(errors) => anyhow::anyhow!(
            errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
        other => anyhow::anyhow!(other.to_string()),
    })?;
    let role = role.ok_or_else(|| anyhow::anyhow!("Invalid role: {}", args.role))?;

    let storage = Storage::connect(&config.general).await?;
    let user = create_account(
        &storage,
        &config.security,
        NewUser {
            name: args.name,
            email: args.email.trim().to_string(),
            password: args.password,
            address: args.address,
            role,
        },
    )
    .await?;

    println!("✓ Created {} '{}' (ID: {})", user.role, user.email, user.id);
    Ok(())
}
