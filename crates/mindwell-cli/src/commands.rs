//! `serve` and `user` command implementations.

use anyhow::{Context, Result};
use mindwell_api::accounts::{self, NewAccount};
use mindwell_api::{AppState, MindwellConfig, Server};
use mindwell_core::{Role, User};

use crate::cli::UserAction;

/// Load configuration and run the API until shutdown.
pub async fn serve(config_path: Option<&str>) -> Result<()> {
    let config = MindwellConfig::load(config_path).context("loading configuration")?;
    tracing::info!(
        address = %config.bind_address(),
        database = %config.database.url,
        "Starting Mindwell"
    );
    let server = Server::new(config).await.context("starting server")?;
    server.serve().await?;
    Ok(())
}

/// Handle a `user` subcommand.
pub async fn handle_user_command(config_path: Option<&str>, action: UserAction) -> Result<()> {
    match action {
        UserAction::CreateAdmin {
            email,
            name,
            surname,
            password,
        } => {
            let config = MindwellConfig::load(config_path).context("loading configuration")?;
            let state = AppState::from_config(&config).await?;
            let user = create_admin(&state, &email, &name, &surname, &password).await?;
            println!("Created admin {} ({})", user.email, user.id);
            Ok(())
        }
    }
}

/// Create an administrator account in `state`'s store.
pub async fn create_admin(
    state: &AppState,
    email: &str,
    name: &str,
    surname: &str,
    password: &str,
) -> Result<User> {
    let user = accounts::create_account(
        state,
        NewAccount {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Admin,
            phone: None,
            bio: None,
            specialization: None,
        },
    )
    .await
    .with_context(|| format!("creating admin '{email}'"))?;
    tracing::info!(user_id = %user.id, "Admin account created");
    Ok(user)
}
