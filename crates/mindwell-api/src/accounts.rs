//! Account creation and lookup shared by registration, the admin API and the CLI.

use mindwell_auth::password::hash_password;
use mindwell_core::{Role, User, validate};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

/// Everything needed to create an account.
#[derive(Clone, Debug, Deserialize)]
pub struct NewAccount {
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login email.
    pub email: String,
    /// Plain password, hashed before storage.
    pub password: String,
    /// Account role.
    pub role: Role,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Public biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Area of practice.
    #[serde(default)]
    pub specialization: Option<String>,
}

/// Create an account; 409 if the email is already registered.
pub async fn create_account(state: &AppState, account: NewAccount) -> ApiResult<User> {
    validate::password(&account.password)?;
    let mut user = User::new(
        &account.name,
        &account.surname,
        &account.email,
        hash_password(&account.password)?,
        account.role,
    )?;
    user.phone = validate::optional_text(account.phone);
    user.bio = validate::optional_text(account.bio);
    user.specialization = validate::optional_text(account.specialization);

    let _guard = state.locks.users.lock().await;
    if find_by_email(state, &user.email).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "email '{}' is already registered",
            user.email
        )));
    }
    state.users().insert(&user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "Account created");
    Ok(user)
}

/// Look a user up by email (normalized before comparing).
pub async fn find_by_email(state: &AppState, email: &str) -> ApiResult<Option<User>> {
    let email = email.trim().to_lowercase();
    Ok(state.users().find_one(|u| u.email == email).await?)
}
