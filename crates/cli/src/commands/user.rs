//! User account management commands.
//!
//! # Usage
//!
//! ```bash
//! shoptrail-cli user create -e shopper@example.com -p 'correct horse'
//! ```

use shoptrail_server::services::auth::AuthService;

/// Register a user through the same workflow as `POST /register`.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the input is invalid, or
/// the email is already registered.
pub async fn create(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let storage = super::connect().await?;

    let result = AuthService::new(storage.users()).register(email, password).await;
    storage.close().await;

    let user = result?;
    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
