use std::io::{self, Write};

use anyhow::Context;
use notiflow_console::storage::config::Config;
use notiflow_console::sync::api_client::HttpConsoleClient;
use notiflow_console::sync::session::{StoredSession, TokenStorage};

/// Prompts for the password, logs in and stores the returned token.
pub async fn login(config: &Config, email: &str) -> anyhow::Result<()> {
    print!("Contraseña para {}: ", email);
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    let client = HttpConsoleClient::new(&config.api)?;
    let response = client
        .login(email, password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("No se pudo iniciar sesión")))?;

    let user = match response.user {
        Some(user) => Some(user),
        None => {
            tracing::info!("Login response carried no user, asking /auth/me");
            client.with_token(response.token.clone()).me().await.ok()
        }
    };

    let storage = TokenStorage::new(config.session.token_cache.clone());
    storage
        .save(&StoredSession::new(response.token, user.clone()))
        .context("No se pudo guardar la sesión")?;

    match user {
        Some(user) => println!("Sesión iniciada como {} ({})", user.name, user.role),
        None => println!("Sesión iniciada"),
    }
    Ok(())
}

/// Best-effort server logout followed by wiping the local session file.
pub async fn logout(config: &Config) -> anyhow::Result<()> {
    let storage = TokenStorage::new(config.session.token_cache.clone());
    if let Ok(session) = storage.load() {
        let client = HttpConsoleClient::new(&config.api)?.with_token(session.token);
        if let Err(e) = client.logout().await {
            tracing::warn!("Server logout failed: {}", e);
        }
    }
    storage.clear().context("No se pudo borrar la sesión")?;
    println!("Sesión cerrada");
    Ok(())
}
