//! cli::commands::auth
//!
//! Authentication command for storing remote credentials.
//!
//! # Design
//!
//! - Stores the credential bundle via the [`CredentialStore`]
//! - NEVER prints tokens to stdout/stderr
//! - Supports both interactive (prompted) and non-interactive (`--token`)
//!   modes

use anyhow::{bail, Context as _, Result};

use crate::core::types::{AuthKind, GitAuth};
use crate::secrets::CredentialStore;

use super::Context;

/// Run the auth command.
///
/// # Security
///
/// This function never prints the token value; it only confirms
/// success or failure.
pub fn auth(
    ctx: &Context,
    token: Option<&str>,
    username: Option<&str>,
    status: bool,
    logout: bool,
) -> Result<()> {
    let credentials = ctx.credentials()?;

    if status {
        return show_status(&credentials, ctx);
    }

    if logout {
        credentials
            .clear_token()
            .context("failed to remove stored credentials")?;
        quiet_println(ctx, "Credentials removed.");
        return Ok(());
    }

    let token_value = match token {
        Some(value) => value.to_string(),
        None => rpassword::prompt_password("Access token (input hidden): ")
            .context("failed to read token from terminal")?,
    };

    if token_value.trim().is_empty() {
        bail!("token must not be empty");
    }

    let auth = GitAuth {
        kind: AuthKind::Pat,
        token: token_value.trim().to_string(),
        username: username.map(str::to_string),
        repo_url: None,
    };

    credentials
        .store_token(&auth)
        .context("failed to store credentials")?;
    quiet_println(ctx, "Credentials stored.");
    Ok(())
}

fn show_status(credentials: &CredentialStore, ctx: &Context) -> Result<()> {
    let present = credentials
        .has_token()
        .context("failed to inspect credential store")?;

    if present {
        // Intentionally no token material, not even a prefix.
        quiet_println(ctx, "Credentials are configured.");
    } else {
        quiet_println(ctx, "No credentials configured. Run 'vaultsync auth'.");
    }
    Ok(())
}

fn quiet_println(ctx: &Context, message: &str) {
    crate::ui::output::print(message, ctx.verbosity);
}
