//! Account command handlers

use anyhow::{bail, Result};

use randwiki_core::{RegisterOutcome, Session};

use crate::editor::{prompt_line, prompt_password};
use crate::output::Output;

fn credentials(username: Option<String>, password: Option<String>) -> Result<(String, String)> {
    let username = match username {
        Some(username) => username,
        None => prompt_line("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    if username.trim().is_empty() || password.is_empty() {
        bail!("Please enter username and password");
    }
    Ok((username.trim().to_string(), password))
}

pub async fn login(
    session: &mut Session,
    username: Option<String>,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let (username, password) = credentials(username, password)?;
    let user = session.login(&username, &password).await?;
    output.success(&format!("Logged in as {}", user));
    Ok(())
}

pub async fn register(
    session: &mut Session,
    username: Option<String>,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let (username, password) = credentials(username, password)?;
    match session.register(&username, &password).await? {
        RegisterOutcome::LoggedIn(user) => {
            output.success(&format!("Registered and logged in as {}", user))
        }
        RegisterOutcome::LoginRequired(message) => output.message(&message),
    }
    Ok(())
}

/// Log out; a stored session cookie is dropped even when anonymous
pub async fn logout(session: &mut Session, output: &Output) -> Result<()> {
    let was_authenticated = session.is_authenticated();
    session.logout().await;
    if was_authenticated {
        output.success("Logged out");
    } else {
        output.message("Not logged in.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_trims_username() {
        let (user, pass) = credentials(Some(" ada ".into()), Some(" pw".into())).unwrap();
        assert_eq!(user, "ada");
        assert_eq!(pass, " pw");
    }

    #[test]
    fn test_credentials_rejects_blank() {
        assert!(credentials(Some("  ".into()), Some("pw".into())).is_err());
        assert!(credentials(Some("ada".into()), Some(String::new())).is_err());
    }
}
