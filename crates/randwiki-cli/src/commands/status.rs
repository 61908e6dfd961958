//! Status command handler

use anyhow::Result;

use randwiki_core::{AuthState, Config, Session};

use crate::output::{Output, OutputFormat};

/// Show session and collection status
pub fn show(session: &Session, config: &Config, output: &Output) -> Result<()> {
    let counts = [
        ("log", session.read_log().len()),
        ("links", session.user_links().len()),
        ("link_lists", session.link_lists().len()),
        ("presets", session.presets().len()),
        ("currently_reading", session.currently_reading().len()),
    ];

    match output.format {
        OutputFormat::Json => {
            let counts: serde_json::Map<String, serde_json::Value> = counts
                .iter()
                .map(|(name, count)| (name.to_string(), (*count).into()))
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "authenticated": session.is_authenticated(),
                    "username": session.username(),
                    "api_url": config.api_url,
                    "data_dir": config.data_dir,
                    "counts": counts,
                    "pending_pushes": session.pending_pushes()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", session.username().unwrap_or("anonymous"));
        }
        OutputFormat::Human => {
            println!("randwiki Status");
            println!("===============");
            println!();
            println!("Account:");
            match session.auth_state() {
                AuthState::Authenticated { username } => {
                    println!("  Logged in as: {}", username)
                }
                AuthState::Anonymous => println!("  Not logged in (data stays on this device)"),
            }
            println!(
                "  Backend:      {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Storage:");
            println!("  Location: {}", session.local().dir().display());
            println!();
            println!("Contents:");
            for (name, count) in counts {
                println!("  {:<18} {}", format!("{}:", name), count);
            }
            if session.pending_pushes() > 0 {
                println!();
                println!("{} change(s) still being sent", session.pending_pushes());
            }
        }
    }

    Ok(())
}
