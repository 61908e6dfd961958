//! Config command handlers

use anyhow::{bail, Context, Result};

use randwiki_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str =
    "data_dir, api_url, wiki_api_url, wiki_base_url, default_sources, storage_quota_bytes, log_file";

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "api_url": config.api_url,
                    "wiki_api_url": config.wiki_api_url,
                    "wiki_base_url": config.wiki_base_url,
                    "default_sources": config.default_sources,
                    "storage_quota_bytes": config.storage_quota_bytes,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!(
                "  api_url:             {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            println!("  wiki_api_url:        {}", config.wiki_api_url);
            println!("  wiki_base_url:       {}", config.wiki_base_url);
            println!("  default_sources:     {}", config.default_sources.join(", "));
            println!("  storage_quota_bytes: {}", config.storage_quota_bytes);
            println!(
                "  log_file:            {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    apply(&mut config, &key, &value)?;
    config.save().context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => config.data_dir = value.into(),
        "api_url" => config.api_url = optional(value),
        "wiki_api_url" => config.wiki_api_url = value.to_string(),
        "wiki_base_url" => config.wiki_base_url = value.trim_end_matches('/').to_string(),
        "default_sources" => {
            let sources: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if sources.is_empty() {
                bail!("default_sources needs at least one source");
            }
            config.default_sources = sources;
        }
        "storage_quota_bytes" => {
            config.storage_quota_bytes = value
                .parse()
                .context("Invalid value for storage_quota_bytes. Use a number of bytes.")?;
        }
        "log_file" => config.log_file = optional(value).map(Into::into),
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_optional_values() {
        let mut config = Config::default();
        apply(&mut config, "api_url", "https://randwiki.example").unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://randwiki.example"));

        apply(&mut config, "api_url", "none").unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_apply_default_sources() {
        let mut config = Config::default();
        apply(&mut config, "default_sources", "vital_arts, my_links,").unwrap();
        assert_eq!(config.default_sources, vec!["vital_arts", "my_links"]);
        assert!(apply(&mut config, "default_sources", " , ").is_err());
    }

    #[test]
    fn test_apply_rejects_unknown_key() {
        let mut config = Config::default();
        let err = apply(&mut config, "sync_url", "x").unwrap_err();
        assert!(err.to_string().contains("Valid keys"));
        assert!(apply(&mut config, "storage_quota_bytes", "lots").is_err());
    }
}
