//! Command handlers

pub mod auth;
pub mod config;
pub mod links;
pub mod lists;
pub mod log;
pub mod presets;
pub mod reading;
pub mod roll;
pub mod status;

use anyhow::{bail, Result};

/// Convert an entry number as printed by the list commands to a position
pub fn position(number: usize) -> Result<usize> {
    if number == 0 {
        bail!("Entries are numbered from 1");
    }
    Ok(number - 1)
}
