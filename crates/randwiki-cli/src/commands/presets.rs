//! Preset command handlers

use anyhow::Result;

use randwiki_core::{Selection, Session};

use crate::output::Output;

pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_presets(&session.presets());
    Ok(())
}

/// Save sources under a name, replacing any preset with that name
pub fn save(session: &mut Session, name: String, sources: Vec<String>, output: &Output) -> Result<()> {
    let selection = Selection::from_sources(&sources);
    session.save_preset(&name, &selection)?;
    output.success(&format!(
        "Saved preset {}: {}",
        name.trim(),
        selection.to_sources().join(", ")
    ));
    Ok(())
}

pub fn delete(session: &mut Session, name: String, output: &Output) -> Result<()> {
    let removed = session.delete_preset(&name)?;
    output.success(&format!("Deleted preset: {}", removed.name));
    Ok(())
}
