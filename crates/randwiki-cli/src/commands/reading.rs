//! Currently-reading command handlers

use anyhow::Result;

use randwiki_core::urls::normalize_url;
use randwiki_core::{InputError, Session};

use super::position;
use crate::editor::confirm;
use crate::output::Output;

pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_reading(&session.currently_reading());
    Ok(())
}

/// Queue an article by URL
///
/// Without a category the entry is logged as a saved link later.
pub fn add(
    session: &mut Session,
    url: String,
    title: Option<String>,
    category: Option<String>,
    output: &Output,
) -> Result<()> {
    let url = normalize_url(&url).ok_or(InputError::InvalidUrl(url))?;
    let title = title.unwrap_or_default();

    if session.add_to_reading(&url, &title, category.as_deref()) {
        output.success("Added to currently reading");
    } else {
        output.message("Already in currently reading");
    }
    Ok(())
}

pub fn remove(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    let idx = position(index)?;
    let items = session.currently_reading();
    let entry = items.get(idx).ok_or(InputError::NoSuchEntry(idx))?;

    if output.should_prompt() {
        println!("Remove from currently reading: {}", entry.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = session.remove_from_reading(idx)?;
    output.success(&format!("Removed: {}", removed.title));
    Ok(())
}

pub fn to_log(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    session.reading_to_log(position(index)?)?;
    output.success("Moved to log");
    Ok(())
}

pub fn to_links(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    session.reading_to_links(position(index)?)?;
    output.success("Moved to links");
    Ok(())
}
