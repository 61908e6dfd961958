//! Read log command handlers

use anyhow::Result;

use randwiki_core::categories::{self, MY_LINKS};
use randwiki_core::urls::{derive_title, normalize_url};
use randwiki_core::{InputError, Session};

use super::position;
use crate::editor::{confirm, edit_text};
use crate::output::Output;

pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_log(&session.read_log());
    Ok(())
}

/// Log an article by URL
pub fn add(
    session: &mut Session,
    url: String,
    title: Option<String>,
    category: Option<String>,
    output: &Output,
) -> Result<()> {
    let url = normalize_url(&url).ok_or(InputError::InvalidUrl(url))?;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| derive_title(&url));
    let category = category.unwrap_or_else(|| MY_LINKS.to_string());

    session.log_article(&url, title.trim(), &category);

    output.success(&format!("Logged: {} ({})", title.trim(), categories::label(&category)));
    Ok(())
}

/// Set the notes of an entry, opening the editor when no text is given
pub fn note(session: &mut Session, index: usize, text: Option<String>, output: &Output) -> Result<()> {
    let idx = position(index)?;
    let text = match text {
        Some(text) => text,
        None => {
            let entry = session
                .read_log()
                .into_iter()
                .nth(idx)
                .ok_or(InputError::NoSuchEntry(idx))?;
            edit_text(&entry.notes)?
        }
    };

    session.update_log_note(idx, &text)?;
    output.success("Notes saved");
    Ok(())
}

pub fn title(session: &mut Session, index: usize, title: String, output: &Output) -> Result<()> {
    session.update_log_title(position(index)?, &title)?;
    output.success("Title updated");
    Ok(())
}

pub fn remove(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    let idx = position(index)?;
    let log = session.read_log();
    let entry = log.get(idx).ok_or(InputError::NoSuchEntry(idx))?;

    if output.should_prompt() {
        println!("Remove from log: {}", entry.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = session.remove_from_log(idx)?;
    output.success(&format!("Removed: {}", removed.title));
    Ok(())
}

pub fn to_reading(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    session.log_to_reading(position(index)?)?;
    output.success("Moved to currently reading");
    Ok(())
}

pub fn to_links(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    session.log_to_links(position(index)?)?;
    output.success("Moved to links");
    Ok(())
}
