//! Saved link command handlers

use anyhow::Result;

use randwiki_core::{InputError, Session};

use super::position;
use crate::commands::lists::resolve_list;
use crate::editor::{confirm, edit_text};
use crate::output::Output;

pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_links(&session.user_links());
    Ok(())
}

/// Save comma-separated URLs, optionally adding them to lists
pub fn add(session: &mut Session, urls: String, lists: Vec<String>, output: &Output) -> Result<()> {
    let list_ids = lists
        .iter()
        .map(|list| resolve_list(session, list).map(|l| l.id))
        .collect::<Result<Vec<_>>>()?;

    let added = session.add_user_links(&urls, &list_ids);
    if added == 0 {
        output.message("No new links added. URLs must be valid and not already saved.");
    } else {
        output.success(&format!("Added {} link(s)", added));
    }
    Ok(())
}

/// Set the notes of a link, opening the editor when no text is given
pub fn note(session: &mut Session, index: usize, text: Option<String>, output: &Output) -> Result<()> {
    let idx = position(index)?;
    let text = match text {
        Some(text) => text,
        None => {
            let link = session
                .user_links()
                .into_iter()
                .nth(idx)
                .ok_or(InputError::NoSuchEntry(idx))?;
            edit_text(&link.notes)?
        }
    };

    session.update_user_link_note(idx, &text)?;
    output.success("Notes saved");
    Ok(())
}

pub fn title(
    session: &mut Session,
    index: usize,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    session.update_user_link_title(position(index)?, title.as_deref().unwrap_or(""))?;
    output.success("Title updated");
    Ok(())
}

pub fn remove(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    let idx = position(index)?;
    let links = session.user_links();
    let link = links.get(idx).ok_or(InputError::NoSuchEntry(idx))?;

    if output.should_prompt() {
        println!("Delete link: {} - {}", link.title, link.url);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = session.remove_user_link(idx)?;
    output.success(&format!("Deleted: {}", removed.title));
    Ok(())
}

pub fn to_reading(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    session.links_to_reading(position(index)?)?;
    output.success("Moved to currently reading");
    Ok(())
}

pub fn to_log(session: &mut Session, index: usize, output: &Output) -> Result<()> {
    session.links_to_log(position(index)?)?;
    output.success("Moved to log");
    Ok(())
}
