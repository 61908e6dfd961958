//! Link list command handlers
//!
//! Lists are addressed by id or by exact name.

use anyhow::Result;

use randwiki_core::urls::normalize_url;
use randwiki_core::{InputError, LinkList, Session};

use crate::editor::confirm;
use crate::output::Output;

/// Look up a list by id or name
pub fn resolve_list(session: &Session, id_or_name: &str) -> Result<LinkList> {
    session
        .find_link_list(id_or_name)
        .ok_or_else(|| InputError::UnknownList(id_or_name.to_string()).into())
}

fn parse_url(url: String) -> Result<String> {
    normalize_url(&url).ok_or_else(|| InputError::InvalidUrl(url).into())
}

pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_lists(&session.link_lists());
    Ok(())
}

pub fn show(session: &Session, list: String, output: &Output) -> Result<()> {
    let list = resolve_list(session, &list)?;
    output.print_list(&list, &session.user_links());
    Ok(())
}

pub fn create(session: &mut Session, name: String, output: &Output) -> Result<()> {
    let id = session.add_link_list(&name)?;
    output.success(&format!("Created list: {} ({})", name.trim(), id));
    Ok(())
}

pub fn rename(session: &mut Session, list: String, name: String, output: &Output) -> Result<()> {
    let list = resolve_list(session, &list)?;
    session.rename_link_list(&list.id, &name)?;
    output.success(&format!("Renamed {} to {}", list.name, name.trim()));
    Ok(())
}

pub fn delete(session: &mut Session, list: String, output: &Output) -> Result<()> {
    let list = resolve_list(session, &list)?;

    if output.should_prompt() {
        println!("Delete list: {} ({} links)", list.name, list.urls.len());
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = session.delete_link_list(&list.id)?;
    output.success(&format!("Deleted list: {}", removed.name));
    Ok(())
}

pub fn add_url(session: &mut Session, list: String, url: String, output: &Output) -> Result<()> {
    let list = resolve_list(session, &list)?;
    let url = parse_url(url)?;
    if session.add_url_to_list(&list.id, &url)? {
        output.success(&format!("Added to {}", list.name));
    } else {
        output.message(&format!("Already in {}", list.name));
    }
    Ok(())
}

pub fn remove_url(session: &mut Session, list: String, url: String, output: &Output) -> Result<()> {
    let list = resolve_list(session, &list)?;
    let url = parse_url(url)?;
    if session.remove_url_from_list(&list.id, &url)? {
        output.success(&format!("Removed from {}", list.name));
    } else {
        output.message(&format!("Not in {}", list.name));
    }
    Ok(())
}

pub fn toggle_url(session: &mut Session, list: String, url: String, output: &Output) -> Result<()> {
    let list = resolve_list(session, &list)?;
    let url = parse_url(url)?;
    if session.toggle_url_in_list(&list.id, &url)? {
        output.success(&format!("Added to {}", list.name));
    } else {
        output.success(&format!("Removed from {}", list.name));
    }
    Ok(())
}
