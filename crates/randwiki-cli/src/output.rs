//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Entries are numbered from 1 in human output; those numbers are what the
//! index arguments of the commands take.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use randwiki_core::{LinkList, LogEntry, Pick, Preset, ReadingEntry, UserLink};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a picked article
    pub fn print_pick(&self, pick: &Pick) {
        match self.format {
            OutputFormat::Human => {
                println!("Read:     {}", pick.title);
                println!("URL:      {}", pick.url);
                println!("Category: {}", pick.category_label);
            }
            OutputFormat::Json => print_json(pick),
            OutputFormat::Quiet => println!("{}", pick.url),
        }
    }

    pub fn print_log(&self, log: &[LogEntry]) {
        match self.format {
            OutputFormat::Human => {
                if log.is_empty() {
                    println!("No articles logged yet.");
                    return;
                }
                for (i, entry) in log.iter().enumerate() {
                    println!(
                        "{:>3}. {} | {} | {}",
                        i + 1,
                        truncate(&entry.title, 40),
                        entry.category,
                        entry.date.as_ref().map(format_date).unwrap_or_else(|| "-".to_string())
                    );
                    println!("     {}", entry.url);
                    if !entry.notes.is_empty() {
                        println!("     Notes: {}", truncate_line(&entry.notes, 60));
                    }
                }
                println!("\n{} logged article(s)", log.len());
            }
            OutputFormat::Json => print_json(&log),
            OutputFormat::Quiet => {
                for entry in log {
                    println!("{}", entry.url);
                }
            }
        }
    }

    pub fn print_links(&self, links: &[UserLink]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links saved.");
                    return;
                }
                for (i, link) in links.iter().enumerate() {
                    let notes_indicator = if link.notes.is_empty() { "" } else { " *" };
                    println!(
                        "{:>3}. {}{} | {}",
                        i + 1,
                        truncate(&link.title, 35),
                        notes_indicator,
                        truncate(&link.url, 50)
                    );
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => print_json(&links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.url);
                }
            }
        }
    }

    pub fn print_lists(&self, lists: &[LinkList]) {
        match self.format {
            OutputFormat::Human => {
                if lists.is_empty() {
                    println!("No link lists.");
                    return;
                }
                for list in lists {
                    println!("{} | {} ({})", list.id, list.name, list.urls.len());
                }
                println!("\n{} list(s)", lists.len());
            }
            OutputFormat::Json => print_json(&lists),
            OutputFormat::Quiet => {
                for list in lists {
                    println!("{}", list.id);
                }
            }
        }
    }

    /// Print one list with its members, marking URLs no longer saved
    pub fn print_list(&self, list: &LinkList, links: &[UserLink]) {
        match self.format {
            OutputFormat::Human => {
                println!("{} ({})", list.name, list.id);
                println!();
                if list.urls.is_empty() {
                    println!("No links in this list.");
                    return;
                }
                for url in &list.urls {
                    match links.iter().find(|l| &l.url == url) {
                        Some(link) => println!("  {} | {}", truncate(&link.title, 35), url),
                        None => println!("  (not saved) | {}", url),
                    }
                }
            }
            OutputFormat::Json => print_json(list),
            OutputFormat::Quiet => {
                for url in &list.urls {
                    println!("{}", url);
                }
            }
        }
    }

    pub fn print_presets(&self, presets: &[Preset]) {
        match self.format {
            OutputFormat::Human => {
                if presets.is_empty() {
                    println!("No presets yet. Save one with `randwiki presets save`.");
                    return;
                }
                for preset in presets {
                    let mut sources = preset.wikipedia_categories.clone();
                    if preset.include_my_links {
                        sources.push("my_links".to_string());
                    }
                    if let Some(ref ids) = preset.link_list_ids {
                        sources.extend(ids.iter().map(|id| format!("linklist:{}", id)));
                    }
                    println!("{}: {}", preset.name, sources.join(", "));
                }
            }
            OutputFormat::Json => print_json(&presets),
            OutputFormat::Quiet => {
                for preset in presets {
                    println!("{}", preset.name);
                }
            }
        }
    }

    pub fn print_reading(&self, items: &[ReadingEntry]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("Nothing in your reading list.");
                    return;
                }
                for (i, entry) in items.iter().enumerate() {
                    let category = if entry.category.is_empty() {
                        "-"
                    } else {
                        entry.category.as_str()
                    };
                    println!(
                        "{:>3}. {} | {} | {}",
                        i + 1,
                        truncate(&entry.title, 40),
                        category,
                        truncate(&entry.url, 50)
                    );
                }
            }
            OutputFormat::Json => print_json(&items),
            OutputFormat::Quiet => {
                for entry in items {
                    println!("{}", entry.url);
                }
            }
        }
    }

    /// Print category keys with their labels
    pub fn print_categories(&self, groups: &[(&str, Vec<(&str, &str)>)]) {
        match self.format {
            OutputFormat::Human => {
                for (heading, categories) in groups {
                    println!("{}:", heading);
                    for (key, label) in categories {
                        println!("  {:<32} {}", key, label);
                    }
                    println!();
                }
            }
            OutputFormat::Json => {
                let json: Vec<_> = groups
                    .iter()
                    .flat_map(|(group, categories)| {
                        categories.iter().map(move |(key, label)| {
                            serde_json::json!({"key": key, "label": label, "group": group})
                        })
                    })
                    .collect();
                print_json(&json);
            }
            OutputFormat::Quiet => {
                for (_, categories) in groups {
                    for (key, _) in categories {
                        println!("{}", key);
                    }
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// `Mon D, YYYY, h:mm AM` in local time
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%b %-d, %Y, %-I:%M %p")
        .to_string()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte titles are cut on character boundaries
        assert_eq!(truncate("Ångström unit", 8), "Ångst...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
    }

    #[test]
    fn test_format_date_shape() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let formatted = format_date(&date);
        let local = date.with_timezone(&Local);
        assert!(formatted.starts_with(&local.format("%b %-d, %Y, ").to_string()));
        assert!(formatted.ends_with("AM") || formatted.ends_with("PM"));
    }
}
