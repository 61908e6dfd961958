//! Collection operations
//!
//! Every edit is a read-modify-write over a whole collection: `get`, change
//! the `Vec`, `save`. Input is validated before anything is read, so a
//! rejected edit never touches a collection.
//!
//! Indexes are zero-based positions in the collection as returned by the
//! matching getter.

use thiserror::Error;
use tracing::debug;

use crate::categories::{self, MY_LINKS};
use crate::collections::{CurrentlyReading, LinkLists, Presets, ReadLog, UserLinks};
use crate::keyed::{self, Placement, Upsert};
use crate::models::{LinkList, LogEntry, Preset, ReadingEntry, UserLink};
use crate::remote::RemoteSync;
use crate::selector::Selection;
use crate::session::Session;
use crate::urls;

/// Rejected user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please enter a name")]
    EmptyName,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Please select at least one source (Wikipedia category, Links, or a link list)")]
    NoSources,
    #[error("No entry #{}", .0 + 1)]
    NoSuchEntry(usize),
    #[error("Unknown link list: {0}")]
    UnknownList(String),
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

fn non_empty_name(name: &str) -> Result<&str, InputError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(InputError::EmptyName)
    } else {
        Ok(trimmed)
    }
}

impl<R: RemoteSync> Session<R> {
    // ==================== Read Log ====================

    /// Read log, most recent first
    pub fn read_log(&self) -> Vec<LogEntry> {
        self.get::<ReadLog>()
    }

    /// Log an article under its source key
    ///
    /// Re-logging a URL refreshes its title, category and date, keeps its
    /// notes, and moves it to the front.
    pub fn log_article(&mut self, url: &str, title: &str, category_key: &str) {
        let mut log = self.read_log();
        let entry = LogEntry::new(url, title, categories::label(category_key));
        if keyed::upsert(&mut log, entry, Placement::Front) == Upsert::Updated {
            debug!(url, "Re-logged article");
        }
        self.save::<ReadLog>(log);
    }

    pub fn update_log_note(&mut self, index: usize, notes: &str) -> Result<(), InputError> {
        let mut log = self.read_log();
        let entry = log.get_mut(index).ok_or(InputError::NoSuchEntry(index))?;
        entry.notes = notes.trim().to_string();
        self.save::<ReadLog>(log);
        Ok(())
    }

    /// Retitle a log entry; a blank title keeps the current one
    pub fn update_log_title(&mut self, index: usize, title: &str) -> Result<(), InputError> {
        let mut log = self.read_log();
        let entry = log.get_mut(index).ok_or(InputError::NoSuchEntry(index))?;
        let trimmed = title.trim();
        if !trimmed.is_empty() {
            entry.title = trimmed.to_string();
        }
        self.save::<ReadLog>(log);
        Ok(())
    }

    pub fn remove_from_log(&mut self, index: usize) -> Result<LogEntry, InputError> {
        let mut log = self.read_log();
        let removed = keyed::remove_at(&mut log, index).ok_or(InputError::NoSuchEntry(index))?;
        self.save::<ReadLog>(log);
        Ok(removed)
    }

    // ==================== User Links ====================

    pub fn user_links(&self) -> Vec<UserLink> {
        self.get::<UserLinks>()
    }

    /// Add every URL of a comma-separated input
    ///
    /// Invalid URLs and URLs already saved (or repeated in the input) are
    /// skipped. New links are appended with titles derived from their URLs
    /// and added to each of `list_ids`. Returns how many links were added.
    pub fn add_user_links(&mut self, input: &str, list_ids: &[String]) -> usize {
        let mut links = self.user_links();
        let mut added = Vec::new();

        for candidate in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some(url) = urls::normalize_url(candidate) else {
                debug!(input = candidate, "Skipping invalid URL");
                continue;
            };
            let title = urls::derive_title(&url);
            if keyed::insert_unique(&mut links, UserLink::new(url.clone(), title), Placement::Back) {
                added.push(url);
            }
        }

        if added.is_empty() {
            return 0;
        }
        self.save::<UserLinks>(links);

        if !list_ids.is_empty() {
            let mut lists = self.link_lists();
            for list in lists.iter_mut().filter(|l| list_ids.contains(&l.id)) {
                for url in &added {
                    list.add_url(url);
                }
            }
            self.save::<LinkLists>(lists);
        }
        added.len()
    }

    /// Save one link at the front; a no-op if the URL is already saved
    ///
    /// A blank title is derived from the URL. Returns whether it was added.
    pub fn add_user_link(&mut self, url: &str, title: &str, notes: &str) -> bool {
        let mut links = self.user_links();
        let title = if title.trim().is_empty() {
            urls::derive_title(url)
        } else {
            title.to_string()
        };
        let link = UserLink::new(url, title).with_notes(notes);
        if !keyed::insert_unique(&mut links, link, Placement::Front) {
            return false;
        }
        self.save::<UserLinks>(links);
        true
    }

    pub fn update_user_link_note(&mut self, index: usize, notes: &str) -> Result<(), InputError> {
        let mut links = self.user_links();
        let link = links.get_mut(index).ok_or(InputError::NoSuchEntry(index))?;
        link.notes = notes.trim().to_string();
        self.save::<UserLinks>(links);
        Ok(())
    }

    /// Retitle a link; a blank title resets it to the derived title
    pub fn update_user_link_title(&mut self, index: usize, title: &str) -> Result<(), InputError> {
        let mut links = self.user_links();
        let link = links.get_mut(index).ok_or(InputError::NoSuchEntry(index))?;
        let trimmed = title.trim();
        link.title = if trimmed.is_empty() {
            urls::derive_title(&link.url)
        } else {
            trimmed.to_string()
        };
        self.save::<UserLinks>(links);
        Ok(())
    }

    /// Remove a link; list memberships are left in place
    pub fn remove_user_link(&mut self, index: usize) -> Result<UserLink, InputError> {
        let mut links = self.user_links();
        let removed = keyed::remove_at(&mut links, index).ok_or(InputError::NoSuchEntry(index))?;
        self.save::<UserLinks>(links);
        Ok(removed)
    }

    pub fn remove_user_link_by_url(&mut self, url: &str) -> Option<UserLink> {
        let mut links = self.user_links();
        let removed = keyed::remove_by_key(&mut links, url)?;
        self.save::<UserLinks>(links);
        Some(removed)
    }

    // ==================== Link Lists ====================

    pub fn link_lists(&self) -> Vec<LinkList> {
        self.get::<LinkLists>()
    }

    /// Create an empty list and return its id
    pub fn add_link_list(&mut self, name: &str) -> Result<String, InputError> {
        let name = non_empty_name(name)?;
        let mut lists = self.link_lists();
        let list = LinkList::new(name);
        let id = list.id.clone();
        lists.push(list);
        self.save::<LinkLists>(lists);
        Ok(id)
    }

    pub fn rename_link_list(&mut self, id: &str, name: &str) -> Result<(), InputError> {
        let name = non_empty_name(name)?;
        self.with_list(id, |list| list.name = name.to_string())
    }

    /// Delete a list; its links stay saved
    pub fn delete_link_list(&mut self, id: &str) -> Result<LinkList, InputError> {
        let mut lists = self.link_lists();
        let removed = keyed::remove_by_key(&mut lists, id)
            .ok_or_else(|| InputError::UnknownList(id.to_string()))?;
        self.save::<LinkLists>(lists);
        Ok(removed)
    }

    pub fn add_url_to_list(&mut self, id: &str, url: &str) -> Result<bool, InputError> {
        self.with_list(id, |list| list.add_url(url))
    }

    pub fn remove_url_from_list(&mut self, id: &str, url: &str) -> Result<bool, InputError> {
        self.with_list(id, |list| list.remove_url(url))
    }

    /// Flip membership of `url`; returns whether it is now a member
    pub fn toggle_url_in_list(&mut self, id: &str, url: &str) -> Result<bool, InputError> {
        self.with_list(id, |list| {
            if list.remove_url(url) {
                false
            } else {
                list.add_url(url)
            }
        })
    }

    /// Find a list by id, or by exact name when no id matches
    pub fn find_link_list(&self, id_or_name: &str) -> Option<LinkList> {
        let lists = self.link_lists();
        let by_id = keyed::position(&lists, id_or_name);
        let idx = by_id.or_else(|| lists.iter().position(|l| l.name == id_or_name))?;
        lists.into_iter().nth(idx)
    }

    fn with_list<T>(&mut self, id: &str, edit: impl FnOnce(&mut LinkList) -> T) -> Result<T, InputError> {
        let mut lists = self.link_lists();
        let list = lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| InputError::UnknownList(id.to_string()))?;
        let result = edit(list);
        self.save::<LinkLists>(lists);
        Ok(result)
    }

    // ==================== Presets ====================

    pub fn presets(&self) -> Vec<Preset> {
        self.get::<Presets>()
    }

    /// Save a selection under a name, replacing a preset of the same name
    pub fn save_preset(&mut self, name: &str, selection: &Selection) -> Result<(), InputError> {
        let name = non_empty_name(name)?;
        if selection.is_empty() {
            return Err(InputError::NoSources);
        }
        let mut presets = self.presets();
        keyed::upsert(&mut presets, selection.to_preset(name), Placement::Back);
        self.save::<Presets>(presets);
        Ok(())
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<Preset, InputError> {
        let mut presets = self.presets();
        let removed = keyed::remove_by_key(&mut presets, name)
            .ok_or_else(|| InputError::UnknownPreset(name.to_string()))?;
        self.save::<Presets>(presets);
        Ok(removed)
    }

    /// The selection stored under a preset name
    pub fn preset_selection(&self, name: &str) -> Result<Selection, InputError> {
        self.presets()
            .iter()
            .find(|p| p.name == name)
            .map(Selection::from_preset)
            .ok_or_else(|| InputError::UnknownPreset(name.to_string()))
    }

    // ==================== Currently Reading ====================

    pub fn currently_reading(&self) -> Vec<ReadingEntry> {
        self.get::<CurrentlyReading>()
    }

    /// Queue an article at the front; a no-op if the URL is queued already
    ///
    /// Without a category the entry is treated as a saved link when logged.
    pub fn add_to_reading(&mut self, url: &str, title: &str, category_key: Option<&str>) -> bool {
        let mut items = self.currently_reading();
        if keyed::contains(&items, url) {
            return false;
        }
        let title = if title.trim().is_empty() {
            urls::derive_title(url)
        } else {
            title.to_string()
        };
        let entry = ReadingEntry {
            url: url.to_string(),
            title,
            category: category_key.map(categories::label).unwrap_or("").to_string(),
            category_key: category_key.unwrap_or(MY_LINKS).to_string(),
            date: Some(chrono::Utc::now()),
            notes: String::new(),
        };
        keyed::insert_unique(&mut items, entry, Placement::Front);
        self.save::<CurrentlyReading>(items);
        true
    }

    pub fn remove_from_reading(&mut self, index: usize) -> Result<ReadingEntry, InputError> {
        let mut items = self.currently_reading();
        let removed = keyed::remove_at(&mut items, index).ok_or(InputError::NoSuchEntry(index))?;
        self.save::<CurrentlyReading>(items);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::Collection;
    use crate::session::tests::local;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn session(temp_dir: &TempDir) -> Session {
        Session::local_only(local(temp_dir))
    }

    #[test]
    fn test_relog_keeps_notes_and_moves_to_front() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        session.log_article("https://en.wikipedia.org/wiki/Rust", "Rust", "vital_technology");
        session.update_log_note(0, "  read twice  ").unwrap();
        session.log_article("https://example.org/other", "Other", "my_links");
        assert_eq!(session.read_log()[0].url, "https://example.org/other");

        session.log_article("https://en.wikipedia.org/wiki/Rust", "Rust (language)", "music");
        let log = session.read_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].url, "https://en.wikipedia.org/wiki/Rust");
        assert_eq!(log[0].title, "Rust (language)");
        assert_eq!(log[0].category, "Music");
        assert_eq!(log[0].notes, "read twice");
    }

    #[test]
    fn test_log_title_blank_keeps_old() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session.log_article("https://example.org/a", "A", "my_links");

        session.update_log_title(0, "   ").unwrap();
        assert_eq!(session.read_log()[0].title, "A");
        session.update_log_title(0, "Renamed").unwrap();
        assert_eq!(session.read_log()[0].title, "Renamed");

        assert_eq!(session.update_log_title(3, "x"), Err(InputError::NoSuchEntry(3)));
        assert_eq!(InputError::NoSuchEntry(3).to_string(), "No entry #4");
    }

    #[test]
    fn test_add_user_links_writes_local_storage() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        assert_eq!(session.add_user_links("https://example.org/a", &[]), 1);

        let raw = session.local().get_item(UserLinks::STORAGE_KEY).unwrap().unwrap();
        let stored: Vec<UserLink> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].url, "https://example.org/a");
        assert_eq!(stored[0].title, "a");
    }

    #[test]
    fn test_links_without_dates_survive_an_edit() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session
            .local()
            .set_item(
                UserLinks::STORAGE_KEY,
                r#"[{"url":"https://a.org/x","title":"x","notes":"","date":"2024-01-01T00:00:00.000Z"},
                    {"url":"https://a.org/old","title":"old","notes":""}]"#,
            )
            .unwrap();
        assert_eq!(session.user_links().len(), 2);

        assert!(session.add_user_link("https://a.org/new", "", ""));

        let raw = session.local().get_item(UserLinks::STORAGE_KEY).unwrap().unwrap();
        let stored: Vec<UserLink> = serde_json::from_str(&raw).unwrap();
        let urls: Vec<&str> = stored.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, ["https://a.org/new", "https://a.org/x", "https://a.org/old"]);
        assert!(stored[2].date.is_none());
    }

    #[test]
    fn test_add_user_links_skips_invalid_and_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session.add_user_link("https://example.org/a", "", "");

        let added = session.add_user_links(
            "example.org/a, example.org/b,, https://example.org/b, http://, example.org/c",
            &[],
        );
        assert_eq!(added, 2);
        let urls: Vec<_> = session.user_links().into_iter().map(|l| l.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.org/a",
                "https://example.org/b",
                "https://example.org/c"
            ]
        );
    }

    #[test]
    fn test_add_user_links_into_lists() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        let id = session.add_link_list("Weekend").unwrap();
        let other = session.add_link_list("Other").unwrap();

        session.add_user_links("example.org/a, example.org/b", &[id.clone()]);
        let lists = session.link_lists();
        let weekend = lists.iter().find(|l| l.id == id).unwrap();
        assert_eq!(weekend.urls, vec!["https://example.org/a", "https://example.org/b"]);
        assert!(lists.iter().find(|l| l.id == other).unwrap().urls.is_empty());
    }

    #[test]
    fn test_duplicate_link_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        assert!(session.add_user_link("https://example.org/a", "First", "n"));
        assert!(!session.add_user_link("https://example.org/a", "Second", ""));
        let links = session.user_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "First");
        assert_eq!(links[0].notes, "n");
    }

    #[test]
    fn test_link_title_blank_resets_to_derived() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        session.add_user_link("https://en.wikipedia.org/wiki/Alan_Turing", "Turing", "");

        session.update_user_link_title(0, "").unwrap();
        assert_eq!(session.user_links()[0].title, "Alan Turing");
    }

    #[test]
    fn test_delete_list_keeps_links() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        let id = session.add_link_list("L").unwrap();
        session.add_user_links("https://example.org/u", &[id.clone()]);

        session.delete_link_list(&id).unwrap();
        assert!(session.link_lists().is_empty());
        assert_eq!(session.user_links()[0].url, "https://example.org/u");
    }

    #[test]
    fn test_removing_link_keeps_membership() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        let id = session.add_link_list("L").unwrap();
        session.add_user_links("https://example.org/u", &[id.clone()]);

        session.remove_user_link(0).unwrap();
        assert!(session.user_links().is_empty());
        assert_eq!(session.link_lists()[0].urls, vec!["https://example.org/u"]);
    }

    #[test]
    fn test_list_membership_edits() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);
        assert_eq!(session.add_link_list("  "), Err(InputError::EmptyName));
        let id = session.add_link_list(" Reading group ").unwrap();
        assert_eq!(session.link_lists()[0].name, "Reading group");

        assert!(session.add_url_to_list(&id, "https://a.org").unwrap());
        assert!(!session.add_url_to_list(&id, "https://a.org").unwrap());
        assert!(!session.toggle_url_in_list(&id, "https://a.org").unwrap());
        assert!(session.toggle_url_in_list(&id, "https://a.org").unwrap());
        assert!(session.remove_url_from_list(&id, "https://a.org").unwrap());
        assert!(session.link_lists()[0].urls.is_empty());

        session.rename_link_list(&id, "Renamed").unwrap();
        assert_eq!(session.find_link_list("Renamed").unwrap().id, id);
        assert_eq!(
            session.add_url_to_list("list_missing", "https://a.org"),
            Err(InputError::UnknownList("list_missing".to_string()))
        );
    }

    #[test]
    fn test_presets() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        assert_eq!(
            session.save_preset("", &Selection::from_sources(["vital_arts"])),
            Err(InputError::EmptyName)
        );
        assert_eq!(
            session.save_preset("Empty", &Selection::default()),
            Err(InputError::NoSources)
        );
        assert!(session.presets().is_empty());

        session
            .save_preset("Arts", &Selection::from_sources(["vital_arts"]))
            .unwrap();
        session
            .save_preset("Mine", &Selection::from_sources(["my_links"]))
            .unwrap();
        session
            .save_preset("Arts", &Selection::from_sources(["vital_arts", "music"]))
            .unwrap();

        let presets = session.presets();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[1].name, "Arts");
        assert_eq!(presets[1].wikipedia_categories, vec!["vital_arts", "music"]);
        assert_eq!(presets[1].link_list_ids, None);

        let selection = session.preset_selection("Mine").unwrap();
        assert_eq!(selection.to_sources(), vec!["my_links"]);

        session.delete_preset("Mine").unwrap();
        assert!(matches!(
            session.preset_selection("Mine"),
            Err(InputError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_currently_reading() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        assert!(session.add_to_reading("https://example.org/a", "", None));
        assert!(session.add_to_reading(
            "https://en.wikipedia.org/wiki/Bridge",
            "Bridge",
            Some("vital_technology")
        ));
        assert!(!session.add_to_reading("https://example.org/a", "Again", None));

        let items = session.currently_reading();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "Technology");
        assert_eq!(items[0].category_key, "vital_technology");
        assert_eq!(items[1].title, "a");
        assert_eq!(items[1].category, "");
        assert_eq!(items[1].category_key, "my_links");

        assert_eq!(session.remove_from_reading(0).unwrap().title, "Bridge");
        assert!(session.remove_from_reading(5).is_err());
    }

    #[test]
    fn test_save_then_get_survives_failed_write() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::local_only(LocalStorage::new(temp_dir.path(), 16));

        session.add_user_link("https://example.org/a-rather-long-path", "", "");
        assert_eq!(session.user_links().len(), 1);
    }
}
