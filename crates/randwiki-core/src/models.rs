//! Data models for randwiki
//!
//! Defines the entries of the five user collections. Field names follow the
//! JSON shape shared with the account backend and the local storage files,
//! so collections written by either side can be read by the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::keyed::Keyed;

/// A URL with a human-readable label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleReference {
    pub url: String,
    pub title: String,
}

/// One entry of the read log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    #[serde(default)]
    pub title: String,
    pub url: String,
    /// Display label of the source category
    #[serde(default)]
    pub category: String,
    /// When the article was (last) logged
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl LogEntry {
    /// Create a log entry stamped with the current time
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category: category.into(),
            date: Some(Utc::now()),
            notes: String::new(),
        }
    }
}

impl Keyed for LogEntry {
    fn key(&self) -> &str {
        &self.url
    }

    /// Re-logging refreshes title, category and date but keeps the notes
    fn merge_duplicate(existing: Self, incoming: Self) -> Self {
        Self {
            notes: existing.notes,
            ..incoming
        }
    }
}

/// A link saved by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserLink {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl UserLink {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            date: Some(Utc::now()),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

impl Keyed for UserLink {
    fn key(&self) -> &str {
        &self.url
    }
}

/// A named, user-curated group of saved link URLs
///
/// `urls` may reference URLs that are no longer saved links; deleting a
/// link does not retract its membership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl LinkList {
    /// Create an empty list with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_list_id(),
            name: name.into(),
            urls: Vec::new(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// Add a URL; returns false if it was already a member
    pub fn add_url(&mut self, url: &str) -> bool {
        if self.contains(url) {
            return false;
        }
        self.urls.push(url.to_string());
        true
    }

    /// Remove a URL; returns false if it was not a member
    pub fn remove_url(&mut self, url: &str) -> bool {
        let before = self.urls.len();
        self.urls.retain(|u| u != url);
        self.urls.len() != before
    }
}

impl Keyed for LinkList {
    fn key(&self) -> &str {
        &self.id
    }
}

/// `list_` followed by nine lowercase alphanumerics
fn new_list_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("list_{}", &simple[..9])
}

/// A saved source selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub wikipedia_categories: Vec<String>,
    #[serde(default)]
    pub include_my_links: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_list_ids: Option<Vec<String>>,
}

impl Keyed for Preset {
    fn key(&self) -> &str {
        &self.name
    }

    /// Saving under an existing name replaces the old snapshot
    fn merge_duplicate(_existing: Self, incoming: Self) -> Self {
        incoming
    }
}

/// An entry of the currently-reading queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEntry {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Display label of the source category (empty when unknown)
    #[serde(default)]
    pub category: String,
    /// Source key, used when the entry is later logged
    #[serde(default = "default_category_key")]
    pub category_key: String,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

/// Entries written by older clients may lack a date or carry one that does
/// not parse; both read as `None` so the rest of the collection still loads.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|date| date.with_timezone(&Utc)))
}

fn default_category_key() -> String {
    crate::categories::MY_LINKS.to_string()
}

impl Keyed for ReadingEntry {
    fn key(&self) -> &str {
        &self.url
    }
}
