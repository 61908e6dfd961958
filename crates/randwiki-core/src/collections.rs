//! Collection descriptors
//!
//! Each of the five user collections is described once: where it lives in
//! device-local storage, which backend endpoint serves it, the JSON field
//! wrapping it on the wire, and which in-memory cache slot holds it while
//! authenticated. [`crate::session::Session`] is generic over these.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::keyed::Keyed;
use crate::models::{LinkList, LogEntry, Preset, ReadingEntry, UserLink};

/// In-memory copies of the collections
///
/// A slot is `Some` while authenticated (the remote copy), or while
/// anonymous after a local write failed (the unsaved value).
#[derive(Debug, Default)]
pub struct Caches {
    read_log: Option<Vec<LogEntry>>,
    user_links: Option<Vec<UserLink>>,
    link_lists: Option<Vec<LinkList>>,
    presets: Option<Vec<Preset>>,
    currently_reading: Option<Vec<ReadingEntry>>,
}

impl Caches {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.read_log.is_none()
            && self.user_links.is_none()
            && self.link_lists.is_none()
            && self.presets.is_none()
            && self.currently_reading.is_none()
    }
}

/// Static description of one user collection
pub trait Collection: Send + Sync + 'static {
    type Item: Keyed + Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Human-readable name used in logs
    const NAME: &'static str;
    /// Device-local storage key
    const STORAGE_KEY: &'static str;
    /// Backend path for GET (pull) and POST (push)
    const ENDPOINT: &'static str;
    /// Field wrapping the array in backend request and response bodies
    const FIELD: &'static str;

    fn cache(caches: &Caches) -> &Option<Vec<Self::Item>>;
    fn cache_mut(caches: &mut Caches) -> &mut Option<Vec<Self::Item>>;
}

macro_rules! collection {
    ($marker:ident, $item:ty, $slot:ident, $name:literal, $key:literal, $endpoint:literal, $field:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Collection for $marker {
            type Item = $item;

            const NAME: &'static str = $name;
            const STORAGE_KEY: &'static str = $key;
            const ENDPOINT: &'static str = $endpoint;
            const FIELD: &'static str = $field;

            fn cache(caches: &Caches) -> &Option<Vec<Self::Item>> {
                &caches.$slot
            }

            fn cache_mut(caches: &mut Caches) -> &mut Option<Vec<Self::Item>> {
                &mut caches.$slot
            }
        }
    };
}

collection!(
    ReadLog,
    LogEntry,
    read_log,
    "read log",
    "random_wiki_read_log",
    "/api/read-log",
    "log"
);
collection!(
    UserLinks,
    UserLink,
    user_links,
    "user links",
    "random_wiki_user_links",
    "/api/user-links",
    "links"
);
collection!(
    LinkLists,
    LinkList,
    link_lists,
    "link lists",
    "random_wiki_link_lists",
    "/api/link-lists",
    "linkLists"
);
collection!(
    Presets,
    Preset,
    presets,
    "presets",
    "random_wiki_presets",
    "/api/presets",
    "presets"
);
collection!(
    CurrentlyReading,
    ReadingEntry,
    currently_reading,
    "currently reading",
    "random_wiki_currently_reading",
    "/api/currently-reading",
    "items"
);
