//! Keyed collections
//!
//! Every user collection is a `Vec` whose entries are unique by a string key
//! (a URL, a list id or a preset name). The helpers here are the only place
//! that inserts into a collection, so no collection ever holds two entries
//! with the same key.

/// An entry identified by a string key
pub trait Keyed {
    /// The identity of the entry within its collection
    fn key(&self) -> &str;

    /// Combine an existing entry with an incoming one carrying the same key.
    ///
    /// Used by [`upsert`]. The default keeps the existing entry.
    fn merge_duplicate(existing: Self, _incoming: Self) -> Self
    where
        Self: Sized,
    {
        existing
    }
}

/// Where a new or updated entry lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

/// Outcome of an [`upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Index of the entry with the given key
pub fn position<T: Keyed>(items: &[T], key: &str) -> Option<usize> {
    items.iter().position(|item| item.key() == key)
}

pub fn contains<T: Keyed>(items: &[T], key: &str) -> bool {
    position(items, key).is_some()
}

/// Insert `item` unless its key is already present.
///
/// Returns false (and leaves `items` untouched) on a duplicate.
pub fn insert_unique<T: Keyed>(items: &mut Vec<T>, item: T, at: Placement) -> bool {
    if contains(items, item.key()) {
        return false;
    }
    match at {
        Placement::Front => items.insert(0, item),
        Placement::Back => items.push(item),
    }
    true
}

/// Insert `item`, or merge it into the entry with the same key.
///
/// Either way the resulting entry is moved to `at`.
pub fn upsert<T: Keyed>(items: &mut Vec<T>, item: T, at: Placement) -> Upsert {
    let (entry, outcome) = match position(items, item.key()) {
        Some(idx) => {
            let existing = items.remove(idx);
            (T::merge_duplicate(existing, item), Upsert::Updated)
        }
        None => (item, Upsert::Inserted),
    };
    match at {
        Placement::Front => items.insert(0, entry),
        Placement::Back => items.push(entry),
    }
    outcome
}

/// Remove the entry with the given key
pub fn remove_by_key<T: Keyed>(items: &mut Vec<T>, key: &str) -> Option<T> {
    position(items, key).map(|idx| items.remove(idx))
}

/// Remove the entry at `index`, if in range
pub fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}
