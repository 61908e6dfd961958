//! Article source categories
//!
//! Each category key maps to a Wikipedia list page whose outgoing article
//! links are the category's members.

/// Pseudo-source key for the user's saved links
pub const MY_LINKS: &str = "my_links";

/// Selection prefix for a link list source (`linklist:<id>`)
pub const LINK_LIST_PREFIX: &str = "linklist:";

/// Category used when a selection ends up empty
pub const DEFAULT_CATEGORY: &str = "vital_technology";

/// Level 4 vital article topics
pub const VITAL_SOURCES: &[(&str, &str)] = &[
    ("vital_people", "Wikipedia:Vital_articles/Level/4/People"),
    ("vital_history", "Wikipedia:Vital_articles/Level/4/History"),
    ("vital_geography", "Wikipedia:Vital_articles/Level/4/Geography"),
    ("vital_arts", "Wikipedia:Vital_articles/Level/4/Arts"),
    (
        "vital_philosophy_religion",
        "Wikipedia:Vital_articles/Level/4/Philosophy_and_religion",
    ),
    (
        "vital_everyday_life",
        "Wikipedia:Vital_articles/Level/4/Everyday_life",
    ),
    (
        "vital_society_social_sciences",
        "Wikipedia:Vital_articles/Level/4/Society_and_social_sciences",
    ),
    (
        "vital_biology_health_sciences",
        "Wikipedia:Vital_articles/Level/4/Biology_and_health_sciences",
    ),
    (
        "vital_physical_sciences",
        "Wikipedia:Vital_articles/Level/4/Physical_sciences",
    ),
    ("vital_technology", "Wikipedia:Vital_articles/Level/4/Technology"),
    ("vital_mathematics", "Wikipedia:Vital_articles/Level/4/Mathematics"),
];

/// Good article topics
pub const GOOD_SOURCES: &[(&str, &str)] = &[
    (
        "agriculture_food_drink",
        "Wikipedia:Good_articles/Agriculture,_food_and_drink",
    ),
    ("art_architecture", "Wikipedia:Good_articles/Art_and_architecture"),
    (
        "engineering_technology",
        "Wikipedia:Good_articles/Engineering_and_technology",
    ),
    ("geography_places", "Wikipedia:Good_articles/Geography_and_places"),
    ("history", "Wikipedia:Good_articles/History"),
    (
        "language_literature",
        "Wikipedia:Good_articles/Language_and_literature",
    ),
    ("mathematics", "Wikipedia:Good_articles/Mathematics"),
    ("media_drama", "Wikipedia:Good_articles/Media_and_drama"),
    ("music", "Wikipedia:Good_articles/Music"),
    ("natural_sciences", "Wikipedia:Good_articles/Natural_sciences"),
    (
        "philosophy_religion",
        "Wikipedia:Good_articles/Philosophy_and_religion",
    ),
    (
        "social_sciences_society",
        "Wikipedia:Good_articles/Social_sciences_and_society",
    ),
    (
        "sports_recreation",
        "Wikipedia:Good_articles/Sports_and_recreation",
    ),
    ("video_games", "Wikipedia:Good_articles/Video_games"),
    ("warfare", "Wikipedia:Good_articles/Warfare"),
    ("all_good", "Wikipedia:Good_articles/all"),
];

/// Display labels, in presentation order
const LABELS: &[(&str, &str)] = &[
    ("vital_people", "People"),
    ("vital_history", "History"),
    ("vital_geography", "Geography"),
    ("vital_arts", "Arts"),
    ("vital_philosophy_religion", "Philosophy and religion"),
    ("vital_everyday_life", "Everyday life"),
    ("vital_society_social_sciences", "Society and social sciences"),
    ("vital_biology_health_sciences", "Biology and health sciences"),
    ("vital_physical_sciences", "Physical sciences"),
    ("vital_technology", "Technology"),
    ("vital_mathematics", "Mathematics"),
    ("agriculture_food_drink", "Agriculture, food and drink"),
    ("art_architecture", "Art and architecture"),
    ("engineering_technology", "Engineering and technology"),
    ("geography_places", "Geography and places"),
    ("history", "History"),
    ("language_literature", "Language and literature"),
    ("mathematics", "Mathematics"),
    ("media_drama", "Media and drama"),
    ("music", "Music"),
    ("natural_sciences", "Natural sciences"),
    ("philosophy_religion", "Philosophy and religion"),
    ("social_sciences_society", "Social sciences and society"),
    ("sports_recreation", "Sports and recreation"),
    ("video_games", "Video games"),
    ("warfare", "Warfare"),
    ("all_good", "All good articles"),
    (MY_LINKS, "Links"),
];

/// Which list family a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Vital,
    Good,
}

/// Resolve a category key to its Wikipedia list page
pub fn page_title(key: &str) -> Option<&'static str> {
    lookup(VITAL_SOURCES, key).or_else(|| lookup(GOOD_SOURCES, key))
}

pub fn is_category(key: &str) -> bool {
    page_title(key).is_some()
}

pub fn family(key: &str) -> Option<Family> {
    if lookup(VITAL_SOURCES, key).is_some() {
        Some(Family::Vital)
    } else if lookup(GOOD_SOURCES, key).is_some() {
        Some(Family::Good)
    } else {
        None
    }
}

/// Display label for a key; unknown keys display as themselves
pub fn label(key: &str) -> &str {
    lookup(LABELS, key).unwrap_or(key)
}

/// Reverse label lookup; unknown labels map to [`MY_LINKS`].
///
/// Labels are not unique ("History" is both a vital and a good topic), so
/// the first match in presentation order wins.
pub fn key_for_label(label: &str) -> &'static str {
    LABELS
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(k, _)| *k)
        .unwrap_or(MY_LINKS)
}

/// All category keys with their labels, vital topics first
pub fn all() -> impl Iterator<Item = (&'static str, &'static str)> {
    VITAL_SOURCES
        .iter()
        .chain(GOOD_SOURCES.iter())
        .map(|&(key, _)| (key, lookup(LABELS, key).unwrap_or(key)))
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
