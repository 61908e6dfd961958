//! Random article selection
//!
//! A selection mixes three kinds of source, written as strings:
//!
//! - a category key such as `vital_technology`
//! - `my_links`, every saved link
//! - `linklist:<id>`, the saved links that belong to one list
//!
//! [`fetch_article`] draws from Wikipedia or from the personal pool (saved
//! links plus selected lists, deduplicated by URL) with equal odds when both
//! are available, and from whichever one is available otherwise.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::categories::{self, DEFAULT_CATEGORY, LINK_LIST_PREFIX, MY_LINKS};
use crate::collections::{LinkLists, UserLinks};
use crate::models::{LinkList, Preset, UserLink};
use crate::remote::RemoteSync;
use crate::session::Session;
use crate::urls;
use crate::wiki::ArticleSource;

/// One entry of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Category(String),
    MyLinks,
    LinkList(String),
}

impl Source {
    pub fn parse(value: &str) -> Self {
        if value == MY_LINKS {
            Source::MyLinks
        } else if let Some(id) = value.strip_prefix(LINK_LIST_PREFIX) {
            Source::LinkList(id.to_string())
        } else {
            Source::Category(value.to_string())
        }
    }

    /// The string form accepted by [`Source::parse`]
    pub fn key(&self) -> String {
        match self {
            Source::Category(key) => key.clone(),
            Source::MyLinks => MY_LINKS.to_string(),
            Source::LinkList(id) => format!("{}{}", LINK_LIST_PREFIX, id),
        }
    }
}

/// The set of sources to draw from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub categories: Vec<String>,
    pub include_my_links: bool,
    pub link_list_ids: Vec<String>,
}

impl Selection {
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::default();
        for source in sources {
            match Source::parse(source.as_ref().trim()) {
                Source::MyLinks => selection.include_my_links = true,
                Source::LinkList(id) => push_unique(&mut selection.link_list_ids, id),
                Source::Category(key) if !key.is_empty() => {
                    push_unique(&mut selection.categories, key)
                }
                Source::Category(_) => {}
            }
        }
        selection
    }

    /// The selection written as source strings, categories first
    pub fn to_sources(&self) -> Vec<String> {
        let mut sources = self.categories.clone();
        if self.include_my_links {
            sources.push(MY_LINKS.to_string());
        }
        sources.extend(
            self.link_list_ids
                .iter()
                .map(|id| Source::LinkList(id.clone()).key()),
        );
        sources
    }

    /// The selection a preset applies; an empty preset selects the default
    /// category
    pub fn from_preset(preset: &Preset) -> Self {
        let selection = Self {
            categories: preset.wikipedia_categories.clone(),
            include_my_links: preset.include_my_links,
            link_list_ids: preset.link_list_ids.clone().unwrap_or_default(),
        };
        if selection.is_empty() {
            Self::from_sources([DEFAULT_CATEGORY])
        } else {
            selection
        }
    }

    /// Snapshot this selection as a named preset
    pub fn to_preset(&self, name: &str) -> Preset {
        Preset {
            name: name.to_string(),
            wikipedia_categories: self.categories.clone(),
            include_my_links: self.include_my_links,
            link_list_ids: (!self.link_list_ids.is_empty()).then(|| self.link_list_ids.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && !self.include_my_links && self.link_list_ids.is_empty()
    }

    fn wants_personal_pool(&self) -> bool {
        self.include_my_links || !self.link_list_ids.is_empty()
    }
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error(
        "Select at least one source (Wikipedia category, Links, or a link list). \
         Ensure your link list(s) have links."
    )]
    NoSources,
    #[error(
        "Add some links to your Links section (and to the selected list(s) if using link lists)."
    )]
    EmptyLinkPool,
    #[error("Failed to fetch article. The article source may be unavailable.")]
    Unavailable,
}

/// A picked article or link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pick {
    pub url: String,
    pub title: String,
    /// Display label of the source
    pub category_label: String,
    /// Source key, passed on when the pick is logged or queued
    pub category_key: String,
    /// Whether the pick came from the personal pool
    pub from_links: bool,
}

/// Pick a random article from the known categories among `keys`
///
/// Returns `None` without any request when no key is a known category, and
/// `None` when the chosen category's listing is unavailable.
pub async fn pick_random<S, G>(source: &mut ArticleSource, keys: &[S], rng: &mut G) -> Option<String>
where
    S: AsRef<str>,
    G: Rng,
{
    pick_from_categories(source, keys, rng)
        .await
        .map(|(url, _)| url)
}

/// Like [`pick_random`], also returning the category that was drawn
async fn pick_from_categories<S, G>(
    source: &mut ArticleSource,
    keys: &[S],
    rng: &mut G,
) -> Option<(String, String)>
where
    S: AsRef<str>,
    G: Rng,
{
    let known: Vec<&str> = keys
        .iter()
        .map(|key| key.as_ref())
        .filter(|key| categories::is_category(key))
        .collect();
    let key = known.choose(rng)?.to_string();

    let paths = source.fetch_category_members(&key).await;
    let path = paths.choose(rng)?;
    Some((source.article_url(path), key))
}

/// Saved links reachable from the selection, deduplicated by URL
///
/// List members that are no longer saved links are skipped.
pub fn link_pool(selection: &Selection, links: &[UserLink], lists: &[LinkList]) -> Vec<UserLink> {
    let mut pool: Vec<UserLink> = if selection.include_my_links {
        links.to_vec()
    } else {
        Vec::new()
    };

    for id in &selection.link_list_ids {
        let Some(list) = lists.iter().find(|l| &l.id == id) else {
            continue;
        };
        for url in &list.urls {
            if pool.iter().any(|l| &l.url == url) {
                continue;
            }
            if let Some(link) = links.iter().find(|l| &l.url == url) {
                pool.push(link.clone());
            }
        }
    }
    pool
}

/// Draw one article or link for a selection
pub async fn fetch_article<R, G>(
    session: &Session<R>,
    source: &mut ArticleSource,
    selection: &Selection,
    rng: &mut G,
) -> Result<Pick, SelectError>
where
    R: RemoteSync,
    G: Rng,
{
    let pool = link_pool(
        selection,
        &session.get::<UserLinks>(),
        &session.get::<LinkLists>(),
    );
    let has_wiki = !selection.categories.is_empty();
    let has_links = !pool.is_empty();

    if !has_wiki && !has_links {
        return Err(SelectError::NoSources);
    }
    if selection.wants_personal_pool() && !has_links {
        return Err(SelectError::EmptyLinkPool);
    }

    let use_wiki = has_wiki && (!has_links || rng.gen_bool(0.5));

    if use_wiki {
        let (url, key) = pick_from_categories(source, &selection.categories, rng)
            .await
            .ok_or(SelectError::Unavailable)?;
        let title = urls::wiki_title(&url).unwrap_or_else(|| urls::derive_title(&url));
        return Ok(Pick {
            title,
            category_label: categories::label(&key).to_string(),
            category_key: key,
            url,
            from_links: false,
        });
    }

    let link = pool.choose(rng).ok_or(SelectError::EmptyLinkPool)?;
    let title = if link.title.is_empty() {
        urls::derive_title(&link.url)
    } else {
        link.title.clone()
    };
    Ok(Pick {
        url: link.url.clone(),
        title,
        category_label: categories::label(MY_LINKS).to_string(),
        category_key: MY_LINKS.to_string(),
        from_links: true,
    })
}
