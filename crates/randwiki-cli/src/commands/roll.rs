//! Roll command handlers

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use randwiki_core::categories::{self, Family};
use randwiki_core::selector::fetch_article;
use randwiki_core::{ArticleSource, Config, Selection, Session};

use crate::output::Output;

/// What to do with a picked article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickAction {
    None,
    Log,
    Reading,
}

impl PickAction {
    pub fn from_flags(log: bool, reading: bool) -> Self {
        if log {
            PickAction::Log
        } else if reading {
            PickAction::Reading
        } else {
            PickAction::None
        }
    }
}

/// Pick a random article from a preset, the given sources, or the
/// configured defaults
pub async fn roll(
    session: &mut Session,
    config: &Config,
    sources: Vec<String>,
    preset: Option<String>,
    action: PickAction,
    open: bool,
    output: &Output,
) -> Result<()> {
    let selection = match preset {
        Some(ref name) => session.preset_selection(name)?,
        None if sources.is_empty() => Selection::from_sources(&config.default_sources),
        None => Selection::from_sources(&sources),
    };
    debug!(sources = ?selection.to_sources(), "Rolling");

    let mut source = ArticleSource::from_config(config);
    let mut rng = StdRng::from_entropy();
    let pick = fetch_article(&*session, &mut source, &selection, &mut rng).await?;

    output.print_pick(&pick);

    match action {
        PickAction::Log => {
            session.log_pick(&pick);
            output.success("Logged");
        }
        PickAction::Reading => {
            if session.read_pick(&pick) {
                output.success("Added to currently reading");
            } else {
                output.message("Already in currently reading");
            }
        }
        PickAction::None => {}
    }

    if open {
        open::that(&pick.url).with_context(|| format!("Failed to open {}", pick.url))?;
    }

    Ok(())
}

/// List category keys grouped by list family
pub fn categories(output: &Output) -> Result<()> {
    let mut vital = Vec::new();
    let mut good = Vec::new();
    for (key, label) in categories::all() {
        match categories::family(key) {
            Some(Family::Vital) => vital.push((key, label)),
            Some(Family::Good) => good.push((key, label)),
            None => {}
        }
    }

    output.print_categories(&[("Vital articles", vital), ("Good articles", good)]);
    Ok(())
}
