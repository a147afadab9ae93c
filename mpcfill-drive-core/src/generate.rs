//! Manifest generation from discovered Drive files plus user directives.
//!
//! Slot order: double-sided pairs (directive order), then repeated cards (directive
//! order, `count` consecutive slots each), then every remaining file in discovery order.

use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use crate::config::ManifestDefaults;
use crate::directive::CardSlotDirective;
use crate::drive::{DriveEntry, ResourceKind};
use crate::error::ManifestError;
use crate::manifest::{bracket_for, cardback_or_default, stock_or_default, CardImage, CardSlot, Manifest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSettings {
    pub stock: String,
    pub foil: bool,
    pub cardback: String,
    /// Used instead of the computed tier; must still hold every card.
    pub bracket_override: Option<u32>,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        ManifestDefaults::default().into()
    }
}

impl From<ManifestDefaults> for ManifestSettings {
    fn from(defaults: ManifestDefaults) -> Self {
        Self {
            stock: defaults.stock,
            foil: defaults.foil,
            cardback: defaults.cardback,
            bracket_override: None,
        }
    }
}

/// A directive that named a file not available in the discovered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDirective {
    pub directive: CardSlotDirective,
    pub missing: Vec<String>,
}

impl fmt::Display for UnresolvedDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "directive '{}' skipped, not found: {}",
            self.directive,
            self.missing.join(", ")
        )
    }
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub manifest: Manifest,
    pub unresolved: Vec<UnresolvedDirective>,
}

struct Pair {
    front: CardImage,
    back: CardImage,
    copies: u32,
}

/// Pool of files not yet claimed by a directive. Duplicate names resolve to the
/// first file discovered with that name.
struct PlainPool<'a> {
    files: Vec<&'a DriveEntry>,
    taken: Vec<bool>,
    by_name: HashMap<&'a str, usize>,
}

impl<'a> PlainPool<'a> {
    fn new(entries: &'a [DriveEntry]) -> Self {
        let files: Vec<&DriveEntry> = entries
            .iter()
            .filter(|entry| entry.kind == ResourceKind::File)
            .collect();
        let mut by_name = HashMap::new();
        for (position, file) in files.iter().copied().enumerate() {
            by_name.entry(file.name.as_str()).or_insert(position);
        }
        Self {
            taken: vec![false; files.len()],
            files,
            by_name,
        }
    }

    fn available(&self, name: &str) -> Option<usize> {
        self.by_name
            .get(name)
            .copied()
            .filter(|&position| !self.taken[position])
    }

    fn take(&mut self, position: usize) -> CardImage {
        self.taken[position] = true;
        image(self.files[position])
    }

    fn remaining(&self) -> impl Iterator<Item = &'a DriveEntry> + '_ {
        self.files
            .iter()
            .zip(&self.taken)
            .filter(|(_, &taken)| !taken)
            .map(|(file, _)| *file)
    }
}

fn image(entry: &DriveEntry) -> CardImage {
    CardImage::new(entry.id.clone(), entry.name.clone())
}

/// Builds a manifest. Folder entries are ignored; unresolvable directives are reported
/// in [`Generated::unresolved`] without affecting the others.
pub fn generate(
    entries: &[DriveEntry],
    directives: &[CardSlotDirective],
    settings: &ManifestSettings,
) -> Result<Generated, ManifestError> {
    let mut pool = PlainPool::new(entries);
    let mut pairs: Vec<Pair> = Vec::new();
    let mut repeats: Vec<(CardImage, u32)> = Vec::new();
    let mut unresolved: Vec<UnresolvedDirective> = Vec::new();

    for directive in directives {
        let CardSlotDirective::DoubleSided { front, back } = directive else {
            continue;
        };
        match (pool.available(front), pool.available(back)) {
            (Some(front_at), Some(back_at)) => {
                let front = pool.take(front_at);
                let back = pool.take(back_at);
                pairs.push(Pair {
                    front,
                    back,
                    copies: 1,
                });
            }
            (front_at, back_at) => {
                let missing = [(front, front_at), (back, back_at)]
                    .into_iter()
                    .filter(|(_, at)| at.is_none())
                    .map(|(name, _)| name.clone())
                    .collect();
                unresolved.push(UnresolvedDirective {
                    directive: directive.clone(),
                    missing,
                });
            }
        }
    }

    // A name given several times keeps its first position and its last count.
    let mut multiples: Vec<(&CardSlotDirective, &str, u32)> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for directive in directives {
        let CardSlotDirective::Multiple { name, count } = directive else {
            continue;
        };
        match seen.get(name.as_str()) {
            Some(&at) => multiples[at] = (directive, name.as_str(), *count),
            None => {
                seen.insert(name.as_str(), multiples.len());
                multiples.push((directive, name.as_str(), *count));
            }
        }
    }

    for (directive, name, count) in multiples {
        if let Some(position) = pool.available(name) {
            repeats.push((pool.take(position), count));
        } else if let Some(pair) = pairs
            .iter_mut()
            .find(|pair| pair.front.name == name || pair.back.name == name)
        {
            pair.copies = pair.copies.max(count);
        } else {
            unresolved.push(UnresolvedDirective {
                directive: directive.clone(),
                missing: vec![name.to_string()],
            });
        }
    }

    let mut slots: Vec<CardSlot> = Vec::new();
    let mut push = |front: CardImage, back: Option<CardImage>| {
        let slot = u32::try_from(slots.len()).unwrap_or(u32::MAX);
        slots.push(CardSlot { slot, front, back });
    };
    for pair in &pairs {
        for _ in 0..pair.copies {
            push(pair.front.clone(), Some(pair.back.clone()));
        }
    }
    for (front, count) in &repeats {
        for _ in 0..*count {
            push(front.clone(), None);
        }
    }
    for file in pool.remaining() {
        push(image(file), None);
    }

    let cards: usize = slots.iter().map(CardSlot::card_count).sum();
    let bracket = match settings.bracket_override {
        Some(bracket) if (bracket as usize) < cards => {
            return Err(ManifestError::BracketTooSmall { bracket, cards });
        }
        Some(bracket) => bracket,
        None => bracket_for(cards),
    };

    for item in &unresolved {
        warn!(directive = %item.directive, missing = ?item.missing, "Unresolved directive");
    }
    info!(
        slots = slots.len(),
        cards,
        bracket,
        pairs = pairs.len(),
        unresolved = unresolved.len(),
        "Generated manifest"
    );

    Ok(Generated {
        manifest: Manifest {
            slots,
            stock: stock_or_default(&settings.stock),
            foil: settings.foil,
            cardback: cardback_or_default(&settings.cardback),
            bracket,
        },
        unresolved,
    })
}
