//! Merging several manifests into one order.

use tracing::info;

use crate::error::ManifestError;
use crate::manifest::{bracket_for, CardSlot, Manifest};

/// Settings that replace the first manifest's values when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineOverrides {
    pub stock: Option<String>,
    pub foil: Option<bool>,
    pub cardback: Option<String>,
    /// Recompute the bracket from the merged card count; otherwise keep the largest input bracket.
    pub auto_bracket: bool,
}

impl Default for CombineOverrides {
    fn default() -> Self {
        Self {
            stock: None,
            foil: None,
            cardback: None,
            auto_bracket: true,
        }
    }
}

/// Concatenates slots in input order and renumbers them from 0.
///
/// Unspecified settings come from the first manifest; differing values in later
/// manifests are dropped. With `auto_bracket` off, the largest input bracket is kept
/// unless it is too small for the merged count, in which case the matching tier is used.
pub fn combine(
    manifests: &[Manifest],
    overrides: &CombineOverrides,
) -> Result<Manifest, ManifestError> {
    let first = manifests.first().ok_or(ManifestError::EmptyInput)?;

    let slots: Vec<CardSlot> = manifests
        .iter()
        .flat_map(|manifest| manifest.slots.iter())
        .enumerate()
        .map(|(index, slot)| CardSlot {
            slot: u32::try_from(index).unwrap_or(u32::MAX),
            ..slot.clone()
        })
        .collect();

    let cards: usize = slots.iter().map(CardSlot::card_count).sum();
    let bracket = if overrides.auto_bracket {
        bracket_for(cards)
    } else {
        let largest = manifests.iter().map(|m| m.bracket).max().unwrap_or(0);
        if (largest as usize) < cards {
            bracket_for(cards)
        } else {
            largest
        }
    };

    let combined = Manifest {
        slots,
        stock: given(&overrides.stock).unwrap_or_else(|| first.stock.clone()),
        foil: overrides.foil.unwrap_or(first.foil),
        cardback: given(&overrides.cardback).unwrap_or_else(|| first.cardback.clone()),
        bracket,
    };

    info!(
        inputs = manifests.len(),
        slots = combined.slots.len(),
        cards,
        bracket,
        "Combined manifests"
    );
    Ok(combined)
}

/// A trimmed override, or `None` when absent or blank.
fn given(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
