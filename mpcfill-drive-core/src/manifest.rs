//! The MPCFill order manifest: model, bracket sizing and XML form.
//!
//! XML layout:
//! ```text
//! <order>
//!     <qty/> <bracket/> <stock/> <foil/> <cardback/>
//!     <fronts><card><id/><slot/><name/><query/></card>...</fronts>
//!     <backs><card><id/><slot/><name/><query/></card>...</backs>
//! </order>
//! ```
//! A paired slot has a front and a back card with the same `<slot>`; the global
//! cardback covers every slot without its own back.
//!
//! Files from the older Python tools put `quantity`, `bracket`, `stock` and `foil`
//! inside a `<details>` element and number cards with `<slots>`; both are read.
//!
//! XML text is read back trimmed, so every text value is stored trimmed:
//! [`CardImage::new`] trims, and so do generation and combining for the settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::ManifestError;

/// Print-run tiers MPCFill bills against, ascending.
pub const BRACKET_SIZES: &[u32] = &[
    18, 36, 55, 72, 90, 108, 126, 144, 162, 180, 198, 216, 234, 396, 504, 612,
];

pub const DEFAULT_STOCK: &str = "(S30) Standard Smooth";
pub const DEFAULT_CARDBACK: &str = "12RJeMQw2E0jEz4SwKJTItoONCeHD7skj";

/// Smallest tier that holds `cards`. Past the largest tier the count itself is used,
/// so the bracket never drops below the card count.
pub fn bracket_for(cards: usize) -> u32 {
    BRACKET_SIZES
        .iter()
        .copied()
        .find(|&size| size as usize >= cards)
        .unwrap_or_else(|| u32::try_from(cards).unwrap_or(u32::MAX))
}

/// One image placed on a card face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImage {
    pub id: String,
    pub name: String,
}

impl CardImage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: trimmed(id.into()),
            name: trimmed(name.into()),
        }
    }

    /// The name without its trailing `.ext`, case preserved.
    pub fn query(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSlot {
    pub slot: u32,
    pub front: CardImage,
    pub back: Option<CardImage>,
}

impl CardSlot {
    pub fn card_count(&self) -> usize {
        1 + usize::from(self.back.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub slots: Vec<CardSlot>,
    pub stock: String,
    pub foil: bool,
    pub cardback: String,
    pub bracket: u32,
}

impl Manifest {
    /// Fronts plus backs.
    pub fn card_count(&self) -> usize {
        self.slots.iter().map(CardSlot::card_count).sum()
    }

    pub fn back_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.back.is_some()).count()
    }

    /// True when slot numbers are exactly `0..N` in order.
    pub fn slots_are_contiguous(&self) -> bool {
        self.slots
            .iter()
            .enumerate()
            .all(|(index, slot)| slot.slot as usize == index)
    }

    pub fn to_xml(&self) -> Result<String, ManifestError> {
        let order = OrderXml::from(self);
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 4);
        order
            .serialize(serializer)
            .map_err(|e| ManifestError::Xml(e.to_string()))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"))
    }

    /// Parses a manifest. Missing settings fall back to the defaults; a missing bracket,
    /// or one too small for the cards, is recomputed. Backs are attached to the front
    /// with the same slot number.
    pub fn from_xml(xml: &str) -> Result<Self, ManifestError> {
        let order: OrderDocument =
            quick_xml::de::from_str(xml).map_err(|e| ManifestError::Xml(e.to_string()))?;
        let details = order.details.unwrap_or_default();

        let mut fronts: BTreeMap<u32, CardImage> = BTreeMap::new();
        for card in order.fronts.cards {
            let slot = card.slot;
            if fronts.insert(slot, CardImage::new(card.id, card.name)).is_some() {
                return Err(ManifestError::Xml(format!("duplicate front slot {slot}")));
            }
        }
        let mut backs: BTreeMap<u32, CardImage> = BTreeMap::new();
        for card in order.backs.cards {
            let slot = card.slot;
            if backs.insert(slot, CardImage::new(card.id, card.name)).is_some() {
                return Err(ManifestError::Xml(format!("duplicate back slot {slot}")));
            }
        }

        let slots: Vec<CardSlot> = fronts
            .into_iter()
            .map(|(slot, front)| CardSlot {
                slot,
                front,
                back: backs.remove(&slot),
            })
            .collect();
        for (slot, back) in &backs {
            warn!(slot, name = %back.name, "Back card has no front in the same slot, dropping it");
        }

        let mut manifest = Manifest {
            slots,
            stock: non_empty(order.stock.or(details.stock)).unwrap_or_else(default_stock),
            foil: order.foil.or(details.foil).unwrap_or(false),
            cardback: non_empty(order.cardback).unwrap_or_else(default_cardback),
            bracket: order.bracket.or(details.bracket).unwrap_or(0),
        };
        let cards = manifest.card_count();
        if (manifest.bracket as usize) < cards {
            if manifest.bracket != 0 {
                debug!(declared = manifest.bracket, cards, "Manifest bracket too small, recomputing");
            }
            manifest.bracket = bracket_for(cards);
        }
        if let Some(declared) = order.qty.or(details.quantity) {
            if declared != cards {
                debug!(declared, counted = cards, "Manifest qty differs from its cards");
            }
        }
        Ok(manifest)
    }
}

fn trimmed(value: String) -> String {
    if value.trim().len() == value.len() {
        value
    } else {
        value.trim().to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(trimmed).filter(|v| !v.is_empty())
}

/// Trimmed stock, or [`DEFAULT_STOCK`] when blank.
pub fn stock_or_default(value: &str) -> String {
    non_empty(Some(value.to_string())).unwrap_or_else(default_stock)
}

/// Trimmed cardback id, or [`DEFAULT_CARDBACK`] when blank.
pub fn cardback_or_default(value: &str) -> String {
    non_empty(Some(value.to_string())).unwrap_or_else(default_cardback)
}

fn default_stock() -> String {
    DEFAULT_STOCK.to_string()
}

fn default_cardback() -> String {
    DEFAULT_CARDBACK.to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename = "order")]
struct OrderXml {
    qty: usize,
    bracket: u32,
    stock: String,
    foil: bool,
    cardback: String,
    fronts: CardsXml,
    backs: CardsXml,
}

/// The accepted input shape. Top-level settings win over `<details>`.
#[derive(Debug, Deserialize)]
struct OrderDocument {
    #[serde(default)]
    qty: Option<usize>,
    #[serde(default)]
    bracket: Option<u32>,
    #[serde(default)]
    stock: Option<String>,
    #[serde(default)]
    foil: Option<bool>,
    #[serde(default)]
    cardback: Option<String>,
    #[serde(default)]
    details: Option<DetailsXml>,
    #[serde(default)]
    fronts: CardsXml,
    #[serde(default)]
    backs: CardsXml,
}

#[derive(Debug, Default, Deserialize)]
struct DetailsXml {
    #[serde(default)]
    quantity: Option<usize>,
    #[serde(default)]
    bracket: Option<u32>,
    #[serde(default)]
    stock: Option<String>,
    #[serde(default)]
    foil: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CardsXml {
    #[serde(rename = "card", default)]
    cards: Vec<CardXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CardXml {
    id: String,
    /// `slots` is what files written by the older tools use.
    #[serde(alias = "slots")]
    slot: u32,
    name: String,
    #[serde(default)]
    query: String,
}

impl CardXml {
    fn new(image: &CardImage, slot: u32) -> Self {
        Self {
            id: image.id.clone(),
            slot,
            name: image.name.clone(),
            query: image.query().to_string(),
        }
    }
}

impl From<&Manifest> for OrderXml {
    fn from(manifest: &Manifest) -> Self {
        let fronts = manifest
            .slots
            .iter()
            .map(|slot| CardXml::new(&slot.front, slot.slot))
            .collect();
        let backs = manifest
            .slots
            .iter()
            .filter_map(|slot| slot.back.as_ref().map(|back| CardXml::new(back, slot.slot)))
            .collect();
        OrderXml {
            qty: manifest.card_count(),
            bracket: manifest.bracket,
            stock: manifest.stock.clone(),
            foil: manifest.foil,
            cardback: manifest.cardback.clone(),
            fronts: CardsXml { cards: fronts },
            backs: CardsXml { cards: backs },
        }
    }
}
