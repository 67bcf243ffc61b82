//! Physical inventory and the in-person serving queue.
//!
//! The inventory is an in-memory list of owned cards seeded from a TOML
//! file at startup; nothing persists across sessions. The serving queue
//! orders waiting customers by priority, each holding a stack of cards
//! reserved for them while they are served at the counter.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use tracing::{debug, info};

use crate::types::DeskError;

// ---------------------------------------------------------------------------
// Inventory items
// ---------------------------------------------------------------------------

/// Physical condition grade of an owned card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "NM")]
    NearMint,
    #[serde(rename = "LP")]
    LightlyPlayed,
    #[serde(rename = "MP")]
    ModeratelyPlayed,
    #[serde(rename = "HP")]
    HeavilyPlayed,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::NearMint => write!(f, "NM"),
            Condition::LightlyPlayed => write!(f, "LP"),
            Condition::ModeratelyPlayed => write!(f, "MP"),
            Condition::HeavilyPlayed => write!(f, "HP"),
        }
    }
}

/// Collecting era of an owned card, used to group the grid view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Era {
    Vintage,
    Mid,
    Modern,
}

/// One owned card in the shop's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Lookup-service card identifier (e.g. "base1-4").
    pub id: String,
    pub name: String,
    pub condition: Condition,
    pub era: Era,
    /// False once sold.
    pub available: bool,
}

// ---------------------------------------------------------------------------
// File shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    card: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    name: String,
    condition: Condition,
    era: Era,
    #[serde(default = "default_available")]
    available: bool,
}

fn default_available() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// The shop's card inventory.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    /// Load the seed inventory from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory file: {path}"))?;
        let file: InventoryFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse inventory file: {path}"))?;

        let items: Vec<InventoryItem> = file
            .card
            .into_iter()
            .map(|raw| InventoryItem {
                id: raw.id,
                name: raw.name,
                condition: raw.condition,
                era: raw.era,
                available: raw.available,
            })
            .collect();

        info!(path, count = items.len(), "Inventory loaded");
        Ok(Self { items })
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn get(&self, card_id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == card_id)
    }

    /// Mark a card as sold. Errors when the card isn't in the inventory.
    pub fn mark_sold(&mut self, card_id: &str) -> Result<(), DeskError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == card_id)
            .ok_or_else(|| DeskError::Inventory(format!("unknown card: {card_id}")))?;
        item.available = false;
        debug!(card_id, "Card marked sold");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serving queue
// ---------------------------------------------------------------------------

/// A customer waiting to be served, with the cards held back for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub username: String,
    /// Lower numbers are served first.
    pub priority: u32,
    /// Card ids reserved for this customer, in reservation order.
    pub stack: Vec<String>,
}

/// Priority-ordered queue of customers at the counter.
///
/// Insertion keeps the queue sorted by priority; the head entry is the
/// customer being served now.
#[derive(Debug, Clone, Default)]
pub struct ServingQueue {
    entries: Vec<QueueEntry>,
}

impl ServingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// The customer being served now, if anyone is waiting.
    pub fn now_serving(&self) -> Option<&QueueEntry> {
        self.entries.first()
    }

    /// Add a customer, keeping the queue sorted by priority. Customers
    /// with equal priority keep their arrival order.
    pub fn join(&mut self, username: &str, priority: u32) -> Result<(), DeskError> {
        if self.entries.iter().any(|e| e.username == username) {
            return Err(DeskError::Inventory(format!(
                "{username} is already in the queue"
            )));
        }
        self.entries.push(QueueEntry {
            username: username.to_string(),
            priority,
            stack: Vec::new(),
        });
        self.entries.sort_by_key(|e| e.priority);
        debug!(username, priority, "Customer joined the queue");
        Ok(())
    }

    /// Remove the customer at the head of the queue (sale completed).
    pub fn serve_next(&mut self) -> Option<QueueEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Toggle a card in a customer's stack: reserve it if absent,
    /// release it if already reserved.
    pub fn toggle_stack(&mut self, username: &str, card_id: &str) -> Result<bool, DeskError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.username == username)
            .ok_or_else(|| DeskError::Inventory(format!("{username} is not in the queue")))?;

        if let Some(pos) = entry.stack.iter().position(|id| id == card_id) {
            entry.stack.remove(pos);
            Ok(false)
        } else {
            entry.stack.push(card_id.to_string());
            Ok(true)
        }
    }

    /// Whether any customer holds this card in their stack.
    pub fn is_card_stacked(&self, card_id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.stack.iter().any(|id| id == card_id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
