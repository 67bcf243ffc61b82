//! Shared types for the TCGDESK service.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that lookup, pricing, inventory
//! and dashboard modules can depend on them without circular references.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Price quote
// ---------------------------------------------------------------------------

/// A price that may be missing from the marketplace feed.
///
/// The primary feed omits the market price for some variants, so every
/// consumer pattern-matches instead of checking a magic value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum PriceQuote {
    Available(Decimal),
    Unavailable,
}

impl PriceQuote {
    /// The price as `Some(amount)` when available.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            PriceQuote::Available(p) => Some(*p),
            PriceQuote::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PriceQuote::Available(_))
    }
}

impl From<Option<Decimal>> for PriceQuote {
    fn from(value: Option<Decimal>) -> Self {
        match value {
            Some(p) => PriceQuote::Available(p),
            None => PriceQuote::Unavailable,
        }
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceQuote::Available(p) => write!(f, "${:.2}", p),
            PriceQuote::Unavailable => write!(f, "N/A"),
        }
    }
}

// ---------------------------------------------------------------------------
// Market snapshot
// ---------------------------------------------------------------------------

/// One point-in-time read of a card's pricing across the two feeds:
/// the primary marketplace (per-variant market price) and the secondary
/// marketplace (rolling average realized sale prices).
///
/// Constructed fresh per lookup, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market_price: PriceQuote,
    /// Rolling average realized sale price. Zero when the feed has none.
    pub average_sell_price: Decimal,
    /// 7-day rolling average baseline.
    pub avg7: Decimal,
    /// 30-day rolling average baseline.
    pub avg30: Decimal,
}

impl MarketSnapshot {
    /// A snapshot with no usable data at all.
    pub fn empty() -> Self {
        Self {
            market_price: PriceQuote::Unavailable,
            average_sell_price: Decimal::ZERO,
            avg7: Decimal::ZERO,
            avg30: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A card record as returned by the lookup service, reduced to the
/// fields the desk actually uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub set_name: String,
    /// Release date of the card's set (drives rotation status).
    pub set_release_date: Option<NaiveDate>,
    pub rarity: Option<String>,
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub snapshot: MarketSnapshot,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] (market: {} | avg sell: ${:.2})",
            self.name, self.set_name, self.snapshot.market_price, self.snapshot.average_sell_price,
        )
    }
}

impl Card {
    /// Helper to build a test/sample card with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        use rust_decimal_macros::dec;
        Card {
            id: "base1-4".to_string(),
            name: "Charizard".to_string(),
            set_name: "Base".to_string(),
            set_release_date: NaiveDate::from_ymd_opt(1999, 1, 9),
            rarity: Some("Rare Holo".to_string()),
            image_small: Some("https://images.pokemontcg.io/base1/4.png".to_string()),
            image_large: Some("https://images.pokemontcg.io/base1/4_hires.png".to_string()),
            snapshot: MarketSnapshot {
                market_price: PriceQuote::Available(dec!(100)),
                average_sell_price: dec!(95),
                avg7: dec!(92),
                avg30: dec!(90),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Release catalog entries
// ---------------------------------------------------------------------------

/// A closed percentage interval, e.g. 10–20%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl ImpactRange {
    /// Midpoint of the interval — the single number the estimate uses.
    pub fn mean(&self) -> Decimal {
        (self.min + self.max) / Decimal::TWO
    }
}

impl fmt::Display for ImpactRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}%", self.min, self.max)
    }
}

/// An upcoming product release expected to move prices of related cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingRelease {
    pub name: String,
    pub release_date: NaiveDate,
    /// Keywords matched against card names. Order within the catalog
    /// carries priority: the first matching release wins.
    pub related_names: Vec<String>,
    pub impact: ImpactRange,
    /// Human-readable commentary shown as the predicted-impact text.
    pub commentary: String,
}

// ---------------------------------------------------------------------------
// Pricing result
// ---------------------------------------------------------------------------

/// Price trend direction against the 30-day baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "Up"),
            Trend::Down => write!(f, "Down"),
            Trend::Stable => write!(f, "Stable"),
        }
    }
}

/// A trend classification together with the percent change behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub direction: Trend,
    /// Percent change vs the baseline, rounded to 2 decimal places.
    pub change_pct: Decimal,
}

/// Coarse demand classification from the market-price / avg-sell ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandIndex {
    Low,
    Medium,
    High,
    Unknown,
}

impl fmt::Display for DemandIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandIndex::Low => write!(f, "Low"),
            DemandIndex::Medium => write!(f, "Medium"),
            DemandIndex::High => write!(f, "High"),
            DemandIndex::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Standard-format legality of the card's set under the annual rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationStatus {
    InStandard,
    RotatingSoon,
    RotatedOut,
}

impl fmt::Display for RotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationStatus::InStandard => write!(f, "In standard"),
            RotationStatus::RotatingSoon => write!(f, "Rotating soon"),
            RotationStatus::RotatedOut => write!(f, "Rotated out"),
        }
    }
}

/// Computed pricing view for one card. Produced per invocation and
/// discarded after render; it has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub predicted_impact: String,
    pub recommended_price: PriceQuote,
    pub market_trend: TrendReading,
    pub sell_trend: TrendReading,
    pub demand: DemandIndex,
    pub rotation: RotationStatus,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for TCGDESK.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Invalid impact range \"{raw}\": expected \"<min>-<max>%\" with non-negative numbers")]
    InvalidImpactFormat { raw: String },

    #[error("Catalog error ({entry}): {message}")]
    Catalog { entry: String, message: String },

    #[error("Lookup error: {message}")]
    Lookup { message: String },

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -- PriceQuote tests --

    #[test]
    fn test_price_quote_amount() {
        assert_eq!(PriceQuote::Available(dec!(12.50)).amount(), Some(dec!(12.50)));
        assert_eq!(PriceQuote::Unavailable.amount(), None);
    }

    #[test]
    fn test_price_quote_display() {
        assert_eq!(format!("{}", PriceQuote::Available(dec!(3.5))), "$3.50");
        assert_eq!(format!("{}", PriceQuote::Unavailable), "N/A");
    }

    #[test]
    fn test_price_quote_from_option() {
        assert_eq!(PriceQuote::from(Some(dec!(1))), PriceQuote::Available(dec!(1)));
        assert_eq!(PriceQuote::from(None), PriceQuote::Unavailable);
    }

    #[test]
    fn test_price_quote_serialization_roundtrip() {
        let available = serde_json::to_string(&PriceQuote::Available(dec!(9.99))).unwrap();
        let missing = serde_json::to_string(&PriceQuote::Unavailable).unwrap();
        assert!(available.contains("available"));
        assert!(missing.contains("unavailable"));

        let back: PriceQuote = serde_json::from_str(&available).unwrap();
        assert_eq!(back, PriceQuote::Available(dec!(9.99)));
    }

    // -- ImpactRange tests --

    #[test]
    fn test_impact_range_mean() {
        let range = ImpactRange { min: dec!(10), max: dec!(20) };
        assert_eq!(range.mean(), dec!(15));
    }

    #[test]
    fn test_impact_range_display() {
        let range = ImpactRange { min: dec!(5), max: dec!(10) };
        assert_eq!(format!("{range}"), "5-10%");
    }

    // -- Display tests --

    #[test]
    fn test_rotation_status_display() {
        assert_eq!(format!("{}", RotationStatus::InStandard), "In standard");
        assert_eq!(format!("{}", RotationStatus::RotatingSoon), "Rotating soon");
        assert_eq!(format!("{}", RotationStatus::RotatedOut), "Rotated out");
    }

    #[test]
    fn test_demand_index_display() {
        assert_eq!(format!("{}", DemandIndex::High), "High");
        assert_eq!(format!("{}", DemandIndex::Unknown), "Unknown");
    }

    #[test]
    fn test_card_display() {
        let card = Card::sample();
        let s = format!("{card}");
        assert!(s.contains("Charizard"));
        assert!(s.contains("$100.00"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = MarketSnapshot::empty();
        assert!(!snap.market_price.is_available());
        assert_eq!(snap.avg30, Decimal::ZERO);
    }
}
