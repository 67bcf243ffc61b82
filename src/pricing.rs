//! Pricing and impact estimation.
//!
//! Pure functions turning a card's market snapshot plus the release
//! catalog into a recommended sale price, trend readings, a demand
//! index and the set's rotation status. No I/O, no shared mutable
//! state; the catalog and the evaluation date are injected so results
//! are deterministic under test.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::catalog::ReleaseCatalog;
use crate::types::{
    DemandIndex, DeskError, ImpactRange, MarketSnapshot, PriceQuote, PricingResult,
    RotationStatus, Trend, TrendReading, UpcomingRelease,
};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Market/avg-sell ratio above which demand reads High.
const DEMAND_HIGH_RATIO: Decimal = dec!(1.1);
/// Market/avg-sell ratio below which demand reads Low.
const DEMAND_LOW_RATIO: Decimal = dec!(0.9);
/// Markup applied when the realized sell price overrides the estimate.
const SELL_PRICE_MARKUP: Decimal = dec!(1.1);

/// Shown when the primary feed has no market price for the card.
pub const NO_PRICE_TEXT: &str = "price data unavailable";
/// Shown when no catalog release matches the card.
pub const NO_IMPACT_TEXT: &str = "no upcoming impact predicted";

// ---------------------------------------------------------------------------
// Impact range parsing
// ---------------------------------------------------------------------------

/// Parse an impact range of the literal form `"<min>-<max>%"`,
/// e.g. `"10-20%"`. Both halves must be non-negative numbers.
/// The pair is returned unmodified; no rounding.
pub fn parse_impact_range(text: &str) -> Result<ImpactRange, DeskError> {
    let invalid = || DeskError::InvalidImpactFormat { raw: text.to_string() };

    let body = text.strip_suffix('%').ok_or_else(invalid)?;
    let mut halves = body.split('-');
    let (min, max) = match (halves.next(), halves.next(), halves.next()) {
        (Some(lo), Some(hi), None) => (lo, hi),
        _ => return Err(invalid()),
    };

    let min: Decimal = min.trim().parse().map_err(|_| invalid())?;
    let max: Decimal = max.trim().parse().map_err(|_| invalid())?;
    if min < Decimal::ZERO || max < Decimal::ZERO {
        return Err(invalid());
    }

    Ok(ImpactRange { min, max })
}

// ---------------------------------------------------------------------------
// Component computations
// ---------------------------------------------------------------------------

/// Percent change of `current` against `baseline`.
/// Defined as 0 when the baseline is 0.
pub fn percent_change(current: Decimal, baseline: Decimal) -> Decimal {
    if baseline == Decimal::ZERO {
        Decimal::ZERO
    } else {
        (current - baseline) / baseline * dec!(100)
    }
}

/// Classify `current` against `baseline` as a trend reading.
pub fn trend_against_baseline(current: Decimal, baseline: Decimal) -> TrendReading {
    let change = percent_change(current, baseline);
    let direction = if change > Decimal::ZERO {
        Trend::Up
    } else if change < Decimal::ZERO {
        Trend::Down
    } else {
        Trend::Stable
    };
    TrendReading {
        direction,
        change_pct: change.round_dp(2),
    }
}

/// Demand classification from the market-price / avg-sell ratio.
/// Unknown when either input is unusable.
pub fn demand_index(snapshot: &MarketSnapshot) -> DemandIndex {
    let market = match snapshot.market_price.amount() {
        Some(p) => p,
        None => return DemandIndex::Unknown,
    };
    if snapshot.average_sell_price == Decimal::ZERO {
        return DemandIndex::Unknown;
    }

    let ratio = market / snapshot.average_sell_price;
    if ratio > DEMAND_HIGH_RATIO {
        DemandIndex::High
    } else if ratio < DEMAND_LOW_RATIO {
        DemandIndex::Low
    } else {
        DemandIndex::Medium
    }
}

/// Rotation status of a set released on `set_release_date`, evaluated
/// at `today`. The annual rotation lands on September 1 of the current
/// year; sets older than two years at that point have rotated out.
/// A missing release date reads as in-standard, matching the catalog
/// browser's behaviour for sets without one.
pub fn rotation_status(set_release_date: Option<NaiveDate>, today: NaiveDate) -> RotationStatus {
    let set_date = match set_release_date {
        Some(d) => d,
        None => return RotationStatus::InStandard,
    };

    let rotation_date = september_first(today.year());
    let two_years_ago = september_first(today.year() - 2);

    if set_date < two_years_ago {
        RotationStatus::RotatedOut
    } else if set_date < rotation_date {
        RotationStatus::RotatingSoon
    } else {
        RotationStatus::InStandard
    }
}

fn september_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 9, 1).expect("September 1 is always a valid date")
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The pricing engine: the release catalog plus the estimate pipeline.
///
/// Holds no other state and never mutates the catalog, so it is safe
/// to share across any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    catalog: ReleaseCatalog,
}

impl PricingEngine {
    pub fn new(catalog: ReleaseCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ReleaseCatalog {
        &self.catalog
    }

    /// The first catalog release, in stored order, whose related names
    /// include a case-sensitive substring of `card_name`.
    /// First match wins — catalog order carries priority.
    pub fn match_release(&self, card_name: &str) -> Option<&UpcomingRelease> {
        self.catalog.releases().iter().find(|release| {
            release
                .related_names
                .iter()
                .any(|name| card_name.contains(name.as_str()))
        })
    }

    /// Full pricing estimate for one card.
    ///
    /// `today` is the evaluation date for the rotation rule; callers
    /// pass the wall-clock date in production and a pinned date in tests.
    pub fn estimate(
        &self,
        card_name: &str,
        set_release_date: Option<NaiveDate>,
        snapshot: &MarketSnapshot,
        today: NaiveDate,
    ) -> PricingResult {
        let (predicted_impact, recommended_price) = match snapshot.market_price.amount() {
            None => (NO_PRICE_TEXT.to_string(), PriceQuote::Unavailable),
            Some(market) => {
                let (text, estimated) = match self.match_release(card_name) {
                    Some(release) => {
                        let impact = release.impact.mean();
                        debug!(
                            card = card_name,
                            release = %release.name,
                            impact_pct = %impact,
                            "Upcoming release matched"
                        );
                        (
                            release.commentary.clone(),
                            market + market * impact / dec!(100),
                        )
                    }
                    None => (NO_IMPACT_TEXT.to_string(), market),
                };

                // An elevated realized sell price floors the estimate:
                // it wins regardless of any predicted impact.
                let price = if snapshot.average_sell_price > market {
                    snapshot.average_sell_price * SELL_PRICE_MARKUP
                } else {
                    estimated
                };

                (
                    text,
                    PriceQuote::Available(
                        price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                    ),
                )
            }
        };

        let market_trend = match snapshot.market_price.amount() {
            Some(market) => trend_against_baseline(market, snapshot.avg30),
            None => TrendReading {
                direction: Trend::Stable,
                change_pct: Decimal::ZERO,
            },
        };
        let sell_trend = trend_against_baseline(snapshot.average_sell_price, snapshot.avg30);

        PricingResult {
            predicted_impact,
            recommended_price,
            market_trend,
            sell_trend,
            demand: demand_index(snapshot),
            rotation: rotation_status(set_release_date, today),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
