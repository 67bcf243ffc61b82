//! Card lookup services.
//!
//! Defines the `CardLookup` trait and provides the Pokémon TCG API
//! implementation. The trait is the seam that lets the dashboard and
//! integration tests run against fixture data instead of the network.

pub mod pokemontcg;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Card;

/// Abstraction over the external card/price lookup service.
///
/// Implementors resolve card identifiers and free-text searches into
/// card records carrying a market snapshot. Failures surface as
/// errors for the caller to report; nothing is retried here.
#[async_trait]
pub trait CardLookup: Send + Sync {
    /// Fetch a single card by its catalog identifier (e.g. "base1-4").
    async fn card_by_id(&self, id: &str) -> Result<Card>;

    /// Free-text search returning matching cards.
    async fn search(&self, query: &str) -> Result<Vec<Card>>;

    /// Service name for logging and identification.
    fn name(&self) -> &str;
}
