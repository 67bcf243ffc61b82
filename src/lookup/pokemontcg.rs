//! Pokémon TCG API integration.
//!
//! Primary source of card records: names, set metadata, images, and
//! nested price fields from two independent feeds (TCGplayer per-variant
//! market prices and Cardmarket rolling averages).
//!
//! API docs: https://docs.pokemontcg.io
//! Base URL: https://api.pokemontcg.io/v2
//! Auth: Optional `X-Api-Key` header (higher rate limit with a key).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::CardLookup;
use crate::types::{Card, DeskError, MarketSnapshot, PriceQuote};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://api.pokemontcg.io/v2";
const SERVICE_NAME: &str = "pokemontcg";

/// Rarity words the search box maps to a rarity filter rather than a
/// name filter.
const RARITY_WORDS: &[&str] = &["common", "uncommon", "rare", "holofoil", "rainbow", "secret"];

// ---------------------------------------------------------------------------
// API response types (Pokémon TCG JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SingleCardResponse {
    data: ApiCard,
}

#[derive(Debug, Deserialize)]
struct CardListResponse {
    #[serde(default)]
    data: Vec<ApiCard>,
}

/// A card as returned by the API. We only deserialize the fields we need.
#[derive(Debug, Deserialize)]
struct ApiCard {
    id: String,
    name: String,
    #[serde(default)]
    rarity: Option<String>,
    set: ApiSet,
    #[serde(default)]
    images: Option<ApiImages>,
    #[serde(default)]
    tcgplayer: Option<ApiTcgplayer>,
    #[serde(default)]
    cardmarket: Option<ApiCardmarket>,
}

#[derive(Debug, Deserialize)]
struct ApiSet {
    name: String,
    /// Either "YYYY/MM/DD" (live API) or "YYYY-MM-DD" (older dumps).
    #[serde(default, rename = "releaseDate")]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiImages {
    #[serde(default)]
    small: Option<String>,
    #[serde(default)]
    large: Option<String>,
}

/// TCGplayer feed: per-variant price blocks keyed by variant name
/// ("holofoil", "normal", "reverseHolofoil", ...). BTreeMap keeps
/// variant iteration deterministic.
#[derive(Debug, Deserialize)]
struct ApiTcgplayer {
    #[serde(default)]
    prices: BTreeMap<String, ApiVariantPrices>,
}

#[derive(Debug, Deserialize)]
struct ApiVariantPrices {
    #[serde(default)]
    market: Option<Decimal>,
    #[serde(default)]
    low: Option<Decimal>,
    #[serde(default)]
    high: Option<Decimal>,
}

/// Cardmarket feed: rolling average realized prices.
#[derive(Debug, Deserialize)]
struct ApiCardmarket {
    #[serde(default)]
    prices: Option<ApiCardmarketPrices>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCardmarketPrices {
    #[serde(default)]
    average_sell_price: Option<Decimal>,
    #[serde(default)]
    avg7: Option<Decimal>,
    #[serde(default)]
    avg30: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Pokémon TCG API client.
pub struct PokemonTcgClient {
    http: Client,
    base_url: String,
    /// Optional API key. Reads work without one at a lower rate limit.
    api_key: Option<String>,
    page_size: u32,
}

impl PokemonTcgClient {
    /// Create a new client.
    ///
    /// `base_url` overrides the public API endpoint (used by tests
    /// against a local stub); `None` uses the real service.
    pub fn new(api_key: Option<String>, base_url: Option<String>, page_size: u32) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("TCGDESK/0.1.0 (card-pricing-desk)")
            .build()
            .context("Failed to build HTTP client for Pokémon TCG API")?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| BASE_URL.to_string()),
            api_key,
            page_size,
        })
    }

    // -- Internal helpers ------------------------------------------------

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url = %url, "Fetching from Pokémon TCG API");
        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("X-Api-Key", key);
        }
        req.send().await.context("Pokémon TCG API request failed")
    }

    /// Translate a free-text search box query into the API's Lucene-ish
    /// query syntax. The first word filters the card name, recognised
    /// rarity words filter rarity, `key:value` tokens pass through, and
    /// everything else matches either the name or the set name.
    pub fn build_query(raw: &str) -> String {
        raw.to_lowercase()
            .split_whitespace()
            .enumerate()
            .map(|(index, word)| {
                if word.contains(':') {
                    word.to_string()
                } else if index == 0 {
                    format!("name:\"*{word}*\"")
                } else if RARITY_WORDS.contains(&word) {
                    format!("rarity:\"*{word}*\"")
                } else {
                    format!("(name:\"*{word}*\" OR set.name:\"*{word}*\")")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse the set release date, accepting both separators the API
    /// has used over time.
    fn parse_release_date(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y/%m/%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }

    /// Reduce the nested price feeds to a market snapshot.
    ///
    /// Market price preference follows the original desk: holofoil
    /// variant first, then normal, otherwise unavailable. Missing
    /// Cardmarket averages default to zero.
    fn snapshot_from(card: &ApiCard) -> MarketSnapshot {
        let market_price = card
            .tcgplayer
            .as_ref()
            .and_then(|t| {
                t.prices
                    .get("holofoil")
                    .and_then(|p| p.market)
                    .or_else(|| t.prices.get("normal").and_then(|p| p.market))
            })
            .map(PriceQuote::Available)
            .unwrap_or(PriceQuote::Unavailable);

        let averages = card.cardmarket.as_ref().and_then(|c| c.prices.as_ref());

        MarketSnapshot {
            market_price,
            average_sell_price: averages
                .and_then(|p| p.average_sell_price)
                .unwrap_or(Decimal::ZERO),
            avg7: averages.and_then(|p| p.avg7).unwrap_or(Decimal::ZERO),
            avg30: averages.and_then(|p| p.avg30).unwrap_or(Decimal::ZERO),
        }
    }

    fn to_card(api: ApiCard) -> Card {
        let snapshot = Self::snapshot_from(&api);
        let set_release_date = api
            .set
            .release_date
            .as_deref()
            .and_then(Self::parse_release_date);
        let (image_small, image_large) = match api.images {
            Some(images) => (images.small, images.large),
            None => (None, None),
        };

        Card {
            id: api.id,
            name: api.name,
            set_name: api.set.name,
            set_release_date,
            rarity: api.rarity,
            image_small,
            image_large,
            snapshot,
        }
    }
}

#[async_trait]
impl CardLookup for PokemonTcgClient {
    async fn card_by_id(&self, id: &str) -> Result<Card> {
        let url = format!("{}/cards/{}", self.base_url, urlencoding::encode(id));
        let resp = self.get(&url).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(DeskError::CardNotFound(id.to_string()).into());
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeskError::Lookup {
                message: format!("Pokémon TCG API error {status}: {body}"),
            }
            .into());
        }

        let card: SingleCardResponse = resp
            .json()
            .await
            .context("Failed to parse Pokémon TCG card response")?;

        Ok(Self::to_card(card.data))
    }

    async fn search(&self, query: &str) -> Result<Vec<Card>> {
        let q = Self::build_query(query);
        let url = format!(
            "{}/cards?q={}&pageSize={}",
            self.base_url,
            urlencoding::encode(&q),
            self.page_size,
        );
        let resp = self.get(&url).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeskError::Lookup {
                message: format!("Pokémon TCG API error {status}: {body}"),
            }
            .into());
        }

        let list: CardListResponse = resp
            .json()
            .await
            .context("Failed to parse Pokémon TCG search response")?;

        debug!(query = %q, count = list.data.len(), "Search complete");
        Ok(list.data.into_iter().map(Self::to_card).collect())
    }

    fn name(&self) -> &str {
        SERVICE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
