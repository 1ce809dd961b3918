//! Price resolution.
//!
//! A unit price for a material is resolved through a fixed cascade over the
//! user's market preferences (a "CX"), first hit wins:
//!
//! 1. planet-scoped ticker override
//! 2. empire-wide ticker override
//! 3. planet-scoped exchange preference
//! 4. empire-wide exchange preference
//! 5. the 30-day universe average
//!
//! Without a selected CX and planet only step 5 runs. Failures while
//! resolving never propagate: the price degrades to zero and a warning is
//! logged, so one missing quote cannot abort a whole plan calculation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Exchange code of the 30-day trailing universe average.
pub const UNIVERSE_30D: &str = "PP30D_UNIVERSE";

/// Commodity exchanges that quote ask and bid prices.
pub const EXCHANGE_VENUES: [&str; 6] = ["AI1", "CI1", "CI2", "IC1", "NC1", "NC2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceDirection {
    Buy,
    Sell,
}

/// Which directions a preference applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PreferenceType {
    Buy,
    Sell,
    Both,
}

impl PreferenceType {
    pub fn applies_to(self, direction: PriceDirection) -> bool {
        matches!(
            (self, direction),
            (PreferenceType::Both, _)
                | (PreferenceType::Buy, PriceDirection::Buy)
                | (PreferenceType::Sell, PriceDirection::Sell)
        )
    }
}

// ===========================================================================
// Preferences
// ===========================================================================

/// A fixed price for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerPreference {
    pub ticker: String,
    #[serde(rename = "type")]
    pub preference_type: PreferenceType,
    pub value: f64,
}

/// Take prices from an exchange, e.g. `"AI1_BUY"` or `"PP7D_UNIVERSE"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangePreference {
    #[serde(rename = "type")]
    pub preference_type: PreferenceType,
    pub exchange: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetTickerPreferences {
    pub planet_id: String,
    pub preferences: Vec<TickerPreference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetExchangePreferences {
    pub planet_id: String,
    pub preferences: Vec<ExchangePreference>,
}

/// A named set of market preferences with empire and planet scopes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CxPreferences {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub empire_tickers: Vec<TickerPreference>,
    #[serde(default)]
    pub planet_tickers: Vec<PlanetTickerPreferences>,
    #[serde(default)]
    pub empire_exchanges: Vec<ExchangePreference>,
    #[serde(default)]
    pub planet_exchanges: Vec<PlanetExchangePreferences>,
}

fn match_ticker(
    preferences: &[TickerPreference],
    ticker: &str,
    direction: PriceDirection,
) -> Option<f64> {
    preferences
        .iter()
        .find(|p| p.ticker == ticker && p.preference_type.applies_to(direction))
        .map(|p| p.value)
}

fn match_exchange(
    preferences: &[ExchangePreference],
    direction: PriceDirection,
) -> Option<&str> {
    preferences
        .iter()
        .find(|p| p.preference_type.applies_to(direction))
        .map(|p| p.exchange.as_str())
}

impl CxPreferences {
    pub fn planet_ticker(&self, planet_id: &str, ticker: &str, direction: PriceDirection) -> Option<f64> {
        self.planet_tickers
            .iter()
            .filter(|p| p.planet_id == planet_id)
            .find_map(|p| match_ticker(&p.preferences, ticker, direction))
    }

    pub fn empire_ticker(&self, ticker: &str, direction: PriceDirection) -> Option<f64> {
        match_ticker(&self.empire_tickers, ticker, direction)
    }

    pub fn planet_exchange(&self, planet_id: &str, direction: PriceDirection) -> Option<&str> {
        self.planet_exchanges
            .iter()
            .filter(|p| p.planet_id == planet_id)
            .find_map(|p| match_exchange(&p.preferences, direction))
    }

    pub fn empire_exchange(&self, direction: PriceDirection) -> Option<&str> {
        match_exchange(&self.empire_exchanges, direction)
    }
}

// ===========================================================================
// Exchange data
// ===========================================================================

/// Quote field an exchange preference reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Ask,
    Bid,
    PriceAverage,
}

impl PriceField {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceField::Ask => "Ask",
            PriceField::Bid => "Bid",
            PriceField::PriceAverage => "PriceAverage",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to read a price: an exchange code and a quote field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSource {
    pub exchange_code: String,
    pub field: PriceField,
}

/// Parse an exchange preference string such as `"AI1_BUY"`.
///
/// The string must split on `_` into exactly two parts. Averages
/// (`*_UNIVERSE`, `PP7D_*`, `PP30D_*`) use the whole string as exchange code.
/// Venue codes take `BUY`/`SELL`/`AVG` to mean ask/bid/average. Anything else
/// falls back to the 30-day universe average.
pub fn parse_exchange_code(preference: &str) -> Result<ExchangeSource, PriceError> {
    let parts: Vec<&str> = preference.split('_').collect();
    let [first, second] = parts.as_slice() else {
        return Err(PriceError::MalformedExchange(preference.to_string()));
    };

    if *second == "UNIVERSE" || *first == "PP7D" || *first == "PP30D" {
        return Ok(ExchangeSource {
            exchange_code: preference.to_string(),
            field: PriceField::PriceAverage,
        });
    }

    if EXCHANGE_VENUES.contains(first) {
        let field = match *second {
            "BUY" => Some(PriceField::Ask),
            "SELL" => Some(PriceField::Bid),
            "AVG" => Some(PriceField::PriceAverage),
            _ => None,
        };
        if let Some(field) = field {
            return Ok(ExchangeSource {
                exchange_code: first.to_string(),
                field,
            });
        }
    }

    Ok(ExchangeSource {
        exchange_code: UNIVERSE_30D.to_string(),
        field: PriceField::PriceAverage,
    })
}

/// Key of one ticker's quote on one exchange, e.g. `"FE.AI1"`.
pub fn exchange_key(ticker: &str, exchange_code: &str) -> String {
    format!("{ticker}.{exchange_code}")
}

/// Current quote of a ticker on an exchange or average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeEntry {
    pub ticker: String,
    pub exchange_code: String,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub bid: Option<f64>,
    pub price_average: f64,
    #[serde(default)]
    pub supply: f64,
    #[serde(default)]
    pub demand: f64,
}

impl ExchangeEntry {
    pub fn key(&self) -> String {
        exchange_key(&self.ticker, &self.exchange_code)
    }

    pub fn field(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Ask => self.ask,
            PriceField::Bid => self.bid,
            PriceField::PriceAverage => Some(self.price_average),
        }
    }
}

// ===========================================================================
// Provider seam
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("malformed exchange preference '{0}': expected two '_'-separated parts")]
    MalformedExchange(String),
    #[error("no exchange data for '{0}'")]
    MissingExchange(String),
    #[error("exchange data '{key}' has no {field} quote")]
    MissingField { key: String, field: PriceField },
}

/// Read access to market preferences and exchange quotes.
pub trait MarketDataProvider {
    fn preferences(&self, cx_id: &str) -> Option<&CxPreferences>;

    /// Quote by [`exchange_key`].
    fn exchange(&self, key: &str) -> Option<&ExchangeEntry>;
}

/// In-memory market data.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    preferences: HashMap<String, CxPreferences>,
    exchanges: HashMap<String, ExchangeEntry>,
}

impl MarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_preferences(&mut self, cx: CxPreferences) -> &mut Self {
        self.preferences.insert(cx.id.clone(), cx);
        self
    }

    pub fn insert_exchange(&mut self, entry: ExchangeEntry) -> &mut Self {
        self.exchanges.insert(entry.key(), entry);
        self
    }

    pub fn preference_count(&self) -> usize {
        self.preferences.len()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.len()
    }
}

impl MarketDataProvider for MarketData {
    fn preferences(&self, cx_id: &str) -> Option<&CxPreferences> {
        self.preferences.get(cx_id)
    }

    fn exchange(&self, key: &str) -> Option<&ExchangeEntry> {
        self.exchanges.get(key)
    }
}

// ===========================================================================
// Resolver
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriceKey {
    ticker: String,
    direction: PriceDirection,
    cx_id: Option<String>,
    planet_id: Option<String>,
}

/// Resolves and memoizes unit prices for one CX / planet selection.
///
/// The memo is only valid for the selection it was filled under; call
/// [`invalidate`](Self::invalidate) whenever either changes.
#[derive(Debug, Clone, Default)]
pub struct PriceResolver {
    cx_id: Option<String>,
    planet_id: Option<String>,
    cache: HashMap<PriceKey, f64>,
}

impl PriceResolver {
    pub fn new(cx_id: Option<String>, planet_id: Option<String>) -> Self {
        Self {
            cx_id,
            planet_id,
            cache: HashMap::new(),
        }
    }

    pub fn cx_id(&self) -> Option<&str> {
        self.cx_id.as_deref()
    }

    pub fn planet_id(&self) -> Option<&str> {
        self.planet_id.as_deref()
    }

    /// Number of memoized lookups.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Switch selection. The memo is dropped if either dimension changed.
    pub fn invalidate(&mut self, cx_id: Option<&str>, planet_id: Option<&str>) {
        if self.cx_id.as_deref() == cx_id && self.planet_id.as_deref() == planet_id {
            return;
        }
        log::debug!(
            "price selection changed to cx={cx_id:?} planet={planet_id:?}, dropping {} cached prices",
            self.cache.len()
        );
        self.cx_id = cx_id.map(str::to_string);
        self.planet_id = planet_id.map(str::to_string);
        self.cache.clear();
    }

    /// Unit price of `ticker` in `direction`. Never fails; unresolvable
    /// prices are zero.
    pub fn price(
        &mut self,
        market: &dyn MarketDataProvider,
        ticker: &str,
        direction: PriceDirection,
    ) -> f64 {
        let key = PriceKey {
            ticker: ticker.to_string(),
            direction,
            cx_id: self.cx_id.clone(),
            planet_id: self.planet_id.clone(),
        };
        if let Some(&price) = self.cache.get(&key) {
            return price;
        }

        let price = match self.resolve(market, ticker, direction) {
            Ok(price) => price,
            Err(err) => {
                log::warn!("price of {ticker} ({direction:?}) unresolved, using 0: {err}");
                0.0
            }
        };
        self.cache.insert(key, price);
        price
    }

    fn resolve(
        &self,
        market: &dyn MarketDataProvider,
        ticker: &str,
        direction: PriceDirection,
    ) -> Result<f64, PriceError> {
        let (Some(cx_id), Some(planet_id)) = (self.cx_id.as_deref(), self.planet_id.as_deref())
        else {
            return universe_price(market, ticker);
        };
        let Some(cx) = market.preferences(cx_id) else {
            return universe_price(market, ticker);
        };

        if let Some(value) = cx.planet_ticker(planet_id, ticker, direction) {
            return Ok(value);
        }
        if let Some(value) = cx.empire_ticker(ticker, direction) {
            return Ok(value);
        }
        if let Some(exchange) = cx.planet_exchange(planet_id, direction) {
            return exchange_price(market, ticker, &parse_exchange_code(exchange)?);
        }
        if let Some(exchange) = cx.empire_exchange(direction) {
            return exchange_price(market, ticker, &parse_exchange_code(exchange)?);
        }
        universe_price(market, ticker)
    }
}

fn exchange_price(
    market: &dyn MarketDataProvider,
    ticker: &str,
    source: &ExchangeSource,
) -> Result<f64, PriceError> {
    let key = exchange_key(ticker, &source.exchange_code);
    let entry = market
        .exchange(&key)
        .ok_or_else(|| PriceError::MissingExchange(key.clone()))?;
    entry.field(source.field).ok_or(PriceError::MissingField {
        key,
        field: source.field,
    })
}

fn universe_price(market: &dyn MarketDataProvider, ticker: &str) -> Result<f64, PriceError> {
    exchange_price(
        market,
        ticker,
        &ExchangeSource {
            exchange_code: UNIVERSE_30D.to_string(),
            field: PriceField::PriceAverage,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(ticker: &str, code: &str, ask: Option<f64>, bid: Option<f64>, avg: f64) -> ExchangeEntry {
        ExchangeEntry {
            ticker: ticker.to_string(),
            exchange_code: code.to_string(),
            ask,
            bid,
            price_average: avg,
            supply: 100.0,
            demand: 100.0,
        }
    }

    fn ticker_pref(ticker: &str, preference_type: PreferenceType, value: f64) -> TickerPreference {
        TickerPreference {
            ticker: ticker.to_string(),
            preference_type,
            value,
        }
    }

    fn exchange_pref(preference_type: PreferenceType, exchange: &str) -> ExchangePreference {
        ExchangePreference {
            preference_type,
            exchange: exchange.to_string(),
        }
    }

    fn market_with(cx: CxPreferences) -> MarketData {
        let mut market = MarketData::new();
        market
            .insert_exchange(quote("FE", UNIVERSE_30D, None, None, 100.0))
            .insert_exchange(quote("FE", "AI1", Some(110.0), Some(90.0), 101.0))
            .insert_exchange(quote("FE", "NC1", Some(120.0), Some(95.0), 105.0))
            .insert_exchange(quote("C", UNIVERSE_30D, None, None, 40.0))
            .insert_preferences(cx);
        market
    }

    fn resolver() -> PriceResolver {
        PriceResolver::new(Some("cx".to_string()), Some("KW-688c".to_string()))
    }

    // -----------------------------------------------------------------------
    // parse_exchange_code
    // -----------------------------------------------------------------------

    fn parsed(s: &str) -> (String, &'static str) {
        let source = parse_exchange_code(s).unwrap();
        (source.exchange_code, source.field.as_str())
    }

    #[test]
    fn parse_universe_average() {
        assert_eq!(
            parsed("PP30D_UNIVERSE"),
            ("PP30D_UNIVERSE".to_string(), "PriceAverage")
        );
        assert_eq!(parsed("PP7D_AI1"), ("PP7D_AI1".to_string(), "PriceAverage"));
    }

    #[test]
    fn parse_venue_directions() {
        assert_eq!(parsed("AI1_BUY"), ("AI1".to_string(), "Ask"));
        assert_eq!(parsed("AI1_SELL"), ("AI1".to_string(), "Bid"));
        assert_eq!(parsed("AI1_AVG"), ("AI1".to_string(), "PriceAverage"));
    }

    #[test]
    fn parse_unknown_pair_falls_back_to_universe() {
        assert_eq!(
            parsed("FOO_MOO"),
            ("PP30D_UNIVERSE".to_string(), "PriceAverage")
        );
        assert_eq!(
            parsed("AI1_MOO"),
            ("PP30D_UNIVERSE".to_string(), "PriceAverage")
        );
    }

    #[test]
    fn parse_rejects_wrong_part_count() {
        assert_eq!(
            parse_exchange_code("FOO_MOO_MEOW"),
            Err(PriceError::MalformedExchange("FOO_MOO_MEOW".to_string()))
        );
        assert!(parse_exchange_code("AI1").is_err());
    }

    // -----------------------------------------------------------------------
    // Cascade
    // -----------------------------------------------------------------------

    #[test]
    fn no_selection_uses_universe_average() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_tickers: vec![ticker_pref("FE", PreferenceType::Both, 1.0)],
            ..Default::default()
        });
        let mut prices = PriceResolver::new(None, None);
        assert_eq!(prices.price(&market, "FE", PriceDirection::Buy), 100.0);

        let mut no_planet = PriceResolver::new(Some("cx".to_string()), None);
        assert_eq!(no_planet.price(&market, "FE", PriceDirection::Buy), 100.0);
    }

    #[test]
    fn planet_ticker_beats_empire_ticker() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_tickers: vec![ticker_pref("FE", PreferenceType::Both, 50.0)],
            planet_tickers: vec![PlanetTickerPreferences {
                planet_id: "KW-688c".to_string(),
                preferences: vec![ticker_pref("FE", PreferenceType::Buy, 70.0)],
            }],
            ..Default::default()
        });
        let mut prices = resolver();
        assert_eq!(prices.price(&market, "FE", PriceDirection::Buy), 70.0);
        // The planet override is BUY only.
        assert_eq!(prices.price(&market, "FE", PriceDirection::Sell), 50.0);
    }

    #[test]
    fn planet_preferences_for_other_planets_are_ignored() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            planet_tickers: vec![PlanetTickerPreferences {
                planet_id: "OT-580b".to_string(),
                preferences: vec![ticker_pref("FE", PreferenceType::Both, 70.0)],
            }],
            ..Default::default()
        });
        assert_eq!(resolver().price(&market, "FE", PriceDirection::Buy), 100.0);
    }

    #[test]
    fn ticker_override_beats_exchange_preference() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_tickers: vec![ticker_pref("FE", PreferenceType::Sell, 60.0)],
            planet_exchanges: vec![PlanetExchangePreferences {
                planet_id: "KW-688c".to_string(),
                preferences: vec![exchange_pref(PreferenceType::Both, "AI1_SELL")],
            }],
            ..Default::default()
        });
        assert_eq!(resolver().price(&market, "FE", PriceDirection::Sell), 60.0);
        assert_eq!(resolver().price(&market, "FE", PriceDirection::Buy), 90.0);
    }

    #[test]
    fn planet_exchange_beats_empire_exchange() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_exchanges: vec![exchange_pref(PreferenceType::Both, "NC1_BUY")],
            planet_exchanges: vec![PlanetExchangePreferences {
                planet_id: "KW-688c".to_string(),
                preferences: vec![exchange_pref(PreferenceType::Buy, "AI1_BUY")],
            }],
            ..Default::default()
        });
        let mut prices = resolver();
        assert_eq!(prices.price(&market, "FE", PriceDirection::Buy), 110.0);
        assert_eq!(prices.price(&market, "FE", PriceDirection::Sell), 120.0);
    }

    #[test]
    fn missing_quote_degrades_to_zero() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_exchanges: vec![exchange_pref(PreferenceType::Both, "AI1_BUY")],
            ..Default::default()
        });
        let mut prices = resolver();
        // C has no AI1 quote.
        assert_eq!(prices.price(&market, "C", PriceDirection::Buy), 0.0);
        // Unknown ticker everywhere.
        assert_eq!(prices.price(&market, "XYZ", PriceDirection::Sell), 0.0);
    }

    #[test]
    fn malformed_preference_degrades_to_zero() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_exchanges: vec![exchange_pref(PreferenceType::Both, "AI1_BUY_NOW")],
            ..Default::default()
        });
        assert_eq!(resolver().price(&market, "FE", PriceDirection::Buy), 0.0);
    }

    #[test]
    fn missing_ask_degrades_to_zero() {
        let mut market = market_with(CxPreferences {
            id: "cx".to_string(),
            empire_exchanges: vec![exchange_pref(PreferenceType::Both, "CI1_BUY")],
            ..Default::default()
        });
        market.insert_exchange(quote("FE", "CI1", None, Some(80.0), 85.0));
        let mut prices = resolver();
        assert_eq!(prices.price(&market, "FE", PriceDirection::Buy), 0.0);
    }

    // -----------------------------------------------------------------------
    // Memoization
    // -----------------------------------------------------------------------

    #[test]
    fn lookups_are_memoized_per_ticker_and_direction() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            ..Default::default()
        });
        let mut prices = resolver();
        prices.price(&market, "FE", PriceDirection::Buy);
        prices.price(&market, "FE", PriceDirection::Buy);
        prices.price(&market, "FE", PriceDirection::Sell);
        assert_eq!(prices.cached(), 2);
    }

    #[test]
    fn changing_selection_drops_the_memo() {
        let market = market_with(CxPreferences {
            id: "cx".to_string(),
            planet_tickers: vec![PlanetTickerPreferences {
                planet_id: "KW-688c".to_string(),
                preferences: vec![ticker_pref("FE", PreferenceType::Both, 70.0)],
            }],
            ..Default::default()
        });
        let mut prices = resolver();
        assert_eq!(prices.price(&market, "FE", PriceDirection::Buy), 70.0);

        prices.invalidate(Some("cx"), Some("KW-688c"));
        assert_eq!(prices.cached(), 1);

        prices.invalidate(Some("cx"), Some("OT-580b"));
        assert_eq!(prices.cached(), 0);
        assert_eq!(prices.planet_id(), Some("OT-580b"));
        assert_eq!(prices.price(&market, "FE", PriceDirection::Buy), 100.0);

        prices.invalidate(None, Some("OT-580b"));
        assert_eq!(prices.cached(), 0);
        assert_eq!(prices.cx_id(), None);
    }
}
