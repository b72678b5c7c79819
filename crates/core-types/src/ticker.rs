use serde::{Deserialize, Serialize};

/// An instrument the application knows how to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Exchange symbol, e.g. "GOOGL".
    pub symbol: String,
    /// Short display name used by the compare view, e.g. "Google".
    pub display_name: String,
    /// Full company name, e.g. "Alphabet Inc.".
    pub company: String,
    pub sector: String,
}

impl Ticker {
    pub fn new(symbol: &str, display_name: &str, company: &str, sector: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            company: company.to_string(),
            sector: sector.to_string(),
        }
    }
}

/// The built-in universe of equities.
pub fn default_universe() -> Vec<Ticker> {
    vec![
        Ticker::new("GOOGL", "Google", "Alphabet Inc.", "Technology"),
        Ticker::new("AAPL", "Apple", "Apple Inc.", "Technology"),
        Ticker::new("MSFT", "Microsoft", "Microsoft Corporation", "Technology"),
        Ticker::new("GME", "GameStop", "GameStop Corp.", "Consumer Discretionary"),
    ]
}

/// Finds a ticker by symbol or display name, ignoring case.
pub fn find_ticker<'a>(universe: &'a [Ticker], key: &str) -> Option<&'a Ticker> {
    let key = key.trim();
    universe.iter().find(|t| {
        t.symbol.eq_ignore_ascii_case(key) || t.display_name.eq_ignore_ascii_case(key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_symbol_or_name() {
        let universe = default_universe();
        assert_eq!(find_ticker(&universe, "googl").unwrap().company, "Alphabet Inc.");
        assert_eq!(find_ticker(&universe, "GameStop").unwrap().symbol, "GME");
        assert!(find_ticker(&universe, "TSLA").is_none());
    }
}
