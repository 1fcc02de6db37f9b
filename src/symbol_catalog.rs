//! Fixed set of Deriv synthetic indices the feed can be subscribed to.

pub const DEFAULT_SYMBOL: &str = "R_75";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub id: &'static str,
    pub label: &'static str,
}

pub const SYMBOLS: &[SymbolInfo] = &[
    SymbolInfo { id: "R_10", label: "Volatility 10" },
    SymbolInfo { id: "R_10_1S", label: "Volatility 10 (1s)" },
    SymbolInfo { id: "R_15_1S", label: "Volatility 15 (1s)" },
    SymbolInfo { id: "R_25", label: "Volatility 25" },
    SymbolInfo { id: "R_25_1S", label: "Volatility 25 (1s)" },
    SymbolInfo { id: "R_30_1S", label: "Volatility 30 (1s)" },
    SymbolInfo { id: "R_50", label: "Volatility 50" },
    SymbolInfo { id: "R_50_1S", label: "Volatility 50 (1s)" },
    SymbolInfo { id: "R_75", label: "Volatility 75" },
    SymbolInfo { id: "R_75_1S", label: "Volatility 75 (1s)" },
    SymbolInfo { id: "R_90_1S", label: "Volatility 90 (1s)" },
    SymbolInfo { id: "R_100", label: "Volatility 100" },
];

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

pub fn find(symbol: &str) -> Option<&'static SymbolInfo> {
    let symbol = normalize_symbol(symbol);
    SYMBOLS.iter().find(|s| s.id == symbol)
}

pub fn is_known(symbol: &str) -> bool {
    find(symbol).is_some()
}

/// `"Volatility 75 (R_75)"`; unknown ids are shown bare.
pub fn display_name(symbol: &str) -> String {
    match find(symbol) {
        Some(info) => format!("{} ({})", info.label, info.id),
        None => symbol.to_string(),
    }
}

fn position(symbol: &str) -> Option<usize> {
    let symbol = normalize_symbol(symbol);
    SYMBOLS.iter().position(|s| s.id == symbol)
}

/// Next symbol in catalog order, wrapping. Unknown ids restart at the first entry.
pub fn next_symbol(current: &str) -> &'static str {
    match position(current) {
        Some(idx) => SYMBOLS[(idx + 1) % SYMBOLS.len()].id,
        None => SYMBOLS[0].id,
    }
}

pub fn prev_symbol(current: &str) -> &'static str {
    match position(current) {
        Some(idx) => SYMBOLS[(idx + SYMBOLS.len() - 1) % SYMBOLS.len()].id,
        None => SYMBOLS[SYMBOLS.len() - 1].id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find("r_75").map(|s| s.label), Some("Volatility 75"));
        assert!(!is_known("BTCUSDT"));
    }

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(next_symbol("R_100"), "R_10");
        assert_eq!(prev_symbol("R_10"), "R_100");
        assert_eq!(next_symbol("R_75"), "R_75_1S");
        assert_eq!(next_symbol("unknown"), "R_10");
    }

    #[test]
    fn display_name_includes_id() {
        assert_eq!(display_name("R_50_1S"), "Volatility 50 (1s) (R_50_1S)");
        assert_eq!(display_name("XYZ"), "XYZ");
    }
}
