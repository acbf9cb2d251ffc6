//! Query layer: filter and order the trader directory.
//!
//! Filters combine with AND semantics and run in a fixed order: text search,
//! then verification type, then chain membership. Ordering is always
//! descending on the chosen key, with ties broken by ascending trader id so
//! output is deterministic.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{Chain, Trader, VerificationType};

/// Largest page a caller can request
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Followers,
    WinRate,
    Pnl,
    Trades,
}

impl SortKey {
    /// Parse a `sortBy` value. Unknown or missing keys fall back to `Followers`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("followers") => Self::Followers,
            Some("winRate") | Some("win_rate") => Self::WinRate,
            Some("pnl") | Some("totalPnL") => Self::Pnl,
            Some("trades") | Some("totalTrades") => Self::Trades,
            _ => Self::default(),
        }
    }

    fn value(&self, trader: &Trader) -> f64 {
        match self {
            Self::Followers => trader.followers as f64,
            Self::WinRate => trader.win_rate,
            Self::Pnl => trader.total_pnl,
            Self::Trades => trader.total_trades as f64,
        }
    }

    /// Descending by key, then ascending by id
    fn compare(&self, a: &Trader, b: &Trader) -> Ordering {
        self.value(b)
            .total_cmp(&self.value(a))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// One equality/membership filter as given on the query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion<T> {
    /// No filter (`all`, empty or absent)
    Any,
    Is(T),
    /// A value that names nothing we know; matches no trader
    Unrecognized,
}

impl<T: FromStr> Criterion<T> {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Any,
            Some(v) if v.eq_ignore_ascii_case("all") => Self::Any,
            Some(v) => v.parse().map(Self::Is).unwrap_or(Self::Unrecognized),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TraderQuery {
    /// Lowercased search needle
    search: Option<String>,
    verification: Option<Criterion<VerificationType>>,
    chain: Option<Criterion<Chain>>,
    sort_by: SortKey,
    /// 1-based page number
    page: usize,
    limit: Option<usize>,
}

/// Filtered, ordered page of traders plus the size of the whole filtered set
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub traders: Vec<Trader>,
    pub total: usize,
}

impl TraderQuery {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    pub fn search(mut self, text: Option<&str>) -> Self {
        self.search = text
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn verification(mut self, criterion: Criterion<VerificationType>) -> Self {
        self.verification = Some(criterion);
        self
    }

    pub fn chain(mut self, criterion: Criterion<Chain>) -> Self {
        self.chain = Some(criterion);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = key;
        self
    }

    pub fn page(mut self, page: Option<u32>, limit: Option<u32>) -> Self {
        self.page = page.map(|p| p.max(1) as usize).unwrap_or(1);
        self.limit = limit.map(|l| (l as usize).clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// True when the trader passes every active filter
    pub fn matches(&self, trader: &Trader) -> bool {
        if let Some(needle) = &self.search {
            if !trader.matches_search(needle) {
                return false;
            }
        }

        match self.verification.unwrap_or(Criterion::Any) {
            Criterion::Any => {}
            Criterion::Is(kind) if trader.verification_type == kind => {}
            _ => return false,
        }

        match self.chain.unwrap_or(Criterion::Any) {
            Criterion::Any => true,
            Criterion::Is(chain) => trader.trades_on(chain),
            Criterion::Unrecognized => false,
        }
    }

    pub fn run(&self, traders: &[Trader]) -> QueryResult {
        let mut matched: Vec<&Trader> = traders.iter().filter(|t| self.matches(t)).collect();
        matched.sort_by(|a, b| self.sort_by.compare(a, b));

        let total = matched.len();
        let traders = match self.limit {
            Some(limit) => matched
                .into_iter()
                .skip((self.page - 1).saturating_mul(limit))
                .take(limit)
                .cloned()
                .collect(),
            None => matched.into_iter().cloned().collect(),
        };

        QueryResult { traders, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::test_support::trader;
    use crate::models::{Chain, VerificationType};

    /// Five traders: three ZK, two TEE
    fn fixture() -> Vec<Trader> {
        let mut traders = vec![
            trader(
                "a",
                "Alpha Whale",
                VerificationType::Zk,
                &[Chain::Ethereum, Chain::Base],
                60.0,
                450.0,
            ),
            trader("b", "Beta", VerificationType::Tee, &[Chain::Solana], 70.0, 280.0),
            trader("c", "Gamma Whale", VerificationType::Zk, &[Chain::Base], 80.0, 900.0),
            trader("d", "Delta", VerificationType::Tee, &[Chain::Ethereum], 65.0, 50.0),
            trader("e", "Epsilon", VerificationType::Zk, &[Chain::Arbitrum], 55.0, -20.0),
        ];
        traders[0].followers = 500;
        traders[1].followers = 900;
        traders[2].followers = 500;
        traders[3].followers = 50;
        traders[4].followers = 1200;
        traders
    }

    fn ids(result: &QueryResult) -> Vec<&str> {
        result.traders.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_zk_sorted_by_pnl() {
        let query = TraderQuery::new()
            .verification(Criterion::parse(Some("ZK")))
            .sort_by(SortKey::parse_or_default(Some("pnl")));

        let result = query.run(&fixture());
        assert_eq!(result.total, 3);
        assert_eq!(ids(&result), vec!["c", "a", "e"]);
    }

    #[test]
    fn test_default_sort_is_followers_with_id_tiebreak() {
        let result = TraderQuery::new().run(&fixture());
        // a and c both have 500 followers
        assert_eq!(ids(&result), vec!["e", "b", "a", "c", "d"]);
    }

    #[test]
    fn test_unknown_sort_key_falls_back_to_followers() {
        assert_eq!(SortKey::parse_or_default(Some("volume")), SortKey::Followers);
        assert_eq!(SortKey::parse_or_default(None), SortKey::Followers);
        assert_eq!(SortKey::parse_or_default(Some("winRate")), SortKey::WinRate);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name_and_address() {
        let result = TraderQuery::new().search(Some("WHALE")).run(&fixture());
        assert_eq!(result.total, 2);

        // address of "d" is 0xdddd
        let result = TraderQuery::new().search(Some("0xDDD")).run(&fixture());
        assert_eq!(ids(&result), vec!["d"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let query = TraderQuery::new()
            .search(Some("whale"))
            .verification(Criterion::Is(VerificationType::Zk))
            .chain(Criterion::parse(Some("ethereum")));

        let result = query.run(&fixture());
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[test]
    fn test_all_and_unrecognized_criteria() {
        let all = TraderQuery::new()
            .verification(Criterion::parse(Some("all")))
            .chain(Criterion::parse(Some("")))
            .run(&fixture());
        assert_eq!(all.total, 5);

        let none = TraderQuery::new()
            .chain(Criterion::parse(Some("dogechain")))
            .run(&fixture());
        assert_eq!(none.total, 0);
        assert!(none.traders.is_empty());
    }

    #[test]
    fn test_filter_soundness_and_completeness() {
        let traders = fixture();
        for verification in ["all", "ZK", "TEE", "ZK+TEE"] {
            for chain in ["all", "ethereum", "base", "solana", "arbitrum"] {
                let query = TraderQuery::new()
                    .verification(Criterion::parse(Some(verification)))
                    .chain(Criterion::parse(Some(chain)));
                let result = query.run(&traders);

                let expected: Vec<&Trader> = traders.iter().filter(|t| query.matches(t)).collect();
                assert_eq!(result.total, expected.len());
                for t in &result.traders {
                    assert!(query.matches(t));
                }
            }
        }
    }

    #[test]
    fn test_sort_order_is_descending_for_every_key() {
        let traders = fixture();
        for key in [SortKey::Followers, SortKey::WinRate, SortKey::Pnl, SortKey::Trades] {
            let result = TraderQuery::new().sort_by(key).run(&traders);
            for pair in result.traders.windows(2) {
                assert!(key.value(&pair[0]) >= key.value(&pair[1]));
            }
        }
    }

    #[test]
    fn test_pagination_keeps_full_total() {
        let result = TraderQuery::new().page(Some(2), Some(2)).run(&fixture());
        assert_eq!(result.total, 5);
        assert_eq!(ids(&result), vec!["a", "c"]);

        let past_end = TraderQuery::new().page(Some(9), Some(2)).run(&fixture());
        assert_eq!(past_end.total, 5);
        assert!(past_end.traders.is_empty());
    }
}
