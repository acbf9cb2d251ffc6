//! Trader directory
//!
//! Read-only collection of trader profiles and their trade records, plus the
//! query layer (`query`) and the aggregation layer (`stats`) built on top of it.
//! A directory is constructed once at startup, either from a JSON fixture file
//! or from the built-in demo dataset, and shared behind an `Arc`.

pub mod fixture;
pub mod query;
pub mod stats;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::error::{GatewayError, GatewayResult};
use crate::models::{Trade, Trader};

/// On-disk layout of a directory fixture file
#[derive(Debug, Deserialize)]
struct DirectoryFile {
    traders: Vec<Trader>,
    #[serde(default)]
    trades: Vec<Trade>,
}

#[derive(Debug, Clone)]
pub struct TraderDirectory {
    traders: Vec<Trader>,
    trades: Vec<Trade>,
    /// Trader id -> position in `traders`
    by_id: HashMap<String, usize>,
}

impl TraderDirectory {
    /// Build a directory, rejecting duplicate trader ids and trades that
    /// reference unknown traders.
    pub fn new(traders: Vec<Trader>, trades: Vec<Trade>) -> GatewayResult<Self> {
        let mut seen = HashSet::with_capacity(traders.len());
        for trader in &traders {
            if !seen.insert(trader.id.as_str()) {
                return Err(GatewayError::Validation(format!(
                    "duplicate trader id: {}",
                    trader.id
                )));
            }
        }

        if let Some(orphan) = trades.iter().find(|t| !seen.contains(t.trader_id.as_str())) {
            return Err(GatewayError::Validation(format!(
                "trade {} references unknown trader {}",
                orphan.id, orphan.trader_id
            )));
        }

        Ok(Self::assemble(traders, trades))
    }

    fn assemble(traders: Vec<Trader>, trades: Vec<Trade>) -> Self {
        let by_id = traders
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.clone(), idx))
            .collect();
        Self {
            traders,
            trades,
            by_id,
        }
    }

    /// Load a directory from a JSON file of the form `{"traders": [...], "trades": [...]}`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read directory fixture {}", path.display()))?;
        let file: DirectoryFile = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse directory fixture {}", path.display()))?;

        let directory = Self::new(file.traders, file.trades)
            .with_context(|| format!("Invalid directory fixture {}", path.display()))?;

        info!(
            "Loaded directory fixture {}: {} traders, {} trades",
            path.display(),
            directory.traders.len(),
            directory.trades.len()
        );
        Ok(directory)
    }

    pub fn traders(&self) -> &[Trader] {
        &self.traders
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn get(&self, trader_id: &str) -> Option<&Trader> {
        self.by_id.get(trader_id).map(|&idx| &self.traders[idx])
    }

    pub fn contains(&self, trader_id: &str) -> bool {
        self.by_id.contains_key(trader_id)
    }

    /// Trades of one trader, newest first
    pub fn trades_for(&self, trader_id: &str) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self
            .trades
            .iter()
            .filter(|t| t.trader_id == trader_id)
            .collect();
        trades.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        trades
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use crate::models::{Chain, Trade, TradeSide, Trader, VerificationType};

    pub fn trader(
        id: &str,
        name: &str,
        verification_type: VerificationType,
        chains: &[Chain],
        win_rate: f64,
        total_pnl: f64,
    ) -> Trader {
        Trader {
            id: id.to_string(),
            address: format!("0x{}", id.repeat(4)),
            name: name.to_string(),
            verification_type,
            chains: chains.to_vec(),
            win_rate,
            total_pnl,
            total_trades: 10,
            followers: 100,
            bio: None,
            joined_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn trade(id: &str, trader_id: &str, amount_in: f64, hour: u32) -> Trade {
        Trade {
            id: id.to_string(),
            trader_id: trader_id.to_string(),
            chain: Chain::Base,
            pair: "ETH/USDC".to_string(),
            side: TradeSide::Buy,
            amount_in,
            amount_out: amount_in,
            pnl: 0.0,
            executed_at: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{trade, trader};
    use super::*;
    use crate::models::{Chain, VerificationType};

    #[test]
    fn test_lookup_returns_unique_trader_or_none() {
        let directory = TraderDirectory::new(
            vec![
                trader("a", "Alpha", VerificationType::Zk, &[Chain::Base], 60.0, 1.0),
                trader("b", "Beta", VerificationType::Tee, &[Chain::Solana], 70.0, 2.0),
            ],
            Vec::new(),
        )
        .unwrap();

        assert_eq!(directory.get("b").unwrap().name, "Beta");
        assert!(directory.get("zzz").is_none());
        assert!(directory.contains("a"));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = TraderDirectory::new(
            vec![
                trader("a", "Alpha", VerificationType::Zk, &[], 60.0, 1.0),
                trader("a", "Alpha Again", VerificationType::Zk, &[], 60.0, 1.0),
            ],
            Vec::new(),
        );
        assert!(matches!(result, Err(GatewayError::Validation(_))));
    }

    #[test]
    fn test_orphan_trades_are_rejected() {
        let result = TraderDirectory::new(
            vec![trader("a", "Alpha", VerificationType::Zk, &[], 60.0, 1.0)],
            vec![trade("t1", "ghost", 10.0, 1)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_trades_for_is_newest_first() {
        let directory = TraderDirectory::new(
            vec![
                trader("a", "Alpha", VerificationType::Zk, &[], 60.0, 1.0),
                trader("b", "Beta", VerificationType::Tee, &[], 60.0, 1.0),
            ],
            vec![
                trade("t1", "a", 10.0, 1),
                trade("t2", "a", 20.0, 5),
                trade("t3", "b", 30.0, 3),
            ],
        )
        .unwrap();

        let ids: Vec<&str> = directory.trades_for("a").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert!(directory.trades_for("nobody").is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("directory-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"traders": [{
                "id": "t1", "address": "0xabc", "name": "Alpha",
                "verificationType": "TEE", "chains": ["arbitrum"],
                "winRate": 55.0, "totalPnL": 12.5, "totalTrades": 3,
                "followers": 9, "joinedAt": "2024-02-01T00:00:00Z"
            }]}"#,
        )
        .unwrap();

        let directory = TraderDirectory::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(directory.traders().len(), 1);
        assert!(directory.trades().is_empty());
        assert_eq!(directory.get("t1").unwrap().chains, vec![Chain::Arbitrum]);
    }
}
