//! Aggregation layer: platform-wide statistics over the directory.

use serde::Serialize;

use crate::models::{Trade, Trader};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_traders: usize,
    pub total_trades: usize,
    /// Sum of trade input amounts, rounded to the nearest integer
    pub total_volume: i64,
    /// Sum of trader P&L, rounded to the nearest integer
    #[serde(rename = "totalPnL")]
    pub total_pnl: i64,
    /// Mean trader win rate, one decimal place; 0.0 for an empty directory
    pub avg_win_rate: f64,
    pub zk_verified: usize,
    pub tee_attested: usize,
}

impl PlatformStats {
    pub fn compute(traders: &[Trader], trades: &[Trade]) -> Self {
        let total_pnl: f64 = traders.iter().map(|t| t.total_pnl).sum();

        let avg_win_rate = if traders.is_empty() {
            0.0
        } else {
            let sum: f64 = traders.iter().map(|t| t.win_rate).sum();
            round_to_tenth(sum / traders.len() as f64)
        };

        Self {
            total_traders: traders.len(),
            total_trades: trades.len(),
            total_volume: trade_volume(trades.iter()).round() as i64,
            total_pnl: total_pnl.round() as i64,
            avg_win_rate,
            zk_verified: traders
                .iter()
                .filter(|t| t.verification_type.includes_zk())
                .count(),
            tee_attested: traders
                .iter()
                .filter(|t| t.verification_type.includes_tee())
                .count(),
        }
    }
}

/// Sum of input amounts
pub fn trade_volume<'a>(trades: impl Iterator<Item = &'a Trade>) -> f64 {
    trades.map(|t| t.amount_in).sum()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::test_support::{trade, trader};
    use crate::models::VerificationType;

    #[test]
    fn test_average_win_rate() {
        let traders = vec![
            trader("a", "A", VerificationType::Zk, &[], 60.0, 0.0),
            trader("b", "B", VerificationType::Zk, &[], 70.0, 0.0),
            trader("c", "C", VerificationType::Zk, &[], 80.0, 0.0),
        ];
        let stats = PlatformStats::compute(&traders, &[]);
        assert_eq!(stats.avg_win_rate, 70.0);
    }

    #[test]
    fn test_total_pnl_and_rounding() {
        let traders = vec![
            trader("a", "A", VerificationType::Zk, &[], 61.25, 450.0),
            trader("b", "B", VerificationType::Tee, &[], 70.0, 280.0),
        ];
        let trades = vec![trade("t1", "a", 100.4, 1), trade("t2", "b", 200.3, 2)];

        let stats = PlatformStats::compute(&traders, &trades);
        assert_eq!(stats.total_pnl, 730);
        assert_eq!(stats.total_volume, 301);
        assert_eq!(stats.total_traders, 2);
        assert_eq!(stats.total_trades, 2);
        // 65.625 -> 65.6
        assert_eq!(stats.avg_win_rate, 65.6);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalPnL"], 730);
    }

    #[test]
    fn test_verification_counts_include_dual_verified() {
        let traders = vec![
            trader("a", "A", VerificationType::Zk, &[], 50.0, 0.0),
            trader("b", "B", VerificationType::Tee, &[], 50.0, 0.0),
            trader("c", "C", VerificationType::ZkTee, &[], 50.0, 0.0),
            trader("d", "D", VerificationType::Unverified, &[], 50.0, 0.0),
        ];
        let stats = PlatformStats::compute(&traders, &[]);
        assert_eq!(stats.zk_verified, 2);
        assert_eq!(stats.tee_attested, 2);
    }

    #[test]
    fn test_empty_directory_reports_zero() {
        let stats = PlatformStats::compute(&[], &[]);
        assert_eq!(stats.total_traders, 0);
        assert_eq!(stats.avg_win_rate, 0.0);
        assert_eq!(stats.total_volume, 0);
    }
}
