use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};

/// Lifecycle status of a copy-trade subscription
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CopyTradeStatus {
    /// Mirroring the followed trader
    Active,
    /// Temporarily not mirroring
    Paused,
    /// Ended by the user
    Stopped,
}

impl std::fmt::Display for CopyTradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// User-supplied settings for a copy trade. Every field is optional and
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyTradeSettings {
    /// Largest single mirrored position in USD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_position_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_percent: Option<f64>,
    /// Slippage tolerance in basis points (e.g. 300 = 3%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
    /// Fraction of the leader's size to mirror
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_ratio: Option<f64>,
}

impl CopyTradeSettings {
    pub fn validate(&self) -> GatewayResult<()> {
        if let Some(size) = self.max_position_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(GatewayError::Validation(
                    "maxPositionSize must be a positive number".to_string(),
                ));
            }
        }
        for (field, value) in [
            ("stopLossPercent", self.stop_loss_percent),
            ("takeProfitPercent", self.take_profit_percent),
        ] {
            if let Some(pct) = value {
                if !(pct.is_finite() && pct > 0.0 && pct <= 100.0) {
                    return Err(GatewayError::Validation(format!(
                        "{} must be in (0, 100]",
                        field
                    )));
                }
            }
        }
        if let Some(bps) = self.slippage_bps {
            if bps > 10_000 {
                return Err(GatewayError::Validation(
                    "slippageBps cannot exceed 10000".to_string(),
                ));
            }
        }
        if let Some(ratio) = self.copy_ratio {
            if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
                return Err(GatewayError::Validation(
                    "copyRatio must be in (0, 1]".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A user's subscription mirroring one trader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyTrade {
    pub id: String,
    pub user_id: String,
    /// Followed trader; always present in the directory at activation time
    pub trader_id: String,
    /// Allocated amount in USD
    pub amount: f64,
    pub settings: CopyTradeSettings,
    pub status: CopyTradeStatus,
    pub activated_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl CopyTrade {
    pub fn new(user_id: &str, trader_id: &str, amount: f64, settings: CopyTradeSettings) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            trader_id: trader_id.to_string(),
            amount,
            settings,
            status: CopyTradeStatus::Active,
            activated_at: Utc::now(),
            stopped_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CopyTradeStatus::Active
    }

    pub fn stop(&mut self) {
        self.status = CopyTradeStatus::Stopped;
        self.stopped_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_ignore_unknown_keys() {
        let json = r#"{"stopLossPercent": 10, "theme": "dark"}"#;
        let settings: CopyTradeSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.stop_loss_percent, Some(10.0));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_reject_out_of_range_values() {
        let settings = CopyTradeSettings {
            take_profit_percent: Some(150.0),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(GatewayError::Validation(_))));

        let settings = CopyTradeSettings {
            copy_ratio: Some(0.0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_stop_marks_subscription_inactive() {
        let mut copy_trade =
            CopyTrade::new("user-1", "trader-1", 250.0, CopyTradeSettings::default());
        assert!(copy_trade.is_active());

        copy_trade.stop();
        assert_eq!(copy_trade.status, CopyTradeStatus::Stopped);
        assert!(copy_trade.stopped_at.is_some());
    }
}
