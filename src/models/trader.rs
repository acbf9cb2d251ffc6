use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a trader's performance claims are backed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VerificationType {
    /// Zero-knowledge proof of performance
    #[serde(rename = "ZK")]
    Zk,
    /// Trusted-execution-environment attestation
    #[serde(rename = "TEE")]
    Tee,
    /// Both proof mechanisms
    #[serde(rename = "ZK+TEE")]
    ZkTee,
    /// Self-reported, no backing
    #[serde(rename = "NONE")]
    Unverified,
}

impl VerificationType {
    pub fn includes_zk(&self) -> bool {
        matches!(self, Self::Zk | Self::ZkTee)
    }

    pub fn includes_tee(&self) -> bool {
        matches!(self, Self::Tee | Self::ZkTee)
    }
}

impl std::fmt::Display for VerificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zk => write!(f, "ZK"),
            Self::Tee => write!(f, "TEE"),
            Self::ZkTee => write!(f, "ZK+TEE"),
            Self::Unverified => write!(f, "NONE"),
        }
    }
}

impl FromStr for VerificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ZK" => Ok(Self::Zk),
            "TEE" => Ok(Self::Tee),
            "ZK+TEE" | "ZK_TEE" | "ZKTEE" => Ok(Self::ZkTee),
            "NONE" | "UNVERIFIED" => Ok(Self::Unverified),
            other => Err(format!("unknown verification type: {}", other)),
        }
    }
}

/// Chains a trader can be active on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Base,
    Arbitrum,
    Optimism,
    Polygon,
    Solana,
    Starknet,
}

impl Chain {
    pub const ALL: [Chain; 7] = [
        Chain::Ethereum,
        Chain::Base,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Polygon,
        Chain::Solana,
        Chain::Starknet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
            Self::Optimism => "optimism",
            Self::Polygon => "polygon",
            Self::Solana => "solana",
            Self::Starknet => "starknet",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "eth" => return Ok(Self::Ethereum),
            "arb" => return Ok(Self::Arbitrum),
            "op" => return Ok(Self::Optimism),
            "matic" => return Ok(Self::Polygon),
            "sol" => return Ok(Self::Solana),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| format!("unknown chain: {}", s))
    }
}

/// A trader profile in the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trader {
    /// Unique trader ID
    pub id: String,
    /// Wallet address the trader operates from
    pub address: String,
    /// Display name
    pub name: String,
    pub verification_type: VerificationType,
    /// Chains the trader is active on
    pub chains: Vec<Chain>,
    /// Win rate percentage (0-100)
    pub win_rate: f64,
    /// Lifetime profit/loss in USD
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    pub total_trades: u32,
    pub followers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl Trader {
    pub fn trades_on(&self, chain: Chain) -> bool {
        self.chains.contains(&chain)
    }

    /// Case-insensitive substring match on display name or address.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.address.to_lowercase().contains(needle)
    }
}

/// Side of an executed trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// An executed trade belonging to exactly one trader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub trader_id: String,
    pub chain: Chain,
    /// Traded pair, e.g. "ETH/USDC"
    pub pair: String,
    pub side: TradeSide,
    /// Input amount in USD
    pub amount_in: f64,
    /// Output amount in USD
    pub amount_out: f64,
    pub pnl: f64,
    pub executed_at: DateTime<Utc>,
}
