//! Built-in demo directory
//!
//! Used when no `DIRECTORY_FIXTURE_PATH` is configured. Trades are generated
//! from a fixed seed so every run serves the same data.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::TraderDirectory;
use crate::models::{Chain, Trade, TradeSide, Trader, VerificationType};

const DEMO_SEED: u64 = 0x0b5c_0a11;
/// 2024-01-15T00:00:00Z
const FIRST_JOINED_TS: i64 = 1_705_276_800;
/// 2025-06-30T12:00:00Z
const LATEST_TRADE_TS: i64 = 1_751_284_800;
const TRADES_PER_TRADER: usize = 12;
const PAIRS: [&str; 5] = ["ETH/USDC", "BTC/USDC", "SOL/USDC", "ARB/ETH", "STRK/USDC"];

struct DemoTrader {
    id: &'static str,
    address: &'static str,
    name: &'static str,
    verification_type: VerificationType,
    chains: &'static [Chain],
    win_rate: f64,
    total_pnl: f64,
    total_trades: u32,
    followers: u32,
    bio: &'static str,
}

const DEMO_TRADERS: &[DemoTrader] = &[
    DemoTrader {
        id: "trader-001",
        address: "0x7a3f9c21d4e8b06f51a2c9e3d7b4f8a1c6e2d901",
        name: "ZeroKnowledge Whale",
        verification_type: VerificationType::Zk,
        chains: &[Chain::Ethereum, Chain::Base],
        win_rate: 78.4,
        total_pnl: 184_250.0,
        total_trades: 1_247,
        followers: 3_420,
        bio: "Swing trader on majors, every fill proven in zero knowledge.",
    },
    DemoTrader {
        id: "trader-002",
        address: "0x3b8e1d47f2a9c05e6d8b3a1f4c7e9d2b5a8f6c13",
        name: "Enclave Alpha",
        verification_type: VerificationType::Tee,
        chains: &[Chain::Arbitrum, Chain::Optimism],
        win_rate: 71.2,
        total_pnl: 92_780.0,
        total_trades: 864,
        followers: 2_115,
        bio: "Perp basis trades executed inside an attested enclave.",
    },
    DemoTrader {
        id: "trader-003",
        address: "0x9d2c4f8a1e7b3d06c5a9f2e8b4d1c7a3f6e9b254",
        name: "Shielded Momentum",
        verification_type: VerificationType::ZkTee,
        chains: &[Chain::Ethereum, Chain::Arbitrum, Chain::Base],
        win_rate: 82.9,
        total_pnl: 241_900.0,
        total_trades: 2_031,
        followers: 5_870,
        bio: "Trend following with dual ZK and TEE verification.",
    },
    DemoTrader {
        id: "trader-004",
        address: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
        name: "Solana Sniper",
        verification_type: VerificationType::Tee,
        chains: &[Chain::Solana],
        win_rate: 64.7,
        total_pnl: 38_410.0,
        total_trades: 3_512,
        followers: 1_290,
        bio: "High-frequency memecoin rotation.",
    },
    DemoTrader {
        id: "trader-005",
        address: "0x05f1e2d3c4b5a69788796a5b4c3d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5",
        name: "Stark Prover",
        verification_type: VerificationType::Zk,
        chains: &[Chain::Starknet],
        win_rate: 69.3,
        total_pnl: 57_120.0,
        total_trades: 412,
        followers: 980,
        bio: "Native Starknet DEX liquidity and arbitrage.",
    },
    DemoTrader {
        id: "trader-006",
        address: "0x6e4a2c8f1b9d3e7a5c0f4b8d2e6a1c9f3b7d5e08",
        name: "Polygon Grinder",
        verification_type: VerificationType::Unverified,
        chains: &[Chain::Polygon, Chain::Base],
        win_rate: 55.8,
        total_pnl: 12_640.0,
        total_trades: 689,
        followers: 310,
        bio: "Small-cap mean reversion.",
    },
    DemoTrader {
        id: "trader-007",
        address: "0x1c9e7a3f5b2d8e4a6c0f9b1d3e5a7c2f4b6d8e19",
        name: "Private Market Maker",
        verification_type: VerificationType::ZkTee,
        chains: &[Chain::Ethereum, Chain::Optimism, Chain::Polygon],
        win_rate: 74.1,
        total_pnl: 133_560.0,
        total_trades: 5_904,
        followers: 4_025,
        bio: "Two-sided quoting on L2 venues.",
    },
    DemoTrader {
        id: "trader-008",
        address: "0x8f3d5b7a9c1e2f4a6b8d0c2e4f6a8b1d3c5e7f20",
        name: "Base Degen",
        verification_type: VerificationType::Zk,
        chains: &[Chain::Base],
        win_rate: 58.6,
        total_pnl: -4_320.0,
        total_trades: 1_876,
        followers: 745,
        bio: "Onchain social tokens. High risk.",
    },
];

impl TraderDirectory {
    /// Directory with eight demo traders and deterministic generated trades
    pub fn demo() -> Self {
        let joined_base = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(FIRST_JOINED_TS);
        let traders: Vec<Trader> = DEMO_TRADERS
            .iter()
            .enumerate()
            .map(|(idx, t)| Trader {
                id: t.id.to_string(),
                address: t.address.to_string(),
                name: t.name.to_string(),
                verification_type: t.verification_type,
                chains: t.chains.to_vec(),
                win_rate: t.win_rate,
                total_pnl: t.total_pnl,
                total_trades: t.total_trades,
                followers: t.followers,
                bio: Some(t.bio.to_string()),
                joined_at: joined_base + Duration::days(17 * idx as i64),
            })
            .collect();

        let trades = generate_trades(&traders, DEMO_SEED);
        Self::assemble(traders, trades)
    }
}

fn generate_trades(traders: &[Trader], seed: u64) -> Vec<Trade> {
    let mut rng = StdRng::seed_from_u64(seed);
    let latest = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(LATEST_TRADE_TS);
    let mut trades = Vec::with_capacity(traders.len() * TRADES_PER_TRADER);

    for trader in traders {
        for n in 0..TRADES_PER_TRADER {
            let chain = trader.chains[rng.gen_range(0..trader.chains.len())];
            let amount_in: f64 = rng.gen_range(100.0..5_000.0);
            // Winning trades land at the trader's win rate
            let won = rng.gen_range(0.0..100.0) < trader.win_rate;
            let return_pct: f64 = if won {
                rng.gen_range(0.5..18.0)
            } else {
                -rng.gen_range(0.5..12.0)
            };
            let pnl = amount_in * return_pct / 100.0;

            trades.push(Trade {
                id: format!("{}-trade-{:03}", trader.id, n + 1),
                trader_id: trader.id.clone(),
                chain,
                pair: PAIRS[rng.gen_range(0..PAIRS.len())].to_string(),
                side: if rng.gen_bool(0.5) { TradeSide::Buy } else { TradeSide::Sell },
                amount_in,
                amount_out: amount_in + pnl,
                pnl,
                executed_at: latest - Duration::minutes(rng.gen_range(0..60 * 24 * 30)),
            });
        }
    }

    trades
}
