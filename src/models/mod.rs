pub mod copy_trade;
pub mod trader;

// Re-export commonly used types
pub use copy_trade::{CopyTrade, CopyTradeSettings, CopyTradeStatus};
pub use trader::{Chain, Trade, TradeSide, Trader, VerificationType};
