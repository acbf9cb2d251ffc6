//! Copy Trade Manager
//!
//! Owns copy-trade subscriptions:
//! - activation with trader existence, amount and settings checks
//! - at most one active subscription per (user, trader)
//! - stopping subscriptions
//! - optional JSON-file persistence

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::directory::TraderDirectory;
use crate::error::{GatewayError, GatewayResult};
use crate::models::copy_trade::{CopyTrade, CopyTradeSettings, CopyTradeStatus};

pub struct CopyTradeManager {
    /// Subscriptions keyed by user id
    copy_trades: Arc<RwLock<HashMap<String, Vec<CopyTrade>>>>,
    /// Directory used to check that followed traders exist
    directory: Arc<TraderDirectory>,
    /// Where to persist subscriptions; in-memory only when None
    storage_path: Option<PathBuf>,
}

impl CopyTradeManager {
    pub fn new(directory: Arc<TraderDirectory>, storage_path: Option<PathBuf>) -> Self {
        Self {
            copy_trades: Arc::new(RwLock::new(HashMap::new())),
            directory,
            storage_path,
        }
    }

    /// Load persisted subscriptions from disk
    pub async fn init(&self) -> Result<()> {
        info!("Initializing CopyTradeManager...");
        self.load().await?;
        info!(
            "CopyTradeManager initialized: {} copy trades",
            self.copy_trades.read().await.values().map(Vec::len).sum::<usize>()
        );
        Ok(())
    }

    // ==========================================================================
    // Subscription Lifecycle
    // ==========================================================================

    /// Start copying a trader
    pub async fn activate(
        &self,
        user_id: &str,
        trader_id: &str,
        amount: f64,
        settings: CopyTradeSettings,
    ) -> GatewayResult<CopyTrade> {
        if user_id.trim().is_empty() {
            return Err(GatewayError::Validation("userId must not be empty".to_string()));
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Err(GatewayError::Validation(
                "amount must be a positive number".to_string(),
            ));
        }
        settings.validate()?;

        if !self.directory.contains(trader_id) {
            return Err(GatewayError::NotFound(format!("Trader {} not found", trader_id)));
        }

        // Duplicate check, insert and save all happen under one write lock,
        // so the file on disk always matches what callers were told
        let mut copy_trades = self.copy_trades.write().await;
        let user_trades = copy_trades.entry(user_id.to_string()).or_default();

        if user_trades
            .iter()
            .any(|ct| ct.trader_id == trader_id && ct.is_active())
        {
            return Err(GatewayError::Conflict(format!(
                "User {} is already copying trader {}",
                user_id, trader_id
            )));
        }

        let copy_trade = CopyTrade::new(user_id, trader_id, amount, settings);
        user_trades.push(copy_trade.clone());

        if let Err(e) = self.persist(&copy_trades).await {
            error!("Failed to save copy trades: {:#}", e);
            if let Some(user_trades) = copy_trades.get_mut(user_id) {
                user_trades.retain(|ct| ct.id != copy_trade.id);
            }
            return Err(GatewayError::Persistence(e.to_string()));
        }
        drop(copy_trades);

        info!(
            "Activated copy trade {}: {} copying {} with {:.2}",
            copy_trade.id, user_id, trader_id, amount
        );
        Ok(copy_trade)
    }

    /// Stop a subscription. Stopping twice is a conflict.
    pub async fn stop(&self, copy_trade_id: &str) -> GatewayResult<CopyTrade> {
        let mut copy_trades = self.copy_trades.write().await;
        let copy_trade = copy_trades
            .values_mut()
            .flat_map(|v| v.iter_mut())
            .find(|ct| ct.id == copy_trade_id)
            .ok_or_else(|| {
                GatewayError::NotFound(format!("Copy trade {} not found", copy_trade_id))
            })?;

        if copy_trade.status == CopyTradeStatus::Stopped {
            return Err(GatewayError::Conflict(format!(
                "Copy trade {} is already stopped",
                copy_trade_id
            )));
        }
        let previous = copy_trade.clone();
        copy_trade.stop();
        let stopped = copy_trade.clone();

        if let Err(e) = self.persist(&copy_trades).await {
            error!("Failed to save copy trades: {:#}", e);
            if let Some(ct) = copy_trades
                .values_mut()
                .flat_map(|v| v.iter_mut())
                .find(|ct| ct.id == copy_trade_id)
            {
                *ct = previous;
            }
            return Err(GatewayError::Persistence(e.to_string()));
        }
        drop(copy_trades);

        info!("Stopped copy trade {} for {}", stopped.id, stopped.user_id);
        Ok(stopped)
    }

    /// All subscriptions of a user, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Vec<CopyTrade> {
        let copy_trades = self.copy_trades.read().await;
        let mut list = copy_trades.get(user_id).cloned().unwrap_or_default();
        list.sort_by(|a, b| b.activated_at.cmp(&a.activated_at));
        list
    }

    pub async fn get(&self, copy_trade_id: &str) -> Option<CopyTrade> {
        let copy_trades = self.copy_trades.read().await;
        copy_trades
            .values()
            .flat_map(|v| v.iter())
            .find(|ct| ct.id == copy_trade_id)
            .cloned()
    }

    // ==========================================================================
    // Persistence
    // ==========================================================================

    async fn load(&self) -> Result<()> {
        let path = match &self.storage_path {
            Some(path) => path,
            None => {
                debug!("No copy trade storage configured, keeping subscriptions in memory");
                return Ok(());
            }
        };
        if !path.exists() {
            debug!("No copy trades file found, starting fresh");
            return Ok(());
        }

        let data = fs::read_to_string(path).await?;
        if data.trim().is_empty() {
            return Ok(());
        }

        let loaded: HashMap<String, Vec<CopyTrade>> =
            serde_json::from_str(&data).context("Failed to parse copy trades file")?;
        let (reconciled, repaired) = self.reconcile(loaded);

        let mut copy_trades = self.copy_trades.write().await;
        *copy_trades = reconciled;
        if repaired > 0 {
            warn!("Repaired {} inconsistent copy trades from {}", repaired, path.display());
            self.persist(&copy_trades).await?;
        }

        let total: usize = copy_trades.values().map(Vec::len).sum();
        info!("Loaded {} copy trades", total);
        Ok(())
    }

    /// Drop subscriptions to traders missing from the directory and stop all but
    /// the newest active subscription per (user, trader). Returns the repaired map
    /// and how many records were changed.
    fn reconcile(
        &self,
        loaded: HashMap<String, Vec<CopyTrade>>,
    ) -> (HashMap<String, Vec<CopyTrade>>, usize) {
        let mut repaired = 0;
        let mut reconciled = HashMap::with_capacity(loaded.len());

        for (user_id, mut user_trades) in loaded {
            let before = user_trades.len();
            user_trades.retain(|ct| {
                let known = self.directory.contains(&ct.trader_id);
                if !known {
                    warn!("Dropping copy trade {}: unknown trader {}", ct.id, ct.trader_id);
                }
                known
            });
            repaired += before - user_trades.len();

            user_trades.sort_by(|a, b| b.activated_at.cmp(&a.activated_at));
            let mut active_traders = HashSet::new();
            for ct in user_trades.iter_mut().filter(|ct| ct.is_active()) {
                if !active_traders.insert(ct.trader_id.clone()) {
                    warn!(
                        "Stopping duplicate copy trade {}: {} already copies {}",
                        ct.id, user_id, ct.trader_id
                    );
                    ct.stop();
                    repaired += 1;
                }
            }

            if !user_trades.is_empty() {
                reconciled.insert(user_id, user_trades);
            }
        }

        (reconciled, repaired)
    }

    /// Write a snapshot to disk. Callers hold the `copy_trades` write lock,
    /// which keeps writes to the temp file serialized.
    async fn persist(&self, copy_trades: &HashMap<String, Vec<CopyTrade>>) -> Result<()> {
        let path = match &self.storage_path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_string_pretty(copy_trades)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, data)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        let total: usize = copy_trades.values().map(Vec::len).sum();
        debug!("Saved {} copy trades", total);
        Ok(())
    }
}
