//! Stranger registry.
//!
//! The registry itself lives outside the admin control plane; this module
//! defines the interface the admin commands use and an in-memory registry
//! used by the console front end.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StrangerError;

/// Lookup side of the stranger registry.
#[async_trait]
pub trait StrangerService: Send + Sync {
    /// Returns the stranger with the given Telegram ID.
    ///
    /// Fails with [`StrangerError::NotFound`] for unknown IDs.
    async fn get_stranger(&self, telegram_id: i64) -> Result<Arc<dyn Stranger>, StrangerError>;
}

/// A single chat participant.
#[async_trait]
pub trait Stranger: Send + Sync {
    fn telegram_id(&self) -> i64;

    /// Terminates the stranger's current talk, if any.
    async fn end_talk(&self) -> Result<(), StrangerError>;

    /// Credits `amount` bonus points to the stranger.
    async fn pay(&self, amount: i64, reason: &str) -> Result<(), StrangerError>;
}

/// A bonus credited to a stranger
#[derive(Debug, Clone, PartialEq)]
pub struct BonusRecord {
    pub amount: i64,
    pub reason: String,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct StrangerRecord {
    partner: Option<i64>,
    balance: i64,
    bonuses: Vec<BonusRecord>,
}

type SharedRecords = Arc<RwLock<HashMap<i64, StrangerRecord>>>;

/// Registry kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStrangerService {
    records: SharedRecords,
}

impl InMemoryStrangerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the given strangers.
    pub async fn with_strangers(ids: impl IntoIterator<Item = i64>) -> Self {
        let service = Self::new();
        for id in ids {
            service.register(id).await;
        }
        service
    }

    /// Registers a stranger. Existing strangers are left untouched.
    pub async fn register(&self, telegram_id: i64) {
        self.records
            .write()
            .await
            .entry(telegram_id)
            .or_default();
    }

    /// Pairs two registered strangers, replacing any previous partners.
    pub async fn pair(&self, a: i64, b: i64) -> Result<(), StrangerError> {
        let mut records = self.records.write().await;
        for id in [a, b] {
            if !records.contains_key(&id) {
                return Err(StrangerError::NotFound(id));
            }
        }

        for id in [a, b] {
            if let Some(old) = records.get(&id).and_then(|r| r.partner) {
                if let Some(old_record) = records.get_mut(&old) {
                    old_record.partner = None;
                }
            }
        }

        if let Some(record) = records.get_mut(&a) {
            record.partner = Some(b);
        }
        if let Some(record) = records.get_mut(&b) {
            record.partner = Some(a);
        }
        Ok(())
    }

    pub async fn partner(&self, telegram_id: i64) -> Option<i64> {
        self.records
            .read()
            .await
            .get(&telegram_id)
            .and_then(|r| r.partner)
    }

    pub async fn balance(&self, telegram_id: i64) -> Option<i64> {
        self.records.read().await.get(&telegram_id).map(|r| r.balance)
    }

    pub async fn bonuses(&self, telegram_id: i64) -> Vec<BonusRecord> {
        self.records
            .read()
            .await
            .get(&telegram_id)
            .map(|r| r.bonuses.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StrangerService for InMemoryStrangerService {
    async fn get_stranger(&self, telegram_id: i64) -> Result<Arc<dyn Stranger>, StrangerError> {
        if !self.records.read().await.contains_key(&telegram_id) {
            return Err(StrangerError::NotFound(telegram_id));
        }

        Ok(Arc::new(InMemoryStranger {
            telegram_id,
            records: self.records.clone(),
        }))
    }
}

/// Handle to a stranger stored in [`InMemoryStrangerService`].
struct InMemoryStranger {
    telegram_id: i64,
    records: SharedRecords,
}

#[async_trait]
impl Stranger for InMemoryStranger {
    fn telegram_id(&self) -> i64 {
        self.telegram_id
    }

    async fn end_talk(&self) -> Result<(), StrangerError> {
        let mut records = self.records.write().await;
        let partner = records
            .get_mut(&self.telegram_id)
            .ok_or(StrangerError::NotFound(self.telegram_id))?
            .partner
            .take();

        if let Some(partner_id) = partner {
            if let Some(partner) = records.get_mut(&partner_id) {
                if partner.partner == Some(self.telegram_id) {
                    partner.partner = None;
                }
            }
            tracing::debug!("Talk between {} and {} ended", self.telegram_id, partner_id);
        }
        Ok(())
    }

    async fn pay(&self, amount: i64, reason: &str) -> Result<(), StrangerError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&self.telegram_id)
            .ok_or(StrangerError::NotFound(self.telegram_id))?;

        record.balance = record
            .balance
            .checked_add(amount)
            .ok_or_else(|| StrangerError::Storage("bonus balance overflow".to_string()))?;
        record.bonuses.push(BonusRecord {
            amount,
            reason: reason.to_string(),
            paid_at: Utc::now(),
        });

        tracing::debug!(
            "Stranger {} was paid {} ({}), balance {}",
            self.telegram_id,
            amount,
            reason,
            record.balance
        );
        Ok(())
    }
}
