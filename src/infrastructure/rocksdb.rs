use crate::domain::payment::{Payment, PaymentId};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment store implementation using RocksDB.
///
/// Records are stored as JSON under their 16-byte payment id.
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "payments" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn payments_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::Persistence("Payments column family not found".to_string())
        })
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn save(&self, payment: Payment) -> Result<()> {
        let cf = self.payments_cf()?;
        let value = serde_json::to_vec(&payment)?;
        self.db.put_cf(cf, payment.id.as_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        let cf = self.payments_cf()?;
        match self.db.get_pinned_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        let cf = self.payments_cf()?;
        let mut payments = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            payments.push(serde_json::from_slice(&value)?);
        }
        Ok(payments)
    }
}
