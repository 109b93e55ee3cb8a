use redb::{Database, ReadableTable, TableDefinition};
use rkyv::{AlignedVec, Archive, Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("Database creation error: {0}")]
    RedbCreate(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
}

/// One ledger row: the crawl's permanent record for a discovered URL.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub url: String,
    pub completed: bool,
    pub discovered_at: u64,
}

impl LedgerEntry {
    fn pending(url: String) -> Self {
        Self {
            url,
            completed: false,
            discovered_at: unix_now(),
        }
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Durable hash -> (url, completed) mapping underlying the frontier.
///
/// Every write commits (and fsyncs) before returning; resumability rests on
/// the ledger reflecting reality at all times. redb serializes write
/// transactions internally, so concurrent workers cannot interleave a
/// check-then-insert.
pub struct Ledger {
    db: Database,
}

impl Ledger {
    const URLS: TableDefinition<'static, &'static str, &'static [u8]> =
        TableDefinition::new("urls");

    /// Open (or create) the ledger under `data_dir`.
    ///
    /// With `wipe` set, any existing ledger file is deleted first: the
    /// restart path discards the previous crawl's record.
    pub fn open<P: AsRef<Path>>(data_dir: P, wipe: bool) -> Result<Self, LedgerError> {
        let data_path = data_dir.as_ref();
        std::fs::create_dir_all(data_path)?;

        let db_path = data_path.join("frontier.redb");
        if wipe && db_path.exists() {
            tracing::info!(path = %db_path.display(), "discarding existing ledger for restart");
            std::fs::remove_file(&db_path)?;
        }

        let db = Database::create(&db_path)?;

        // Open the table once so the database creates it before use.
        let write_txn = db.begin_write()?;
        {
            let _urls = write_txn.open_table(Self::URLS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Record a URL as discovered-but-incomplete.
    ///
    /// Returns true if the hash was unseen and a row was written; false for
    /// an already-known hash (pending or complete), making admission
    /// idempotent by construction.
    pub fn record_pending(&self, hash: &str, url: &str) -> Result<bool, LedgerError> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(Self::URLS)?;
            if table.get(hash)?.is_some() {
                false
            } else {
                let entry = LedgerEntry::pending(url.to_string());
                let serialized = rkyv::to_bytes::<_, 512>(&entry)
                    .map_err(|e| LedgerError::Serialization(format!("Serialize failed: {}", e)))?;
                table.insert(hash, serialized.as_ref())?;
                true
            }
        };
        write_txn.commit()?;
        Ok(inserted)
    }

    /// Flip a ledger row to completed.
    ///
    /// Returns true if the hash was already known. An unknown hash still
    /// gets a completed row written (so the URL can never be re-admitted),
    /// but the caller should log the anomaly: it means a URL was dispatched
    /// without having been admitted.
    pub fn mark_complete(&self, hash: &str, url: &str) -> Result<bool, LedgerError> {
        let write_txn = self.db.begin_write()?;
        let seen_before = {
            let mut table = write_txn.open_table(Self::URLS)?;

            let existing = if let Some(bytes) = table.get(hash)? {
                let mut aligned = AlignedVec::new();
                aligned.extend_from_slice(bytes.value());
                let entry: LedgerEntry = unsafe { rkyv::from_bytes_unchecked(&aligned) }
                    .map_err(|e| LedgerError::Serialization(format!("Deserialize failed: {}", e)))?;
                Some(entry)
            } else {
                None
            };

            let seen_before = existing.is_some();
            let mut entry = existing.unwrap_or_else(|| LedgerEntry::pending(url.to_string()));
            entry.completed = true;

            let serialized = rkyv::to_bytes::<_, 512>(&entry)
                .map_err(|e| LedgerError::Serialization(format!("Serialize failed: {}", e)))?;
            table.insert(hash, serialized.as_ref())?;
            seen_before
        };
        write_txn.commit()?;
        Ok(seen_before)
    }

    /// Whether the ledger has any row for this hash.
    pub fn contains(&self, hash: &str) -> Result<bool, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::URLS)?;
        Ok(table.get(hash)?.is_some())
    }

    /// Fetch a single entry, mainly for diagnostics and tests.
    pub fn get(&self, hash: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::URLS)?;

        if let Some(bytes) = table.get(hash)? {
            let mut aligned = AlignedVec::new();
            aligned.extend_from_slice(bytes.value());
            let entry: LedgerEntry = unsafe { rkyv::from_bytes_unchecked(&aligned) }
                .map_err(|e| LedgerError::Serialization(format!("Deserialize failed: {}", e)))?;
            Ok(Some(entry))
        } else {
            Ok(None)
        }
    }

    /// URLs recorded but not yet completed, in ledger iteration order.
    /// Used by the resume path to rebuild the ready list.
    pub fn pending_urls(&self) -> Result<Vec<String>, LedgerError> {
        let mut pending = Vec::new();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::URLS)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let mut aligned = AlignedVec::new();
            aligned.extend_from_slice(value.value());
            let entry: LedgerEntry = unsafe { rkyv::from_bytes_unchecked(&aligned) }
                .map_err(|e| LedgerError::Serialization(format!("Deserialize failed: {}", e)))?;
            if !entry.completed {
                pending.push(entry.url);
            }
        }

        Ok(pending)
    }

    /// Total number of ledger rows.
    pub fn len(&self) -> Result<usize, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::URLS)?;
        Ok(table.iter()?.count())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// Number of rows already marked complete.
    pub fn completed_count(&self) -> Result<usize, LedgerError> {
        let mut count = 0;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::URLS)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let mut aligned = AlignedVec::new();
            aligned.extend_from_slice(value.value());
            let entry: LedgerEntry = unsafe { rkyv::from_bytes_unchecked(&aligned) }
                .map_err(|e| LedgerError::Serialization(format!("Deserialize failed: {}", e)))?;
            if entry.completed {
                count += 1;
            }
        }

        Ok(count)
    }
}
