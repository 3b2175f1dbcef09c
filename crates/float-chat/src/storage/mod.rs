//! Read-side storage boundary.
//!
//! The core only needs two read operations; real storage engines live outside
//! the crate and implement [`FloatStore`]. [`MemoryStore`] is the Vec-backed
//! implementation used in tests and small deployments.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::geo::regions::RegionBox;
use crate::types::{FloatRecord, Parameter};

/// One conjunctive read against the store.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    /// Rows must carry a non-null value for this parameter.
    pub parameter: Parameter,
    pub region: Option<RegionBox>,
    /// Inclusive lower timestamp bound.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper timestamp bound.
    pub end: Option<DateTime<Utc>>,
    pub limit: usize,
    /// Newest rows first when set.
    pub newest_first: bool,
}

#[async_trait]
pub trait FloatStore: Send + Sync {
    /// Run a conjunctive filtered read.
    async fn query(&self, query: &StoreQuery) -> Result<Vec<FloatRecord>>;

    /// Full scan of active floats for the nearest/radius paths. Acceptable
    /// for the dataset size class this system targets (hundreds to low
    /// thousands of rows).
    async fn all_active_rows(&self) -> Result<Vec<FloatRecord>>;
}

/// In-memory store over a set of float records.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<FloatRecord>>,
}

impl MemoryStore {
    pub fn new(rows: Vec<FloatRecord>) -> Self {
        Self { rows: RwLock::new(rows) }
    }

    pub fn insert(&self, row: FloatRecord) {
        self.rows.write().push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl FloatStore for MemoryStore {
    async fn query(&self, query: &StoreQuery) -> Result<Vec<FloatRecord>> {
        let rows = self.rows.read();
        let mut matched: Vec<FloatRecord> = rows
            .iter()
            .filter(|row| row.value_of(query.parameter).is_some())
            .filter(|row| query.region.map_or(true, |b| b.contains(row.latitude, row.longitude)))
            .filter(|row| query.start.map_or(true, |start| row.timestamp >= start))
            .filter(|row| query.end.map_or(true, |end| row.timestamp < end))
            .cloned()
            .collect();
        if query.newest_first {
            matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
        matched.truncate(query.limit);
        Ok(matched)
    }

    async fn all_active_rows(&self) -> Result<Vec<FloatRecord>> {
        Ok(self.rows.read().iter().filter(|row| row.is_active()).cloned().collect())
    }
}
