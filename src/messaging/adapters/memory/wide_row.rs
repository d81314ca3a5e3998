//! A minimal in-process wide-row table.
//!
//! Rows live in partitions; each partition is an ordered map keyed by the
//! clustering key. Reads are restricted to what a partitioned store offers:
//! exact-key access and descending range reads within one partition.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::messaging::{
    domain::TotalEstimate,
    ports::{StoreError, StoreResult},
};

type Partitions<P, C, R> = HashMap<P, BTreeMap<C, R>>;

/// Thread-safe partitioned table shared between clones.
#[derive(Debug)]
pub(super) struct WideRowTable<P, C, R> {
    partitions: Arc<RwLock<Partitions<P, C, R>>>,
}

impl<P, C, R> Clone for WideRowTable<P, C, R> {
    fn clone(&self) -> Self {
        Self {
            partitions: Arc::clone(&self.partitions),
        }
    }
}

impl<P, C, R> Default for WideRowTable<P, C, R> {
    fn default() -> Self {
        Self {
            partitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn cap_to_take(cap: u64) -> usize {
    usize::try_from(cap.saturating_add(1)).unwrap_or(usize::MAX)
}

impl<P, C, R> WideRowTable<P, C, R>
where
    P: Eq + Hash,
    C: Ord,
    R: Clone,
{
    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Partitions<P, C, R>>> {
        self.partitions
            .read()
            .map_err(|e| StoreError::unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Partitions<P, C, R>>> {
        self.partitions
            .write()
            .map_err(|e| StoreError::unavailable(format!("lock poisoned: {e}")))
    }

    /// Reads one row by its full primary key.
    pub(super) fn get(&self, partition: &P, clustering: &C) -> StoreResult<Option<R>> {
        let guard = self.read()?;
        Ok(guard
            .get(partition)
            .and_then(|rows| rows.get(clustering))
            .cloned())
    }

    /// Writes a row, replacing any row with the same key.
    pub(super) fn put(&self, partition: P, clustering: C, row: R) -> StoreResult<()> {
        let mut guard = self.write()?;
        guard.entry(partition).or_default().insert(clustering, row);
        Ok(())
    }

    /// Writes a row only if the key is vacant; returns the row stored under
    /// the key afterwards.
    pub(super) fn put_if_absent(&self, partition: P, clustering: C, row: R) -> StoreResult<R> {
        let mut guard = self.write()?;
        let stored = guard
            .entry(partition)
            .or_default()
            .entry(clustering)
            .or_insert(row);
        Ok(stored.clone())
    }

    /// Returns up to `limit` rows below `upper`, largest key first.
    pub(super) fn scan_below(
        &self,
        partition: &P,
        upper: Bound<C>,
        limit: usize,
    ) -> StoreResult<Vec<R>> {
        let guard = self.read()?;
        Ok(guard
            .get(partition)
            .map(|rows| {
                rows.range((Bound::Unbounded, upper))
                    .rev()
                    .take(limit)
                    .map(|(_, row)| row.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Counts rows below `upper`, visiting at most `cap + 1` of them.
    pub(super) fn count_below(
        &self,
        partition: &P,
        upper: Bound<C>,
        cap: u64,
    ) -> StoreResult<TotalEstimate> {
        let guard = self.read()?;
        let seen = guard.get(partition).map_or(0, |rows| {
            rows.range((Bound::Unbounded, upper))
                .take(cap_to_take(cap))
                .count()
        });
        Ok(TotalEstimate::from_bounded_scan(
            u64::try_from(seen).unwrap_or(u64::MAX),
            cap,
        ))
    }

    /// Returns every row of a partition in clustering order.
    pub(super) fn partition_rows(&self, partition: &P) -> StoreResult<Vec<R>> {
        let guard = self.read()?;
        Ok(guard
            .get(partition)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}
