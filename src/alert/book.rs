//! Alert record storage with time and page indices.
//!
//! Records live in one arena keyed by a stable id. Two ordered sets index
//! the arena: `(time, id)` for finding the next record to fire and
//! `(page, id)` for cancelling everything aimed at a page. Neither key is
//! unique.

use std::collections::{BTreeMap, BTreeSet};

use super::kind::AlertKind;

/// Identifier of a UI page; interpreted only by the UI layer.
pub type PageId = u32;

/// A scheduled alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRecord {
    /// Seconds since UTC midnight; may exceed one day.
    pub time: i64,
    /// Lower values win ties at the same time.
    pub priority: i32,
    /// Page the UI should switch to when this fires.
    pub page: PageId,
    pub sound: AlertKind,
}

#[derive(Debug, Default)]
pub struct AlertBook {
    records: BTreeMap<u64, AlertRecord>,
    by_time: BTreeSet<(i64, u64)>,
    by_page: BTreeSet<(PageId, u64)>,
    next_id: u64,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: AlertRecord) {
        let id = self.next_id;
        self.next_id += 1;
        self.by_time.insert((record.time, id));
        self.by_page.insert((record.page, id));
        self.records.insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_time.clear();
        self.by_page.clear();
    }

    /// Remove every record targeting `page`. Returns how many were removed.
    pub fn remove_page(&mut self, page: PageId) -> usize {
        let ids: Vec<u64> = self
            .by_page
            .range((page, 0)..=(page, u64::MAX))
            .map(|&(_, id)| id)
            .collect();
        for &id in &ids {
            self.forget(id);
        }
        ids.len()
    }

    /// Remove every record scheduled at exactly `time`.
    pub fn remove_time(&mut self, time: i64) -> usize {
        let ids: Vec<u64> = self
            .by_time
            .range((time, 0)..=(time, u64::MAX))
            .map(|&(_, id)| id)
            .collect();
        for &id in &ids {
            self.forget(id);
        }
        ids.len()
    }

    /// Drop records whose time is before `now_secs` without firing them.
    pub fn discard_before(&mut self, now_secs: i64) -> usize {
        let ids: Vec<u64> = self
            .by_time
            .range(..(now_secs, 0))
            .map(|&(_, id)| id)
            .collect();
        for &id in &ids {
            self.forget(id);
        }
        ids.len()
    }

    /// The record to fire next: earliest time, then lowest priority value,
    /// then insertion order.
    pub fn next_due(&self) -> Option<AlertRecord> {
        let &(earliest, _) = self.by_time.first()?;
        self.by_time
            .range((earliest, 0)..=(earliest, u64::MAX))
            .filter_map(|(_, id)| self.records.get(id))
            .min_by_key(|record| record.priority)
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.by_time.iter().filter_map(|(_, id)| self.records.get(id))
    }

    fn forget(&mut self, id: u64) {
        if let Some(record) = self.records.remove(&id) {
            self.by_time.remove(&(record.time, id));
            self.by_page.remove(&(record.page, id));
        }
    }
}
