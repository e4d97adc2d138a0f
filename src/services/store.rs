//! In-memory document collections.
//!
//! Documents are kept in a `DashMap` keyed by id (or any unique key). Listing
//! returns documents in insertion order.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

/// A fresh document id: 32 lowercase hex characters.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug)]
pub struct Collection<T> {
    docs: DashMap<String, (u64, T)>,
    seq: AtomicU64,
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn insert(&self, key: String, doc: T) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.docs.insert(key, (seq, doc));
    }

    /// Insert only if `key` is not taken. The check and insert hold the
    /// shard lock together; on conflict the document is handed back.
    pub fn insert_new(&self, key: String, doc: T) -> Result<(), T> {
        match self.docs.entry(key) {
            Entry::Occupied(_) => Err(doc),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, doc));
                Ok(())
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.docs.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.docs.get(key).map(|entry| entry.value().1.clone())
    }

    /// Apply `change` in place and return the updated document.
    pub fn update<F>(&self, key: &str, change: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut entry = self.docs.get_mut(key)?;
        change(&mut entry.value_mut().1);
        Some(entry.value().1.clone())
    }

    pub fn remove(&self, key: &str) -> Option<T> {
        self.docs.remove(key).map(|(_, (_, doc))| doc)
    }

    /// Documents matching `predicate`, oldest first.
    pub fn find<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        let mut found: Vec<(u64, T)> = self
            .docs
            .iter()
            .filter(|entry| predicate(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, doc)| doc).collect()
    }

    pub fn all(&self) -> Vec<T> {
        self.find(|_| true)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<T: Clone> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}
