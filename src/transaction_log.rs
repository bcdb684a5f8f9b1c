// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Thread-safe ledger entry log with duplicate detection.
//!
//! One ledger entry may exist per (user, source event): the same purchase
//! legitimately produces one entry for the seller and one for an affiliate,
//! but never two for the same user. The log combines a [`DashMap`] for O(1)
//! duplicate checking with a [`SegQueue`] preserving insertion order.

use crate::base::{BalanceTransactionId, UserId};
use crate::error::LedgerError;
use crate::event::{SourceEvent, SourceKind};
use crate::transaction::BalanceTransaction;
use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Duplicate-detection key: one entry per user per source event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub user_id: UserId,
    pub kind: SourceKind,
    pub event_id: u64,
}

impl EntryKey {
    pub fn new(user_id: UserId, event: &SourceEvent) -> Self {
        Self {
            user_id,
            kind: event.kind(),
            event_id: event.event_id(),
        }
    }
}

/// Append-only entry log shared by all books of a ledger.
#[derive(Debug, Default)]
pub struct TransactionLog {
    /// Entries keyed by (user, source event) for O(1) duplicate detection.
    entries: DashMap<EntryKey, Arc<BalanceTransaction>>,

    /// Entry ids in insertion order.
    order: SegQueue<BalanceTransactionId>,
}

impl TransactionLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            order: SegQueue::new(),
        }
    }

    /// Atomically checks for a duplicate and, if the key is free, builds and
    /// records the entry produced by `build`.
    ///
    /// The builder runs while the key's map slot is reserved, so a concurrent
    /// `record` for the same (user, source event) cannot interleave between
    /// the duplicate check and the ledger mutation the builder performs.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateEntry`] if an entry with the same key
    /// already exists; otherwise forwards any error from `build`, in which
    /// case nothing is recorded.
    pub fn push_with<F>(&self, key: EntryKey, build: F) -> Result<Arc<BalanceTransaction>, LedgerError>
    where
        F: FnOnce() -> Result<BalanceTransaction, LedgerError>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateEntry),
            Entry::Vacant(slot) => {
                let entry = Arc::new(build()?);
                slot.insert(Arc::clone(&entry));
                self.order.push(entry.id);
                Ok(entry)
            }
        }
    }

    /// Looks up the entry recorded for a (user, source event), if any.
    pub fn get(&self, key: &EntryKey) -> Option<Arc<BalanceTransaction>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry))
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
