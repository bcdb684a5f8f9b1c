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

//! Balance reconciliation engine.
//!
//! The [`Ledger`] is the central component: it records ledger entries and
//! settles each one into the correct balance row. Rows are grouped into
//! books, one per (user, merchant account) pair, and each book is guarded by
//! a mutex so the search for a matching unpaid row and the
//! increment-or-create run as one atomic step.
//!
//! # Matching rules
//!
//! | source event | matched unpaid row | new row date if none |
//! |--------------|--------------------|----------------------|
//! | purchase | same date as the purchase's success date | success date |
//! | refund / single-purchase dispute / credit | earliest with date ≤ event date | event date |
//! | charge dispute | same date as the charge's creation date, else earliest ≤ formalization date | formalization date |
//!
//! Processing and paid rows are never matched; a row's holding currency is
//! ignored when matching (conversion is handled upstream).

use crate::amount::BalanceTransactionAmount;
use crate::balance::Balance;
use crate::base::{BalanceId, BalanceTransactionId, MerchantAccountId, UserId};
use crate::error::LedgerError;
use crate::event::SourceEvent;
use crate::transaction::BalanceTransaction;
use crate::transaction_log::{EntryKey, TransactionLog};
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// One book per (user, merchant account) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BookKey {
    user_id: UserId,
    merchant_account_id: Option<MerchantAccountId>,
}

/// The balance rows of one (user, merchant account) pair.
///
/// The mutex is the serialization unit required by the accounting contract:
/// two entries settling for the same pair can never both conclude that no
/// unpaid row exists and create duplicates.
#[derive(Debug, Default)]
struct Book {
    balances: Mutex<Vec<Balance>>,
}

impl Book {
    fn new() -> Self {
        Self::default()
    }
}

/// How to pick the unpaid row an entry settles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalanceMatch {
    /// Exact-date match (purchases).
    OnDate(NaiveDate),
    /// Earliest unpaid row dated on or before the given date (refunds,
    /// single-purchase disputes, credits).
    EarliestOnOrBefore(NaiveDate),
    /// Exact-date match on the charge's creation date, falling back to the
    /// earliest unpaid row on or before the dispute's formalization date
    /// (disputes against multi-purchase charges).
    OnDateOrEarliest {
        date: NaiveDate,
        on_or_before: NaiveDate,
    },
}

impl BalanceMatch {
    fn for_event(event: &SourceEvent) -> Self {
        match event {
            SourceEvent::Purchase { .. } => Self::OnDate(event.occurred_on()),
            SourceEvent::Dispute {
                charge: Some(charge),
                ..
            } => Self::OnDateOrEarliest {
                date: charge.created_at.date_naive(),
                on_or_before: event.occurred_on(),
            },
            _ => Self::EarliestOnOrBefore(event.occurred_on()),
        }
    }

    /// Date for a freshly created row when no unpaid row matched. For charge
    /// disputes this is the formalization date, not the charge's date.
    fn new_row_date(&self) -> NaiveDate {
        match self {
            Self::OnDate(date) => *date,
            Self::EarliestOnOrBefore(date) => *date,
            Self::OnDateOrEarliest { on_or_before, .. } => *on_or_before,
        }
    }

    fn find(&self, balances: &[Balance]) -> Option<usize> {
        match self {
            Self::OnDate(date) => unpaid_on_date(balances, *date),
            Self::EarliestOnOrBefore(date) => earliest_unpaid_on_or_before(balances, *date),
            Self::OnDateOrEarliest { date, on_or_before } => unpaid_on_date(balances, *date)
                .or_else(|| earliest_unpaid_on_or_before(balances, *on_or_before)),
        }
    }
}

/// Index of the unpaid row dated exactly `date`, lowest id winning ties.
fn unpaid_on_date(balances: &[Balance], date: NaiveDate) -> Option<usize> {
    balances
        .iter()
        .enumerate()
        .filter(|(_, balance)| balance.is_unpaid() && balance.date == date)
        .min_by_key(|(_, balance)| balance.id)
        .map(|(index, _)| index)
}

/// Index of the earliest unpaid row dated on or before `limit`. Ties on the
/// date go to the lowest id (creation order).
fn earliest_unpaid_on_or_before(balances: &[Balance], limit: NaiveDate) -> Option<usize> {
    balances
        .iter()
        .enumerate()
        .filter(|(_, balance)| balance.is_unpaid() && balance.date <= limit)
        .min_by_key(|(_, balance)| (balance.date, balance.id))
        .map(|(index, _)| index)
}

/// Balance reconciliation engine managing all books and the entry log.
///
/// # Invariants
///
/// - One ledger entry per (user, source event); duplicates are rejected.
/// - Every accepted entry settles into exactly one balance row, and only
///   unpaid rows ever change.
/// - `amount_cents` accumulates issued-side net cents and
///   `holding_amount_cents` holding-side net cents, always together.
pub struct Ledger {
    /// Books indexed by (user, merchant account).
    books: DashMap<BookKey, Book>,
    /// Append-only entry log with duplicate detection.
    log: TransactionLog,
    next_balance_id: AtomicU64,
    next_transaction_id: AtomicU64,
}

impl Ledger {
    /// Creates a new ledger with no books or entries.
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
            log: TransactionLog::new(),
            next_balance_id: AtomicU64::new(1),
            next_transaction_id: AtomicU64::new(1),
        }
    }

    /// Records a ledger entry and settles it into a balance row.
    ///
    /// This is the single mutating operation of the ledger. The entry is
    /// checked against the log first (a duplicate leaves every balance
    /// untouched), then the matching rules pick or create the unpaid row and
    /// both of its running totals are adjusted by the respective net cents.
    ///
    /// Deltas may be negative (refunds, chargebacks, corrections); balances
    /// may legitimately go negative.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateEntry`] if an entry for this (user, source
    /// event) was already recorded.
    pub fn record(
        &self,
        user_id: UserId,
        merchant_account_id: Option<MerchantAccountId>,
        event: SourceEvent,
        issued_amount: BalanceTransactionAmount,
        holding_amount: BalanceTransactionAmount,
    ) -> Result<Arc<BalanceTransaction>, LedgerError> {
        let key = EntryKey::new(user_id, &event);
        self.log.push_with(key, || {
            let book_key = BookKey {
                user_id,
                merchant_account_id,
            };
            let book = self.books.entry(book_key).or_insert_with(Book::new);
            let mut balances = book.balances.lock();

            let rule = BalanceMatch::for_event(&event);
            let index = match rule.find(&balances) {
                Some(index) => index,
                None => {
                    let balance = Balance::new(
                        BalanceId(self.next_balance_id.fetch_add(1, Ordering::Relaxed)),
                        user_id,
                        merchant_account_id,
                        rule.new_row_date(),
                        issued_amount.currency,
                        holding_amount.currency,
                    );
                    balances.push(balance);
                    balances.len() - 1
                }
            };

            let balance = &mut balances[index];
            balance.credit(issued_amount.net_cents, holding_amount.net_cents)?;

            Ok(BalanceTransaction {
                id: BalanceTransactionId(self.next_transaction_id.fetch_add(1, Ordering::Relaxed)),
                user_id,
                merchant_account_id,
                event,
                issued_amount,
                holding_amount,
                balance_id: balance.id,
            })
        })
    }

    /// Sum of all unpaid rows' issued-side totals for a user, across
    /// merchant accounts. Derived read, consistent immediately after any
    /// `record` call.
    pub fn unpaid_balance_cents(&self, user_id: UserId) -> i64 {
        self.books
            .iter()
            .filter(|book| book.key().user_id == user_id)
            .map(|book| {
                book.value()
                    .balances
                    .lock()
                    .iter()
                    .filter(|balance| balance.is_unpaid())
                    .map(|balance| balance.amount_cents)
                    .sum::<i64>()
            })
            .sum()
    }

    /// Snapshot of a balance row by id.
    pub fn balance(&self, id: BalanceId) -> Option<Balance> {
        self.books.iter().find_map(|book| {
            book.value()
                .balances
                .lock()
                .iter()
                .find(|balance| balance.id == id)
                .cloned()
        })
    }

    /// Snapshot of all balance rows for one (user, merchant account) pair,
    /// in creation order.
    pub fn balances_for(
        &self,
        user_id: UserId,
        merchant_account_id: Option<MerchantAccountId>,
    ) -> Vec<Balance> {
        let key = BookKey {
            user_id,
            merchant_account_id,
        };
        self.books
            .get(&key)
            .map(|book| book.balances.lock().clone())
            .unwrap_or_default()
    }

    /// Snapshot of every balance row in the ledger, ordered by id.
    pub fn balances(&self) -> Vec<Balance> {
        let mut all: Vec<Balance> = self
            .books
            .iter()
            .flat_map(|book| book.value().balances.lock().clone())
            .collect();
        all.sort_by_key(|balance| balance.id);
        all
    }

    /// Transitions a balance row into payout (unpaid -> processing).
    ///
    /// # Errors
    ///
    /// [`LedgerError::BalanceNotFound`] for an unknown id, or
    /// [`LedgerError::InvalidStateTransition`] if the row is not unpaid.
    pub fn mark_processing(&self, id: BalanceId) -> Result<(), LedgerError> {
        self.with_balance_mut(id, Balance::mark_processing)
    }

    /// Transitions a balance row to paid (processing -> paid).
    ///
    /// # Errors
    ///
    /// [`LedgerError::BalanceNotFound`] for an unknown id, or
    /// [`LedgerError::InvalidStateTransition`] if the row is not processing.
    pub fn mark_paid(&self, id: BalanceId) -> Result<(), LedgerError> {
        self.with_balance_mut(id, Balance::mark_paid)
    }

    /// Looks up the entry recorded for a (user, source event), if any.
    pub fn entry_for(&self, user_id: UserId, event: &SourceEvent) -> Option<Arc<BalanceTransaction>> {
        self.log.get(&EntryKey::new(user_id, event))
    }

    /// Number of recorded ledger entries.
    pub fn entry_count(&self) -> usize {
        self.log.len()
    }

    fn with_balance_mut<F>(&self, id: BalanceId, f: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut Balance) -> Result<(), LedgerError>,
    {
        for book in self.books.iter() {
            let mut balances = book.value().balances.lock();
            if let Some(balance) = balances.iter_mut().find(|balance| balance.id == id) {
                return f(balance);
            }
        }
        Err(LedgerError::BalanceNotFound)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::BalanceState;
    use crate::base::Currency;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn row(id: u64, day: u32, state: BalanceState) -> Balance {
        let mut balance = Balance::new(
            BalanceId(id),
            UserId(1),
            None,
            date(day),
            Currency::Usd,
            Currency::Usd,
        );
        balance.state = state;
        balance
    }

    #[test]
    fn on_date_ignores_frozen_rows() {
        let balances = vec![
            row(1, 5, BalanceState::Processing),
            row(2, 5, BalanceState::Unpaid),
        ];
        assert_eq!(unpaid_on_date(&balances, date(5)), Some(1));
    }

    #[test]
    fn earliest_on_or_before_prefers_oldest_date() {
        let balances = vec![
            row(1, 3, BalanceState::Paid),
            row(2, 4, BalanceState::Unpaid),
            row(3, 5, BalanceState::Unpaid),
        ];
        assert_eq!(earliest_unpaid_on_or_before(&balances, date(5)), Some(1));
    }

    #[test]
    fn earliest_on_or_before_breaks_date_ties_by_lowest_id() {
        let balances = vec![
            row(7, 4, BalanceState::Unpaid),
            row(3, 4, BalanceState::Unpaid),
        ];
        assert_eq!(earliest_unpaid_on_or_before(&balances, date(5)), Some(1));
    }

    #[test]
    fn earliest_on_or_before_excludes_later_dates() {
        let balances = vec![row(1, 8, BalanceState::Unpaid)];
        assert_eq!(earliest_unpaid_on_or_before(&balances, date(5)), None);
    }
}
