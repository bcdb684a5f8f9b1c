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

//! Ledger entries.
//!
//! A [`BalanceTransaction`] is an immutable, append-only record of one money
//! movement for one user, carrying the amount in the currency it was issued
//! in and the amount in the currency the user's balance is held in. Creation
//! happens only through [`Ledger::record`](crate::Ledger::record), which
//! also settles the entry into a balance row.

use crate::amount::BalanceTransactionAmount;
use crate::base::{BalanceId, BalanceTransactionId, MerchantAccountId, UserId};
use crate::event::SourceEvent;
use chrono::NaiveDate;
use serde::Serialize;

/// An immutable ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceTransaction {
    pub id: BalanceTransactionId,
    /// The seller or affiliate credited or debited by this entry.
    pub user_id: UserId,
    pub merchant_account_id: Option<MerchantAccountId>,
    /// The upstream event that caused this entry.
    pub event: SourceEvent,
    /// Amount in the currency the buyer was charged (or refunded) in.
    pub issued_amount: BalanceTransactionAmount,
    /// Amount in the currency the user's balance is held in.
    pub holding_amount: BalanceTransactionAmount,
    /// The balance row this entry settled into.
    pub balance_id: BalanceId,
}

impl BalanceTransaction {
    /// The calendar date the source event occurred on.
    pub fn occurred_on(&self) -> NaiveDate {
        self.event.occurred_on()
    }
}
