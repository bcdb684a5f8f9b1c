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

//! Balance rows.
//!
//! A [`Balance`] is the per-seller, per-merchant-account, per-calendar-day
//! running total of ledger entries, in two parallel sums: the issued-side
//! net cents (`amount_cents`) and the holding-side net cents
//! (`holding_amount_cents`). Both are updated atomically together by the
//! reconciliation in [`Ledger`](crate::Ledger).
//!
//! State machine:
//!
//  Unpaid (accumulating) ──payout──► Processing (frozen) ──settled──► Paid (frozen)

use crate::base::{BalanceId, Currency, MerchantAccountId, UserId};
use crate::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Lifecycle state of a balance row.
///
/// Only `Unpaid` rows accumulate; `Processing` and `Paid` rows are immutable
/// from the ledger's perspective and are never matched for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceState {
    Unpaid,
    Processing,
    Paid,
}

impl fmt::Display for BalanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceState::Unpaid => f.write_str("unpaid"),
            BalanceState::Processing => f.write_str("processing"),
            BalanceState::Paid => f.write_str("paid"),
        }
    }
}

/// A per-day running balance for one (user, merchant account) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub id: BalanceId,
    pub user_id: UserId,
    pub merchant_account_id: Option<MerchantAccountId>,
    pub date: NaiveDate,
    pub state: BalanceState,
    /// Currency of the issued-side running total.
    pub currency: Currency,
    /// Issued-side net cents, summed across entries. May go negative.
    pub amount_cents: i64,
    /// Currency the seller's balance is held in, as of row creation.
    ///
    /// Matching for reuse ignores this field: a row created in one holding
    /// currency is still incremented by entries in another. Conversion is
    /// handled upstream; this layer sums cents.
    pub holding_currency: Currency,
    /// Holding-side net cents, summed across entries. May go negative.
    pub holding_amount_cents: i64,
}

impl Balance {
    /// Cents per whole currency unit when formatting output.
    const DECIMAL_SCALE: u32 = 2;

    /// A fresh unpaid row with zero totals.
    pub fn new(
        id: BalanceId,
        user_id: UserId,
        merchant_account_id: Option<MerchantAccountId>,
        date: NaiveDate,
        currency: Currency,
        holding_currency: Currency,
    ) -> Self {
        Self {
            id,
            user_id,
            merchant_account_id,
            date,
            state: BalanceState::Unpaid,
            currency,
            amount_cents: 0,
            holding_currency,
            holding_amount_cents: 0,
        }
    }

    pub fn is_unpaid(&self) -> bool {
        self.state == BalanceState::Unpaid
    }

    /// Applies a signed delta to both running totals.
    ///
    /// # Errors
    ///
    /// [`LedgerError::BalanceFrozen`] if the row is processing or paid.
    pub fn credit(
        &mut self,
        amount_delta_cents: i64,
        holding_delta_cents: i64,
    ) -> Result<(), LedgerError> {
        if !self.is_unpaid() {
            return Err(LedgerError::BalanceFrozen);
        }
        self.amount_cents += amount_delta_cents;
        self.holding_amount_cents += holding_delta_cents;
        Ok(())
    }

    /// Marks the row as entering payout.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidStateTransition`] unless the row is unpaid.
    pub fn mark_processing(&mut self) -> Result<(), LedgerError> {
        if self.state != BalanceState::Unpaid {
            return Err(LedgerError::InvalidStateTransition);
        }
        self.state = BalanceState::Processing;
        Ok(())
    }

    /// Marks the row as paid out.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidStateTransition`] unless the row is processing.
    pub fn mark_paid(&mut self) -> Result<(), LedgerError> {
        if self.state != BalanceState::Processing {
            return Err(LedgerError::InvalidStateTransition);
        }
        self.state = BalanceState::Paid;
        Ok(())
    }
}

impl Serialize for Balance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Balance", 8)?;
        state.serialize_field("user", &self.user_id)?;
        state.serialize_field("merchant_account", &self.merchant_account_id)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("state", &self.state)?;
        state.serialize_field("currency", &self.currency)?;
        state.serialize_field(
            "amount",
            &Decimal::new(self.amount_cents, Balance::DECIMAL_SCALE),
        )?;
        state.serialize_field("holding_currency", &self.holding_currency)?;
        state.serialize_field(
            "holding_amount",
            &Decimal::new(self.holding_amount_cents, Balance::DECIMAL_SCALE),
        )?;
        state.end()
    }
}
