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

//! # Balance Ledger
//!
//! This library provides the balance-transaction ledger of a marketplace:
//! purchases, refunds, disputes, and credits produce immutable ledger
//! entries, and each entry settles into a per-seller, per-merchant-account,
//! per-day balance row with unpaid/processing/paid lifecycle states.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Central engine recording entries and reconciling balances
//! - [`Balance`]: Per-day running totals with the payout state machine
//! - [`BalanceTransaction`]: Immutable ledger entry with issued and holding amounts
//! - [`SourceEvent`]: The purchase/refund/dispute/credit a ledger entry is attached to
//! - [`FlowOfFunds`]: Multi-currency breakdown of one money movement
//! - [`LedgerError`]: Error types for ledger operations
//!
//! ## Example
//!
//! ```
//! use balance_ledger_rs::{
//!     BalanceTransactionAmount, Currency, Ledger, PurchaseId, SourceEvent, UserId,
//! };
//! use chrono::{TimeZone, Utc};
//!
//! let ledger = Ledger::new();
//!
//! // Record a successful purchase: $100.00 charged, $88.90 after fees,
//! // held in the seller's CAD balance.
//! let entry = ledger
//!     .record(
//!         UserId(1),
//!         None,
//!         SourceEvent::Purchase {
//!             id: PurchaseId(1),
//!             succeeded_at: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
//!         },
//!         BalanceTransactionAmount::new(Currency::Usd, 100_00, 88_90),
//!         BalanceTransactionAmount::new(Currency::Cad, 110_00, 97_79),
//!     )
//!     .unwrap();
//!
//! // A new unpaid balance row was created for the purchase's date.
//! let balance = ledger.balance(entry.balance_id).unwrap();
//! assert_eq!(balance.amount_cents, 88_90);
//! assert_eq!(balance.holding_amount_cents, 97_79);
//! assert_eq!(ledger.unpaid_balance_cents(UserId(1)), 88_90);
//! ```
//!
//! ## Thread Safety
//!
//! The ledger serializes reconciliation per (user, merchant account) pair,
//! so concurrent entries for the same seller and day can never create
//! duplicate balance rows.

pub mod amount;
mod balance;
mod base;
pub mod error;
mod event;
mod flow_of_funds;
mod ledger;
mod transaction;
mod transaction_log;

pub use amount::BalanceTransactionAmount;
pub use balance::{Balance, BalanceState};
pub use base::{
    BalanceId, BalanceTransactionId, ChargeId, CreditId, Currency, DisputeId, MerchantAccountId,
    ParseCurrencyError, PurchaseId, RefundId, UserId,
};
pub use error::LedgerError;
pub use event::{ChargeRef, SourceEvent, SourceKind};
pub use flow_of_funds::{CurrencyAmount, FlowOfFunds, MerchantAccountAmount};
pub use ledger::Ledger;
pub use transaction::BalanceTransaction;
pub use transaction_log::{EntryKey, TransactionLog};
