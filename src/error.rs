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

//! Error types for ledger operations.

use thiserror::Error;

/// Ledger operation errors.
///
/// Two failure modes named by the accounting contract have no variants here
/// because they are unrepresentable: a ledger entry with zero or multiple
/// source events (the source event is an enum), and a merchant-account net
/// amount without a gross (the pair is a single field).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A ledger entry for this (user, source event) already exists
    #[error("ledger entry already recorded for this source event")]
    DuplicateEntry,

    /// Referenced balance row does not exist
    #[error("balance not found")]
    BalanceNotFound,

    /// Credit attempted against a processing or paid balance row
    #[error("balance is frozen (processing or paid)")]
    BalanceFrozen,

    /// Balance state transition out of order (unpaid -> processing -> paid)
    #[error("invalid balance state transition")]
    InvalidStateTransition,
}
