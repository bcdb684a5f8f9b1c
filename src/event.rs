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

//! Source events.
//!
//! Every ledger entry is caused by exactly one upstream event: a purchase
//! succeeding, a refund being processed, a dispute being formalized, or a
//! credit being issued. The enum makes the exactly-one constraint structural
//! instead of a runtime validation over four nullable references.

use crate::base::{ChargeId, CreditId, DisputeId, PurchaseId, RefundId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A charge aggregating several purchases, as referenced by a dispute that
/// was raised against the whole charge rather than a single purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRef {
    pub id: ChargeId,
    pub created_at: DateTime<Utc>,
}

/// The upstream event a ledger entry is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEvent {
    /// A purchase completed successfully.
    Purchase {
        id: PurchaseId,
        succeeded_at: DateTime<Utc>,
    },
    /// A refund was processed against an earlier purchase.
    Refund {
        id: RefundId,
        created_at: DateTime<Utc>,
    },
    /// A dispute was formalized, against either a single purchase or a
    /// multi-purchase charge.
    Dispute {
        id: DisputeId,
        formalized_at: DateTime<Utc>,
        charge: Option<ChargeRef>,
    },
    /// An administrative credit was issued.
    Credit {
        id: CreditId,
        created_at: DateTime<Utc>,
    },
}

/// Discriminant of a [`SourceEvent`], used for duplicate detection keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Purchase,
    Refund,
    Dispute,
    Credit,
}

impl SourceEvent {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Purchase { .. } => SourceKind::Purchase,
            Self::Refund { .. } => SourceKind::Refund,
            Self::Dispute { .. } => SourceKind::Dispute,
            Self::Credit { .. } => SourceKind::Credit,
        }
    }

    /// The raw upstream identifier, unique within its [`SourceKind`].
    pub fn event_id(&self) -> u64 {
        match self {
            Self::Purchase { id, .. } => id.0,
            Self::Refund { id, .. } => id.0,
            Self::Dispute { id, .. } => id.0,
            Self::Credit { id, .. } => id.0,
        }
    }

    /// The event's own timestamp: purchase success, refund creation, dispute
    /// formalization, or credit creation.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Purchase { succeeded_at, .. } => *succeeded_at,
            Self::Refund { created_at, .. } => *created_at,
            Self::Dispute { formalized_at, .. } => *formalized_at,
            Self::Credit { created_at, .. } => *created_at,
        }
    }

    /// The event's timestamp truncated to a calendar date.
    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_at().date_naive()
    }

    /// The charge reference for a dispute raised against a whole charge.
    pub fn charge(&self) -> Option<ChargeRef> {
        match self {
            Self::Dispute { charge, .. } => *charge,
            _ => None,
        }
    }
}
