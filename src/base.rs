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

//! Core identifier types and currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a seller or affiliate whose balance is tracked.
    UserId
);
id_type!(
    /// Unique identifier for a connected merchant account.
    MerchantAccountId
);
id_type!(
    /// Unique identifier for a balance row.
    ///
    /// Allocated in creation order; the reconciliation tie-break relies on
    /// lower ids meaning earlier creation.
    BalanceId
);
id_type!(
    /// Unique identifier for a ledger entry.
    BalanceTransactionId
);
id_type!(
    /// Identifier of a purchase in the upstream order system.
    PurchaseId
);
id_type!(
    /// Identifier of a refund in the upstream order system.
    RefundId
);
id_type!(
    /// Identifier of a dispute raised with the card network.
    DisputeId
);
id_type!(
    /// Identifier of a charge aggregating several purchases.
    ChargeId
);
id_type!(
    /// Identifier of a manually issued credit.
    CreditId
);

/// ISO 4217 currencies the ledger moves money in.
///
/// Amounts are always integer cents of the given currency. The ledger never
/// converts between currencies; upstream settlement code supplies amounts
/// already denominated in the right frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Cad,
    Eur,
    Gbp,
    Aud,
    Jpy,
}

impl Currency {
    /// Lowercase ISO code, matching the wire/CSV representation.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Cad => "cad",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
            Currency::Aud => "aud",
            Currency::Jpy => "jpy",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown currency code: {0}")]
pub struct ParseCurrencyError(pub String);

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "cad" => Ok(Currency::Cad),
            "eur" => Ok(Currency::Eur),
            "gbp" => Ok(Currency::Gbp),
            "aud" => Ok(Currency::Aud),
            "jpy" => Ok(Currency::Jpy),
            other => Err(ParseCurrencyError(other.to_string())),
        }
    }
}
