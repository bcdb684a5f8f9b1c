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

//! Flow-of-funds value objects.
//!
//! A [`FlowOfFunds`] describes one money movement in up to three currency
//! frames: what the buyer was charged (issued), what cleared after
//! processor-side conversion (settled), and the platform's own-currency
//! equivalent (gumroad). When a connected merchant account intermediates the
//! charge, the gross and net amounts credited to it are carried as a pair.

use crate::base::Currency;
use serde::{Deserialize, Serialize};

/// An amount of money in a single currency, in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub cents: i64,
}

impl CurrencyAmount {
    pub fn new(currency: Currency, cents: i64) -> Self {
        Self { currency, cents }
    }
}

/// Merchant-account side of a charge: gross amount credited and net amount
/// after processor fees. Always a pair; a net without a gross is a caller
/// bug and cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantAccountAmount {
    pub gross: CurrencyAmount,
    pub net: CurrencyAmount,
}

/// The complete multi-currency breakdown of a single money movement.
///
/// Immutable once constructed. The three frames may legitimately disagree in
/// both currency and magnitude (cross-currency card charges); that is not an
/// error condition anywhere in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowOfFunds {
    issued_amount: CurrencyAmount,
    settled_amount: CurrencyAmount,
    gumroad_amount: CurrencyAmount,
    merchant_account_amount: Option<MerchantAccountAmount>,
}

impl FlowOfFunds {
    /// A flow with no merchant account intermediating the charge.
    pub fn new(
        issued_amount: CurrencyAmount,
        settled_amount: CurrencyAmount,
        gumroad_amount: CurrencyAmount,
    ) -> Self {
        Self {
            issued_amount,
            settled_amount,
            gumroad_amount,
            merchant_account_amount: None,
        }
    }

    /// A flow where a connected merchant account received the charge.
    pub fn with_merchant_account(
        issued_amount: CurrencyAmount,
        settled_amount: CurrencyAmount,
        gumroad_amount: CurrencyAmount,
        merchant_account_gross: CurrencyAmount,
        merchant_account_net: CurrencyAmount,
    ) -> Self {
        Self {
            issued_amount,
            settled_amount,
            gumroad_amount,
            merchant_account_amount: Some(MerchantAccountAmount {
                gross: merchant_account_gross,
                net: merchant_account_net,
            }),
        }
    }

    /// A flow where nothing was converted: all three frames carry the same
    /// currency and amount. Used for platform-internal movements (credits).
    pub fn simple(currency: Currency, cents: i64) -> Self {
        let amount = CurrencyAmount::new(currency, cents);
        Self::new(amount, amount, amount)
    }

    pub fn issued_amount(&self) -> CurrencyAmount {
        self.issued_amount
    }

    pub fn settled_amount(&self) -> CurrencyAmount {
        self.settled_amount
    }

    pub fn gumroad_amount(&self) -> CurrencyAmount {
        self.gumroad_amount
    }

    pub fn merchant_account_gross_amount(&self) -> Option<CurrencyAmount> {
        self.merchant_account_amount.map(|m| m.gross)
    }

    pub fn merchant_account_net_amount(&self) -> Option<CurrencyAmount> {
        self.merchant_account_amount.map(|m| m.net)
    }
}
