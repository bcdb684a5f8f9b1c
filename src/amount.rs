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

//! Ledger entry amounts.
//!
//! A [`BalanceTransactionAmount`] is a currency plus a gross/net cents pair.
//! The four factories derive seller-side or affiliate-side, issued or
//! holding amounts from a [`FlowOfFunds`]:
//!
//! - Affiliates are always paid in the gumroad-internal currency, out of the
//!   revenue share the caller already computed; their gross equals their net.
//! - Sellers are paid in the full issued-transaction currency, net of
//!   processor fees, unless a merchant account intermediated the charge, in
//!   which case the holding amount is the merchant account's own
//!   gross/net/currency.

use crate::base::Currency;
use crate::flow_of_funds::FlowOfFunds;
use serde::{Deserialize, Serialize};

/// A currency plus gross/net cents pair, as stored on a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceTransactionAmount {
    pub currency: Currency,
    pub gross_cents: i64,
    pub net_cents: i64,
}

impl BalanceTransactionAmount {
    pub fn new(currency: Currency, gross_cents: i64, net_cents: i64) -> Self {
        Self {
            currency,
            gross_cents,
            net_cents,
        }
    }

    /// Affiliate issued amount: the affiliate's revenue share, in the
    /// gumroad-internal currency. The share is already net of fees, so gross
    /// and net are the same number.
    pub fn issued_amount_for_affiliate(
        flow_of_funds: &FlowOfFunds,
        issued_affiliate_cents: i64,
    ) -> Self {
        Self {
            currency: flow_of_funds.gumroad_amount().currency,
            gross_cents: issued_affiliate_cents,
            net_cents: issued_affiliate_cents,
        }
    }

    /// Affiliate holding amount. Affiliates are not subject to
    /// settlement-currency conversion, so this is identical to
    /// [`issued_amount_for_affiliate`](Self::issued_amount_for_affiliate).
    pub fn holding_amount_for_affiliate(
        flow_of_funds: &FlowOfFunds,
        issued_affiliate_cents: i64,
    ) -> Self {
        Self::issued_amount_for_affiliate(flow_of_funds, issued_affiliate_cents)
    }

    /// Seller issued amount: the full buyer charge as gross, the
    /// caller-supplied fee-adjusted cents as net, in the issued currency.
    pub fn issued_amount_for_seller(flow_of_funds: &FlowOfFunds, issued_net_cents: i64) -> Self {
        Self {
            currency: flow_of_funds.issued_amount().currency,
            gross_cents: flow_of_funds.issued_amount().cents,
            net_cents: issued_net_cents,
        }
    }

    /// Seller holding amount: same as the issued amount, unless a merchant
    /// account intermediated the charge, in which case the merchant
    /// account's currency, gross, and net take over entirely (including
    /// over the `issued_net_cents` argument).
    pub fn holding_amount_for_seller(flow_of_funds: &FlowOfFunds, issued_net_cents: i64) -> Self {
        match (
            flow_of_funds.merchant_account_gross_amount(),
            flow_of_funds.merchant_account_net_amount(),
        ) {
            (Some(gross), Some(net)) => Self {
                currency: gross.currency,
                gross_cents: gross.cents,
                net_cents: net.cents,
            },
            _ => Self::issued_amount_for_seller(flow_of_funds, issued_net_cents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow_of_funds::CurrencyAmount;

    fn cross_currency_flow() -> FlowOfFunds {
        FlowOfFunds::new(
            CurrencyAmount::new(Currency::Gbp, 80_00),
            CurrencyAmount::new(Currency::Eur, 93_50),
            CurrencyAmount::new(Currency::Usd, 101_25),
        )
    }

    fn merchant_account_flow() -> FlowOfFunds {
        FlowOfFunds::with_merchant_account(
            CurrencyAmount::new(Currency::Usd, 100_00),
            CurrencyAmount::new(Currency::Usd, 100_00),
            CurrencyAmount::new(Currency::Usd, 100_00),
            CurrencyAmount::new(Currency::Cad, 135_00),
            CurrencyAmount::new(Currency::Cad, 120_11),
        )
    }

    #[test]
    fn affiliate_issued_amount_uses_gumroad_currency() {
        let amount =
            BalanceTransactionAmount::issued_amount_for_affiliate(&cross_currency_flow(), 12_34);
        assert_eq!(amount.currency, Currency::Usd);
        assert_eq!(amount.gross_cents, 12_34);
        assert_eq!(amount.net_cents, 12_34);
    }

    #[test]
    fn affiliate_issued_and_holding_amounts_are_identical() {
        for cents in [-50_00, 0, 12_34] {
            let flow = cross_currency_flow();
            assert_eq!(
                BalanceTransactionAmount::issued_amount_for_affiliate(&flow, cents),
                BalanceTransactionAmount::holding_amount_for_affiliate(&flow, cents)
            );
        }
    }

    #[test]
    fn affiliate_amounts_ignore_merchant_account_fields() {
        let amount =
            BalanceTransactionAmount::holding_amount_for_affiliate(&merchant_account_flow(), 5_00);
        assert_eq!(amount.currency, Currency::Usd);
        assert_eq!(amount.gross_cents, 5_00);
        assert_eq!(amount.net_cents, 5_00);
    }

    #[test]
    fn seller_issued_amount_keeps_full_buyer_charge_as_gross() {
        let amount =
            BalanceTransactionAmount::issued_amount_for_seller(&cross_currency_flow(), 71_20);
        assert_eq!(amount.currency, Currency::Gbp);
        assert_eq!(amount.gross_cents, 80_00);
        assert_eq!(amount.net_cents, 71_20);
    }

    #[test]
    fn seller_holding_amount_matches_issued_without_merchant_account() {
        let flow = cross_currency_flow();
        assert_eq!(
            BalanceTransactionAmount::holding_amount_for_seller(&flow, 71_20),
            BalanceTransactionAmount::issued_amount_for_seller(&flow, 71_20)
        );
    }

    #[test]
    fn seller_holding_amount_is_overridden_by_merchant_account() {
        let amount =
            BalanceTransactionAmount::holding_amount_for_seller(&merchant_account_flow(), 88_90);
        assert_eq!(amount.currency, Currency::Cad);
        assert_eq!(amount.gross_cents, 135_00);
        // The caller-supplied net is ignored when a merchant account is present.
        assert_eq!(amount.net_cents, 120_11);
    }

    #[test]
    fn negative_refund_amounts_pass_through() {
        let flow = FlowOfFunds::simple(Currency::Usd, -100_00);
        let amount = BalanceTransactionAmount::issued_amount_for_seller(&flow, -88_90);
        assert_eq!(amount.gross_cents, -100_00);
        assert_eq!(amount.net_cents, -88_90);
    }
}
