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

//! Balance and amount-factory public API integration tests.

use balance_ledger_rs::{
    Balance, BalanceId, BalanceState, BalanceTransactionAmount, Currency, CurrencyAmount,
    FlowOfFunds, LedgerError, UserId,
};
use chrono::NaiveDate;

// === Helper Functions ===

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn new_balance() -> Balance {
    Balance::new(
        BalanceId(1),
        UserId(1),
        None,
        day(5),
        Currency::Usd,
        Currency::Cad,
    )
}

fn cross_currency_flow() -> FlowOfFunds {
    // Buyer charged in GBP, settled in EUR, platform books in USD.
    FlowOfFunds::new(
        CurrencyAmount::new(Currency::Gbp, 80_00),
        CurrencyAmount::new(Currency::Eur, 93_50),
        CurrencyAmount::new(Currency::Usd, 101_25),
    )
}

fn merchant_flow() -> FlowOfFunds {
    FlowOfFunds::with_merchant_account(
        CurrencyAmount::new(Currency::Usd, 100_00),
        CurrencyAmount::new(Currency::Usd, 100_00),
        CurrencyAmount::new(Currency::Usd, 100_00),
        CurrencyAmount::new(Currency::Cad, 135_00),
        CurrencyAmount::new(Currency::Cad, 120_11),
    )
}

// === Balance State Machine ===

#[test]
fn new_balance_starts_unpaid_and_empty() {
    let balance = new_balance();
    assert_eq!(balance.state, BalanceState::Unpaid);
    assert_eq!(balance.amount_cents, 0);
    assert_eq!(balance.holding_amount_cents, 0);
    assert!(balance.is_unpaid());
}

#[test]
fn credit_accumulates_both_running_totals() {
    let mut balance = new_balance();
    balance.credit(88_90, 97_79).unwrap();
    balance.credit(-20_00, -22_00).unwrap();
    assert_eq!(balance.amount_cents, 68_90);
    assert_eq!(balance.holding_amount_cents, 75_79);
}

#[test]
fn balance_may_go_negative() {
    let mut balance = new_balance();
    balance.credit(-100_00, -110_00).unwrap();
    assert_eq!(balance.amount_cents, -100_00);
    assert_eq!(balance.holding_amount_cents, -110_00);
}

#[test]
fn frozen_balance_rejects_credits() {
    let mut balance = new_balance();
    balance.mark_processing().unwrap();
    assert_eq!(balance.credit(1, 1), Err(LedgerError::BalanceFrozen));
    assert!(!balance.is_unpaid());

    balance.mark_paid().unwrap();
    assert_eq!(balance.credit(1, 1), Err(LedgerError::BalanceFrozen));
}

#[test]
fn lifecycle_is_unpaid_processing_paid() {
    let mut balance = new_balance();
    assert_eq!(balance.mark_paid(), Err(LedgerError::InvalidStateTransition));

    balance.mark_processing().unwrap();
    assert_eq!(balance.state, BalanceState::Processing);
    assert_eq!(
        balance.mark_processing(),
        Err(LedgerError::InvalidStateTransition)
    );

    balance.mark_paid().unwrap();
    assert_eq!(balance.state, BalanceState::Paid);
    assert_eq!(balance.mark_paid(), Err(LedgerError::InvalidStateTransition));
}

// === Amount Factories ===

#[test]
fn seller_issued_amount_takes_issued_frame() {
    let amount = BalanceTransactionAmount::issued_amount_for_seller(&cross_currency_flow(), 71_20);
    assert_eq!(amount.currency, Currency::Gbp);
    assert_eq!(amount.gross_cents, 80_00);
    assert_eq!(amount.net_cents, 71_20);
}

#[test]
fn seller_holding_amount_without_merchant_account_matches_issued() {
    let flow = cross_currency_flow();
    assert_eq!(
        BalanceTransactionAmount::holding_amount_for_seller(&flow, 71_20),
        BalanceTransactionAmount::issued_amount_for_seller(&flow, 71_20)
    );
}

#[test]
fn seller_holding_amount_with_merchant_account_takes_merchant_frame() {
    let amount = BalanceTransactionAmount::holding_amount_for_seller(&merchant_flow(), 88_90);
    assert_eq!(amount.currency, Currency::Cad);
    assert_eq!(amount.gross_cents, 135_00);
    assert_eq!(amount.net_cents, 120_11);
}

#[test]
fn affiliate_amounts_use_gumroad_frame_and_are_flat() {
    let flow = cross_currency_flow();
    let issued = BalanceTransactionAmount::issued_amount_for_affiliate(&flow, 12_34);
    let holding = BalanceTransactionAmount::holding_amount_for_affiliate(&flow, 12_34);

    assert_eq!(issued, holding);
    assert_eq!(issued.currency, Currency::Usd);
    assert_eq!(issued.gross_cents, 12_34);
    assert_eq!(issued.net_cents, 12_34);
}

#[test]
fn affiliate_amounts_are_unaffected_by_merchant_account() {
    let with_merchant =
        BalanceTransactionAmount::issued_amount_for_affiliate(&merchant_flow(), 12_34);
    let without_merchant = BalanceTransactionAmount::issued_amount_for_affiliate(
        &FlowOfFunds::simple(Currency::Usd, 100_00),
        12_34,
    );
    assert_eq!(with_merchant, without_merchant);
}
