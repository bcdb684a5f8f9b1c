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

use balance_ledger_rs::{
    BalanceTransactionAmount, ChargeId, ChargeRef, CreditId, Currency, DisputeId, Ledger,
    MerchantAccountId, PurchaseId, RefundId, SourceEvent, UserId,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

/// Balance Ledger - Process ledger event CSV files
///
/// Reads purchase/refund/dispute/credit events from a CSV file, settles them
/// into balances, and outputs the balance table to stdout.
#[derive(Parser, Debug)]
#[command(name = "balance-ledger-rs")]
#[command(about = "A balance ledger that processes marketplace event CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with ledger events
    ///
    /// Expected columns: type,user,merchant_account,event_id,occurred_at,
    /// charge_id,charge_created_at,issued_currency,issued_gross,issued_net,
    /// holding_currency,holding_gross,holding_net
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Process events from CSV
    let ledger = match process_events(BufReader::new(file)) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error processing events: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_balances(&ledger, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, user, merchant_account, event_id, occurred_at, charge_id,
/// charge_created_at, issued_currency, issued_gross, issued_net,
/// holding_currency, holding_gross, holding_net`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    event_type: String,
    user: u64,
    merchant_account: Option<u64>,
    event_id: u64,
    occurred_at: DateTime<Utc>,
    charge_id: Option<u64>,
    charge_created_at: Option<DateTime<Utc>>,
    issued_currency: Currency,
    issued_gross: i64,
    issued_net: i64,
    holding_currency: Currency,
    holding_gross: i64,
    holding_net: i64,
}

/// A fully parsed ledger event ready to be recorded.
struct LedgerEvent {
    user_id: UserId,
    merchant_account_id: Option<MerchantAccountId>,
    event: SourceEvent,
    issued_amount: BalanceTransactionAmount,
    holding_amount: BalanceTransactionAmount,
}

impl CsvRecord {
    /// Converts a CSV record to a ledger event.
    ///
    /// Returns `None` for unknown event types. A charge reference is only
    /// meaningful for disputes and is ignored elsewhere.
    fn into_event(self) -> Option<LedgerEvent> {
        let event = match self.event_type.to_lowercase().as_str() {
            "purchase" => SourceEvent::Purchase {
                id: PurchaseId(self.event_id),
                succeeded_at: self.occurred_at,
            },
            "refund" => SourceEvent::Refund {
                id: RefundId(self.event_id),
                created_at: self.occurred_at,
            },
            "dispute" => SourceEvent::Dispute {
                id: DisputeId(self.event_id),
                formalized_at: self.occurred_at,
                charge: match (self.charge_id, self.charge_created_at) {
                    (Some(id), Some(created_at)) => Some(ChargeRef {
                        id: ChargeId(id),
                        created_at,
                    }),
                    _ => None,
                },
            },
            "credit" => SourceEvent::Credit {
                id: CreditId(self.event_id),
                created_at: self.occurred_at,
            },
            _ => return None,
        };

        Some(LedgerEvent {
            user_id: UserId(self.user),
            merchant_account_id: self.merchant_account.map(MerchantAccountId),
            event,
            issued_amount: BalanceTransactionAmount::new(
                self.issued_currency,
                self.issued_gross,
                self.issued_net,
            ),
            holding_amount: BalanceTransactionAmount::new(
                self.holding_currency,
                self.holding_gross,
                self.holding_net,
            ),
        })
    }
}

/// Process ledger events from a CSV reader.
///
/// Uses streaming parsing to handle arbitrarily large CSV files without
/// loading the entire file into memory. Malformed rows and rejected events
/// (e.g., duplicates) are silently skipped.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn process_events<R: Read>(reader: R) -> Result<Ledger, csv::Error> {
    let ledger = Ledger::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " purchase "
        .flexible(true) // Allow missing optional trailing fields
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(event) = record.into_event() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid event record");
                    continue;
                };

                // Record the entry, ignoring errors (silent failure)
                if let Err(e) = ledger.record(
                    event.user_id,
                    event.merchant_account_id,
                    event.event,
                    event.issued_amount,
                    event.holding_amount,
                ) {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping event for user {}: {}", event.user_id, e);
                }
            }
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(ledger)
}

/// Write the balance table to a CSV writer.
///
/// Outputs every balance row, ordered by id, with amounts in whole currency
/// units at 2 decimal places.
///
/// # CSV Format
///
/// Columns: `user, merchant_account, date, state, currency, amount,
/// holding_currency, holding_amount`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_balances<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for balance in ledger.balances() {
        wtr.serialize(&balance)?;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "type,user,merchant_account,event_id,occurred_at,charge_id,charge_created_at,issued_currency,issued_gross,issued_net,holding_currency,holding_gross,holding_net\n";

    #[test]
    fn parse_simple_purchase() {
        let csv = format!(
            "{HEADER}purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,cad,11000,9779\n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();

        assert_eq!(ledger.entry_count(), 1);
        assert_eq!(ledger.unpaid_balance_cents(UserId(1)), 88_90);

        let balances = ledger.balances();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].holding_amount_cents, 97_79);
    }

    #[test]
    fn parse_purchase_and_refund() {
        let csv = format!(
            "{HEADER}\
             purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,usd,10000,8890\n\
             refund,1,,1,2024-03-08T12:00:00Z,,,usd,-10000,-8890,usd,-10000,-8890\n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();

        assert_eq!(ledger.entry_count(), 2);
        assert_eq!(ledger.unpaid_balance_cents(UserId(1)), 0);
    }

    #[test]
    fn parse_charge_dispute() {
        let csv = format!(
            "{HEADER}\
             purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,usd,10000,8890\n\
             dispute,1,,7,2024-03-20T12:00:00Z,42,2024-03-05T09:00:00Z,usd,-10000,-8890,usd,-10000,-8890\n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();

        // The dispute matches the unpaid balance on the charge's date.
        let balances = ledger.balances();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount_cents, 0);
    }

    #[test]
    fn parse_with_whitespace() {
        let csv = format!(
            "{HEADER} purchase , 1 ,, 1 , 2024-03-05T12:00:00Z ,,, usd , 10000 , 8890 , usd , 10000 , 8890 \n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();
        assert_eq!(ledger.entry_count(), 1);
    }

    #[test]
    fn skip_malformed_rows() {
        let csv = format!(
            "{HEADER}\
             purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,usd,10000,8890\n\
             bogus,row,with,bad,data,,,usd,x,y,usd,x,y\n\
             purchase,2,,2,2024-03-05T12:00:00Z,,,usd,5000,4445,usd,5000,4445\n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();

        assert_eq!(ledger.entry_count(), 2); // Two valid purchases
    }

    #[test]
    fn skip_duplicate_events() {
        let csv = format!(
            "{HEADER}\
             purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,usd,10000,8890\n\
             purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,usd,10000,8890\n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();

        assert_eq!(ledger.entry_count(), 1);
        assert_eq!(ledger.unpaid_balance_cents(UserId(1)), 88_90);
    }

    #[test]
    fn write_balances_to_csv() {
        let csv = format!(
            "{HEADER}purchase,1,,1,2024-03-05T12:00:00Z,,,usd,10000,8890,cad,11000,9779\n"
        );
        let ledger = process_events(Cursor::new(csv)).unwrap();

        let mut output = Vec::new();
        write_balances(&ledger, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains(
            "user,merchant_account,date,state,currency,amount,holding_currency,holding_amount"
        ));
        assert!(output_str.contains("1,,2024-03-05,unpaid,usd,88.90,cad,97.79"));
    }
}
