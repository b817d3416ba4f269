//! Verified read commands.

use super::utils::{print_json, CliResult};
use serde_json::json;
use tally_core::{ConsensusReport, VerifiedReader};

/// What to read and how much of the result to print.
pub enum ReadCommand {
    Balance { account: String },
    Account { account: String },
    Transaction { signature: String },
}

/// Runs a verified read and prints the accepted value as JSON.
///
/// With `report` set, prints the full consensus report instead and returns
/// whether the read was accepted rather than failing on rejection.
pub async fn handle_read_command(
    reader: &VerifiedReader,
    command: ReadCommand,
    report: bool,
) -> CliResult<bool> {
    if report {
        let report = run_report(reader, &command).await;
        print_json(&report)?;
        return Ok(report.is_accepted());
    }

    match command {
        ReadCommand::Balance { account } => {
            let lamports = reader.verified_balance(&account).await?;
            print_json(&json!({"account": account, "lamports": lamports}))?;
        }
        ReadCommand::Account { account } => {
            let snapshot = reader.verified_account_snapshot(&account).await?;
            print_json(&json!({"account": account, "snapshot": snapshot}))?;
        }
        ReadCommand::Transaction { signature } => {
            let record = reader.verified_transaction_record(&signature).await?;
            print_json(&record)?;
        }
    }

    Ok(true)
}

async fn run_report(reader: &VerifiedReader, command: &ReadCommand) -> ConsensusReport {
    match command {
        ReadCommand::Balance { account } => reader.balance_report(account).await,
        ReadCommand::Account { account } => reader.account_snapshot_report(account).await,
        ReadCommand::Transaction { signature } => reader.transaction_record_report(signature).await,
    }
}
