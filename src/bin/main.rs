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

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use token_ledger::{
    Address, Amount, Balance, Engine, LedgerConfig, ServerConfig, TransferRequest, bootstrap,
    server,
};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Token Ledger - Transfer tokens between 20-byte addresses
///
/// Runs the JSON API server, or replays a CSV of transfers and prints the
/// resulting balances.
#[derive(Parser, Debug)]
#[command(name = "token-ledger")]
#[command(about = "A token ledger with atomic transfers", long_about = None)]
struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT", global = true)]
    log_format: LogFormat,

    /// Address of the account funded at startup
    #[arg(long, env = "DEFAULT_ACCOUNT", global = true)]
    default_account: Option<Address>,

    /// Initial balance of the default account
    #[arg(long, env = "DEFAULT_BALANCE", global = true)]
    default_balance: Option<Balance>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Replay transfers from a CSV file and write balances to stdout
    ///
    /// Expected format: from,to,amount
    /// Example: token-ledger replay transfers.csv > balances.csv
    Replay {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

impl Args {
    fn ledger_config(&self) -> LedgerConfig {
        let defaults = LedgerConfig::default();
        LedgerConfig {
            default_account: self.default_account.unwrap_or(defaults.default_account),
            default_balance: self
                .default_balance
                .clone()
                .unwrap_or(defaults.default_balance),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = args.ledger_config();
    let engine = Engine::in_memory();
    bootstrap(engine.store().as_ref(), &config).context("failed to create default account")?;

    match args.command {
        Command::Serve { host, port } => {
            let server_config = ServerConfig { host, port };
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(run_server(server_config, Arc::new(engine)))
        }
        Command::Replay { input } => {
            let file = File::open(&input)
                .with_context(|| format!("error opening file '{}'", input.display()))?;
            process_transfers(&engine, BufReader::new(file))
                .context("error processing transfers")?;
            write_accounts(&engine, std::io::stdout()).context("error writing output")?;
            Ok(())
        }
    }
}

async fn run_server(config: ServerConfig, engine: Arc<Engine>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(
        "connect to http://localhost:{}/accounts to list balances",
        config.port
    );
    server::serve(listener, engine).await?;
    Ok(())
}

/// Raw CSV record matching the input format.
///
/// Fields: `from, to, amount`. The amount stays text so that values beyond
/// 64 bits are parsed exactly.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    from: Address,
    to: Address,
    amount: String,
}

impl CsvRecord {
    fn into_request(self) -> Option<TransferRequest> {
        let amount: Amount = self.amount.parse().ok()?;
        Some(TransferRequest::new(self.from, self.to, amount))
    }
}

/// Replays transfers from a CSV reader against `engine`.
///
/// Malformed rows and rejected transfers are logged and skipped. Returns the
/// number of transfers applied.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the header is invalid.
pub fn process_transfers<R: Read>(engine: &Engine, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);

    let mut applied = 0;
    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 2, error = %e, "skipping malformed row");
                continue;
            }
        };

        let Some(request) = record.into_request() else {
            warn!(line = line + 2, "skipping row with unparseable amount");
            continue;
        };

        match engine.execute(&request) {
            Ok(_) => applied += 1,
            Err(e) => debug!(
                line = line + 2,
                code = e.kind().code(),
                error = %e,
                "skipping transfer"
            ),
        }
    }

    info!(applied, "replay finished");
    Ok(applied)
}

/// Writes `address,balance` rows for every account, ordered by address.
///
/// # Errors
///
/// Returns an error if the store cannot be read or writing fails.
pub fn write_accounts<W: Write>(engine: &Engine, writer: W) -> anyhow::Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for account in engine.accounts()? {
        wtr.serialize(&account)?;
    }
    wtr.flush()?;
    Ok(())
}
