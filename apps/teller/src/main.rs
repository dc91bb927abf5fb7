mod config;
mod notifier;
mod render;

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AccountOrchestrator, FetchOutcome, HttpLedgerGateway, OperationForm, OrchestratorOptions,
};
use shared::{domain::OperationKind, protocol::LedgerPage};
use tracing_subscriber::EnvFilter;

use crate::{config::Settings, notifier::TerminalNotifier};

#[derive(Parser, Debug)]
#[command(name = "teller", about = "Inspect and operate bank ledger accounts")]
struct Cli {
    /// Config file to read instead of ./teller.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    backend_host: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    /// Skip the confirmation prompt even when confirm_mutations is enabled.
    #[arg(short = 'y', long, global = true)]
    yes: bool,
    /// Print the resulting page as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of an account's operation history.
    Show {
        account: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    Debit {
        account: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Credit {
        account: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Move funds from `account` to `--to`.
    Transfer {
        account: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    tracing::debug!(?settings, "resolved settings");

    let gateway = HttpLedgerGateway::new(
        &settings.backend_host,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    tracing::debug!(backend = %gateway.base_url(), "ledger gateway ready");
    let orchestrator = AccountOrchestrator::new_with_dependencies(
        Arc::new(gateway),
        Arc::new(TerminalNotifier::stderr()),
        OrchestratorOptions {
            page_size: settings.page_size,
            confirm_mutations: settings.confirm_mutations && !cli.yes,
        },
    );

    let page = run(&orchestrator, cli.command).await?;
    write_page(&mut io::stdout().lock(), &page, cli.json)
}

fn write_page(out: &mut impl Write, page: &LedgerPage, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, page)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render::render_page(page))?;
    }
    out.flush()?;
    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(host) = &cli.backend_host {
        settings.backend_host = host.clone();
    }
    if let Some(size) = cli.page_size {
        settings.page_size = size;
    }
    Ok(settings.normalized())
}

async fn run(orchestrator: &AccountOrchestrator, command: Command) -> Result<LedgerPage> {
    let (account, form) = match command {
        Command::Show { account, page } => {
            let mut outcome = orchestrator.select_account(&account).await?;
            if page > 0 {
                outcome = orchestrator.change_page(page).await?;
            }
            return applied(outcome);
        }
        Command::Debit {
            account,
            amount,
            description,
        } => (
            account,
            OperationForm::new(OperationKind::Debit, amount, description),
        ),
        Command::Credit {
            account,
            amount,
            description,
        } => (
            account,
            OperationForm::new(OperationKind::Credit, amount, description),
        ),
        Command::Transfer {
            account,
            to,
            amount,
            description,
        } => (
            account,
            OperationForm::new(OperationKind::Transfer, amount, description).with_destination(to),
        ),
    };

    orchestrator.select_account(&account).await?;
    let report = orchestrator.submit_operation(form).await?;
    applied(report.reconciliation?)
}

fn applied(outcome: FetchOutcome) -> Result<LedgerPage> {
    match outcome {
        FetchOutcome::Applied(page) => Ok(page),
        FetchOutcome::Superseded => bail!("page read was superseded by a newer request"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use client_core::{GatewayError, LedgerGateway};
    use rust_decimal::Decimal;
    use shared::{
        domain::{AccountId, OperationType},
        protocol::OperationRecord,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<StdMutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("buf").clone()).expect("utf8")
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buf").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct SingleAccountLedger;

    #[async_trait]
    impl LedgerGateway for SingleAccountLedger {
        async fn fetch_page(
            &self,
            account: &AccountId,
            page: u32,
            size: u32,
        ) -> Result<LedgerPage, GatewayError> {
            Ok(LedgerPage {
                account_id: account.clone(),
                balance: Decimal::new(70, 0),
                current_page: page,
                total_pages: 1,
                page_size: size,
                operations: vec![OperationRecord {
                    id: Some(1),
                    operation_type: OperationType::Debit,
                    amount: Decimal::new(30, 0),
                    date: Utc::now(),
                    description: "atm".into(),
                }],
            })
        }

        async fn debit(&self, _: &AccountId, _: Decimal, _: &str) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn credit(&self, _: &AccountId, _: Decimal, _: &str) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn transfer(
            &self,
            _: &AccountId,
            _: &AccountId,
            _: Decimal,
            _: &str,
        ) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn json_output_is_the_only_thing_on_stdout_after_a_mutation() {
        let notices = SharedBuf::default();
        let orchestrator = AccountOrchestrator::new_with_dependencies(
            Arc::new(SingleAccountLedger),
            Arc::new(TerminalNotifier::new(notices.clone())),
            OrchestratorOptions::default(),
        );

        let page = run(
            &orchestrator,
            Command::Debit {
                account: "A1".into(),
                amount: "30".into(),
                description: "atm".into(),
            },
        )
        .await
        .expect("debit");
        let mut stdout = Vec::new();
        write_page(&mut stdout, &page, true).expect("write");

        let parsed: serde_json::Value =
            serde_json::from_slice(&stdout).expect("stdout holds one JSON document");
        assert_eq!(parsed["accountId"], "A1");
        assert_eq!(parsed["operations"][0]["description"], "atm");
        assert_eq!(notices.contents(), "Debit operation successful!\n");
    }

    #[test]
    fn cli_overrides_apply_after_file_and_env() {
        let cli = Cli::parse_from([
            "teller",
            "--backend-host",
            "ledger.test:9000",
            "--page-size",
            "0",
            "show",
            "A1",
        ]);

        let settings = resolve_settings(&cli).expect("settings");
        assert_eq!(settings.backend_host, "http://ledger.test:9000");
        assert_eq!(settings.page_size, 1);
    }

    #[test]
    fn transfer_requires_destination() {
        let err = Cli::try_parse_from(["teller", "transfer", "A1", "--amount", "5"])
            .expect_err("missing --to");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["teller", "debit", "A1", "--amount", "5", "-y", "--json"]);
        assert!(cli.yes);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Debit { ref amount, .. } if amount == "5"));
    }
}
