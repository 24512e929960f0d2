use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{AccountLedger, AgreementService, TransferOrchestrator};
use crate::domain::{AccountId, AccountType, format_amount, parse_amount};
use crate::storage::Repository;

/// Kassa - banking ledger core
#[derive(Parser)]
#[command(name = "kassa")]
#[command(about = "Accounts, transfers and commissions over a local ledger database")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "KASSA_DATABASE", default_value = "kassa.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Agreement (party) management commands
    #[command(subcommand)]
    Agreement(AgreementCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Charge an amount to a single account
    Charge {
        /// Account ID
        account: AccountId,

        /// Amount to charge (e.g., "12.50")
        amount: String,
    },

    /// Transfer money between two agreements
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        amount: String,

        /// Source agreement name
        #[arg(long)]
        from: String,

        /// Destination agreement name
        #[arg(long)]
        to: String,

        /// Account type to debit on the source side
        #[arg(long, default_value = "0")]
        from_type: AccountType,

        /// Account type to credit on the destination side
        #[arg(long, default_value = "0")]
        to_type: AccountType,

        /// Commission rate charged to the source first (e.g., "0.05")
        #[arg(long)]
        commission: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AgreementCommands {
    /// Register a new agreement
    Add {
        /// Agreement name (must be unique)
        name: String,
    },

    /// Show an agreement and its accounts
    Show {
        /// Agreement name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open an account for an agreement
    Add {
        /// Owning agreement name
        agreement: String,

        /// Display number of the account
        #[arg(short, long)]
        number: String,

        /// Account type discriminator
        #[arg(short = 't', long = "type", default_value = "0")]
        account_type: AccountType,

        /// Initial amount, may be negative
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        amount: String,
    },

    /// List accounts
    List {
        /// Only accounts of this agreement
        #[arg(long)]
        agreement: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Services wired against one SQLite database.
struct Services {
    agreements: AgreementService<Repository>,
    orchestrator: TransferOrchestrator<Repository>,
}

impl Services {
    async fn connect(database_path: &str) -> Result<Self> {
        let repo = Repository::connect(&format!("sqlite:{}", database_path)).await?;
        Ok(Self::new(repo))
    }

    fn new(repo: Repository) -> Self {
        Self {
            agreements: AgreementService::new(repo.clone()),
            orchestrator: TransferOrchestrator::new(AccountLedger::new(repo)),
        }
    }

    fn ledger(&self) -> &AccountLedger<Repository> {
        self.orchestrator.ledger()
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "kassa=debug" } else { "kassa=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Commands::Init => {
                Repository::init(&format!("sqlite:{}?mode=rwc", self.database)).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Agreement(cmd) => {
                let services = Services::connect(&self.database).await?;
                run_agreement_command(&services, cmd).await?;
            }

            Commands::Account(cmd) => {
                let services = Services::connect(&self.database).await?;
                run_account_command(&services, cmd).await?;
            }

            Commands::Charge { account, amount } => {
                let services = Services::connect(&self.database).await?;
                let amount = parse_amount(&amount).context("Invalid amount format")?;

                if !services.ledger().debit(account, amount).await? {
                    bail!("Charge refused: insufficient funds in account {}", account);
                }
                println!("Charged {} to account {}", format_amount(amount), account);
            }

            Commands::Transfer {
                amount,
                from,
                to,
                from_type,
                to_type,
                commission,
            } => {
                let services = Services::connect(&self.database).await?;
                let amount = parse_amount(&amount).context("Invalid amount format")?;
                let commission = commission
                    .map(|rate| parse_amount(&rate))
                    .transpose()
                    .context("Invalid commission rate")?;

                let source = services.agreements.get_by_name(&from).await?;
                let destination = services.agreements.get_by_name(&to).await?;

                let with_commission = commission.is_some();
                let done = match commission {
                    Some(rate) => {
                        services
                            .orchestrator
                            .transfer_with_commission(
                                &source,
                                &destination,
                                from_type,
                                to_type,
                                amount,
                                rate,
                            )
                            .await
                            .context("Transfer failed; the commission may already have been charged")?
                    }
                    None => {
                        services
                            .orchestrator
                            .transfer_between_parties(
                                &source,
                                &destination,
                                from_type,
                                to_type,
                                amount,
                            )
                            .await?
                    }
                };

                if !done {
                    bail!(transfer_refusal(&source.name, with_commission));
                }
                println!(
                    "Transferred {} {} -> {}",
                    format_amount(amount),
                    source.name,
                    destination.name
                );
            }
        }

        Ok(())
    }
}

fn transfer_refusal(source: &str, with_commission: bool) -> String {
    if with_commission {
        format!(
            "Transfer refused: insufficient funds for {}; the commission may already have been charged",
            source
        )
    } else {
        format!("Transfer refused: insufficient funds for {}", source)
    }
}

async fn run_agreement_command(services: &Services, cmd: AgreementCommands) -> Result<()> {
    match cmd {
        AgreementCommands::Add { name } => {
            let agreement = services.agreements.add_agreement(name).await?;
            println!("Added agreement: {} ({})", agreement.name, agreement.id);
        }

        AgreementCommands::Show { name } => {
            let agreement = services.agreements.get_by_name(&name).await?;
            let accounts = services.ledger().list_by_agreement(&agreement).await?;

            println!("Agreement: {}", agreement.name);
            println!("  ID:       {}", agreement.id);
            println!("  Accounts: {}", accounts.len());
            for account in accounts {
                println!(
                    "    #{:<6} {:<20} type {:<4} {:>14}",
                    account.id,
                    account.number,
                    account.account_type,
                    format_amount(account.amount)
                );
            }
        }
    }
    Ok(())
}

async fn run_account_command(services: &Services, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Add {
            agreement,
            number,
            account_type,
            amount,
        } => {
            let agreement = services.agreements.get_by_name(&agreement).await?;
            let amount = parse_amount(&amount).context("Invalid amount format")?;

            let account = services
                .ledger()
                .create_account(&agreement, number, account_type, amount)
                .await?;
            println!(
                "Created account {} ({}) for {}",
                account.number, account.id, agreement.name
            );
        }

        AccountCommands::List { agreement, json } => {
            let accounts = match agreement {
                Some(name) => {
                    let agreement = services.agreements.get_by_name(&name).await?;
                    services.ledger().list_by_agreement(&agreement).await?
                }
                None => services.ledger().list_all().await?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&accounts)?);
            } else if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!(
                    "{:<8} {:<10} {:<20} {:<6} {:>14}",
                    "ID", "AGREEMENT", "NUMBER", "TYPE", "AMOUNT"
                );
                println!("{}", "-".repeat(62));
                for account in accounts {
                    println!(
                        "{:<8} {:<10} {:<20} {:<6} {:>14}",
                        account.id,
                        account.agreement_id,
                        account.number,
                        account.account_type,
                        format_amount(account.amount)
                    );
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_with_commission() {
        let cli = Cli::try_parse_from([
            "kassa",
            "transfer",
            "5",
            "--from",
            "alice",
            "--to",
            "bob",
            "--commission",
            "0.05",
        ])
        .unwrap();

        match cli.command {
            Commands::Transfer {
                amount,
                from,
                to,
                from_type,
                to_type,
                commission,
            } => {
                assert_eq!(amount, "5");
                assert_eq!(from, "alice");
                assert_eq!(to, "bob");
                assert_eq!(from_type, 0);
                assert_eq!(to_type, 0);
                assert_eq!(commission.as_deref(), Some("0.05"));
            }
            _ => panic!("expected transfer command"),
        }
    }

    #[test]
    fn test_parse_account_add() {
        let cli = Cli::try_parse_from([
            "kassa", "account", "add", "acme", "--number", "40817", "--type", "2", "--amount",
            "-3.5",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Account(AccountCommands::Add { account_type: 2, .. })
        ));
    }

    #[test]
    fn test_transfer_refusal_mentions_commission() {
        assert_eq!(
            transfer_refusal("alice", false),
            "Transfer refused: insufficient funds for alice"
        );
        assert!(
            transfer_refusal("alice", true).contains("the commission may already have been charged")
        );
    }
}
