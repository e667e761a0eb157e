use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Value, json};

use crate::core::{
    DebtStore, DebtType, DebtUpdate, NewDebt, SimulationOptions, Strategy, compare_strategies,
};

use super::{DEFAULT_PORT, run_http_server};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Snowball,
    Avalanche,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDebtType {
    CreditCard,
    PersonalLoan,
    StudentLoan,
    CarLoan,
    MedicalDebt,
    Other,
}

impl From<CliDebtType> for DebtType {
    fn from(value: CliDebtType) -> Self {
        match value {
            CliDebtType::CreditCard => DebtType::CreditCard,
            CliDebtType::PersonalLoan => DebtType::PersonalLoan,
            CliDebtType::StudentLoan => DebtType::StudentLoan,
            CliDebtType::CarLoan => DebtType::CarLoan,
            CliDebtType::MedicalDebt => DebtType::MedicalDebt,
            CliDebtType::Other => DebtType::Other,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "debtplan",
    about = "Debt payoff planner: compare snowball and avalanche repayment"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "debts.json",
        help = "JSON file holding the debt list and monthly budget"
    )]
    store: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a debt to the store
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum, default_value_t = CliDebtType::Other)]
        debt_type: CliDebtType,
        #[arg(long, help = "Current balance")]
        balance: f64,
        #[arg(long, help = "Annual interest rate in percent, e.g. 18.99")]
        interest_rate: f64,
        #[arg(long, help = "Fixed monthly minimum payment")]
        minimum_payment: f64,
    },
    /// Remove a debt by id
    Remove { id: String },
    /// Change fields of an existing debt
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum)]
        debt_type: Option<CliDebtType>,
        #[arg(long)]
        balance: Option<f64>,
        #[arg(long)]
        interest_rate: Option<f64>,
        #[arg(long)]
        minimum_payment: Option<f64>,
    },
    /// Set the total monthly budget for debt repayment
    Budget {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Remove every debt, keeping the budget
    Clear,
    /// Print debts, budget and summary statistics
    List,
    /// Simulate one repayment strategy over the stored debts
    Simulate {
        #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
        strategy: CliStrategy,
        #[arg(long, help = "Roll minimums of paid-off debts into the extra payment")]
        redistribute: bool,
    },
    /// Compare snowball and avalanche over the stored debts
    Compare {
        #[arg(long, help = "Roll minimums of paid-off debts into the extra payment")]
        redistribute: bool,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[derive(Debug)]
struct CommandOutput {
    body: Value,
    changed: bool,
}

impl CommandOutput {
    fn changed(body: Value) -> Self {
        Self {
            body,
            changed: true,
        }
    }

    fn report<T: Serialize>(body: &T) -> Result<Self> {
        Ok(Self {
            body: serde_json::to_value(body)?,
            changed: false,
        })
    }
}

pub async fn run_cli(cli: Cli) -> Result<()> {
    if let Command::Serve { port } = cli.command {
        run_http_server(port)
            .await
            .with_context(|| format!("failed to serve on port {port}"))?;
        return Ok(());
    }

    let mut store = DebtStore::load(&cli.store)
        .with_context(|| format!("failed to load {}", cli.store.display()))?;
    let output = run_store_command(cli.command, &mut store)?;
    if output.changed {
        store
            .save(&cli.store)
            .with_context(|| format!("failed to save {}", cli.store.display()))?;
    }
    println!("{}", serde_json::to_string_pretty(&output.body)?);
    Ok(())
}

fn options(redistribute: bool) -> SimulationOptions {
    SimulationOptions {
        redistribute_freed_minimums: redistribute,
    }
}

fn run_store_command(command: Command, store: &mut DebtStore) -> Result<CommandOutput> {
    match command {
        Command::Add {
            name,
            debt_type,
            balance,
            interest_rate,
            minimum_payment,
        } => {
            let debt = store.add_debt(NewDebt {
                name,
                debt_type: debt_type.into(),
                balance,
                interest_rate,
                minimum_payment,
            })?;
            Ok(CommandOutput::changed(serde_json::to_value(&debt)?))
        }
        Command::Remove { id } => {
            if !store.remove_debt(&id) {
                bail!("no debt with id {id}");
            }
            Ok(CommandOutput::changed(json!({ "removed": id })))
        }
        Command::Update {
            id,
            name,
            debt_type,
            balance,
            interest_rate,
            minimum_payment,
        } => {
            let update = DebtUpdate {
                name,
                debt_type: debt_type.map(Into::into),
                balance,
                interest_rate,
                minimum_payment,
            };
            if !store.update_debt(&id, update)? {
                bail!("no debt with id {id}");
            }
            Ok(CommandOutput::changed(json!({ "updated": id })))
        }
        Command::Budget { amount } => {
            store.set_monthly_budget(amount)?;
            Ok(CommandOutput::changed(json!({ "monthlyBudget": amount })))
        }
        Command::Clear => {
            store.clear_all_debts();
            Ok(CommandOutput::changed(json!({ "cleared": true })))
        }
        Command::List => CommandOutput::report(&json!({
            "debts": store.debts(),
            "monthlyBudget": store.monthly_budget(),
            "stats": store.stats(),
        })),
        Command::Simulate {
            strategy,
            redistribute,
        } => CommandOutput::report(
            &store.calculate_strategy(strategy.into(), options(redistribute)),
        ),
        Command::Compare { redistribute } => CommandOutput::report(&compare_strategies(
            store.debts(),
            store.monthly_budget(),
            options(redistribute),
        )),
        Command::Serve { .. } => bail!("serve does not operate on the store"),
    }
}
