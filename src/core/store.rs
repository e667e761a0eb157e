use std::fs;
use std::io;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::engine::simulate_with;
use super::types::{
    Debt, DebtStats, DebtUpdate, NewDebt, SimulationOptions, Strategy, StrategyResult,
};
use super::validate::{
    ValidationError, validate_debt, validate_monthly_budget, validate_new_debt, validate_update,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The debt list and budget the user has entered. Persisted as a JSON snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtStore {
    debts: Vec<Debt>,
    monthly_budget: f64,
}

impl DebtStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot; a missing file is an empty store.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("store: {} not found, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let store: Self = serde_json::from_str(&raw)?;
        for debt in &store.debts {
            validate_debt(debt)?;
        }
        validate_monthly_budget(store.monthly_budget)?;
        log::info!(
            "store: loaded {} debt(s) from {}",
            store.debts.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!(
            "store: saved {} debt(s) to {}",
            self.debts.len(),
            path.display()
        );
        Ok(())
    }

    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    pub fn monthly_budget(&self) -> f64 {
        self.monthly_budget
    }

    /// Returns a copy of the stored debt, with its assigned id.
    pub fn add_debt(&mut self, input: NewDebt) -> Result<Debt, ValidationError> {
        validate_new_debt(&input)?;
        let debt = Debt {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            debt_type: input.debt_type,
            balance: input.balance,
            original_balance: input.balance,
            interest_rate: input.interest_rate,
            minimum_payment: input.minimum_payment,
            created_at: Utc::now(),
        };
        self.debts.push(debt.clone());
        Ok(debt)
    }

    /// Returns whether a debt with `id` was present.
    pub fn remove_debt(&mut self, id: &str) -> bool {
        let before = self.debts.len();
        self.debts.retain(|d| d.id != id);
        self.debts.len() != before
    }

    pub fn update_debt(&mut self, id: &str, update: DebtUpdate) -> Result<bool, ValidationError> {
        validate_update(&update)?;
        let Some(debt) = self.debts.iter_mut().find(|d| d.id == id) else {
            return Ok(false);
        };
        if let Some(name) = update.name {
            debt.name = name;
        }
        if let Some(debt_type) = update.debt_type {
            debt.debt_type = debt_type;
        }
        if let Some(balance) = update.balance {
            debt.balance = balance;
        }
        if let Some(rate) = update.interest_rate {
            debt.interest_rate = rate;
        }
        if let Some(payment) = update.minimum_payment {
            debt.minimum_payment = payment;
        }
        Ok(true)
    }

    pub fn set_monthly_budget(&mut self, budget: f64) -> Result<(), ValidationError> {
        validate_monthly_budget(budget)?;
        self.monthly_budget = budget;
        Ok(())
    }

    /// Drops every debt; the budget is kept.
    pub fn clear_all_debts(&mut self) {
        self.debts.clear();
    }

    pub fn calculate_strategy(
        &self,
        strategy: Strategy,
        options: SimulationOptions,
    ) -> StrategyResult {
        simulate_with(&self.debts, self.monthly_budget, strategy, options)
    }

    pub fn stats(&self) -> DebtStats {
        debt_stats(&self.debts)
    }
}

pub fn debt_stats(debts: &[Debt]) -> DebtStats {
    if debts.is_empty() {
        return DebtStats::default();
    }
    let count = debts.len() as f64;
    DebtStats {
        total_debt: debts.iter().map(|d| d.balance).sum(),
        total_minimum_payments: debts.iter().map(|d| d.minimum_payment).sum(),
        average_interest_rate: debts.iter().map(|d| d.interest_rate).sum::<f64>() / count,
        highest_interest_rate: debts
            .iter()
            .map(|d| d.interest_rate)
            .fold(f64::NEG_INFINITY, f64::max),
        lowest_balance: debts
            .iter()
            .map(|d| d.balance)
            .fold(f64::INFINITY, f64::min),
    }
}
