use thiserror::Error;

use super::types::{Debt, DebtUpdate, NewDebt};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("balance must be a number > 0, got {0}")]
    Balance(f64),

    #[error("interestRate must be a number >= 0, got {0}")]
    InterestRate(f64),

    #[error("minimumPayment must be a number > 0, got {0}")]
    MinimumPayment(f64),

    #[error("monthlyBudget must be a number >= 0, got {0}")]
    MonthlyBudget(f64),
}

pub fn validate_new_debt(debt: &NewDebt) -> Result<(), ValidationError> {
    check_fields(
        &debt.name,
        debt.balance,
        debt.interest_rate,
        debt.minimum_payment,
    )
}

/// Used for debts that arrive fully formed, e.g. over the HTTP API.
pub fn validate_debt(debt: &Debt) -> Result<(), ValidationError> {
    check_fields(
        &debt.name,
        debt.balance,
        debt.interest_rate,
        debt.minimum_payment,
    )
}

pub fn validate_update(update: &DebtUpdate) -> Result<(), ValidationError> {
    if let Some(name) = &update.name {
        check_name(name)?;
    }
    if let Some(balance) = update.balance {
        check_balance(balance)?;
    }
    if let Some(rate) = update.interest_rate {
        check_interest_rate(rate)?;
    }
    if let Some(payment) = update.minimum_payment {
        check_minimum_payment(payment)?;
    }
    Ok(())
}

pub fn validate_monthly_budget(budget: f64) -> Result<(), ValidationError> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(ValidationError::MonthlyBudget(budget));
    }
    Ok(())
}

fn check_fields(
    name: &str,
    balance: f64,
    interest_rate: f64,
    minimum_payment: f64,
) -> Result<(), ValidationError> {
    check_name(name)?;
    check_balance(balance)?;
    check_interest_rate(interest_rate)?;
    check_minimum_payment(minimum_payment)
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

fn check_balance(balance: f64) -> Result<(), ValidationError> {
    if !balance.is_finite() || balance <= 0.0 {
        return Err(ValidationError::Balance(balance));
    }
    Ok(())
}

fn check_interest_rate(rate: f64) -> Result<(), ValidationError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ValidationError::InterestRate(rate));
    }
    Ok(())
}

fn check_minimum_payment(payment: f64) -> Result<(), ValidationError> {
    if !payment.is_finite() || payment <= 0.0 {
        return Err(ValidationError::MinimumPayment(payment));
    }
    Ok(())
}
