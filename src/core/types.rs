use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Snowball,
    Avalanche,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum DebtType {
    #[serde(rename = "Credit Card", alias = "credit-card")]
    CreditCard,
    #[serde(rename = "Personal Loan", alias = "personal-loan")]
    PersonalLoan,
    #[serde(rename = "Student Loan", alias = "student-loan")]
    StudentLoan,
    #[serde(rename = "Car Loan", alias = "car-loan")]
    CarLoan,
    #[serde(rename = "Medical Debt", alias = "medical-debt")]
    MedicalDebt,
    #[default]
    #[serde(alias = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub debt_type: DebtType,
    pub balance: f64,
    pub original_balance: f64,
    /// Nominal annual rate in percent, e.g. `18.99`.
    pub interest_rate: f64,
    pub minimum_payment: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when entering a new debt; the store fills in the rest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebt {
    pub name: String,
    #[serde(default)]
    pub debt_type: DebtType,
    pub balance: f64,
    pub interest_rate: f64,
    pub minimum_payment: f64,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtUpdate {
    pub name: Option<String>,
    pub debt_type: Option<DebtType>,
    pub balance: Option<f64>,
    pub interest_rate: Option<f64>,
    pub minimum_payment: Option<f64>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationOptions {
    /// Recompute the extra payment every month from the debts still open, so a
    /// retired debt's minimum rolls into the focus payment.
    pub redistribute_freed_minimums: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleItem {
    pub month: u32,
    pub debt_name: String,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
    pub is_extra: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub total_payments: f64,
    pub total_interest: f64,
    pub months_to_payoff: u32,
    pub schedule: Vec<PaymentScheduleItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    pub interest: f64,
    pub months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball: StrategyResult,
    pub avalanche: StrategyResult,
    pub savings: Savings,
    pub best_strategy: Strategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtStats {
    pub total_debt: f64,
    pub total_minimum_payments: f64,
    pub average_interest_rate: f64,
    pub highest_interest_rate: f64,
    pub lowest_balance: f64,
}
