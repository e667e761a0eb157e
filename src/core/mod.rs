mod engine;
mod store;
mod types;
mod validate;

pub use engine::{MAX_MONTHS, compare_strategies, round2, simulate, simulate_with};
pub use store::{DebtStore, StoreError, StoreResult, debt_stats};
pub use types::{
    Debt, DebtStats, DebtType, DebtUpdate, NewDebt, PaymentScheduleItem, Savings,
    SimulationOptions, Strategy, StrategyComparison, StrategyResult,
};
pub use validate::{
    ValidationError, validate_debt, validate_monthly_budget, validate_new_debt, validate_update,
};
