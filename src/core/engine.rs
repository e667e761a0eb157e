use std::cmp::Ordering;

use super::types::{
    Debt, PaymentScheduleItem, Savings, SimulationOptions, Strategy, StrategyComparison,
    StrategyResult,
};

/// Hard stop for a single simulation: 50 years of monthly payments.
pub const MAX_MONTHS: u32 = 600;

#[derive(Debug, Clone)]
struct WorkingDebt<'a> {
    name: &'a str,
    balance: f64,
    interest_rate: f64,
    minimum_payment: f64,
}

impl<'a> From<&'a Debt> for WorkingDebt<'a> {
    fn from(debt: &'a Debt) -> Self {
        Self {
            name: &debt.name,
            balance: debt.balance,
            interest_rate: debt.interest_rate,
            minimum_payment: debt.minimum_payment,
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    payments: f64,
    interest: f64,
}

/// Round half away from zero to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn priority(strategy: Strategy, a: &WorkingDebt<'_>, b: &WorkingDebt<'_>) -> Ordering {
    match strategy {
        Strategy::Snowball => a.balance.total_cmp(&b.balance),
        Strategy::Avalanche => b.interest_rate.total_cmp(&a.interest_rate),
    }
}

fn sort_by_priority(working: &mut [WorkingDebt<'_>], strategy: Strategy) {
    // `sort_by` is stable, so ties keep their input order.
    working.sort_by(|a, b| priority(strategy, a, b));
}

fn extra_payment(working: &[WorkingDebt<'_>], monthly_budget: f64) -> f64 {
    let total_minimum_payments: f64 = working.iter().map(|d| d.minimum_payment).sum();
    (monthly_budget - total_minimum_payments).max(0.0)
}

pub fn simulate(debts: &[Debt], monthly_budget: f64, strategy: Strategy) -> StrategyResult {
    simulate_with(debts, monthly_budget, strategy, SimulationOptions::default())
}

pub fn simulate_with(
    debts: &[Debt],
    monthly_budget: f64,
    strategy: Strategy,
    options: SimulationOptions,
) -> StrategyResult {
    if debts.is_empty() || monthly_budget <= 0.0 {
        return StrategyResult::default();
    }

    let mut working: Vec<WorkingDebt<'_>> = debts.iter().map(WorkingDebt::from).collect();
    sort_by_priority(&mut working, strategy);

    let mut extra = extra_payment(&working, monthly_budget);
    let mut schedule = Vec::new();
    let mut totals = Totals::default();
    let mut month = 0;

    while month < MAX_MONTHS && working.iter().any(|d| d.balance > 0.0) {
        month += 1;
        if options.redistribute_freed_minimums {
            extra = extra_payment(&working, monthly_budget);
        }

        // The focus is the first debt still open this month.
        let mut focus_open = extra > 0.0;
        for debt in working.iter_mut() {
            if debt.balance <= 0.0 {
                continue;
            }
            let is_focus = std::mem::take(&mut focus_open);
            if let Some(item) = pay_debt_for_month(debt, month, is_focus, extra, &mut totals) {
                schedule.push(item);
            }
        }

        let open_before = working.len();
        working.retain(|d| d.balance > 0.0);
        if working.len() != open_before {
            sort_by_priority(&mut working, strategy);
        }
    }

    if !working.is_empty() {
        log::debug!(
            "{strategy:?}: hit {MAX_MONTHS}-month cap with {} debt(s) outstanding",
            working.len()
        );
    }

    StrategyResult {
        total_payments: round2(totals.payments),
        total_interest: round2(totals.interest),
        months_to_payoff: month,
        schedule,
    }
}

fn pay_debt_for_month(
    debt: &mut WorkingDebt<'_>,
    month: u32,
    is_focus: bool,
    extra: f64,
    totals: &mut Totals,
) -> Option<PaymentScheduleItem> {
    let monthly_interest = debt.balance * (debt.interest_rate / 100.0) / 12.0;
    let mut payment = debt.minimum_payment;
    if is_focus {
        payment += extra;
    }

    let principal = (payment - monthly_interest).max(0.0).min(debt.balance);
    let payment = principal + monthly_interest;
    if payment <= 0.0 {
        return None;
    }

    debt.balance = (debt.balance - principal).max(0.0);
    totals.payments += payment;
    totals.interest += monthly_interest;

    Some(PaymentScheduleItem {
        month,
        debt_name: debt.name.to_string(),
        payment: round2(payment),
        principal: round2(principal),
        interest: round2(monthly_interest),
        remaining_balance: round2(debt.balance),
        is_extra: is_focus,
    })
}

/// Runs both strategies over the same snapshot. Each run works on its own copy.
pub fn compare_strategies(
    debts: &[Debt],
    monthly_budget: f64,
    options: SimulationOptions,
) -> StrategyComparison {
    let snowball = simulate_with(debts, monthly_budget, Strategy::Snowball, options);
    let avalanche = simulate_with(debts, monthly_budget, Strategy::Avalanche, options);

    let savings = Savings {
        interest: round2((snowball.total_interest - avalanche.total_interest).max(0.0)),
        months: snowball
            .months_to_payoff
            .saturating_sub(avalanche.months_to_payoff),
    };
    let best_strategy = if avalanche.total_interest < snowball.total_interest {
        Strategy::Avalanche
    } else {
        Strategy::Snowball
    };

    StrategyComparison {
        snowball,
        avalanche,
        savings,
        best_strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DebtType;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use std::collections::HashMap;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn debt(name: &str, balance: f64, interest_rate: f64, minimum_payment: f64) -> Debt {
        Debt {
            id: format!("id-{name}"),
            name: name.to_string(),
            debt_type: DebtType::Other,
            balance,
            original_balance: balance,
            interest_rate,
            minimum_payment,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn two_equal_balances() -> Vec<Debt> {
        vec![debt("A", 500.0, 5.0, 50.0), debt("B", 500.0, 20.0, 50.0)]
    }

    fn entries_for<'a>(
        result: &'a StrategyResult,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PaymentScheduleItem> {
        result.schedule.iter().filter(move |i| i.debt_name == name)
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_approx(round2(1.005_000_1), 1.01);
        assert_approx(round2(2.5), 2.5);
        assert_approx(round2(0.125), 0.13);
        assert_approx(round2(-0.125), -0.13);
        assert_approx(round2(43.854_2), 43.85);
    }

    #[test]
    fn empty_debts_return_zero_result() {
        let result = simulate(&[], 500.0, Strategy::Snowball);
        assert_eq!(result, StrategyResult::default());
    }

    #[test]
    fn non_positive_budget_returns_zero_result() {
        let debts = two_equal_balances();
        for budget in [0.0, -10.0] {
            for strategy in [Strategy::Snowball, Strategy::Avalanche] {
                let result = simulate(&debts, budget, strategy);
                assert_eq!(result.months_to_payoff, 0);
                assert_eq!(result.total_payments, 0.0);
                assert_eq!(result.total_interest, 0.0);
                assert!(result.schedule.is_empty());
            }
        }
    }

    #[test]
    fn single_debt_golden_schedule() {
        let debts = vec![debt("Card", 1200.0, 12.0, 200.0)];
        let result = simulate(&debts, 200.0, Strategy::Avalanche);

        assert_eq!(result.months_to_payoff, 7);
        assert_approx(result.total_interest, 43.86);
        assert_approx(result.total_payments, 1243.86);

        let expected = [
            (200.0, 188.0, 12.0, 1012.0),
            (200.0, 189.88, 10.12, 822.12),
            (200.0, 191.78, 8.22, 630.34),
            (200.0, 193.70, 6.30, 436.64),
            (200.0, 195.63, 4.37, 241.01),
            (200.0, 197.59, 2.41, 43.42),
            (43.86, 43.42, 0.43, 0.0),
        ];
        assert_eq!(result.schedule.len(), expected.len());
        for (index, (item, (payment, principal, interest, remaining))) in
            result.schedule.iter().zip(expected).enumerate()
        {
            assert_eq!(item.month, index as u32 + 1);
            assert_eq!(item.debt_name, "Card");
            assert!(!item.is_extra, "no extra when budget equals the minimum");
            assert_approx(item.payment, payment);
            assert_approx(item.principal, principal);
            assert_approx(item.interest, interest);
            assert_approx(item.remaining_balance, remaining);
        }
    }

    #[test]
    fn avalanche_focuses_highest_rate_first() {
        let result = simulate(&two_equal_balances(), 150.0, Strategy::Avalanche);

        let first = &result.schedule[0];
        assert_eq!(first.debt_name, "B");
        assert!(first.is_extra);
        assert_approx(first.payment, 100.0);

        let b_entries: Vec<_> = entries_for(&result, "B").collect();
        assert_eq!(b_entries.len(), 6);
        assert!(b_entries.iter().all(|i| i.is_extra));
        assert!(entries_for(&result, "A").take(6).all(|i| !i.is_extra));
        assert!(entries_for(&result, "A").skip(6).all(|i| i.is_extra));

        assert_eq!(result.months_to_payoff, 9);
        assert_approx(result.total_interest, 37.43);
        assert_approx(result.total_payments, 1037.43);
    }

    #[test]
    fn snowball_breaks_balance_ties_by_input_order() {
        let result = simulate(&two_equal_balances(), 150.0, Strategy::Snowball);

        let first = &result.schedule[0];
        assert_eq!(first.debt_name, "A");
        assert!(first.is_extra);
        assert_eq!(result.schedule[1].debt_name, "B");
        assert!(!result.schedule[1].is_extra);

        assert_eq!(result.months_to_payoff, 9);
        assert_approx(result.total_interest, 52.84);
        assert_approx(result.total_payments, 1052.84);
    }

    #[test]
    fn avalanche_never_costs_more_interest_than_snowball_here() {
        let debts = two_equal_balances();
        let snowball = simulate(&debts, 150.0, Strategy::Snowball);
        let avalanche = simulate(&debts, 150.0, Strategy::Avalanche);
        assert!(avalanche.total_interest <= snowball.total_interest);
    }

    #[test]
    fn freed_minimum_stays_out_of_the_extra_pool_by_default() {
        let result = simulate(&two_equal_balances(), 150.0, Strategy::Snowball);
        // A retires in month 6; B then gets only its minimum plus the original extra.
        let month_seven = result
            .schedule
            .iter()
            .find(|i| i.month == 7)
            .expect("month 7 entry");
        assert_eq!(month_seven.debt_name, "B");
        assert_approx(month_seven.payment, 100.0);
    }

    #[test]
    fn redistribution_rolls_freed_minimums_into_the_focus_debt() {
        let debts = two_equal_balances();
        let options = SimulationOptions {
            redistribute_freed_minimums: true,
        };
        let snowball = simulate_with(&debts, 150.0, Strategy::Snowball, options);
        let avalanche = simulate_with(&debts, 150.0, Strategy::Avalanche, options);

        assert_eq!(snowball.months_to_payoff, 8);
        assert_approx(snowball.total_interest, 51.24);
        assert_eq!(avalanche.months_to_payoff, 8);
        assert_approx(avalanche.total_interest, 37.18);

        let month_seven = snowball
            .schedule
            .iter()
            .find(|i| i.month == 7)
            .expect("month 7 entry");
        assert_approx(month_seven.payment, 150.0);
    }

    #[test]
    fn month_cap_returns_partial_payoff() {
        let debts = vec![debt("Slow", 10_000.0, 0.0, 10.0)];
        let result = simulate(&debts, 10.0, Strategy::Snowball);

        assert_eq!(result.months_to_payoff, MAX_MONTHS);
        assert_eq!(result.schedule.len(), MAX_MONTHS as usize);
        let last = result.schedule.last().expect("schedule entries");
        assert_approx(last.remaining_balance, 4_000.0);
        assert_approx(result.total_payments, 6_000.0);
        assert_approx(result.total_interest, 0.0);
    }

    #[test]
    fn zero_balance_debt_does_not_take_the_focus_slot() {
        let debts = vec![debt("Done", 0.0, 0.0, 10.0), debt("Open", 1_000.0, 0.0, 50.0)];
        let result = simulate(&debts, 160.0, Strategy::Snowball);

        let first = &result.schedule[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.debt_name, "Open");
        assert!(first.is_extra);
        assert_approx(first.payment, 150.0);
        assert_approx(first.remaining_balance, 850.0);

        assert!(entries_for(&result, "Done").next().is_none());
        assert_eq!(result.months_to_payoff, 7);
        assert_approx(result.total_payments, 1_000.0);
    }

    #[test]
    fn zero_minimum_debt_without_extra_never_advances() {
        let debts = vec![debt("Stuck", 100.0, 0.0, 0.0), debt("Paid", 100.0, 0.0, 50.0)];
        let result = simulate(&debts, 50.0, Strategy::Avalanche);

        assert_eq!(result.months_to_payoff, MAX_MONTHS);
        assert!(entries_for(&result, "Stuck").next().is_none());
        assert_eq!(entries_for(&result, "Paid").count(), 2);
    }

    #[test]
    fn simulate_does_not_mutate_input() {
        let debts = two_equal_balances();
        let before = debts.clone();
        let _ = simulate(&debts, 150.0, Strategy::Snowball);
        let _ = compare_strategies(&debts, 150.0, SimulationOptions::default());
        assert_eq!(debts, before);
    }

    #[test]
    fn comparison_reports_savings_and_best_strategy() {
        let comparison =
            compare_strategies(&two_equal_balances(), 150.0, SimulationOptions::default());

        assert_eq!(comparison.best_strategy, Strategy::Avalanche);
        assert_approx(comparison.savings.interest, 15.41);
        assert_eq!(comparison.savings.months, 0);
        assert_approx(comparison.snowball.total_interest, 52.84);
        assert_approx(comparison.avalanche.total_interest, 37.43);
    }

    #[test]
    fn comparison_prefers_snowball_on_equal_interest() {
        let debts = vec![debt("Only", 300.0, 10.0, 100.0)];
        let comparison = compare_strategies(&debts, 100.0, SimulationOptions::default());

        assert_eq!(comparison.best_strategy, Strategy::Snowball);
        assert_approx(comparison.savings.interest, 0.0);
        assert_eq!(comparison.snowball, comparison.avalanche);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]
        #[test]
        fn prop_schedule_is_conserved_and_monotonic(
            rows in proptest::collection::vec(
                (1.0f64..20_000.0, 0.0f64..35.0, 1.0f64..600.0),
                1..5,
            ),
            budget_over_minimums in 0.0f64..1_500.0,
            avalanche in proptest::bool::ANY,
            redistribute in proptest::bool::ANY,
        ) {
            let debts: Vec<Debt> = rows
                .iter()
                .enumerate()
                .map(|(i, (balance, rate, min))| debt(&format!("d{i}"), *balance, *rate, *min))
                .collect();
            let budget = debts.iter().map(|d| d.minimum_payment).sum::<f64>() + budget_over_minimums;
            let strategy = if avalanche { Strategy::Avalanche } else { Strategy::Snowball };
            let options = SimulationOptions { redistribute_freed_minimums: redistribute };

            let result = simulate_with(&debts, budget, strategy, options);
            prop_assert!(result.months_to_payoff <= MAX_MONTHS);

            let mut last_balance: HashMap<&str, f64> = HashMap::new();
            for item in &result.schedule {
                prop_assert!(item.payment >= 0.0);
                prop_assert!(item.principal >= 0.0);
                prop_assert!(item.interest >= 0.0);
                prop_assert!(item.remaining_balance >= 0.0);
                // Each field is rounded on its own, so allow one cent per term.
                prop_assert!((item.payment - (item.principal + item.interest)).abs() <= 0.011);
                if let Some(previous) = last_balance.insert(item.debt_name.as_str(), item.remaining_balance) {
                    prop_assert!(item.remaining_balance <= previous);
                }
            }

            let extra_months: Vec<u32> = result
                .schedule
                .iter()
                .filter(|i| i.is_extra)
                .map(|i| i.month)
                .collect();
            let mut deduped = extra_months.clone();
            deduped.dedup();
            prop_assert_eq!(extra_months, deduped);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]
        #[test]
        fn prop_month_one_focus_matches_strategy(
            rows in proptest::collection::vec(
                (1.0f64..10_000.0, 0.0f64..30.0, 10.0f64..200.0),
                2..6,
            ),
            extra in 1.0f64..500.0,
        ) {
            let debts: Vec<Debt> = rows
                .iter()
                .enumerate()
                .map(|(i, (balance, rate, min))| debt(&format!("d{i}"), *balance, *rate, *min))
                .collect();
            let budget = debts.iter().map(|d| d.minimum_payment).sum::<f64>() + extra;

            let snowball = simulate(&debts, budget, Strategy::Snowball);
            let smallest = debts
                .iter()
                .reduce(|best, d| if d.balance < best.balance { d } else { best })
                .expect("non-empty");
            prop_assert_eq!(&snowball.schedule[0].debt_name, &smallest.name);
            prop_assert!(snowball.schedule[0].is_extra);

            let avalanche = simulate(&debts, budget, Strategy::Avalanche);
            let steepest = debts
                .iter()
                .reduce(|best, d| if d.interest_rate > best.interest_rate { d } else { best })
                .expect("non-empty");
            prop_assert_eq!(&avalanche.schedule[0].debt_name, &steepest.name);
            prop_assert!(avalanche.schedule[0].is_extra);
        }
    }
}
