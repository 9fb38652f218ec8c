use chrono::{DateTime, Utc};

use crate::config::PrincipalRule;
use crate::decimal::Money;
use crate::fortnight::AccrualPeriod;
use crate::transaction::Movement;

/// sum of movements created on or before `boundary`
pub fn balance_on<M: Movement>(movements: &[M], boundary: DateTime<Utc>) -> Money {
    movements
        .iter()
        .filter(|m| m.created_on() <= boundary)
        .map(|m| m.amount())
        .sum()
}

/// sum of movements created strictly before `boundary`
pub fn balance_before<M: Movement>(movements: &[M], boundary: DateTime<Utc>) -> Money {
    movements
        .iter()
        .filter(|m| m.created_on() < boundary)
        .map(|m| m.amount())
        .sum()
}

/// interest-bearing principal of `period` under `rule`
pub fn principal_for<M, P>(movements: &[M], period: &P, rule: PrincipalRule) -> Money
where
    M: Movement,
    P: AccrualPeriod + ?Sized,
{
    match rule {
        PrincipalRule::CarriedLessWithdrawals => carried_less_withdrawals(movements, period),
        PrincipalRule::CarriedPlusMovements => carried_plus_movements(movements, period),
    }
}

fn within<M: Movement, P: AccrualPeriod + ?Sized>(movement: &M, period: &P) -> bool {
    let created_on = movement.created_on();
    created_on >= period.start_date() && created_on < period.end_date()
}

fn carried_less_withdrawals<M, P>(movements: &[M], period: &P) -> Money
where
    M: Movement,
    P: AccrualPeriod + ?Sized,
{
    let carried = balance_before(movements, period.start_date());
    let withdrawn: Money = movements
        .iter()
        .filter(|m| m.amount().is_negative() && within(*m, period))
        .map(|m| m.amount())
        .sum();

    carried + withdrawn
}

fn carried_plus_movements<M, P>(movements: &[M], period: &P) -> Money
where
    M: Movement,
    P: AccrualPeriod + ?Sized,
{
    let moved: Money = movements
        .iter()
        .filter(|m| within(*m, period))
        .map(|m| m.amount())
        .sum();

    // inclusive of start, so a movement stamped exactly at start lands in both sums
    let carried = balance_on(movements, period.start_date());
    if carried.is_positive() {
        moved + carried
    } else {
        moved
    }
}
