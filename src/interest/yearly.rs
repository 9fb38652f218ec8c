use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::trace;

use crate::config::{LedgerConfig, YearlyInterestMethod};
use crate::decimal::Money;
use crate::fortnight::Fortnight;
use crate::interest::principal::principal_for;
use crate::interest::{period_interest, FortnightInterest};
use crate::transaction::Movement;

/// unrounded interest earned over calendar `year`
pub fn yearly_interest<M: Movement>(movements: &[M], year: i32, config: &LedgerConfig) -> Decimal {
    match config.yearly_method {
        YearlyInterestMethod::PerFortnight => per_fortnight(movements, year, config),
        YearlyInterestMethod::PerTransaction => per_transaction(movements, year, config),
    }
}

/// principal, rate and interest of each fortnight of `year`
pub fn fortnight_breakdown<M: Movement>(
    movements: &[M],
    year: i32,
    config: &LedgerConfig,
) -> Vec<FortnightInterest> {
    Fortnight::for_year_with(year, &config.rates)
        .into_iter()
        .map(|fortnight| {
            let principal = principal_for(movements, &fortnight, config.principal_rule);
            let rate = fortnight.interest_rate();
            let interest = period_interest(principal, rate, config.fortnights_per_year);
            FortnightInterest {
                fortnight,
                principal,
                rate,
                interest: Money::from_decimal(interest),
            }
        })
        .collect()
}

fn per_fortnight<M: Movement>(movements: &[M], year: i32, config: &LedgerConfig) -> Decimal {
    Fortnight::for_year_with(year, &config.rates)
        .iter()
        .map(|fortnight| {
            let principal = principal_for(movements, fortnight, config.principal_rule);
            let interest =
                period_interest(principal, fortnight.interest_rate(), config.fortnights_per_year);
            trace!(fortnight = %fortnight, principal = %principal, interest = %interest, "fortnight accrued");
            interest
        })
        .sum()
}

/// each deposit of the year earns one fortnight at the rate of the fortnight it falls in;
/// withdrawals earn nothing
fn per_transaction<M: Movement>(movements: &[M], year: i32, config: &LedgerConfig) -> Decimal {
    movements
        .iter()
        .filter(|m| m.created_on().year() == year && m.amount().is_positive())
        .filter_map(|m| {
            let fortnight = Fortnight::containing_with(m.created_on().date_naive(), &config.rates).ok()?;
            Some(m.amount().periodic_interest(fortnight.interest_rate(), config.fortnights_per_year))
        })
        .sum()
}
