pub mod principal;
pub mod yearly;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::decimal::{Money, Rate};
use crate::fortnight::Fortnight;

pub use principal::{balance_before, balance_on, principal_for};
pub use yearly::{fortnight_breakdown, yearly_interest};

/// interest earned by one fortnight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FortnightInterest {
    pub fortnight: Fortnight,
    pub principal: Money,
    pub rate: Rate,
    pub interest: Money,
}

/// unrounded interest of one accrual period
///
/// a principal that is zero or negative earns nothing.
pub fn period_interest(principal: Money, annual_rate: Rate, periods_per_year: u32) -> Decimal {
    if !principal.is_positive() {
        return Decimal::ZERO;
    }
    principal.periodic_interest(annual_rate, periods_per_year)
}
