use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// number of fortnights in a calendar year
pub const FORTNIGHTS_PER_YEAR: u32 = 24;

/// smallest magnitude a deposit or withdrawal must exceed
pub const MINIMUM_AMOUNT: i64 = 10;

/// passbook configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// a movement is valid only when `|amount| > minimum_amount`; never below 10
    pub minimum_amount: Money,
    pub rates: RateSchedule,
    pub fortnights_per_year: u32,
    #[serde(default)]
    pub principal_rule: PrincipalRule,
    #[serde(default)]
    pub yearly_method: YearlyInterestMethod,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            minimum_amount: Money::from_major(MINIMUM_AMOUNT),
            rates: RateSchedule::default(),
            fortnights_per_year: FORTNIGHTS_PER_YEAR,
            principal_rule: PrincipalRule::default(),
            yearly_method: YearlyInterestMethod::default(),
        }
    }
}

impl LedgerConfig {
    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.minimum_amount < Money::from_major(MINIMUM_AMOUNT) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "minimum amount must be at least {}, got {}",
                    MINIMUM_AMOUNT, self.minimum_amount
                ),
            });
        }

        if self.fortnights_per_year == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "fortnights per year must be positive".to_string(),
            });
        }

        self.rates.validate()
    }

    pub fn with_principal_rule(mut self, rule: PrincipalRule) -> Self {
        self.principal_rule = rule;
        self
    }

    pub fn with_yearly_method(mut self, method: YearlyInterestMethod) -> Self {
        self.yearly_method = method;
        self
    }
}

/// a rate that applies to fortnights starting on or after `effective_from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateStep {
    pub effective_from: NaiveDate,
    pub rate: Rate,
}

/// time-varying annual rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// rate before the first step
    pub initial_rate: Rate,
    /// ascending by `effective_from`
    pub steps: Vec<RateStep>,
}

impl Default for RateSchedule {
    /// 1% until the 2022-08-01 rate change, 2% afterwards
    fn default() -> Self {
        Self {
            initial_rate: Rate::from_percentage(1),
            steps: vec![RateStep {
                effective_from: NaiveDate::from_ymd_opt(2022, 8, 1).unwrap_or_default(),
                rate: Rate::from_percentage(2),
            }],
        }
    }
}

impl RateSchedule {
    /// a single rate for all dates
    pub fn flat(rate: Rate) -> Self {
        Self {
            initial_rate: rate,
            steps: Vec::new(),
        }
    }

    /// append a rate change
    pub fn then(mut self, effective_from: NaiveDate, rate: Rate) -> Self {
        self.steps.push(RateStep { effective_from, rate });
        self
    }

    /// rate in force on `date`
    pub fn rate_for(&self, date: NaiveDate) -> Rate {
        self.steps
            .iter()
            .rev()
            .find(|step| step.effective_from <= date)
            .map(|step| step.rate)
            .unwrap_or(self.initial_rate)
    }

    pub fn validate(&self) -> Result<()> {
        let rates = std::iter::once(self.initial_rate).chain(self.steps.iter().map(|s| s.rate));
        for rate in rates {
            if rate < Rate::ZERO {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("interest rate must not be negative, got {}", rate),
                });
            }
        }

        for pair in self.steps.windows(2) {
            if pair[1].effective_from <= pair[0].effective_from {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!(
                        "rate steps must be in ascending order: {} follows {}",
                        pair[1].effective_from, pair[0].effective_from
                    ),
                });
            }
        }

        Ok(())
    }
}

/// how the interest-bearing principal of a fortnight is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrincipalRule {
    /// balance carried into the fortnight, reduced by withdrawals made during it.
    /// deposits start earning from the following fortnight.
    #[default]
    CarriedLessWithdrawals,
    /// every movement inside `[start, end)` plus the positive balance as of `start`
    /// (inclusive, so a movement stamped exactly at `start` is counted twice)
    CarriedPlusMovements,
}

/// how a calendar year's interest is aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YearlyInterestMethod {
    /// sum of the interest of the year's fortnights
    #[default]
    PerFortnight,
    /// each deposit of the year earns one fortnight at its own fortnight's rate
    PerTransaction,
}
