use chrono::{DateTime, Datelike, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::RateSchedule;
use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};

/// a window of time over which interest accrues at a single rate
pub trait AccrualPeriod {
    /// first instant of the period
    fn start_date(&self) -> DateTime<Utc>;

    /// last second of the period
    fn end_date(&self) -> DateTime<Utc>;

    /// annual rate applied to the period
    fn interest_rate(&self) -> Rate;
}

/// half-month accrual window starting on the 1st or the 16th
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Fortnight {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rate: Rate,
}

impl Fortnight {
    /// fortnight starting on `date` under the default rate schedule
    pub fn new(date: NaiveDate) -> Result<Self> {
        Self::with_schedule(date, &RateSchedule::default())
    }

    /// fortnight starting on `date`, rate taken from `schedule`
    pub fn with_schedule(date: NaiveDate, schedule: &RateSchedule) -> Result<Self> {
        let last_day = match date.day() {
            1 => date.with_day(15),
            16 => last_day_of_month(date),
            _ => return Err(LedgerError::InvalidFortnight { date }),
        };

        let start = date.and_hms_opt(0, 0, 0);
        let end = last_day.and_then(|d| d.and_hms_opt(23, 59, 59));

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                start: start.and_utc(),
                end: end.and_utc(),
                rate: schedule.rate_for(date),
            }),
            _ => Err(LedgerError::InvalidDate {
                message: format!("cannot resolve the end of the fortnight starting {}", date),
            }),
        }
    }

    /// fortnight from an iso `YYYY-MM-DD` string
    pub fn parse(date: &str) -> Result<Self> {
        date.parse()
    }

    /// fortnight that contains `date`, whatever its day of month
    pub fn containing(date: NaiveDate) -> Result<Self> {
        Self::containing_with(date, &RateSchedule::default())
    }

    pub fn containing_with(date: NaiveDate, schedule: &RateSchedule) -> Result<Self> {
        let start_day = if date.day() < 16 { 1 } else { 16 };
        let start = date
            .with_day(start_day)
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("no fortnight contains {}", date),
            })?;
        Self::with_schedule(start, schedule)
    }

    /// fortnight containing the provider's current time
    pub fn current(time_provider: &SafeTimeProvider) -> Result<Self> {
        Self::containing(time_provider.now().date_naive())
    }

    /// the 24 fortnights of `year` in chronological order
    ///
    /// years outside the supported calendar range yield an empty list.
    pub fn for_year(year: i32) -> Vec<Fortnight> {
        Self::for_year_with(year, &RateSchedule::default())
    }

    pub fn for_year_with(year: i32, schedule: &RateSchedule) -> Vec<Fortnight> {
        (1..=12)
            .flat_map(|month| [1, 16].map(|day| NaiveDate::from_ymd_opt(year, month, day)))
            .flatten()
            .filter_map(|date| Self::with_schedule(date, schedule).ok())
            .collect()
    }

    /// the fortnight directly after this one
    pub fn next(&self) -> Result<Self> {
        self.next_with(&RateSchedule::default())
    }

    pub fn next_with(&self, schedule: &RateSchedule) -> Result<Self> {
        let following = self
            .end
            .date_naive()
            .succ_opt()
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("no fortnight after {}", self.start_day()),
            })?;
        Self::with_schedule(following, schedule)
    }

    /// midnight of the start day
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start
    }

    /// 23:59:59 of the 15th, or of the last day of the month
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn interest_rate(&self) -> Rate {
        self.rate
    }

    /// calendar day the fortnight starts on
    pub fn start_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// last calendar day of the fortnight
    pub fn end_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// `start <= instant < end`, the same half-open window the passbook sums over
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

impl AccrualPeriod for Fortnight {
    fn start_date(&self) -> DateTime<Utc> {
        Fortnight::start_date(self)
    }

    fn end_date(&self) -> DateTime<Utc> {
        Fortnight::end_date(self)
    }

    fn interest_rate(&self) -> Rate {
        Fortnight::interest_rate(self)
    }
}

impl FromStr for Fortnight {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
            LedgerError::InvalidDate {
                message: format!("'{}' is not a YYYY-MM-DD date: {}", s, e),
            }
        })?;
        Fortnight::new(date)
    }
}

impl TryFrom<NaiveDate> for Fortnight {
    type Error = LedgerError;

    fn try_from(date: NaiveDate) -> Result<Self> {
        Fortnight::new(date)
    }
}

impl fmt::Display for Fortnight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_day(), self.end_day())
    }
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).and_then(|first| first.pred_opt())
}
