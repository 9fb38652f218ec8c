use chrono::{DateTime, Datelike, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::{LedgerConfig, PrincipalRule, RateSchedule, YearlyInterestMethod};
use crate::decimal::Money;
use crate::errors::{AppendError, LedgerError, Result};
use crate::events::{EventStore, LedgerEvent};
use crate::fortnight::AccrualPeriod;
use crate::interest::{self, FortnightInterest};
use crate::transaction::Transaction;
use crate::types::PassbookId;

/// operations every savings ledger offers
pub trait Ledger {
    /// append in order; items before a failing one stay recorded
    fn add_transactions(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> std::result::Result<usize, AppendError>;

    fn transactions(&self) -> &[Transaction];

    fn balance(&self) -> Money;

    fn balance_on(&self, boundary: DateTime<Utc>) -> Money;

    fn amount_for_fortnight_interest_calculation(&self, period: &dyn AccrualPeriod) -> Money;

    fn interest_for_fortnight(&self, period: &dyn AccrualPeriod) -> Money;

    fn interest_for_year(&self, year: i32) -> Money;
}

/// append-only, chronologically ordered savings ledger
#[derive(Debug, Clone)]
pub struct Passbook {
    id: PassbookId,
    config: LedgerConfig,
    transactions: Vec<Transaction>,
    balance: Money,
    events: EventStore,
}

impl Default for Passbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Passbook {
    /// empty passbook with the default configuration
    pub fn new() -> Self {
        Self::open(Uuid::new_v4(), LedgerConfig::default())
    }

    /// empty passbook with a validated custom configuration
    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::open(Uuid::new_v4(), config))
    }

    /// passbook seeded with `transactions`, each appended through the validated path
    pub fn from_transactions<I>(transactions: I) -> Result<Self>
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut passbook = Self::new();
        passbook.add_transactions(transactions).map_err(|e| e.error)?;
        Ok(passbook)
    }

    pub fn builder() -> PassbookBuilder {
        PassbookBuilder::new()
    }

    fn open(id: PassbookId, config: LedgerConfig) -> Self {
        let mut events = EventStore::new();
        events.emit(LedgerEvent::PassbookOpened { passbook_id: id });

        Self {
            id,
            config,
            transactions: Vec::new(),
            balance: Money::ZERO,
            events,
        }
    }

    pub fn id(&self) -> PassbookId {
        self.id
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// append one transaction
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<()> {
        self.validate_append(&transaction)?;

        self.balance += transaction.amount();
        debug!(
            passbook_id = %self.id,
            transaction_id = %transaction.id(),
            kind = %transaction.kind(),
            amount = %transaction.amount(),
            balance = %self.balance,
            "transaction recorded"
        );
        self.events.emit(LedgerEvent::TransactionRecorded {
            passbook_id: self.id,
            transaction_id: transaction.id(),
            kind: transaction.kind(),
            amount: transaction.amount(),
            balance_after: self.balance,
            created_on: transaction.created_on(),
        });
        self.transactions.push(transaction);

        Ok(())
    }

    /// append transactions one after another
    ///
    /// returns how many were appended. on failure the transactions before the
    /// failing one remain in the passbook and the error reports how many that is.
    pub fn add_transactions<I>(&mut self, transactions: I) -> std::result::Result<usize, AppendError>
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut accepted = 0;
        for transaction in transactions {
            self.add_transaction(transaction)
                .map_err(|error| AppendError { accepted, error })?;
            accepted += 1;
        }
        Ok(accepted)
    }

    fn validate_append(&self, transaction: &Transaction) -> Result<()> {
        let amount = transaction.amount();
        if amount.abs() <= self.config.minimum_amount {
            return Err(LedgerError::InvalidAmount {
                amount,
                minimum: self.config.minimum_amount,
            });
        }

        if let Some(last) = self.transactions.last() {
            if transaction.created_on() < last.created_on() {
                return Err(LedgerError::InvalidTransactionDate {
                    created_on: transaction.created_on(),
                    last: last.created_on(),
                });
            }
        }

        if amount.is_negative() && (self.balance + amount).is_negative() {
            return Err(LedgerError::NegativeBalance {
                balance: self.balance,
                amount,
            });
        }

        Ok(())
    }

    /// recorded transactions in chronological order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    /// sum of every recorded amount, zero when empty
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// balance including every transaction created on or before `boundary`
    pub fn balance_on(&self, boundary: DateTime<Utc>) -> Money {
        interest::balance_on(&self.transactions, boundary)
    }

    /// balance including only transactions created strictly before `boundary`
    pub fn balance_before(&self, boundary: DateTime<Utc>) -> Money {
        interest::balance_before(&self.transactions, boundary)
    }

    pub fn deposits_total(&self) -> Money {
        self.iter()
            .filter(|t| t.is_deposit())
            .map(|t| t.amount())
            .sum()
    }

    pub fn withdrawals_total(&self) -> Money {
        self.iter()
            .filter(|t| t.is_withdrawal())
            .map(|t| t.amount())
            .sum()
    }

    /// interest-bearing principal of `period` under the configured rule
    pub fn amount_for_fortnight_interest_calculation<P>(&self, period: &P) -> Money
    where
        P: AccrualPeriod + ?Sized,
    {
        interest::principal_for(&self.transactions, period, self.config.principal_rule)
    }

    /// `principal * rate / fortnights_per_year`, zero when the principal is not positive
    pub fn interest_for_fortnight<P>(&self, period: &P) -> Money
    where
        P: AccrualPeriod + ?Sized,
    {
        let principal = self.amount_for_fortnight_interest_calculation(period);
        let interest = interest::period_interest(
            principal,
            period.interest_rate(),
            self.config.fortnights_per_year,
        );
        Money::from_decimal(interest)
    }

    /// interest earned over calendar `year` by the configured method
    pub fn interest_for_year(&self, year: i32) -> Money {
        let interest = Money::from_decimal(interest::yearly_interest(
            &self.transactions,
            year,
            &self.config,
        ));
        debug!(passbook_id = %self.id, year, interest = %interest, "yearly interest computed");
        interest
    }

    /// per-fortnight principal, rate and interest for `year`
    pub fn fortnight_breakdown(&self, year: i32) -> Vec<FortnightInterest> {
        interest::fortnight_breakdown(&self.transactions, year, &self.config)
    }

    /// interest of every fortnight of the current year that has already ended
    pub fn interest_to_date(&self, time_provider: &SafeTimeProvider) -> Money {
        let now = time_provider.now();
        let fortnights_per_year = self.config.fortnights_per_year;

        let interest: Decimal = self
            .fortnight_breakdown(now.year())
            .into_iter()
            .filter(|f| f.fortnight.end_date() < now)
            .map(|f| interest::period_interest(f.principal, f.rate, fortnights_per_year))
            .sum();

        Money::from_decimal(interest)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.take_events()
    }

    pub(crate) fn restore(id: PassbookId, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::open(id, config))
    }
}

impl Ledger for Passbook {
    fn add_transactions(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> std::result::Result<usize, AppendError> {
        Passbook::add_transactions(self, transactions)
    }

    fn transactions(&self) -> &[Transaction] {
        Passbook::transactions(self)
    }

    fn balance(&self) -> Money {
        Passbook::balance(self)
    }

    fn balance_on(&self, boundary: DateTime<Utc>) -> Money {
        Passbook::balance_on(self, boundary)
    }

    fn amount_for_fortnight_interest_calculation(&self, period: &dyn AccrualPeriod) -> Money {
        Passbook::amount_for_fortnight_interest_calculation(self, period)
    }

    fn interest_for_fortnight(&self, period: &dyn AccrualPeriod) -> Money {
        Passbook::interest_for_fortnight(self, period)
    }

    fn interest_for_year(&self, year: i32) -> Money {
        Passbook::interest_for_year(self, year)
    }
}

impl<'a> IntoIterator for &'a Passbook {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// builder for passbooks with custom configuration or seed transactions
#[derive(Debug, Default)]
pub struct PassbookBuilder {
    id: Option<PassbookId>,
    config: LedgerConfig,
    transactions: Vec<Transaction>,
}

impl PassbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: PassbookId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn minimum_amount(mut self, minimum: Money) -> Self {
        self.config.minimum_amount = minimum;
        self
    }

    pub fn rates(mut self, rates: RateSchedule) -> Self {
        self.config.rates = rates;
        self
    }

    pub fn principal_rule(mut self, rule: PrincipalRule) -> Self {
        self.config.principal_rule = rule;
        self
    }

    pub fn yearly_method(mut self, method: YearlyInterestMethod) -> Self {
        self.config.yearly_method = method;
        self
    }

    pub fn transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn transactions<I>(mut self, transactions: I) -> Self
    where
        I: IntoIterator<Item = Transaction>,
    {
        self.transactions.extend(transactions);
        self
    }

    /// validate the configuration and replay the seed transactions in order
    pub fn build(self) -> Result<Passbook> {
        self.config.validate()?;

        let mut passbook = Passbook::open(self.id.unwrap_or_else(Uuid::new_v4), self.config);
        passbook
            .add_transactions(self.transactions)
            .map_err(|e| e.error)?;
        Ok(passbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::fortnight::Fortnight;
    use crate::types::TransactionKind;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn tx(amount: i64, created_on: DateTime<Utc>) -> Transaction {
        Transaction::new(Money::from_major(amount), created_on).unwrap()
    }

    fn day(amount: i64, y: i32, m: u32, d: u32) -> Transaction {
        tx(amount, at(y, m, d, 0, 0, 0))
    }

    fn january_9th() -> DateTime<Utc> {
        at(2022, 1, 9, 15, 10, 22)
    }

    fn fortnight(start: &str) -> Fortnight {
        Fortnight::parse(start).unwrap()
    }

    fn john() -> Passbook {
        let mut passbook = Passbook::from_transactions([day(1000, 2021, 12, 1)]).unwrap();
        passbook
            .add_transactions([day(-500, 2022, 11, 7), day(1000, 2022, 11, 13)])
            .unwrap();
        passbook
    }

    fn jane() -> Passbook {
        let mut passbook = Passbook::from_transactions([day(1000, 2021, 12, 1)]).unwrap();
        passbook
            .add_transactions([day(1000, 2022, 1, 23), day(-500, 2022, 12, 24)])
            .unwrap();
        passbook
    }

    #[test]
    fn test_new_passbook_is_empty() {
        let passbook = Passbook::new();
        assert!(passbook.is_empty());
        assert_eq!(passbook.balance(), Money::ZERO);
        assert_eq!(passbook.events().len(), 1);
    }

    #[test]
    fn test_seed_transaction() {
        let passbook = Passbook::from_transactions([tx(1280, january_9th())]).unwrap();

        assert_eq!(passbook.transactions().len(), 1);
        assert_eq!(passbook.balance(), Money::from_major(1280));
    }

    #[test]
    fn test_add_many_transactions() {
        let mut passbook = Passbook::from_transactions([tx(1280, january_9th())]).unwrap();
        let added = passbook
            .add_transactions([tx(720, january_9th()), tx(920, january_9th())])
            .unwrap();

        assert_eq!(added, 2);
        assert_eq!(passbook.len(), 3);
        assert_eq!(passbook.balance(), Money::from_major(2920));
    }

    #[test]
    fn test_balance_with_deposits_and_withdrawal() {
        let mut passbook = Passbook::from_transactions([tx(1280, january_9th())]).unwrap();
        passbook.add_transaction(tx(720, january_9th())).unwrap();
        assert_eq!(passbook.balance(), Money::from_major(2000));

        let mut passbook = Passbook::from_transactions([tx(1280, january_9th())]).unwrap();
        passbook.add_transaction(tx(-280, january_9th())).unwrap();
        assert_eq!(passbook.balance(), Money::from_major(1000));
        assert_eq!(passbook.deposits_total(), Money::from_major(1280));
        assert_eq!(passbook.withdrawals_total(), Money::from_major(-280));
    }

    #[test]
    fn test_overdraw_rejected() {
        let mut passbook = Passbook::from_transactions([tx(1280, january_9th())]).unwrap();
        let err = passbook.add_transaction(tx(-2200, january_9th())).unwrap_err();

        assert!(err.is_invalid_amount());
        assert!(matches!(err, LedgerError::NegativeBalance { .. }));
        assert_eq!(passbook.balance(), Money::from_major(1280));
        assert_eq!(passbook.len(), 1);
    }

    #[test]
    fn test_withdrawing_everything_is_allowed() {
        let mut passbook = Passbook::from_transactions([tx(1280, january_9th())]).unwrap();
        passbook.add_transaction(tx(-1280, january_9th())).unwrap();
        assert_eq!(passbook.balance(), Money::ZERO);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut passbook = Passbook::new();
        passbook.add_transaction(tx(1000, at(2022, 3, 1, 15, 10, 22))).unwrap();

        let err = passbook
            .add_transaction(tx(1000, at(2022, 2, 1, 15, 10, 22)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionDate { .. }));
    }

    #[test]
    fn test_out_of_order_by_time_of_day_rejected() {
        let mut passbook = Passbook::new();
        passbook.add_transaction(tx(1000, at(2022, 3, 1, 15, 10, 22))).unwrap();

        let err = passbook
            .add_transaction(tx(1000, at(2022, 3, 1, 14, 10, 22)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionDate { .. }));

        // same instant is fine
        passbook.add_transaction(tx(1000, at(2022, 3, 1, 15, 10, 22))).unwrap();
    }

    #[test]
    fn test_batch_keeps_earlier_items() {
        let mut passbook = Passbook::new();
        let err = passbook
            .add_transactions([
                tx(500, at(2022, 1, 1, 0, 0, 0)),
                tx(-200, at(2022, 1, 2, 0, 0, 0)),
                tx(-400, at(2022, 1, 3, 0, 0, 0)),
                tx(900, at(2022, 1, 4, 0, 0, 0)),
            ])
            .unwrap_err();

        assert_eq!(err.accepted, 2);
        assert!(matches!(err.error, LedgerError::NegativeBalance { .. }));
        assert_eq!(passbook.len(), 2);
        assert_eq!(passbook.balance(), Money::from_major(300));
    }

    #[test]
    fn test_batch_items_see_earlier_items() {
        let mut passbook = Passbook::new();
        // the withdrawal is only covered by the deposit in the same batch
        let added = passbook
            .add_transactions([tx(500, january_9th()), tx(-450, january_9th())])
            .unwrap();
        assert_eq!(added, 2);

        let err = passbook
            .add_transactions([tx(100, at(2022, 2, 1, 0, 0, 0)), tx(100, at(2022, 1, 31, 0, 0, 0))])
            .unwrap_err();
        assert_eq!(err.accepted, 1);
        assert!(matches!(err.error, LedgerError::InvalidTransactionDate { .. }));
    }

    #[test]
    fn test_balance_on_first_march() {
        let mut passbook = Passbook::new();
        passbook
            .add_transactions([
                tx(500, at(2022, 1, 9, 0, 0, 0)),
                tx(-280, at(2022, 2, 28, 8, 20, 28)),
                tx(1300, at(2022, 3, 8, 1, 19, 49)),
            ])
            .unwrap();

        assert_eq!(passbook.balance_on(at(2022, 3, 1, 0, 0, 0)), Money::from_major(220));
    }

    #[test]
    fn test_balance_on_never_decreases_without_withdrawals() {
        let passbook = jane();
        let mut boundary = at(2021, 11, 1, 0, 0, 0);
        let mut previous = passbook.balance_on(boundary);

        assert_eq!(previous, Money::ZERO);
        while boundary < at(2022, 12, 1, 0, 0, 0) {
            boundary += Duration::days(7);
            let current = passbook.balance_on(boundary);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_amount_for_fortnight_interest_calculation() {
        let mut passbook = john();
        passbook.add_transaction(day(90, 2022, 11, 19)).unwrap();

        assert_eq!(
            passbook.amount_for_fortnight_interest_calculation(&fortnight("2022-11-16")),
            Money::from_major(1500)
        );
        assert_eq!(
            passbook.amount_for_fortnight_interest_calculation(&fortnight("2022-12-01")),
            Money::from_major(1590)
        );
    }

    #[test]
    fn test_amount_for_first_november() {
        let passbook = john();
        assert_eq!(
            passbook.amount_for_fortnight_interest_calculation(&fortnight("2022-11-01")),
            Money::from_major(500)
        );
    }

    #[test]
    fn test_interest_for_fortnight() {
        let passbook = john();

        assert_eq!(
            passbook.interest_for_fortnight(&fortnight("2022-11-01")),
            Money::from_str_exact("0.41666667").unwrap()
        );
        assert_eq!(
            passbook.interest_for_fortnight(&fortnight("2022-12-01")),
            Money::from_str_exact("1.25").unwrap()
        );
    }

    #[test]
    fn test_no_interest_before_first_deposit() {
        let passbook = john();
        assert_eq!(passbook.interest_for_fortnight(&fortnight("2021-11-16")), Money::ZERO);
    }

    #[test]
    fn test_interest_for_year() {
        assert_eq!(john().interest_for_year(2022), Money::from_major(15));
        assert_eq!(jane().interest_for_year(2022), Money::from_str_exact("27.08333333").unwrap());
        assert_eq!(jane().interest_for_year(2023), Money::from_major(30));
    }

    #[test]
    fn test_interest_for_year_per_transaction() {
        let passbook = Passbook::builder()
            .yearly_method(YearlyInterestMethod::PerTransaction)
            .transactions([day(1000, 2021, 12, 1), day(-500, 2022, 11, 7), day(1000, 2022, 11, 13)])
            .build()
            .unwrap();

        assert_eq!(passbook.interest_for_year(2022), Money::from_str_exact("0.83333333").unwrap());
        assert_eq!(passbook.interest_for_year(2021), Money::from_str_exact("0.41666667").unwrap());
    }

    #[test]
    fn test_through_ledger_trait() {
        let mut ledger: Box<dyn Ledger> = Box::new(Passbook::new());
        ledger
            .add_transactions(vec![day(1000, 2021, 12, 1), day(-500, 2022, 11, 7)])
            .unwrap();

        let nov_1 = fortnight("2022-11-01");
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.balance(), Money::from_major(500));
        assert_eq!(ledger.amount_for_fortnight_interest_calculation(&nov_1), Money::from_major(500));
        assert_eq!(
            ledger.interest_for_fortnight(&nov_1),
            Money::from_str_exact("0.41666667").unwrap()
        );
    }

    #[test]
    fn test_builder_with_custom_rates() {
        let passbook = Passbook::builder()
            .rates(RateSchedule::flat(Rate::from_percentage(3)))
            .minimum_amount(Money::from_major(50))
            .transaction(day(2400, 2023, 1, 1))
            .build()
            .unwrap();

        // 2400 * 3% over 24 fortnights, the deposit earns from 2023-01-16
        assert_eq!(passbook.interest_for_year(2023), Money::from_major(69));
    }

    #[test]
    fn test_config_minimum_enforced_on_append() {
        let mut passbook = Passbook::builder()
            .minimum_amount(Money::from_major(50))
            .build()
            .unwrap();

        let err = passbook.add_transaction(day(40, 2023, 1, 1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_minimum_below_ten_rejected() {
        let result = Passbook::builder().minimum_amount(Money::ZERO).build();
        assert!(matches!(result, Err(LedgerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LedgerConfig {
            fortnights_per_year: 0,
            ..LedgerConfig::default()
        };
        assert!(matches!(
            Passbook::with_config(config),
            Err(LedgerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_events_record_accepted_items_only() {
        let mut passbook = Passbook::new();
        passbook.take_events();

        passbook.add_transaction(tx(1000, january_9th())).unwrap();
        let _ = passbook.add_transaction(tx(-5000, january_9th()));

        let events = passbook.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            LedgerEvent::TransactionRecorded { kind, balance_after, .. } => {
                assert_eq!(*kind, TransactionKind::Deposit);
                assert_eq!(*balance_after, Money::from_major(1000));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_interest_to_date() {
        let time = SafeTimeProvider::new(TimeSource::Test(at(2022, 1, 20, 12, 0, 0)));
        let control = time.test_control().unwrap();
        let passbook = jane();

        // only 2022-01-01 has ended
        assert_eq!(passbook.interest_to_date(&time), Money::from_str_exact("0.41666667").unwrap());

        control.advance(Duration::days(365));
        assert_eq!(passbook.interest_to_date(&time), Money::from_str_exact("1.25").unwrap());
    }
}
