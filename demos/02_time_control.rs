/// time control - deterministic accrual with controlled time
use chrono::{Duration, TimeZone, Utc};
use savings_passbook::{Fortnight, Money, Passbook, SafeTimeProvider, TimeSource, Transaction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2022, 1, 3, 10, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let mut passbook = Passbook::new();
    passbook.add_transaction(Transaction::stamped(Money::from_major(2400), &time)?)?;
    println!("deposit on {}", time.now().format("%Y-%m-%d"));

    for _ in 0..6 {
        controller.advance(Duration::days(30));
        println!(
            "{}  current fortnight {}  interest to date {}",
            time.now().format("%Y-%m-%d"),
            Fortnight::current(&time)?,
            passbook.interest_to_date(&time).round_dp(2)
        );
    }

    passbook.add_transaction(Transaction::stamped(Money::from_major(-400), &time)?)?;
    println!("\nwithdrawal on {}, balance {}", time.now().format("%Y-%m-%d"), passbook.balance());

    Ok(())
}
