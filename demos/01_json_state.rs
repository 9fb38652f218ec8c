/// json state - statements, snapshots and restore
use savings_passbook::{Money, Passbook, PassbookSnapshot, Transaction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state serialization ===\n");

    let passbook = Passbook::builder()
        .transaction(Transaction::parse(Money::from_major(1000), "2021-12-01")?)
        .transaction(Transaction::parse(Money::from_major(1000), "2022-01-23")?)
        .transaction(Transaction::parse(Money::from_major(-500), "2022-12-24")?)
        .build()?;

    println!("view");
    println!("----");
    println!("{}\n", passbook.json());

    println!("2022 statement");
    println!("--------------");
    for line in passbook.fortnight_breakdown(2022) {
        println!(
            "{}  principal {:>8}  rate {:>6}  interest {}",
            line.fortnight,
            line.principal,
            line.rate,
            line.interest.round_dp(2)
        );
    }

    let json = passbook.to_snapshot().to_json()?;
    println!("\nsnapshot: {}\n", json);

    let restored = Passbook::from_snapshot(PassbookSnapshot::from_json(&json)?)?;
    println!("restored balance: {}", restored.balance());
    println!("restored 2022 interest: {}", restored.interest_for_year(2022).round_dp(2));

    Ok(())
}
