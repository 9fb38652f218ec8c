/// quick start - a passbook, a few movements and the interest they earn
use savings_passbook::{Fortnight, Money, Passbook, Transaction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut passbook = Passbook::from_transactions([
        Transaction::parse(Money::from_major(1000), "2021-12-01")?,
    ])?;

    passbook.add_transactions([
        Transaction::parse(Money::from_major(-500), "2022-11-07")?,
        Transaction::parse(Money::from_major(1000), "2022-11-13")?,
    ])?;

    let november = Fortnight::parse("2022-11-01")?;
    println!("balance: {}", passbook.balance());
    println!(
        "principal for {}: {}",
        november,
        passbook.amount_for_fortnight_interest_calculation(&november)
    );
    println!("interest for {}: {}", november, passbook.interest_for_fortnight(&november));
    println!("interest for 2022: {}", passbook.interest_for_year(2022).round_dp(2));

    Ok(())
}
