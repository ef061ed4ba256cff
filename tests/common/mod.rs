use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 6] = [
    "type",
    "amount",
    "category",
    "description",
    "date",
    "payment_method",
];

/// `rows` debit groceries of 1,00 each, all in March 2024.
pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;

    for i in 1..=rows {
        wtr.write_record([
            "expense",
            "1,00",
            "Food",
            &format!("Groceries #{i}"),
            "2024-03-10",
            "debit",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// A random mix of income, debit and credit expenses.
pub fn generate_random_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let cents: u32 = rng.gen_range(1..=500_000);
        let amount = format!("{}.{:02}", cents / 100, cents % 100);
        let day: u32 = rng.gen_range(1..=28);
        let date = format!("2024-03-{day:02}");
        let (kind, category, method) = match rng.gen_range(0..3) {
            0 => ("income", "Salary", ""),
            1 => ("expense", "Food", "debit"),
            _ => ("expense", "Shopping", "credit"),
        };
        wtr.write_record([kind, &amount, category, "", &date, method])?;
    }

    wtr.flush()?;
    Ok(())
}
