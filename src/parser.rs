use crate::error::{Error, Result};
use crate::expense::Expense;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::{fmt::Display, io, path::Path, str::FromStr};

use serde::{Deserialize, Deserializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| Error::MalformedInput(format!("date {:?} is not YYYY-MM-DD: {}", input, e)))
}

pub fn parse_amount(input: &str) -> Result<f64> {
    let input = input.trim();
    let amount = input
        .parse::<f64>()
        .map_err(|e| Error::MalformedInput(format!("amount {:?}: {}", input, e)))?;
    check_finite(amount)
}

pub fn check_finite(amount: f64) -> Result<f64> {
    if !amount.is_finite() {
        return Err(Error::MalformedInput(format!(
            "amount {} is not a finite number",
            amount
        )));
    }
    Ok(amount)
}

#[derive(Debug, Deserialize)]
struct ExpenseRecord {
    date: NaiveDate,
    category: String,
    #[serde(deserialize_with = "arbitrary_amount")]
    amount: f64,
}

/// Reads `date,category,amount` CSV rows.
pub struct Parser {}

impl Parser {
    /// Rows that do not describe a valid expense are skipped with a warning.
    pub fn parse<R: io::Read>(reader: R) -> Result<Vec<Expense>> {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut result = Vec::new();
        for (index, r) in rdr.deserialize::<ExpenseRecord>().enumerate() {
            let record = match r {
                Err(err) => {
                    log::warn!("skipping expense row {}: {}", index + 1, err);
                    continue;
                }
                Ok(record) => record,
            };
            match check_finite(record.amount) {
                Err(err) => log::warn!("skipping expense row {}: {}", index + 1, err),
                Ok(amount) => result.push(Expense::new(record.date, record.category, amount)),
            }
        }
        Ok(result)
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Expense>> {
        let file = std::fs::File::open(path)?;
        Parser::parse(io::BufReader::new(file))
    }
}

pub fn write_expenses<W: io::Write>(expenses: &[Expense], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for expense in expenses {
        wtr.serialize(expense)?;
    }
    // Serializing no records writes no header.
    if expenses.is_empty() {
        wtr.write_record(["date", "category", "amount"])?;
    }
    wtr.flush()?;

    Ok(())
}

pub fn write_expenses_file<P: AsRef<Path>>(expenses: &[Expense], path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_expenses(expenses, io::BufWriter::new(file))
}

pub fn arbitrary_amount<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    <T as FromStr>::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount<T> {
        Number(T),
        String(String),
    }

    match Amount::<T>::deserialize(deserializer)? {
        Amount::String(s) if s.is_empty() => Err(serde::de::Error::custom("amount is empty")),
        Amount::Number(i) => Ok(i),
        Amount::String(s) => s.parse::<T>().map_err(serde::de::Error::custom),
    }
}
