//! Compare survival rates of female and male passengers.
//!
//! `cargo run --example survival -- [path] [alpha]`
use homogeneity::{render, FieldValue, HomogeneityTest, Population, Record, TestConfig};
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("resources/passengers.csv");
    let alpha = match args.get(2) {
        Some(a) => Some(a.parse::<f64>()?),
        None => None,
    };

    let group_name = "sex";
    let target_name = "survived";

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let group_index = headers
        .iter()
        .position(|h| h == group_name)
        .ok_or("group column not found")?;
    let target_index = headers
        .iter()
        .position(|h| h == target_name)
        .ok_or("target column not found")?;

    let mut female = Population::default();
    let mut male = Population::default();
    for result in csv_reader.records() {
        let record = result?;

        // Empty cells stay null so the test reports them.
        let target_str = &record[target_index];
        let value = if target_str.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Int(target_str.parse::<i64>()?)
        };
        let mut row = Record::new();
        row.insert(target_name.to_string(), value);

        match &record[group_index] {
            "female" => female.push(row),
            "male" => male.push(row),
            _ => continue,
        }
    }

    let cfg = match alpha {
        Some(a) => TestConfig::from_alpha(target_name, a)?,
        None => TestConfig::new(target_name),
    };
    let test = HomogeneityTest::with_config(&["female", "male"], &[&female, &male], cfg)?;
    let run = test.run()?;

    println!("{}", render(&run));

    Ok(())
}
