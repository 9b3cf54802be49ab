//! Generates synthetic CSV datasets for local runs.
//!
//! Run with: `cargo run --bin create-demo-data`

use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📊 Creating demo data...");
    println!();

    let data_dir = Path::new("./data");
    fs::create_dir_all(data_dir)?;
    println!("✓ Data directory ready");
    println!();

    write_disasters(&data_dir.join("disaster_data.csv"))?;
    write_agriculture(&data_dir.join("agriculture_data.csv"))?;
    write_salaries(&data_dir.join("data_science_job_salaries.csv"))?;

    println!();
    println!("✨ Demo data created successfully!");
    println!();
    println!("You can now:");
    println!("  • Start the server: cargo run --bin agrodash-server");
    println!("  • Query the API: curl 'http://localhost:3000/report?start=2020&end=2024'");

    Ok(())
}

fn write_disasters(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["ISO", "Start Year", "Disaster Type", "Total Affected"])?;

    let countries = ["BRA", "USA", "ARG", "IND", "AUS"];
    let disaster_types = ["Flood", "Drought", "Storm", "Wildfire"];

    let mut count = 0;
    for year in 2020..=2024 {
        for country in &countries {
            // A few events per country and year
            for _ in 0..3 {
                let kind = rand::pick(&disaster_types);
                let affected = (rand::random::<f64>() * 250_000.0) as u64;
                writer.write_record([
                    country.to_string(),
                    year.to_string(),
                    kind.to_string(),
                    affected.to_string(),
                ])?;
                count += 1;
            }
        }
    }
    writer.flush()?;

    println!("  ✓ disaster_data.csv: {} rows", count);
    Ok(())
}

fn write_agriculture(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["farm_location", "sale_date", "product_name", "units_shipped_kg"])?;

    // Overlaps the disaster countries only partially, so the outer join
    // has one-sided locations to show.
    let locations = ["BRA", "ARG", "AUS", "FRA"];
    let products = ["Soy", "Wheat", "Corn", "Rice", "Coffee"];

    let mut count = 0;
    for year in 2020..=2024 {
        for location in &locations {
            for _ in 0..6 {
                let month = 1 + (rand::random::<f64>() * 11.0) as u32;
                let day = 1 + (rand::random::<f64>() * 27.0) as u32;
                let product = rand::pick(&products);
                let units = 50.0 + rand::random::<f64>() * 4_950.0;
                writer.write_record([
                    location.to_string(),
                    format!("{:04}-{:02}-{:02}", year, month, day),
                    product.to_string(),
                    format!("{:.1}", units),
                ])?;
                count += 1;
            }
        }
    }
    writer.flush()?;

    println!("  ✓ agriculture_data.csv: {} rows", count);
    Ok(())
}

fn write_salaries(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["work_year", "experience_level", "job_title", "salary_in_usd"])?;

    let levels = [("EN", 60_000.0), ("MI", 90_000.0), ("SE", 130_000.0), ("EX", 180_000.0)];
    // More than six titles, so the distribution view gets an overflow slice.
    let titles = [
        "Data Scientist",
        "Data Analyst",
        "Data Engineer",
        "Machine Learning Engineer",
        "Analytics Engineer",
        "Research Scientist",
        "BI Developer",
        "Data Architect",
        "MLOps Engineer",
    ];

    let mut count = 0;
    for year in 2020..=2024 {
        for _ in 0..40 {
            let (level, base) = rand::pick(&levels);
            let title = rand::pick(&titles);
            // +/- 30% around the level's base salary
            let salary = base * (0.7 + rand::random::<f64>() * 0.6);
            writer.write_record([
                year.to_string(),
                level.to_string(),
                title.to_string(),
                format!("{:.0}", salary),
            ])?;
            count += 1;
        }
    }
    writer.flush()?;

    println!("  ✓ data_science_job_salaries.csv: {} rows", count);
    Ok(())
}

// Simple pseudo-random number generator
mod rand {
    use std::cell::Cell;
    use std::time::{SystemTime, UNIX_EPOCH};

    thread_local! {
        static SEED: Cell<u64> = Cell::new(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos() as u64
        );
    }

    pub fn random<T: FromRandom>() -> T {
        T::from_random()
    }

    /// Picks a uniformly random element of a non-empty slice.
    pub fn pick<T>(items: &[T]) -> &T {
        let idx = (random::<f64>() * items.len() as f64) as usize;
        &items[idx.min(items.len() - 1)]
    }

    pub trait FromRandom {
        fn from_random() -> Self;
    }

    impl FromRandom for f64 {
        fn from_random() -> Self {
            SEED.with(|seed| {
                let mut s = seed.get();
                s ^= s << 13;
                s ^= s >> 7;
                s ^= s << 17;
                seed.set(s);
                (s as f64) / (u64::MAX as f64)
            })
        }
    }
}
