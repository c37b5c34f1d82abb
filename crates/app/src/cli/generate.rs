use std::path::PathBuf;

use clap::Args;
use csv::Writer;
use jiff::{SignedDuration, Timestamp};
use rand::{Rng, seq::SliceRandom};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct GenerateArgs {
    /// Number of product rows to write
    #[arg(long, default_value_t = 100_000)]
    rows: usize,

    /// Category UUIDs to assign products to; repeat for several
    #[arg(long = "category", required = true)]
    categories: Vec<Uuid>,

    /// Leave the Id column empty so every row is inserted as new
    #[arg(long)]
    without_ids: bool,

    /// Destination CSV path
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GeneratedRow {
    id: Option<Uuid>,
    name: String,
    description: String,
    price: Decimal,
    inventory_level: u32,
    category_id: Uuid,
    image_url: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

pub(crate) fn run(args: &GenerateArgs) -> Result<(), String> {
    let mut writer = Writer::from_path(&args.output)
        .map_err(|error| format!("failed to create {}: {error}", args.output.display()))?;

    let mut rng = rand::thread_rng();
    let now = Timestamp::now();

    for n in 1..=args.rows {
        let category = args
            .categories
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| "at least one category is required".to_string())?;

        let age = SignedDuration::from_hours(24 * rng.gen_range(0..100));
        let created_at = now
            .checked_sub(age)
            .map_err(|error| format!("failed to compute timestamp: {error}"))?;

        writer
            .serialize(GeneratedRow {
                id: (!args.without_ids).then(Uuid::now_v7),
                name: format!("Product {n}"),
                description: format!("Description for product {n}"),
                price: Decimal::new(rng.gen_range(100..10_000), 2),
                inventory_level: rng.gen_range(1..500),
                category_id: category,
                image_url: format!("https://example.com/images/product{n}.jpg"),
                created_at,
                updated_at: created_at,
            })
            .map_err(|error| format!("failed to write row {n}: {error}"))?;
    }

    writer
        .flush()
        .map_err(|error| format!("failed to flush {}: {error}", args.output.display()))?;

    println!("wrote {} rows to {}", args.rows, args.output.display());

    Ok(())
}
