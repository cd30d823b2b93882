use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Write a synthetic app catalog in the Play Store export layout.
#[derive(Debug, Parser)]
#[command(name = "generate-sample", version)]
struct Args {
    /// Number of apps to generate.
    #[arg(long, default_value_t = 5_000)]
    rows: usize,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path; `.csv` or `.parquet`.
    #[arg(short, long, default_value = "sample_playstore.csv")]
    output: PathBuf,
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

const CATEGORIES: &[&str] = &[
    "Education", "Music & Audio", "Tools", "Business", "Entertainment", "Books & Reference",
    "Lifestyle", "Personalization", "Health & Fitness", "Productivity", "Shopping",
    "Communication", "Travel & Local", "Finance", "Social", "Strategy", "Adventure", "Word",
    "Puzzle", "Simulation", "Role Playing", "Action", "Casual", "Racing", "Sports", "Arcade",
    "Card", "Music", "Trivia",
];

const CONTENT_RATINGS: &[&str] = &["Everyone", "Teen", "Mature 17+", "Everyone 10+", "Adults only 18+"];

/// Play Store install buckets ("1+", "10+", ... "10,000,000,000+").
const INSTALL_BUCKETS: &[u64] = &[
    1, 5, 10, 50, 100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
    5_000_000, 10_000_000, 50_000_000, 100_000_000, 500_000_000, 1_000_000_000,
    5_000_000_000, 10_000_000_000,
];

#[derive(Debug, Serialize)]
struct SampleApp {
    #[serde(rename = "App Name")]
    name: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Rating")]
    rating: f64,
    #[serde(rename = "Minimum Installs")]
    min_installs: i64,
    #[serde(rename = "Maximum Installs")]
    max_installs: i64,
    #[serde(rename = "Free")]
    free: bool,
    #[serde(rename = "Content Rating")]
    content_rating: String,
}

fn generate(rows: usize, rng: &mut StdRng) -> Vec<SampleApp> {
    (0..rows)
        .map(|i| {
            // Skew towards small buckets, like the real catalog.
            let u = rng.random::<f64>();
            let bucket = ((u * u * u) * INSTALL_BUCKETS.len() as f64) as usize;
            let min_installs = INSTALL_BUCKETS[bucket.min(INSTALL_BUCKETS.len() - 1)];
            let max_installs = min_installs + (rng.random::<f64>() * min_installs as f64 * 4.0) as u64;

            // Roughly half of the catalog is unrated.
            let rating = if rng.random::<f64>() < 0.45 {
                0.0
            } else {
                (10.0 + rng.random::<f64>() * 40.0).round() / 10.0
            };

            SampleApp {
                name: format!("Sample App {i:05}"),
                category: pick(rng, CATEGORIES).to_string(),
                rating,
                min_installs: min_installs as i64,
                max_installs: max_installs as i64,
                free: rng.random::<f64>() < 0.97,
                content_rating: pick(rng, CONTENT_RATINGS).to_string(),
            }
        })
        .collect()
}

fn write_csv(path: &Path, apps: &[SampleApp]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for app in apps {
        writer.serialize(app).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, apps: &[SampleApp]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("App Name", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
        Field::new("Rating", DataType::Float64, false),
        Field::new("Minimum Installs", DataType::Int64, false),
        Field::new("Maximum Installs", DataType::Int64, false),
        Field::new("Free", DataType::Boolean, false),
        Field::new("Content Rating", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(apps.iter().map(|a| a.name.as_str()))),
            Arc::new(StringArray::from_iter_values(apps.iter().map(|a| a.category.as_str()))),
            Arc::new(Float64Array::from_iter_values(apps.iter().map(|a| a.rating))),
            Arc::new(Int64Array::from_iter_values(apps.iter().map(|a| a.min_installs))),
            Arc::new(Int64Array::from_iter_values(apps.iter().map(|a| a.max_installs))),
            Arc::new(BooleanArray::from(apps.iter().map(|a| a.free).collect::<Vec<_>>())),
            Arc::new(StringArray::from_iter_values(
                apps.iter().map(|a| a.content_rating.as_str()),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let apps = generate(args.rows, &mut rng);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &apps)?,
        "parquet" | "pq" => write_parquet(&args.output, &apps)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    log::info!("Wrote {} apps to {}", apps.len(), args.output.display());
    println!("Wrote {} apps to {}", apps.len(), args.output.display());
    Ok(())
}
