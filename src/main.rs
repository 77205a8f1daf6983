//! Claims Analytics CLI
//!
//! Runs the hypothesis-testing flow end to end: load the claims file,
//! clean it, derive risk metrics, run the named test battery, and print
//! the interpreted report.

use anyhow::Context;
use claims_analytics::dataset::{clean, load_claims, CleanOptions, Delimiter, LoaderOptions};
use claims_analytics::metrics::with_risk_metrics;
use claims_analytics::stats::{interpret_all, run_all_risk_tests};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DelimiterArg {
    Pipe,
    Tab,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Pipe => Delimiter::Pipe,
            DelimiterArg::Tab => Delimiter::Tab,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "claims_analytics",
    about = "Risk hypothesis testing over a delimited insurance claims dataset"
)]
struct Args {
    /// Path to the delimited claims data file
    data: PathBuf,

    /// Field delimiter of the input file
    #[arg(long, value_enum, default_value_t = DelimiterArg::Pipe)]
    delimiter: DelimiterArg,

    /// Column parsed into dates during cleaning
    #[arg(long, default_value = "TransactionMonth")]
    date_column: String,

    /// Also write the interpreted report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Claims Analytics v0.1.0");
    println!("=======================\n");

    let start = Instant::now();
    let loader_options = LoaderOptions {
        delimiter: args.delimiter.into(),
    };
    let dataset = load_claims(&args.data, &loader_options)
        .with_context(|| format!("loading {}", args.data.display()))?;
    println!(
        "Loaded {} rows x {} columns in {:?}",
        dataset.n_rows(),
        dataset.n_columns(),
        start.elapsed()
    );

    let clean_options = CleanOptions {
        date_column: args.date_column.clone(),
    };
    let dataset = clean(dataset, &clean_options).context("cleaning dataset")?;
    let dataset = with_risk_metrics(dataset).context("deriving risk metrics")?;

    let results = run_all_risk_tests(&dataset).context("running hypothesis tests")?;
    let interpretations = interpret_all(&results);

    for interpretation in &interpretations {
        println!("\n{} TEST RESULTS:", interpretation.name.to_uppercase());
        println!("P-value: {:.4}", interpretation.p_value);
        println!("Test Statistic: {:.4}", interpretation.statistic);
        println!("Decision: {} null hypothesis", interpretation.decision());
        println!(
            "Business Implication: {}",
            interpretation.business_implication
        );
    }

    if let Some(json_path) = &args.json {
        let file = File::create(json_path)
            .with_context(|| format!("creating {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &interpretations)
            .context("writing JSON report")?;
        println!("\nReport written to: {}", json_path.display());
    }

    Ok(())
}
