use anyhow::{Context, Result};
use clap::Parser;
use dsi_flow_etl::core::PostProcessOptions;
use dsi_flow_etl::extract::csv_codec::{read_records, write_records};
use dsi_flow_etl::transform::post_process;
use dsi_flow_etl::utils::logger;
use dsi_flow_etl::utils::validation::validate_reference_point;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dsi-postprocess")]
#[command(about = "Apply averages, outlier correction, gap filling and distances to a records CSV")]
struct Args {
    /// Records CSV written by dsi-flow-etl
    input: PathBuf,

    /// Output CSV (defaults to <input>_processed.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    annual_averages: bool,

    #[arg(long)]
    correct_outliers: bool,

    #[arg(long)]
    fill_gaps: bool,

    #[arg(long, allow_hyphen_values = true)]
    reference_lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    reference_lon: Option<f64>,

    /// Write the outlier and gap-filling summary as JSON next to the output
    #[arg(long)]
    report: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn default_output(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "records".to_string());
    input.with_file_name(format!("{}_processed.csv", stem))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let options = PostProcessOptions {
        annual_averages: args.annual_averages,
        correct_outliers: args.correct_outliers,
        fill_gaps: args.fill_gaps,
        reference_point: validate_reference_point(args.reference_lat, args.reference_lon)?,
    };
    if !options.any() {
        anyhow::bail!(
            "Nothing to do: pass --annual-averages, --correct-outliers, --fill-gaps or --reference-lat/--reference-lon"
        );
    }

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut records = read_records(BufReader::new(file))
        .with_context(|| format!("Failed to read records from {}", args.input.display()))?;
    tracing::info!("📁 Loaded {} records from {}", records.len(), args.input.display());

    let summary = post_process(&mut records, &options);

    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let writer = BufWriter::new(
        File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    write_records(writer, &records).context("Failed to write processed CSV")?;

    if args.report {
        let report_path = output.with_extension("report.json");
        let report = serde_json::json!({
            "input": args.input.display().to_string(),
            "records": records.len(),
            "outlier_corrections": summary.corrections,
            "filled_per_station": summary.filled_per_station,
            "distances_computed": summary.distances_computed,
        });
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        tracing::info!("📝 Report written to {}", report_path.display());
    }

    tracing::info!("✅ {} records written to {}", records.len(), output.display());
    println!("✅ Output saved to: {}", output.display());
    Ok(())
}
