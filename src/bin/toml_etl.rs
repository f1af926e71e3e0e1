use clap::Parser;
use dsi_flow_etl::config::toml_config::TomlConfig;
use dsi_flow_etl::core::pipeline::discover_yearbooks;
use dsi_flow_etl::core::ConfigProvider;
use dsi_flow_etl::utils::{logger, validation::Validate};
use dsi_flow_etl::{DsiPipeline, EtlEngine, EtlError, LocalStorage, YearbookTextLoader};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Yearbook extraction driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dsi-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code().max(1));
        }
    };

    let verbose = args.verbose || config.verbose_logging();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based yearbook extraction");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = DsiPipeline::new(storage, config, YearbookTextLoader::new())?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Extraction completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Extraction completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e @ EtlError::NoRecords { .. }) => {
            tracing::warn!("⚠️ {}; no file written", e);
            println!("⚠️ {}", e.user_friendly_message());
        }
        Err(e) => {
            tracing::error!(
                "❌ Extraction failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("-")
    );
    println!("  Input: {}", config.input_dir().display());
    println!("  Output: {}/{}", config.output_path(), config.output_file());
    if config.years().is_empty() {
        println!("  Years: all dsi_<year> files");
    } else {
        let years: Vec<String> = config.years().iter().map(|y| y.to_string()).collect();
        println!("  Years: {}", years.join(", "));
    }
    println!("  Concurrent Files: {}", config.concurrent_files());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📚 Yearbooks:");
    if config.years().is_empty() {
        match discover_yearbooks(config.input_dir()) {
            Ok(found) if !found.is_empty() => {
                for yearbook in found {
                    println!("  {} -> {}", yearbook.year, yearbook.path.display());
                }
            }
            Ok(_) => println!("  ⚠️ No dsi_<year>.pdf or .txt files found"),
            Err(e) => println!("  ❌ {}", e.user_friendly_message()),
        }
    } else {
        for &year in config.years() {
            let candidates = config.yearbook_candidates(year);
            match candidates.iter().find(|p| p.is_file()) {
                Some(path) => println!("  {} -> {}", year, path.display()),
                None => println!("  {} -> ❌ missing", year),
            }
        }
    }

    println!();
    println!("🎯 Stations:");
    if config.target_stations().is_empty() {
        println!("  Built-in station list");
    } else {
        println!("  {}", config.target_stations().join(", "));
    }
    println!("  Header window: {} lines", config.header_window());

    let options = config.post_process();
    println!();
    println!("🛠️ Post-processing:");
    if !options.any() {
        println!("  (none)");
    }
    if options.annual_averages {
        println!("  ✅ Annual averages");
    }
    if options.correct_outliers {
        println!("  ✅ Outlier correction (mean ± 3 std -> median)");
    }
    if options.fill_gaps {
        println!("  ✅ Gap filling per station");
    }
    if let Some((lat, lon)) = options.reference_point {
        println!("  ✅ Distance from ({}, {})", lat, lon);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
