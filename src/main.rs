use clap::Parser;
use dsi_flow_etl::utils::{logger, validation::Validate};
use dsi_flow_etl::{CliConfig, DsiPipeline, EtlEngine, EtlError, LocalStorage, YearbookTextLoader};

fn report_failure(e: &EtlError) -> i32 {
    tracing::error!(
        "❌ Extraction failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    e.exit_code()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse().normalize();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting dsi-flow-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match DsiPipeline::new(storage, config, YearbookTextLoader::new()) {
        Ok(pipeline) => pipeline,
        Err(e) => std::process::exit(report_failure(&e)),
    };

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
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
