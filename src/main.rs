use clap::Parser;
use secret_santa::utils::{logger, validation::Validate};
use secret_santa::{CliConfig, CsvRecordSource, FileRecordSink, LocalStorage, SantaPipeline, SantaRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting secret-santa CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let source = CsvRecordSource::new(
        LocalStorage::new("."),
        config.participants.clone(),
        config.prior_pairs.clone(),
    );
    let sink = FileRecordSink::new(
        LocalStorage::new(&config.output_path),
        config.output_path.clone(),
        config.output_formats.clone(),
        config.fields.clone(),
    );
    let runner = SantaRunner::new(SantaPipeline::new(source, sink, config));

    match runner.run().await {
        Ok(report) => {
            println!("✅ Drew {} Secret Santa pairs (seed {})", report.pair_count, report.seed);
            for path in &report.output_paths {
                println!("📁 Output saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Draw failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
