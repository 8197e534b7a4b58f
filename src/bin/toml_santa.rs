use clap::Parser;
use secret_santa::config::toml_config::TomlConfig;
use secret_santa::core::Pipeline;
use secret_santa::domain::{ports::ConfigProvider, services};
use secret_santa::utils::{logger, validation::Validate};
use secret_santa::{
    AssignmentEngine, CsvRecordSource, FileRecordSink, LocalStorage, SantaPipeline, SantaRunner,
};

#[derive(Parser)]
#[command(name = "toml-santa")]
#[command(about = "Secret Santa draw driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "santa.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Check the inputs and feasibility without drawing or writing files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(seed) = args.seed {
        config.engine.seed = Some(seed);
        tracing::info!("🔧 Seed overridden to: {}", seed);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let source = CsvRecordSource::new(
        LocalStorage::new("."),
        config.source.participants_file.clone(),
        config.source.prior_pairs_file.clone(),
    );
    let mut sink = FileRecordSink::new(
        LocalStorage::new(config.output_path()),
        config.output_path().to_string(),
        config.load.output_formats.clone(),
        config.fields.clone(),
    );
    if let Some(stem) = config.file_stem() {
        sink = sink.with_file_stem(stem);
    }
    let dry_run_config = config.clone();
    let pipeline = SantaPipeline::new(source, sink, config);

    let outcome = if args.dry_run {
        perform_dry_run(&pipeline, &dry_run_config).await
    } else {
        SantaRunner::new(pipeline).run().await.map(|report| {
            println!("✅ Drew {} pairs (seed {})", report.pair_count, report.seed);
            for path in &report.output_paths {
                println!("📁 Output saved to: {}", path);
            }
        })
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Draw failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Draw: {}", config.draw.name);
    if let Some(description) = &config.draw.description {
        println!("  Description: {}", description);
    }
    println!("  Participants: {}", config.participants_file());
    println!(
        "  Prior pairs: {}",
        config.prior_pairs_file().unwrap_or("(none)")
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    match config.seed() {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: random"),
    }
    println!(
        "  Attempts: {}, budget factor: {}",
        config.max_attempts(),
        config.budget_factor()
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(
    pipeline: &impl Pipeline,
    config: &TomlConfig,
) -> secret_santa::Result<()> {
    println!("🔍 Dry Run Analysis:");

    let input = pipeline.extract().await?;
    let participants = services::participants_from_records(&input.participants, &config.fields)?;
    let forbidden = services::forbidden_pairs_from_records(&input.prior_pairs, &config.fields)?;
    println!("  Participants: {}", participants.len());
    println!("  Prior pairs: {}", forbidden.len());

    AssignmentEngine::default().check_feasibility(&participants, &forbidden)?;

    println!();
    println!("✅ A valid draw exists. Run without --dry-run to draw and write files.");
    Ok(())
}
