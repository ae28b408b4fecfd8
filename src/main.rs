use clap::Parser;
use qif_etl::config::toml_config::TomlConfig;
use qif_etl::utils::{logger, validation::Validate};
use qif_etl::{CliConfig, EtlEngine, LocalStorage, StatementPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting qif-etl");
    if let Some(path) = &args.config {
        tracing::info!("📁 Loading configuration from: {}", path);
    }

    let config = match args.resolve().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    if args.dry_run {
        print_plan(&config);
        return Ok(());
    }

    let storage = LocalStorage::default();
    let pipeline = StatementPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Conversion completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
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
            Ok(())
        }
    }
}

fn print_plan(config: &TomlConfig) {
    let source = config
        .source
        .path
        .as_deref()
        .or(config.source.url.as_deref())
        .unwrap_or("-");

    println!("🔍 Dry run, nothing will be written");
    println!("  Source:      {} ({:?})", source, config.source.r#type);
    println!(
        "  Account:     {} [{}]",
        config.account.name, config.account.r#type
    );
    println!(
        "  Date column: {} ({})",
        config.mapping.date, config.mapping.date_format
    );
    println!(
        "  Output:      {}/{}",
        config.load.output_path, config.load.filename
    );
    if let Some(compression) = config.load.compression.as_ref().filter(|c| c.enabled) {
        println!("  Archive:     {}", compression.filename);
    }
    println!(
        "  Invalid rows: {:?}",
        config.error_handling.on_invalid_row
    );
}
