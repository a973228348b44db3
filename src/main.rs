use clap::Parser;
use fare_squirrel::utils::{logger, validation::Validate};
use fare_squirrel::{sample_once, CliArgs, SquirrelConfig, SquirrelError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_json);

    println!("Starting script...");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match SquirrelConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(e);
    }

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no request is sent and nothing is written");
        display_config_summary(&config);
        return;
    }

    match sample_once(&config).await {
        Ok(output_path) => {
            tracing::info!("✅ Sample recorded in {}", output_path);
            println!("Successfully wrote line into csv file...");
        }
        Err(e) => fail(e),
    }
}

fn fail(e: SquirrelError) -> ! {
    tracing::error!(
        "❌ Sampling failed: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn display_config_summary(config: &SquirrelConfig) {
    println!("📋 Configuration Summary:");
    println!("  Product: {}", config.ride.product_name);
    println!("  Ride API: {}", config.ride.base_url);
    println!(
        "  Start: {} ({})",
        config.places.start.label, config.places.start.address
    );
    println!(
        "  End: {} ({})",
        config.places.end.label, config.places.end.address
    );
    println!(
        "  Geocoder: {} (timeout {}s)",
        config.geocoder.base_url, config.geocoder.timeout_seconds
    );
    println!("  Output: {}", config.output_path());
}
