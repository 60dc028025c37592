use clap::Parser;
use family_tree::utils::error::{ErrorSeverity, FamilyTreeError};
use family_tree::utils::{logger, validation::Validate};
use family_tree::{CliConfig, FamilyTreeEngine, JsonFileStore};

fn fail(e: &FamilyTreeError) -> ! {
    tracing::error!(
        "❌ Family tree request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let file_config = match cli.load_toml() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if file_config.json_logs() {
        logger::init_json_logger(file_config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose || file_config.log_level() == "debug");
    }

    tracing::info!("Starting family-tree CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = file_config.validate() {
        fail(&e);
    }
    let settings = match cli.settings(&file_config) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    if let Err(e) = settings.validate() {
        fail(&e);
    }

    let store = match JsonFileStore::open(&settings.records_path).await {
        Ok(store) => store,
        Err(e) => fail(&e),
    };
    tracing::info!("📂 Using relationship records from {}", store.path().display());
    let engine = FamilyTreeEngine::with_config(store, settings.layout);
    tracing::debug!("Layout config: {:?}", engine.config());

    let tree = match engine.request_family_tree(&settings.member()).await {
        Ok(tree) => tree,
        Err(e) => fail(&e),
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        serde_json::to_string(&tree)?
    };
    println!("{}", output);

    tracing::info!(
        "✅ Laid out {} members rooted at {}",
        tree.layout.positions.len(),
        tree.root
    );
    Ok(())
}
