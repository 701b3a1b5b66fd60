use campus_coffee::utils::error::PosError;
use campus_coffee::utils::{logger, validation::Validate};
use campus_coffee::{CliConfig, Command, JsonFilePosStore, OsmApiClient, Pos, PosService};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logging() {
        logger::init_json_logger(config.logging.verbose);
    } else {
        logger::init_cli_logger(config.logging.verbose);
    }
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let Some(command) = cli.command else {
        eprintln!("No command given, run with --help to see the available commands");
        std::process::exit(1);
    };

    let store = JsonFilePosStore::new(&config.store.path);
    let osm = OsmApiClient::new(&config)?;
    let service = PosService::new(store, osm);

    match run(&service, command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(
    service: &PosService<JsonFilePosStore, OsmApiClient>,
    command: Command,
) -> Result<String, PosError> {
    match command {
        Command::Import { node_id } => {
            let pos = service.import_from_osm_node(node_id).await?;
            Ok(serde_json::to_string_pretty(&pos)?)
        }
        Command::List => {
            let all = service.get_all().await?;
            Ok(serde_json::to_string_pretty(&all)?)
        }
        Command::Get { id } => {
            let pos = service.get_by_id(id).await?;
            Ok(serde_json::to_string_pretty(&pos)?)
        }
        Command::Upsert { file } => {
            let data = tokio::fs::read(&file).await?;
            let pos: Pos = serde_json::from_slice(&data).map_err(|e| PosError::ValidationError {
                message: format!("{} is not a valid POS document: {}", file.display(), e),
            })?;
            pos.validate()?;
            let saved = service.upsert(pos).await?;
            Ok(serde_json::to_string_pretty(&saved)?)
        }
        Command::Clear => {
            service.clear().await?;
            Ok("✅ All POS removed".to_string())
        }
    }
}
