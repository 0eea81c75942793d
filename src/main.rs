use brunogen::cache::{spawn_sweeper, MemoryArtifactStore};
use brunogen::cli::{Cli, Commands, GenerateArgs, ServeArgs};
use brunogen::config::GenerationConfig;
use brunogen::service::{self, ServiceState};
use brunogen::{packaging, storage, NAME, VERSION};
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => run_generate(args).await,
        Commands::Serve(args) => run_serve(args).await,
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}

async fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    println!("🚀 {} v{}", NAME, VERSION);

    let raw = tokio::fs::read_to_string(&args.config).await?;
    let config: GenerationConfig = serde_json::from_str(&raw)?;

    log::info!("Generating artifacts for '{}'", config.collection_name);
    let artifacts = packaging::generate(&config)?;
    let written = storage::write_artifacts(&args.output, &artifacts).await?;

    println!("✅ Generated {} files in {}", written.len(), args.output.display());
    for path in &written {
        println!("   {}", path.display());
    }
    Ok(())
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    println!("🚀 {} v{}", NAME, VERSION);

    let store = Arc::new(MemoryArtifactStore::new(Duration::from_secs(args.ttl)));
    let sweeper = spawn_sweeper(
        Arc::clone(&store),
        Duration::from_secs(args.sweep_interval),
    );
    let state = ServiceState { store };

    tokio::select! {
        result = service::serve(args.port, state) => result?,
        _ = signal::ctrl_c() => {
            println!("\n🛑 Shutdown signal received");
        }
    }

    sweeper.abort();
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}
