use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bruno collection generator - turns a declarative test config into a
/// mock server, a Bruno collection, and their supporting files
#[derive(Parser)]
#[command(name = "brunogen")]
#[command(about = "Generate Bruno API test collections and matching mock servers")]
#[command(version = crate::VERSION)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate artifacts from a configuration file
    Generate(GenerateArgs),

    /// Run the HTTP generation service
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the generation configuration (JSON)
    #[arg(required = true)]
    pub config: PathBuf,

    /// Directory to write the generated artifacts into
    #[arg(short, long, default_value = "bruno-generated")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Seconds a generated collection stays downloadable
    #[arg(long, default_value_t = 3600)]
    pub ttl: u64,

    /// Seconds between cache eviction sweeps
    #[arg(long, default_value_t = 1800)]
    pub sweep_interval: u64,
}
