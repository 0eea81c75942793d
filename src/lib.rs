//! Bruno Collection Generator
//!
//! Turns a declarative test configuration into four mutually consistent
//! artifacts: an Express/mssql mock server, a Bruno collection document,
//! an npm dependency manifest, and Markdown setup instructions. The same
//! pipeline is reachable from the CLI and from the HTTP generation service.

pub mod assembler;
pub mod assertions;
pub mod cache;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod generators;
pub mod mock_server;
pub mod packaging;
pub mod payload;
pub mod script;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use assembler::{assemble, assemble_at};
pub use config::{
    AssertionType, AuthSpec, CsvScenario, CustomAssertion, DbConfig, GenerationConfig, QuerySpec,
    ResponseContract, Scenario,
};
pub use error::{CacheError, GeneratorError, Result, ValidationError};
pub use generators::{generate_value, GeneratorKind, GeneratorSpec};
pub use packaging::{generate, generate_at, GeneratedArtifacts};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
