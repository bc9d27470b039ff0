//! samldb SAML client inspection CLI
//!
//! Reads the SAML client configuration table for one environment and reports
//! what the registry would serve. Configuration comes from the same environment
//! variables the library uses (`STORAGE_BACKEND`, `DATABASE_URL`,
//! `SAML_CLIENT_TABLE`, `SAML_ENVIRONMENT`, `SAML_CALLBACK_URL`,
//! `SAML_CLIENT_NAME_PARAMETER`).
//!
//! ## Usage Examples
//!
//! ```bash
//! # Names known for the environment
//! samldb-clients names
//!
//! # Validate one client and print a summary
//! samldb-clients show SAML_0
//!
//! # Build the whole registry, as an application would on first use
//! samldb-clients --format json-pretty check
//! ```
//!
//! Secrets (passwords, keystore bytes) are never printed. Any failure exits
//! with code 1.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use samldb::{
    config::Config,
    saml::{ClientConfiguration, ClientRegistry, SigningDefaults},
    storage::{ConfigurationCache, create_record_source, parse_storage_backend},
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

/// Main CLI application structure
#[derive(Parser)]
#[command(
    name = "samldb-clients",
    about = "Inspect database-backed SAML client configuration",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// JSON formatted output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// List the client names configured for the environment
    Names,
    /// Validate one client and print its configuration summary
    Show {
        /// Client name, as stored in the table
        name: String,
    },
    /// Build every client and print its callback URL
    Check,
}

#[derive(Serialize)]
struct KeyEntrySummary {
    alias: String,
    key_entry: bool,
    subject: Option<String>,
}

#[derive(Serialize)]
struct ClientSummary {
    name: String,
    environment: String,
    destination_binding_type: String,
    identity_provider_entity_id: String,
    service_provider_entity_id: String,
    maximum_authentication_lifetime: u64,
    keystore_type: String,
    keystore_alias: String,
    entries: Vec<KeyEntrySummary>,
}

impl From<&ClientConfiguration> for ClientSummary {
    fn from(configuration: &ClientConfiguration) -> Self {
        let store = configuration.credential_store();
        let entries = store
            .aliases()
            .map(|alias| KeyEntrySummary {
                alias: alias.to_string(),
                key_entry: store.is_key_entry(alias),
                subject: store.certificate(alias).map(|c| c.subject().to_string()),
            })
            .collect();

        Self {
            name: configuration.name().to_string(),
            environment: configuration.environment().to_string(),
            destination_binding_type: configuration.destination_binding_type().to_string(),
            identity_provider_entity_id: configuration.identity_provider_entity_id().to_string(),
            service_provider_entity_id: configuration.service_provider_entity_id().to_string(),
            maximum_authentication_lifetime: configuration.maximum_authentication_lifetime(),
            keystore_type: configuration.keystore_type().to_string(),
            keystore_alias: configuration.keystore_alias().to_string(),
            entries,
        }
    }
}

#[derive(Serialize)]
struct CheckedClient {
    name: String,
    callback_url: Option<String>,
}

fn print<T: Serialize>(format: &OutputFormat, value: &T) -> Result<()> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "samldb=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::new()?;
    tracing::info!(
        version = %config.version,
        environment = %config.environment.as_ref(),
        "Starting samldb-clients"
    );

    let backend = parse_storage_backend(&config.storage_backend, config.database_url.as_deref())?;
    let source =
        create_record_source(backend, &config.table_name, config.environment.clone()).await?;
    let cache = Arc::new(ConfigurationCache::new(source));

    match &cli.command {
        Commands::Names => {
            let names = cache.names().await?;
            print(&cli.format, &names)
        }
        Commands::Show { name } => {
            let configuration =
                ClientConfiguration::load(name, cache.as_ref(), &SigningDefaults::default())
                    .await?;
            print(&cli.format, &ClientSummary::from(&configuration))
        }
        Commands::Check => {
            let mut registry = ClientRegistry::new(cache);
            if let Some(template) = config.callback_template()? {
                registry = registry.with_callback(template);
            }

            let checked: Vec<CheckedClient> = registry
                .list_clients()
                .await?
                .iter()
                .map(|client| CheckedClient {
                    name: client.name().to_string(),
                    callback_url: client.callback_url().map(str::to_string),
                })
                .collect();
            print(&cli.format, &checked)
        }
    }
}
