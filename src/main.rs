use anyhow::{Context, Result};
use cfclient::cf::{ConnectionContext, UaaTokenProvider, Void};
use cfclient::config::Config;
use cfclient::resource::{service_bindings, service_brokers, service_instances, service_keys};
use cfclient::CloudFoundryClient;
use clap::{Parser, Subcommand, ValueEnum};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line client for the Cloud Foundry service APIs
#[derive(Parser, Debug)]
#[command(name = "cfclient", version, about, long_about = None)]
struct Args {
    /// API endpoint, e.g. https://api.example.com
    #[arg(short, long)]
    api: Option<String>,

    /// OAuth client id for the client-credentials grant
    #[arg(long)]
    client_id: Option<String>,

    /// OAuth client secret (defaults to CF_CLIENT_SECRET)
    #[arg(long)]
    client_secret: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    skip_ssl_validation: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every resource of a kind, following pagination
    List { resource: ResourceKind },
    /// Show one resource
    Get { resource: ResourceKind, id: String },
    /// Delete one resource
    Delete { resource: ResourceKind, id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResourceKind {
    ServiceInstances,
    ServiceKeys,
    ServiceBrokers,
    ServiceBindings,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let directive = level.directive()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG overrides the flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cfclient started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cfclient").join("cfclient.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cfclient").join("cfclient.log");
    }
    PathBuf::from("cfclient.log")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn print_stream<T: Serialize>(mut items: BoxStream<'static, cfclient::Result<T>>) -> Result<()> {
    let mut count = 0usize;
    while let Some(item) = items.try_next().await? {
        println!("{}", serde_json::to_string(&item)?);
        count += 1;
    }
    tracing::info!("Listed {} resources", count);
    Ok(())
}

async fn list(client: &CloudFoundryClient, resource: ResourceKind) -> Result<()> {
    match resource {
        ResourceKind::ServiceInstances => {
            let request = service_instances::ListServiceInstancesRequest::default();
            print_stream(client.service_instances().list_all(&request)).await
        }
        ResourceKind::ServiceKeys => {
            let request = service_keys::ListServiceKeysRequest::default();
            print_stream(client.service_keys().list_all(&request)).await
        }
        ResourceKind::ServiceBrokers => {
            let request = service_brokers::ListServiceBrokersRequest::default();
            print_stream(client.service_brokers().list_all(&request)).await
        }
        ResourceKind::ServiceBindings => {
            let request = service_bindings::ListServiceBindingsRequest::default();
            print_stream(client.service_bindings_v3().list_all(&request)).await
        }
    }
}

async fn get(client: &CloudFoundryClient, resource: ResourceKind, id: String) -> Result<()> {
    match resource {
        ResourceKind::ServiceInstances => print_json(
            &client
                .service_instances()
                .get(&service_instances::GetServiceInstanceRequest::new(id))
                .await?,
        ),
        ResourceKind::ServiceKeys => print_json(
            &client
                .service_keys()
                .get(&service_keys::GetServiceKeyRequest::new(id))
                .await?,
        ),
        ResourceKind::ServiceBrokers => print_json(
            &client
                .service_brokers()
                .get(&service_brokers::GetServiceBrokerRequest::new(id))
                .await?,
        ),
        ResourceKind::ServiceBindings => print_json(
            &client
                .service_bindings_v3()
                .get(&service_bindings::GetServiceBindingRequest::new(id))
                .await?,
        ),
    }
}

async fn delete(client: &CloudFoundryClient, resource: ResourceKind, id: String) -> Result<()> {
    let Void = match resource {
        ResourceKind::ServiceInstances => {
            client
                .service_instances()
                .delete(&service_instances::DeleteServiceInstanceRequest::new(&id))
                .await?
        }
        ResourceKind::ServiceKeys => {
            client
                .service_keys()
                .delete(&service_keys::DeleteServiceKeyRequest::new(&id))
                .await?
        }
        ResourceKind::ServiceBrokers => {
            client
                .service_brokers()
                .delete(&service_brokers::DeleteServiceBrokerRequest::new(&id))
                .await?
        }
        ResourceKind::ServiceBindings => {
            client
                .service_bindings_v3()
                .delete(&service_bindings::DeleteServiceBindingRequest::new(&id))
                .await?
        }
    };
    println!("Deleted {}", id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();
    if args.skip_ssl_validation {
        config.skip_ssl_validation = true;
    }

    let api = config.effective_api(args.api.as_deref()).context(
        "No API endpoint configured. Set CF_API, add \"api\" to the config file or use --api",
    )?;
    tracing::info!("Using API endpoint: {}", api);

    let connection = ConnectionContext::new(config.connection_config(&api)?)?;
    let grant = config.grant(args.client_id.as_deref(), args.client_secret.as_deref())?;
    let client = CloudFoundryClient::new(connection, UaaTokenProvider::new(grant));

    let result = match args.command {
        Command::List { resource } => list(&client, resource).await,
        Command::Get { resource, id } => get(&client, resource, id).await,
        Command::Delete { resource, id } => delete(&client, resource, id).await,
    };

    if let Err(err) = &result {
        tracing::error!("Command failed: {:#}", err);
    }
    result
}
