mod config;

use alana::api::auth::obtain_token;
use alana::api::http::format_api_error;
use alana::apps::dca::batch::{DcaBatch, DcaWell};
use alana::apps::dca::series::Frequency;
use alana::resource::{extract_json_value, get_all_resource_keys, get_resource, Table};
use alana::{AlanaClient, AlanaError, Session};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, OutputFormat};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Command line client for the Alana reservoir-engineering API
#[derive(Parser, Debug)]
#[command(name = "alana", version, about, long_about = None)]
struct Args {
    /// Alana server base URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// API token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token and store it
    Login {
        #[arg(short, long)]
        username: String,
        /// Password (falls back to ALANA_PASSWORD)
        #[arg(short, long, env = "ALANA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the active workspace
    Workspace,
    /// List registered resource types
    Resources,
    /// List records of a resource type
    List {
        key: String,
        /// App segment for resource types missing from the catalog
        #[arg(long)]
        app: Option<String>,
    },
    /// Show one record by name
    Get {
        key: String,
        name: String,
        /// Print only this dotted path (e.g. primary_plot_data.forecast.0)
        #[arg(long)]
        field: Option<String>,
    },
    /// Print the id registered for a name
    Resolve { key: String, name: String },
    /// Delete one record by name
    Delete { key: String, name: String },
    /// Download the file stored with a record
    Download {
        key: String,
        id: i64,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Fit decline curves for a set of wells under a new DCA master
    RunDca {
        /// Name of the DCA master to create
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "monthly")]
        frequency: String,
        /// Well as NAME:ARPS:YYYY-MM-DD (repeatable)
        #[arg(long = "well", required = true)]
        wells: Vec<String>,
        /// Extra master fields as a JSON object
        #[arg(long)]
        master_json: Option<String>,
    },
    /// Run a field development plan
    RunFdp {
        name: String,
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Show or change stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    SetUrl { url: String },
    SetToken { token: String },
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
    fn as_directive(self) -> Option<&'static str> {
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
    // RUST_LOG wins over --log-level
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::try_from_default_env().ok()?,
        Err(_) => EnvFilter::new(level.as_directive()?),
    };

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
            eprintln!("Failed to open log file {}: {}", log_path.display(), e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("alana {} started with log level: {:?}", alana::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("alana").join("alana.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".alana").join("alana.log");
    }
    PathBuf::from("alana.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        match err.downcast_ref::<AlanaError>() {
            Some(api_err) => eprintln!("Error: {}", format_api_error(api_err)),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    let output = config.effective_output(args.output);

    match &args.command {
        Command::Login { username, password } => {
            let url = config.effective_base_url(args.url.as_deref());
            let token = obtain_token(&url, username, password).await?;
            config.base_url = Some(url);
            config.set_token(&token)?;
            println!("Token stored for {}", username);
        },
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let shown = json!({
                    "base_url": config.effective_base_url(args.url.as_deref()),
                    "token": config.effective_token(args.token.as_deref()).map(|_| "<set>"),
                    "timeout_secs": config.effective_timeout(args.timeout),
                    "output": output,
                    "path": Config::config_path(),
                });
                print_value(&shown, output)?;
            },
            ConfigAction::SetUrl { url } => {
                config.set_base_url(url)?;
                println!("Base URL set to {}", url);
            },
            ConfigAction::SetToken { token } => {
                config.set_token(token)?;
                println!("Token stored");
            },
        },
        Command::Resources => {
            let rows: Vec<Value> = get_all_resource_keys()
                .into_iter()
                .filter_map(get_resource)
                .map(|def| {
                    json!({
                        "key": def.key,
                        "app": def.app,
                        "name_field": def.name_field,
                        "path": def.collection_path(),
                    })
                })
                .collect();
            print_value(&Value::Array(rows), output)?;
        },
        command => {
            let client = connect(&args, &config).await?;
            run_remote(&client, command, output).await?;
        },
    }

    Ok(())
}

async fn connect(args: &Args, config: &Config) -> Result<AlanaClient> {
    let url = config.effective_base_url(args.url.as_deref());
    let token = config
        .effective_token(args.token.as_deref())
        .context("No token configured. Use --token, ALANA_TOKEN or `alana login`")?;
    let timeout = Duration::from_secs(config.effective_timeout(args.timeout));

    let session = Session::with_timeout(&token, &url, timeout)?;
    Ok(AlanaClient::connect_with_session(session).await?)
}

async fn run_remote(client: &AlanaClient, command: &Command, output: OutputFormat) -> Result<()> {
    match command {
        Command::Workspace => {
            let workspace = client.active_workspace().cloned().unwrap_or(Value::Null);
            print_value(&workspace, output)?;
        },
        Command::List { key, app } => {
            let resource = match app {
                Some(app) => client.resource_at(app, key),
                None => client.resource(key)?,
            };
            print_value(&resource.list().await?, output)?;
        },
        Command::Get { key, name, field } => {
            let record = client.resource(key)?.get_master_by_name(name).await?;
            match field {
                Some(path) => println!("{}", extract_json_value(&record, path)),
                None => print_value(&record, output)?,
            }
        },
        Command::Resolve { key, name } => {
            println!("{}", client.resolve_id(key, name).await?);
        },
        Command::Delete { key, name } => {
            let status = client.resource(key)?.delete_master_by_name(name).await?;
            println!("Deleted {} '{}' (HTTP {})", key, name, status);
        },
        Command::Download { key, id, dir } => {
            let path = client.resource(key)?.download_master(*id, dir).await?;
            println!("{}", path.display());
        },
        Command::RunDca {
            name,
            frequency,
            wells,
            master_json,
        } => {
            let wells = wells
                .iter()
                .map(|w| DcaWell::parse(w))
                .collect::<alana::Result<Vec<_>>>()?;
            let master_fields = match master_json {
                Some(raw) => serde_json::from_str(raw).context("--master-json is not valid JSON")?,
                None => Value::Null,
            };
            let batch = DcaBatch {
                name: name.clone(),
                frequency: frequency.parse::<Frequency>()?,
                wells,
                master_fields,
            };
            let report = client.dca().run_batch(batch).await?;
            print_value(&serde_json::to_value(&report)?, output)?;
        },
        Command::RunFdp { name, prefix } => {
            let result = client.fdp().run(name, prefix.as_deref()).await?;
            print_value(&result, output)?;
        },
        Command::Login { .. } | Command::Config { .. } | Command::Resources => {},
    }
    Ok(())
}

fn print_value(value: &Value, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => match value {
            Value::Array(_) | Value::Object(_) => print!("{}", Table::from_records(value).render()),
            Value::String(s) => println!("{}", s),
            other => println!("{}", other),
        },
    }
    Ok(())
}
