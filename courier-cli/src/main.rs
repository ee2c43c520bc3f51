mod ops;

use clap::{Args, Parser, Subcommand};
use courier_core::{
    ApiClient, ClientConfig, FileTokenStore, SessionExpired, TokenStore, DEFAULT_API_BASE,
};
use ops::{
    clear_token, parse_header, parse_query, send_request, set_token, show_token, ui,
    OutputFormat, Verb,
};
use reqwest::header::{HeaderName, HeaderValue};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI wrapper around the courier request facade.
#[derive(Parser)]
#[command(name = "courier", author, version, about = "Send authenticated JSON requests")]
struct Cli {
    /// API base url
    #[arg(long, env = "COURIER_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Request timeout in seconds
    #[arg(long, env = "COURIER_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Token store file (defaults to the platform data dir)
    #[arg(long, env = "COURIER_STORE")]
    store: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource
    Get(RequestArgs),
    /// DELETE a resource
    Delete(RequestArgs),
    /// POST, with an optional JSON body
    Post(BodyArgs),
    /// PUT, with an optional JSON body
    Put(BodyArgs),
    /// Manage the stored bearer token
    #[command(subcommand)]
    Token(TokenCommands),
}

#[derive(Args)]
struct RequestArgs {
    /// Path relative to the base url, or an absolute url
    path: String,
    /// Query parameter, key=value (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_query)]
    query: Vec<(String, String)>,
    /// Extra header, name:value (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    headers: Vec<(HeaderName, HeaderValue)>,
    /// Attach the stored bearer token
    #[arg(long, short)]
    auth: bool,
}

#[derive(Args)]
struct BodyArgs {
    #[command(flatten)]
    request: RequestArgs,
    /// Inline JSON body
    #[arg(long, short, conflicts_with = "file")]
    data: Option<String>,
    /// Read the JSON body from a file
    #[arg(long, short)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Store a bearer token
    Set { token: String },
    /// Show the stored token
    Show,
    /// Remove the stored token
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件（如果存在），忽略错误
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let store: Arc<dyn TokenStore> = Arc::new(match &cli.store {
        Some(path) => FileTokenStore::new(path),
        None => FileTokenStore::default_location()?,
    });

    let succeeded = match cli.command {
        Commands::Token(token_cmd) => {
            match token_cmd {
                TokenCommands::Set { token } => set_token(store.as_ref(), &token, cli.output)?,
                TokenCommands::Show => show_token(store.as_ref(), cli.output)?,
                TokenCommands::Clear => clear_token(store.as_ref(), cli.output)?,
            }
            true
        }
        Commands::Get(args) => {
            let client = build_client(&cli.api_base, cli.timeout, store)?;
            send_request(&client, Verb::Get, args.into(), None, cli.output).await?
        }
        Commands::Delete(args) => {
            let client = build_client(&cli.api_base, cli.timeout, store)?;
            send_request(&client, Verb::Delete, args.into(), None, cli.output).await?
        }
        Commands::Post(args) => {
            let client = build_client(&cli.api_base, cli.timeout, store)?;
            let body = ops::load_body(args.data.as_deref(), args.file.as_deref())?;
            send_request(&client, Verb::Post, args.request.into(), body, cli.output).await?
        }
        Commands::Put(args) => {
            let client = build_client(&cli.api_base, cli.timeout, store)?;
            let body = ops::load_body(args.data.as_deref(), args.file.as_deref())?;
            send_request(&client, Verb::Put, args.request.into(), body, cli.output).await?
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn build_client(
    api_base: &str,
    timeout: Option<u64>,
    store: Arc<dyn TokenStore>,
) -> anyhow::Result<ApiClient> {
    let mut config = ClientConfig::new(api_base)?;
    if let Some(secs) = timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let hook = |signal: &SessionExpired| {
        ui::print_warning(&format!("会话已失效，token 已清除 ({})", signal.url));
        ui::print_hint("run `courier token set <token>` to sign in again");
    };
    Ok(ApiClient::with_hook(config, store, Arc::new(hook))?)
}

impl From<RequestArgs> for ops::RequestSpec {
    fn from(args: RequestArgs) -> Self {
        ops::RequestSpec {
            path: args.path,
            query: args.query,
            headers: args.headers,
            auth: args.auth,
        }
    }
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
