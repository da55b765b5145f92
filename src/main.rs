use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use rusty_cu_runner::config::{
    API_VERSION_VAR, DEFAULT_API_VERSION, ENDPOINT_VAR, KEY_VAR, TIMEOUT_VAR, TOKEN_VAR,
};
use rusty_cu_runner::models::{AnalyzerDefinition, StaticTokenCredential};
use rusty_cu_runner::utils::init_tracing_with;
use rusty_cu_runner::{
    BatchOptions, ClientOptions, ContentUnderstandingClient, Credentials, FailurePolicy,
    PollOptions,
};

#[derive(Parser)]
#[command(name = "rusty-cu", version, about = "Run Azure AI Content Understanding analyzers")]
struct Cli {
    /// Resource endpoint, e.g. https://my-resource.services.ai.azure.com
    #[arg(long, env = ENDPOINT_VAR)]
    endpoint: String,

    #[arg(long, env = KEY_VAR, hide_env_values = true, conflicts_with = "token")]
    key: Option<String>,

    /// Pre-acquired bearer token for the cognitiveservices scope.
    #[arg(long, env = TOKEN_VAR, hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = API_VERSION_VAR, default_value = DEFAULT_API_VERSION)]
    api_version: String,

    #[arg(long, env = TIMEOUT_VAR, default_value_t = 120)]
    timeout_secs: u64,

    #[arg(long, default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Debug-level logs on stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one url or local file.
    Analyze {
        analyzer: String,
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        url: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Analyze every matching file in a directory.
    Batch {
        analyzer: String,
        directory: PathBuf,
        #[arg(long, default_value = "*")]
        pattern: String,
        #[arg(long)]
        recursive: bool,
        /// Keep going after a file fails and report failures at the end.
        #[arg(long)]
        continue_on_error: bool,
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Manage custom analyzers.
    Analyzer {
        #[command(subcommand)]
        action: AnalyzerCommand,
    },
}

#[derive(Subcommand)]
enum AnalyzerCommand {
    /// Create or fully replace an analyzer from a JSON definition file.
    Create { id: String, definition: PathBuf },
    Get { id: String },
    Delete { id: String },
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing_with(if cli.verbose { "debug" } else { "info" });

    let credentials = match (cli.key, cli.token) {
        (Some(key), None) => Credentials::with_key(&cli.endpoint, key),
        (None, Some(token)) => Credentials::with_token_credential(
            &cli.endpoint,
            Arc::new(StaticTokenCredential::new(token)),
        ),
        _ => anyhow::bail!("pass exactly one of --key or --token"),
    };
    let options = ClientOptions {
        api_version: cli.api_version,
        request_timeout: Duration::from_secs(cli.timeout_secs),
    };
    let client = ContentUnderstandingClient::with_options(credentials, options)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });
    let poll = PollOptions::default()
        .with_interval(Duration::from_millis(cli.poll_interval_ms))
        .with_cancellation(cancel.clone());

    let output = match cli.command {
        Command::Analyze {
            analyzer,
            url,
            file,
        } => {
            let result = match (url, file) {
                (Some(url), _) => client.analyze_url(&analyzer, &url, &poll).await?,
                (None, Some(file)) => client.analyze_file(&analyzer, &file, &poll).await?,
                (None, None) => anyhow::bail!("pass --url or --file"),
            };
            serde_json::to_value(result)?
        }
        Command::Batch {
            analyzer,
            directory,
            pattern,
            recursive,
            continue_on_error,
            concurrency,
        } => {
            let batch = BatchOptions {
                pattern,
                recursive,
                failure_policy: if continue_on_error {
                    FailurePolicy::CollectErrors
                } else {
                    FailurePolicy::AbortOnFirst
                },
                concurrency,
                poll,
            };
            let report = client.analyze_directory(&analyzer, &directory, &batch).await?;

            let mut results = Map::new();
            for (path, result) in report.results {
                results.insert(path.display().to_string(), serde_json::to_value(result)?);
            }
            let failures: Map<String, Value> = report
                .failures
                .into_iter()
                .map(|(path, err)| (path.display().to_string(), Value::String(err.to_string())))
                .collect();
            json!({ "results": results, "failures": failures })
        }
        Command::Analyzer { action } => match action {
            AnalyzerCommand::Create {
                id,
                definition: path,
            } => {
                let raw = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                let definition: AnalyzerDefinition = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?;
                serde_json::to_value(
                    client
                        .create_or_replace_analyzer(&id, &definition, &cancel)
                        .await?,
                )?
            }
            AnalyzerCommand::Get { id } => {
                serde_json::to_value(client.get_analyzer(&id, &cancel).await?)?
            }
            AnalyzerCommand::Delete { id } => {
                client.delete_analyzer(&id, &cancel).await?;
                json!({ "deleted": id })
            }
            AnalyzerCommand::List => {
                serde_json::to_value(client.list_analyzers(&cancel).await?)?
            }
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
