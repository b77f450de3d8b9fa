//! `stackit` command-line client.
//!
//! Signs in against a StackIt API, keeps the session in a local file, and
//! issues authenticated requests through the same resilient client the
//! library exposes. Responses print as pretty JSON on stdout; failures print
//! the normalized error envelope on stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use stackit_client::api::{AnswerFilters, LoginCredentials, QuestionFilters, RegisterData};
use stackit_client::config::{self, ClientConfig, SessionStorage};
use stackit_client::observability::logging::init_logging;
use stackit_client::{ApiClient, ApiError};

#[derive(Parser)]
#[command(name = "stackit")]
#[command(about = "Command-line client for the StackIt API", long_about = None)]
struct Cli {
    /// TOML config file; defaults plus environment overrides when omitted
    #[arg(short, long, env = "STACKIT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    base_url: Option<String>,

    /// Where tokens are kept between invocations
    #[arg(short, long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the issued tokens
    Login {
        username: String,
        #[arg(short, long, env = "STACKIT_PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "STACKIT_PASSWORD")]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Invalidate the refresh token and forget the session
    Logout,
    /// Show the signed-in user's profile
    Whoami,
    /// GET an arbitrary path under the base URL
    Get { path: String },
    /// POST a JSON body to an arbitrary path under the base URL
    Post {
        path: String,
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    #[command(subcommand)]
    Questions(QuestionCommands),
    #[command(subcommand)]
    Answers(AnswerCommands),
}

#[derive(Subcommand)]
enum QuestionCommands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show { id: u64 },
}

#[derive(Subcommand)]
enum AnswerCommands {
    List {
        #[arg(short, long)]
        question: u64,
    },
}

fn build_config(cli: &Cli) -> Result<ClientConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::from_env()?,
    };
    // The CLI is useless without a persistent session.
    config.session.storage = SessionStorage::File;
    if let Some(path) = &cli.session_file {
        config.session.path = path.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    Ok(config)
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a `--data` argument; a bad document is a local failure, not an outage.
fn parse_data(data: &str) -> Result<Value, ApiError> {
    serde_json::from_str(data).map_err(|e| ApiError::malformed(format!("Invalid --data JSON: {e}")))
}

async fn run(client: &ApiClient, command: Commands) -> Result<Value, ApiError> {
    match command {
        Commands::Login { username, password } => {
            let response = client
                .auth()
                .login::<Value>(&LoginCredentials { username, password })
                .await?;
            Ok(response.user)
        }
        Commands::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let data = RegisterData {
                username,
                email,
                password,
                first_name,
                last_name,
            };
            let response = client.auth().register::<Value>(&data).await?;
            Ok(response.user)
        }
        Commands::Logout => {
            client.auth().logout().await;
            Ok(serde_json::json!({ "logged_out": true }))
        }
        Commands::Whoami => client.auth().profile().await,
        Commands::Get { path } => client.get(&path).await,
        Commands::Post { path, data } => {
            let body = parse_data(&data)?;
            client.post(&path, &body).await
        }
        Commands::Questions(QuestionCommands::List { search, page }) => {
            let filters = QuestionFilters {
                search,
                page,
                ..QuestionFilters::default()
            };
            let page = client.questions().list::<Value>(&filters).await?;
            serde_json::to_value(page).map_err(|e| ApiError::malformed(e.to_string()))
        }
        Commands::Questions(QuestionCommands::Show { id }) => client.questions().get(id).await,
        Commands::Answers(AnswerCommands::List { question }) => {
            let answers = client
                .answers()
                .list::<Value>(&AnswerFilters::for_question(question))
                .await?;
            Ok(Value::Array(answers))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(&config.observability);

    let client = ApiClient::from_config(&config)?;

    match run(&client, cli.command).await {
        Ok(value) => print_json(&value),
        Err(e) => {
            eprintln!("{}", serde_json::to_string_pretty(&e)?);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackit_client::ErrorKind;

    #[test]
    fn invalid_data_is_malformed() {
        let err = parse_data("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.status_code(), 0);
        assert!(err.message().starts_with("Invalid --data JSON"));
    }

    #[test]
    fn valid_data_parses() {
        assert_eq!(parse_data(r#"{"content": "hi"}"#).unwrap()["content"], "hi");
    }
}
