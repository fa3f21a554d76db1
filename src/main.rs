//! Binary entry point for the Berth CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use berth::{
    ConfigStore, ConsolePrompter, HetznerApi, HetznerApiError, HetznerConfig, KeyStore,
    ProvisionError, ProvisionOutcome, ProvisioningOrchestrator, SessionClient, SessionConfig,
};

#[derive(Debug, Parser)]
#[command(
    name = "berth",
    about = "Provision an SSH key, register it with Hetzner Cloud, and open a session",
    arg_required_else_help = true
)]
enum Cli {
    #[command(
        name = "up",
        about = "Reconcile key material, pick a datacentre, and connect over SSH"
    )]
    Up,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError<HetznerApiError>),
    #[error("session error: {0}")]
    Session(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Up => up_command().await,
    }
}

async fn up_command() -> Result<i32, CliError> {
    let store = ConfigStore::new();
    let config_exists = store
        .config_file_exists()
        .map_err(|err| CliError::Config(err.to_string()))?;
    if !config_exists {
        let path = store
            .write_template()
            .map_err(|err| CliError::Config(err.to_string()))?;
        writeln!(
            io::stdout(),
            "Generated config file \"{path}\", please update the file with the correct information"
        )
        .ok();
        return Ok(0);
    }

    let hetzner_config =
        HetznerConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    hetzner_config
        .validate()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let session_config =
        SessionConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    session_config
        .validate()
        .map_err(|err| CliError::Config(err.to_string()))?;

    let provider = HetznerApi::new(hetzner_config.token.clone());
    let orchestrator = ProvisioningOrchestrator::new(provider, ConsolePrompter);
    let key_store = KeyStore::new(&session_config.key_file);

    let environment = match orchestrator
        .ensure_ready(&key_store, &hetzner_config.key_name)
        .await?
    {
        ProvisionOutcome::Ready(environment) => environment,
        ProvisionOutcome::Declined => {
            writeln!(
                io::stdout(),
                "Generate a key-pair using `ssh-keygen` and try again"
            )
            .ok();
            return Ok(0);
        }
    };

    let session = SessionClient::with_process_runner(session_config);
    let info = session
        .server_info(&environment.key_path)
        .map_err(|err| CliError::Session(err.to_string()))?;
    writeln!(io::stdout(), "{}", info.trim_end()).ok();

    Ok(0)
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
