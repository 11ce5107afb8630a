//! signed-params - sign payloads and verify signature tokens from the shell.

use std::env;
use std::io::Read;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use signed_params::config::{LoggingConfig, Settings};
use signed_params::{Signer, SigningError, Value};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");
const DEFAULT_CONFIG_PATH: &str = "/etc/signed-params/config.toml";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let (config_path, positional) = split_args(&args);
    let Some((command, rest)) = positional.split_first() else {
        print_help();
        return ExitCode::FAILURE;
    };

    let settings = match Settings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration loaded from: {}", config_path);

    let signer = match Signer::from_config(&settings.signing) {
        Ok(signer) => signer,
        Err(e) => {
            error!(error = %e, "Failed to build signer");
            return ExitCode::FAILURE;
        }
    };

    let result = match command.as_str() {
        "sign" => run_sign(&signer, rest.first()),
        "verify" => run_verify(&signer, rest.first()),
        other => {
            eprintln!("Unknown command '{}'. Run with --help for usage.", other);
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "{} failed", command);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sign a JSON object given as argument or on stdin.
fn run_sign(signer: &Signer, input: Option<&String>) -> Result<String, SigningError> {
    let json: serde_json::Value = serde_json::from_str(&read_input(input)?)?;
    signer.sign(Value::from(json))
}

/// Verify a token given as argument or on stdin, printing its data as JSON.
fn run_verify(signer: &Signer, input: Option<&String>) -> Result<String, SigningError> {
    let token = read_input(input)?;
    let data = signer.verify(token.trim())?;
    Ok(serde_json::to_string_pretty(&data)?)
}

fn read_input(arg: Option<&String>) -> Result<String, SigningError> {
    match arg {
        Some(value) if value != "-" => Ok(value.clone()),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Sign nested parameter payloads and verify signature tokens.

USAGE:
    {} [OPTIONS] sign [JSON]
    {} [OPTIONS] verify [TOKEN]

    JSON or TOKEN is read from stdin when omitted or given as '-'.

OPTIONS:
    -c, --config <PATH>    Path to configuration file
                           [default: {}]
    -h, --help             Print help information
    -V, --version          Print version information
"#,
        NAME, VERSION, NAME, NAME, DEFAULT_CONFIG_PATH
    );
}

/// Separate the config path option from positional arguments.
fn split_args(args: &[String]) -> (String, Vec<String>) {
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            if let Some(path) = iter.next() {
                config_path = path.clone();
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = path.to_string();
        } else {
            positional.push(arg.clone());
        }
    }

    (config_path, positional)
}

/// Initialize logging based on settings. Logs go to stderr so stdout stays
/// clean for tokens and data.
fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
