//! Lumo Nonce - create and verify stateless nonces from the command line.

use std::env;
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lumo_nonce::auth::NonceVerifier;
use lumo_nonce::config::Settings;
use lumo_nonce::error::NonceError;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

fn main() -> ExitCode {
    // Parse command line arguments (simple std::env approach)
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let invocation = match Invocation::parse(&args) {
        Ok(i) => i,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Run '{} --help' for usage.", NAME);
            return ExitCode::from(2);
        }
    };

    // Load configuration, falling back to defaults
    let settings = match &invocation.config_path {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    // Initialize logging based on configuration
    if let Err(e) = init_logging(&settings) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&settings, &invocation) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Nonce operation failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sub-command requested on the command line.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Create,
    Verify { token: String },
}

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    config_path: Option<String>,
    action: Action,
    user_id: String,
    context: String,
    user_token: String,
}

impl Invocation {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut config_path = None;
        let mut user_token = String::new();
        let mut positional = Vec::new();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--config" || arg == "-c" {
                config_path = Some(iter.next().ok_or("--config requires a path")?.clone());
            } else if let Some(path) = arg.strip_prefix("--config=") {
                config_path = Some(path.to_string());
            } else if arg == "--user-token" || arg == "-t" {
                user_token = iter.next().ok_or("--user-token requires a value")?.clone();
            } else if let Some(token) = arg.strip_prefix("--user-token=") {
                user_token = token.to_string();
            } else {
                positional.push(arg.clone());
            }
        }

        let mut positional = positional.into_iter();
        let command = positional.next().ok_or("missing command")?;
        let user_id = positional.next().ok_or("missing <user_id>")?;
        let context = positional.next().ok_or("missing <context>")?;

        let action = match command.as_str() {
            "create" => Action::Create,
            "verify" => Action::Verify {
                token: positional.next().ok_or("missing <token>")?,
            },
            other => return Err(format!("unknown command '{}'", other)),
        };

        if let Some(extra) = positional.next() {
            return Err(format!("unexpected argument '{}'", extra));
        }

        Ok(Self {
            config_path,
            action,
            user_id,
            context,
            user_token,
        })
    }
}

/// Execute the requested action.
fn run(settings: &Settings, invocation: &Invocation) -> Result<ExitCode, NonceError> {
    let config = settings.nonce_config()?;
    debug!(
        lifetime_seconds = config.lifetime_seconds(),
        algorithm = %config.algorithm(),
        "Nonce configuration loaded"
    );
    let verifier = NonceVerifier::new(config);

    match &invocation.action {
        Action::Create => {
            let token = verifier.create(
                &invocation.user_id,
                &invocation.context,
                &invocation.user_token,
            )?;
            println!("{}", token);
            Ok(ExitCode::SUCCESS)
        }
        Action::Verify { token } => {
            let outcome = verifier.verify(
                &invocation.user_id,
                &invocation.context,
                token,
                &invocation.user_token,
            )?;
            let report = serde_json::json!({
                "outcome": outcome,
                "code": outcome.code(),
            });
            println!("{}", serde_json::to_string(&report)?);
            if outcome.is_valid() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Create and verify stateless, time-windowed nonces.

USAGE:
    {} [OPTIONS] create <user_id> <context>
    {} [OPTIONS] verify <user_id> <context> <token>

OPTIONS:
    -c, --config <PATH>        Path to configuration file
                               [default: built-in defaults]
    -t, --user-token <TOKEN>   Session token bound into the nonce
                               [default: empty]
    -h, --help                 Print help information
    -V, --version              Print version information

'verify' prints a JSON report and exits 0 when the nonce is valid.
"#,
        NAME, VERSION, NAME, NAME
    );
}

/// Initialize logging based on settings.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    // Logs go to stderr so stdout carries only the token or report
    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            // Default to pretty format
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
