use clap::{Parser, Subcommand};
use std::process::ExitCode;
use stubcore::{config, deep_equal, json};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "stubcore", version, about = "Deep equality and sandbox configuration for test doubles")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two JSON documents structurally; exits 0 when equal, 1 when not
    Equal {
        /// First JSON document
        left: String,
        /// Second JSON document
        right: String,
    },
    /// Print the sandbox configuration, optionally overlaid with overrides
    Config {
        /// JSON object whose keys override the defaults
        #[arg(long)]
        overrides: Option<String>,
    },
}

fn parse_document(label: &str, text: &str) -> Result<serde_json::Value, ExitCode> {
    serde_json::from_str(text).map_err(|e| {
        eprintln!("Invalid JSON for {label}: {e}");
        ExitCode::from(2)
    })
}

fn run_equal(left: &str, right: &str) -> ExitCode {
    let (left, right) = match (parse_document("left", left), parse_document("right", right)) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(code), _) | (_, Err(code)) => return code,
    };
    let equal = deep_equal(&json::from_json(&left), &json::from_json(&right));
    println!("{equal}");
    if equal {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn run_config(overrides: Option<&str>) -> ExitCode {
    let overrides = match overrides.map(|text| parse_document("overrides", text)).transpose() {
        Ok(doc) => doc,
        Err(code) => return code,
    };
    let overrides = match overrides.as_ref().map(json::from_json) {
        None => None,
        Some(stubcore::Value::Object(obj)) if !obj.is_array() => Some(obj),
        Some(other) => {
            eprintln!("Overrides must be a JSON object, got {}", other.type_name());
            return ExitCode::from(2);
        }
    };
    let merged = config::get_config(overrides.as_ref());
    match serde_json::to_string_pretty(&json::to_json(&stubcore::Value::Object(merged))) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to render configuration: {e}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Command::Equal { left, right } => run_equal(left, right),
        Command::Config { overrides } => run_config(overrides.as_deref()),
    }
}
