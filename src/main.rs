//! CLI entry point for the API runner.
//!
//! Runs a single JSON request template against an endpoint, reports the
//! normalized response, and checks optional status, timing and header
//! expectations.

use anyhow::{Context, Result, bail};
use api_runner::config::RunnerConfig;
use api_runner::output::{append_record, print_json, print_pretty};
use api_runner::record::RunRecord;
use api_runner::template::RequestTemplate;
use api_runner::transport::{BasicClient, header_value};
use api_runner::{ResponseResult, RunnerFactory};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "api_runner")]
#[command(about = "Run templated HTTP requests and check their responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one request template against an endpoint
    Run {
        /// JSON request template file
        #[arg(short, long, value_name = "FILE")]
        template: String,

        /// Target URL
        #[arg(short, long, value_name = "URL")]
        endpoint: String,

        /// Protocol identifier (overrides defaults file and environment)
        #[arg(short, long)]
        protocol: Option<String>,

        /// JSON default-values file with "Auth URL", "Username", "Password", "Protocol"
        #[arg(short, long, value_name = "FILE")]
        defaults: Option<String>,

        /// Skip the authentication handshake
        #[arg(long, default_value_t = false)]
        no_auth: bool,

        /// Fail unless the response has this status code
        #[arg(long)]
        expect_status: Option<u16>,

        /// Fail if the request takes longer than this many milliseconds
        #[arg(long)]
        max_elapsed_ms: Option<u64>,

        /// Fail unless the response carries this header (repeatable)
        #[arg(long, value_name = "NAME")]
        expect_header: Vec<String>,

        /// Fail unless the response header NAME equals VALUE (repeatable)
        #[arg(long, value_name = "NAME=VALUE", value_parser = parse_header_pair)]
        expect_header_value: Vec<(String, String)>,

        /// CSV file to append a run record to
        #[arg(short, long, value_name = "FILE")]
        record: Option<String>,

        /// Print the response as JSON instead of debug format
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List supported protocol identifiers
    Protocols,
}

/// Expectations checked after a successful run.
#[derive(Default)]
struct Expectations {
    status: Option<u16>,
    max_elapsed: Option<Duration>,
    headers_present: Vec<String>,
    header_values: Vec<(String, String)>,
}

/// Splits `NAME=VALUE` at the first `=`.
fn parse_header_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            template,
            endpoint,
            protocol,
            defaults,
            no_auth,
            expect_status,
            max_elapsed_ms,
            expect_header,
            expect_header_value,
            record,
            json,
        } => {
            let mut config = RunnerConfig::load(defaults.as_deref())?;
            if let Some(protocol) = protocol {
                config.protocol = protocol;
            }

            let expectations = Expectations {
                status: expect_status,
                max_elapsed: max_elapsed_ms.map(Duration::from_millis),
                headers_present: expect_header,
                header_values: expect_header_value,
            };

            let (result, elapsed) = run_template(
                &config,
                &template,
                &endpoint,
                !no_auth,
                record.as_deref(),
            )
            .await?;

            if json {
                print_json(&result)?;
            } else {
                print_pretty(&result);
            }

            check_expectations(&result, elapsed, &expectations)?;
        }
        Commands::Protocols => {
            for protocol in RunnerFactory::protocols() {
                info!(protocol, "Protocol");
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/api_runner.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("api_runner.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Loads a template, runs it once, and appends a run record if asked to.
#[tracing::instrument(skip(config, record_path), fields(protocol = %config.protocol))]
async fn run_template(
    config: &RunnerConfig,
    template_path: &str,
    endpoint: &str,
    authenticate: bool,
    record_path: Option<&str>,
) -> Result<(ResponseResult, Duration)> {
    let transport = BasicClient::with_timeouts(config.timeout(), config.connect_timeout())?;
    let factory = RunnerFactory::new(Arc::new(transport));
    let runner = factory.create(&config.protocol, config.credentials.clone())?;

    let text = std::fs::read_to_string(template_path)
        .with_context(|| format!("failed to read template '{template_path}'"))?;
    let spec = RequestTemplate::parse(&text)?.into_spec(endpoint, authenticate);
    let method = spec.method.clone();

    let started = Instant::now();
    let outcome = runner.run_request(spec).await;
    let elapsed = started.elapsed();

    let record = match &outcome {
        Ok(result) => RunRecord::from_result(result, elapsed),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Request failed");
            RunRecord::from_error(e, elapsed)
        }
    }
    .with_target(&config.protocol, &method, endpoint);

    if let Some(path) = record_path {
        if let Err(e) = append_record(path, &record) {
            warn!(path, error = %e, "Failed to append run record");
        }
    }

    let result = outcome?;
    info!(
        status = result.status_code,
        elapsed_ms = record.elapsed_ms,
        has_body = result.body.is_some(),
        "Request completed"
    );
    Ok((result, elapsed))
}

fn check_expectations(
    result: &ResponseResult,
    elapsed: Duration,
    expectations: &Expectations,
) -> Result<()> {
    if let Some(expected) = expectations.status {
        if result.status_code != expected {
            bail!(
                "status code {} does not match expected {}",
                result.status_code,
                expected
            );
        }
    }

    if let Some(max) = expectations.max_elapsed {
        if elapsed > max {
            bail!(
                "request took {}ms, expected at most {}ms",
                elapsed.as_millis(),
                max.as_millis()
            );
        }
    }

    for name in &expectations.headers_present {
        if header_value(&result.headers, name).is_none() {
            bail!("{} not found in response headers", name);
        }
    }

    for (name, expected) in &expectations.header_values {
        match header_value(&result.headers, name) {
            None => bail!("{} not found in response headers", name),
            Some(value) if value != expected.as_str() => {
                bail!(
                    "header {} is '{}', expected '{}'",
                    name,
                    value,
                    expected
                );
            }
            Some(_) => {}
        }
    }

    Ok(())
}
