//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - loads settings from the environment
//! - serves, renders once, or prints diagnostics

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, RenderArgs, ServeArgs};
use crate::config::Settings;
use crate::domain::RenderMode;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mirror` binary.
pub fn run() -> Result<(), AppError> {
    // `mirror` and `mirror --bind ...` behave like `mirror serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_tracing();
    let settings = Settings::from_env();

    match cli.command {
        Command::Serve(args) => handle_serve(settings, args),
        Command::Render(args) => handle_render(settings, args),
        Command::Diag => print_json(&crate::debug::site_probe_report(&settings)),
        Command::Schema => handle_schema(settings),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_serve(settings: Settings, args: ServeArgs) -> Result<(), AppError> {
    let addr = args.bind.unwrap_or_else(|| settings.bind_addr());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(crate::server::serve(settings, &addr))
}

fn handle_render(settings: Settings, args: RenderArgs) -> Result<(), AppError> {
    let config = settings.validate()?;
    let mode = if args.preview {
        RenderMode::Standalone
    } else {
        RenderMode::Fragment
    };

    let run = pipeline::run_catalog(&config, mode)?;
    if run.courses.is_empty() {
        warn!("No published courses in collection {}", config.course_collection);
    }

    match &args.out {
        Some(path) => crate::io::export::write_html(path, &run.html),
        None => {
            print!("{}", run.html);
            Ok(())
        }
    }
}

fn handle_schema(settings: Settings) -> Result<(), AppError> {
    let (status, body) = crate::debug::schema_dump(&settings);
    print_json(&body)?;
    if status >= 400 {
        return Err(AppError::upstream("Schema read failed.", Some(status), ""));
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::runtime(format!("Failed to format JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Rewrite argv so `mirror` defaults to `mirror serve`.
///
/// Rules:
/// - `mirror`                      -> `mirror serve`
/// - `mirror --bind ADDR ...`      -> `mirror serve --bind ADDR ...`
/// - `mirror --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
    }
    argv
}
