//! `jeevraksha` - CLI for the emergency profile registry
//!
//! Each command starts the application, walks it through the screens the
//! command stands for, and prints the screen it ends on.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use jeevraksha::cli::{CallCommand, Cli, Command, ConfigCommand, OpenCommand, ProfileCommand};
use jeevraksha::cli::{HomeCommand, RegisterCommand};
use jeevraksha::dialer::contact_uri;
use jeevraksha::{init_logging, render, Action, App, Config, Dialer, HostDialer};
use jeevraksha::{GeminiGenerator, ProfileStore, Summarizer};

// Platform-specific imports using conditional compilation
#[cfg(target_os = "linux")]
use jeevraksha_linux as platform;

#[cfg(target_os = "macos")]
use jeevraksha_mac as platform;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let path = cli.config;
    match cli.command {
        Command::Home(cmd) => handle_home(&load_config(path)?, &cmd),
        Command::Register(cmd) => handle_register(&load_config(path)?, &cmd),
        Command::Qr(cmd) => handle_qr(&load_config(path)?, &cmd),
        Command::Scan(cmd) => handle_scan(&load_config(path)?, &cmd).await,
        Command::Open(cmd) => handle_open(&load_config(path)?, &cmd).await,
        Command::Call(cmd) => handle_call(&load_config(path)?, &cmd),
        // Loads on its own so a broken default file can still be inspected.
        Command::Config(cmd) => handle_config(path, cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("loading configuration")
}

fn summarizer(config: &Config) -> anyhow::Result<Summarizer> {
    let generator =
        GeminiGenerator::from_config(&config.summary).context("building summary client")?;
    Ok(Summarizer::new(generator))
}

fn build_app(config: &Config) -> anyhow::Result<App> {
    let store = ProfileStore::open(config.storage_path());
    Ok(App::new(store, summarizer(config)?))
}

fn print_screen(app: &App, json: bool) -> anyhow::Result<()> {
    let view = app.state().view();
    if json {
        let value = render::view_json(view, app.saved_profiles());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::render_view(view, app.saved_profiles()));
    }
    Ok(())
}

fn handle_home(config: &Config, cmd: &HomeCommand) -> anyhow::Result<()> {
    let app = build_app(config)?;
    print_screen(&app, cmd.json)
}

fn handle_register(config: &Config, cmd: &RegisterCommand) -> anyhow::Result<()> {
    let mut app = build_app(config)?;
    app.dispatch(Action::StartRegistration)?;
    app.submit_registration(cmd.to_form())
        .context("registration was not saved")?;
    print_screen(&app, cmd.json)
}

fn handle_qr(config: &Config, cmd: &ProfileCommand) -> anyhow::Result<()> {
    let mut app = build_app(config)?;
    app.select_saved(&cmd.profile)?;
    print_screen(&app, cmd.json)
}

async fn handle_scan(config: &Config, cmd: &ProfileCommand) -> anyhow::Result<()> {
    let mut app = build_app(config)?;
    app.dispatch(Action::StartScan)?;
    let effects = app.scan(&cmd.profile)?;
    app.run_effects(effects).await?;
    print_screen(&app, cmd.json)
}

async fn handle_open(config: &Config, cmd: &OpenCommand) -> anyhow::Result<()> {
    let store = ProfileStore::open(config.storage_path());
    let (mut app, effects) = App::start(store, summarizer(config)?, Some(&cmd.fragment));
    app.run_effects(effects).await?;
    print_screen(&app, cmd.json)
}

fn handle_call(config: &Config, cmd: &CallCommand) -> anyhow::Result<()> {
    let app = build_app(config)?;
    let profile = app.resolve_profile(&cmd.profile)?;
    let uri = contact_uri(&profile, cmd.slot())?;

    if cmd.dry_run {
        println!("{uri}");
        return Ok(());
    }
    HostDialer.dial(&uri)?;
    println!("Calling {} on {}", uri.number(), platform::platform_name());
    Ok(())
}

fn handle_config(path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = &load_config(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Profile store:      {}", config.storage_path().display());
                println!("  Storage key:        {}", config.storage.storage_key);
                println!();
                println!("[Summary]");
                println!("  API base:           {}", config.summary.api_base);
                println!(
                    "  API key:            {}",
                    if config.summary.api_key.is_some() {
                        "set"
                    } else {
                        "not set"
                    }
                );
                println!("  Timeout (secs):     {}", config.summary.timeout_secs);
                println!();
                println!("Platform:             {}", platform::platform_name());
            }
        }
        ConfigCommand::Path => {
            let path = path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
