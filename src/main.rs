use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use semana_pasada::config::{get_config_path, load_config, resolve, save_config, Cli};
use semana_pasada::week_window::{compute_last_week_window, last_week_window_from_date};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn run() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let config = resolve(&cli, load_config(&config_path))?;

    if cli.save_config {
        save_config(&config_path, &config.to_app_config())?;
        info!(path = %config_path.display(), "config saved");
    }

    let window = match cli.reference_date {
        Some(date) => last_week_window_from_date(date),
        None => compute_last_week_window(Local::now().naive_local()),
    };

    let report = semana_pasada::run(&config, window)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("cannot serialize report")?;
        println!("{}", json);
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("semana-pasada failed: {err:#}");
        std::process::exit(1);
    }
}
