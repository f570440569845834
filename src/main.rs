use chrono::Local;
use tracing_subscriber::EnvFilter;

use notiflow_console::storage::config::Config;

mod cli;
use cli::{
    CliMode, USAGE, parse_cli_mode, run_agenda_mode, run_delete_message_mode, run_message_mode,
    run_report_mode, run_send_mode, run_templates_mode, run_upcoming_mode,
};
mod tui;
use tui::{login, logout, run_tui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli_mode = match parse_cli_mode(std::env::args().skip(1), Local::now().date_naive()) {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let config = Config::load_or_create()?;
    tracing::info!("Using API at {}", config.api.base_url);

    let result = match cli_mode {
        CliMode::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliMode::Login(email) => login(&config, &email).await,
        CliMode::Logout => logout(&config).await,
        CliMode::Agenda { date, sample } => run_agenda_mode(&config, date, sample).await,
        CliMode::Upcoming { sample } => run_upcoming_mode(&config, sample).await,
        CliMode::Report => run_report_mode(&config).await,
        CliMode::Send(message) => run_send_mode(&config, &message).await,
        CliMode::ShowMessage(id) => run_message_mode(&config, &id).await,
        CliMode::DeleteMessage(id) => run_delete_message_mode(&config, &id).await,
        CliMode::Templates => run_templates_mode(&config).await,
        CliMode::Interactive { sample, month } => run_tui(config, sample, month).await,
    };

    if let Err(e) = &result {
        tracing::error!("notiflow-console failed: {:#}", e);
    }
    result
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "notiflow-console.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("notiflow-console started");
}
