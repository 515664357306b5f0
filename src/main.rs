use calendar_access::storage::Config;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{USAGE, parse_cli_mode, run};

fn main() -> anyhow::Result<()> {
    let config = Config::load_or_create()?;
    let _guard = setup_logging(&config);

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    if let Err(e) = run(cli_mode, &config) {
        tracing::error!("Command failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn setup_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = Config::config_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "calendar-access.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!("calendar-access started");
    guard
}
