//! NetCopy CLI - netcat with checksums and traffic statistics

use clap::Parser;
use netcopy::config::{CliArgs, SessionConfig};
use netcopy::core::Session;
use netcopy::NetcopyError;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging; --verbose turns on progress messages over RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if args.address.is_none() {
        eprintln!("Usage: netcopy [OPTIONS] <ADDRESS>");
        eprintln!("       netcopy --help for more information");
        std::process::exit(1);
    }

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            let fatal = e
                .downcast_ref::<NetcopyError>()
                .map_or(true, NetcopyError::is_fatal);
            if !fatal {
                tracing::debug!("Session ended on a transfer error: {:?}", e);
            }
            std::process::exit(1);
        }
    }
}

fn log_filter(verbose: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    with_verbose(filter, verbose)
}

fn with_verbose(filter: EnvFilter, verbose: bool) -> EnvFilter {
    let quieter_than_info = filter
        .max_level_hint()
        .map_or(true, |level| level < LevelFilter::INFO);
    if verbose && quieter_than_info {
        filter.add_directive(LevelFilter::INFO.into())
    } else {
        filter
    }
}

fn run(args: &CliArgs) -> anyhow::Result<i32> {
    let config = SessionConfig::from_cli(args)?;

    if config.verbose {
        print_config(&config);
    }

    let report = Session::new(config).run()?;
    Ok(report.exit_code())
}

fn print_config(config: &SessionConfig) {
    tracing::info!("Peer:        {}", config.address);
    tracing::info!("Mode:        {}", if config.listen_mode { "listen" } else { "connect" });
    tracing::info!("Directions:  {}", config.task_count());
    tracing::info!(
        "Buffer:      {}",
        humansize::format_size(config.buffer_size as u64, humansize::BINARY)
    );
    if config.compute_checksum {
        tracing::info!("Checksum:    {}", config.hash.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_quiet_env_level() {
        let filter = with_verbose(EnvFilter::new("warn"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_env_level_kept_without_verbose() {
        let filter = with_verbose(EnvFilter::new("warn"), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = with_verbose(EnvFilter::new("debug"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
