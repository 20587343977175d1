use clap::Parser;
use macfinder::cli::Args;
use macfinder::output;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match args.execute().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}

/// Log to stderr so stdout only carries the result. `RUST_LOG` wins over flags.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "macfinder=debug"
    } else if quiet {
        "macfinder=warn"
    } else {
        "macfinder=info"
    }
}
