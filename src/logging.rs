use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const CRATES: [&str; 5] = ["facesort", "facesort_catalog", "facesort_config", "facesort_interchange", "facesort_organize"];

/// Filter used when `RUST_LOG` is not set: our crates at the level picked by
/// `-v`/`-q`, everything else (sqlx included) at warn.
fn default_filter(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let mut directives = vec![if quiet { "error".to_string() } else { "warn".to_string() }];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}

/// Logs to stderr so stdout only carries the command's own output.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(verbose > 1).with_filter(filter))
        .init();
}
