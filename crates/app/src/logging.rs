use std::io;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Level applied to this tool's own targets.
pub(crate) fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    match (verbose, quiet) {
        (_, true) => LevelFilter::WARN,
        (true, false) => LevelFilter::DEBUG,
        (false, false) => LevelFilter::INFO,
    }
}

pub(crate) fn setup_tracing(level: LevelFilter) {
    let own_level = level.into_level().unwrap_or(Level::ERROR);
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let effective_level = if metadata.target().starts_with("octfilter") {
            own_level
        } else {
            Level::WARN
        };
        metadata.level() <= &effective_level
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}
