//! Tracing subscriber setup for the binary

use tracing::Level;

/// Parse a textual level, falling back to `info` for anything unknown
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// Install the global fmt subscriber on stderr. Library code only emits events.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
