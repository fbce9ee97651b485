//! Logging setup for the Jubensha binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The default filter enables the `jubensha_*` library crates and the binary
/// itself at `default_log_level`. `RUST_LOG` overrides it entirely.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "jubensha-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use jubensha_shared::logger::setup_logger;
///
/// setup_logger("jubensha-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, level: &str) -> String {
    format!(
        "jubensha_server={level},jubensha_client={level},jubensha_shared={level},{}={level},tower_http={level}",
        binary_name.replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_library_crates_and_binary() {
        // テスト項目: デフォルトフィルタがライブラリとバイナリの両方を含む
        // given (前提条件):
        let binary = "jubensha-server";

        // when (操作):
        let filter = default_filter(binary, "debug");

        // then (期待する結果):
        assert!(filter.contains("jubensha_server=debug"));
        assert!(filter.contains("jubensha_client=debug"));
        assert!(filter.ends_with("tower_http=debug"));
        assert!(!filter.contains("jubensha-server"));
    }
}
