pub mod builders;
pub mod fake_executor;

use std::path::Path;
use std::sync::Once;
use std::time::Duration;

use readqc::fs::mock::MockFileSystem;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single async test step.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialise tracing for tests.
///
/// Output goes through `with_test_writer()`, so the harness only shows it
/// for failing tests (or with `-- --nocapture`). Levels come from
/// `READQC_LOG`, then `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(readqc::logging::LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test step timed out")
}

/// A mock filesystem holding a small FASTQ record at each of `paths`.
pub fn mock_fs_with_reads<P: AsRef<Path>>(paths: &[P]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for path in paths {
        fs.add_file(path, "@r\nACGT\n+\nIIII\n");
    }
    fs
}
