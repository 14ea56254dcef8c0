//! Runs every engine in turn. The first argument, if given, is the run time in
//! seconds for every engine; otherwise the barber shop stays open 15 seconds and
//! the others run 10.
//!
//! ```bash
//! RUST_LOG=info cargo run -p sync-problems -- 5
//! ```

use std::time::Duration;
use sync_framework::tracing::setup_tracing;
use sync_problems::lifecycle::Lab;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let mut lab = Lab::default();
    if let Some(arg) = std::env::args().nth(1) {
        let seconds = arg
            .parse::<u64>()
            .map_err(|e| format!("invalid run time {arg:?}: {e}"))?;
        lab.run_time = Duration::from_secs(seconds);
        lab.barber_run_time = Duration::from_secs(seconds);
    }
    info!(
        run_secs = lab.run_time.as_secs(),
        barber_secs = lab.barber_run_time.as_secs(),
        "Starting lab"
    );

    lab.run_all().await.map_err(|e| {
        error!(error = %e, "Lab aborted");
        e.to_string()
    })
}
