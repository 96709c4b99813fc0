// Entrypoint for the CLI application.
// - Keeps `main` small: load the settings file and hand it to the UI flow.
// - Returns `anyhow::Result` so any stage failure becomes a process failure.

use spsync_cli::{config::Settings, ui::run_sync};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    // Config file path comes from the first argument, defaulting to
    // `spsync.json` in the working directory.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "spsync.json".to_string());
    let settings = Settings::from_file(Path::new(&path))?;

    // Run the sync. This call blocks until the upload finishes or fails.
    run_sync(settings)?;
    Ok(())
}
