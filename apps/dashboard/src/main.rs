mod app;
mod charts;
mod data;
mod ui;

use std::fs::File;
use std::sync::Arc;

use anyhow::Result;

fn main() -> Result<()> {
    init_logging();
    let table = data::load_table()?;
    app::App::new(table).run()
}

/// Diagnostics go to a temp-dir file so the alternate screen stays clean.
/// Setup is best-effort; the dashboard runs fine without a log.
fn init_logging() {
    let path = std::env::temp_dir().join("souk.log");
    let Ok(file) = File::create(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(Arc::new(file))
        .try_init();
}
