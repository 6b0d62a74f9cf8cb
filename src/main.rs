use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

fn main() -> Result<()> {
    debug!(version = env!("APP_VERSION"), "lifescope placeholder entry");

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout).context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
