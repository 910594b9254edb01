//! Run command - execute an allocation script against a fresh pool.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mempool_allocator::PoolAllocator;

use crate::config::Settings;
use crate::script;
use crate::session::Session;

/// Run the run command.
pub fn run(path: &Path, settings: Settings, json: bool) -> Result<()> {
    tracing::info!(script = %path.display(), size = settings.size, "Running script");

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let lines = script::parse(&source)
        .with_context(|| format!("Failed to parse script: {}", path.display()))?;

    let pool = PoolAllocator::with_config(settings.size, settings.pool)
        .context("Failed to create pool")?;
    let mut session = Session::new(pool);

    if json {
        let mut sink = io::sink();
        for line in &lines {
            session.execute(line, &mut sink)?;
        }
        print_json(&session)?;
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in &lines {
            session.execute(line, &mut out)?;
        }
        print_summary(&session, &mut out)?;
    }

    tracing::info!(
        commands = lines.len(),
        failures = session.failures(),
        "Script finished"
    );
    Ok(())
}

fn print_summary(session: &Session, out: &mut impl Write) -> Result<()> {
    let pool = session.pool();
    writeln!(out)?;
    write!(out, "{pool}")?;
    writeln!(out, "Free:           {} bytes", pool.free_bytes())?;
    writeln!(out, "Largest free:   {} bytes", pool.largest_free_block())?;
    writeln!(out, "Fragmentation:  {:.1}%", pool.fragmentation() * 100.0)?;
    writeln!(out, "Failures:       {}", session.failures())?;

    if let Some(stats) = pool.stats() {
        writeln!(out)?;
        writeln!(out, "Statistics")?;
        writeln!(out, "==========")?;
        writeln!(out, "Allocations:    {}", stats.total_allocs)?;
        writeln!(out, "Frees:          {}", stats.total_frees)?;
        writeln!(out, "Resizes:        {}", stats.total_resizes)?;
        writeln!(out, "Relocations:    {}", stats.relocations)?;
        writeln!(out, "Failed allocs:  {}", stats.failed_allocs)?;
        writeln!(out, "Peak usage:     {} bytes", stats.peak_usage)?;
    }
    Ok(())
}

fn print_json(session: &Session) -> Result<()> {
    let pool = session.pool();
    let blocks: Vec<_> = pool.blocks().collect();
    let report = serde_json::json!({
        "name": pool.name(),
        "capacity": pool.capacity(),
        "used": pool.used_bytes(),
        "free": pool.free_bytes(),
        "largest_free": pool.largest_free_block(),
        "blocks": blocks,
        "stats": pool.stats(),
        "failures": session.failures(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
