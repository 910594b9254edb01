//! Script session: named handles over one pool

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use mempool_allocator::{Allocation, MemoryError, PoolAllocator};

use crate::script::{Command, Line};

/// Executes script commands, reporting each outcome to a writer
///
/// Pool errors are reported and counted, never fatal: a script is expected
/// to exercise exhaustion and misuse. Only I/O failures abort.
pub struct Session {
    pool: PoolAllocator,
    /// Names keep their last handle after a free, so stale use is visible
    handles: BTreeMap<String, Allocation>,
    failures: usize,
}

impl Session {
    pub fn new(pool: PoolAllocator) -> Self {
        Self {
            pool,
            handles: BTreeMap::new(),
            failures: 0,
        }
    }

    pub fn pool(&self) -> &PoolAllocator {
        &self.pool
    }

    /// Commands that reported an error
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn execute(&mut self, line: &Line, out: &mut impl Write) -> Result<()> {
        tracing::trace!(line = line.number, command = ?line.command, "Executing");

        match &line.command {
            Command::Alloc { name, size } => match self.pool.allocate(*size) {
                Ok(handle) => {
                    self.handles.insert(name.clone(), handle);
                    writeln!(out, "alloc {name} {size} -> @{}", handle.offset())?;
                }
                Err(err) => self.report(out, line, &err)?,
            },
            Command::Free { name } => {
                let Some(handle) = self.handle(out, line, name)? else {
                    return Ok(());
                };
                match self.pool.free(handle) {
                    Ok(()) => writeln!(out, "free {name} @{}", handle.offset())?,
                    Err(err) => self.report(out, line, &err)?,
                }
            }
            Command::Resize { name, size } => {
                let Some(handle) = self.handle(out, line, name)? else {
                    return Ok(());
                };
                match self.pool.resize(Some(handle), *size) {
                    Ok(Some(resized)) => {
                        self.handles.insert(name.clone(), resized);
                        let how = if resized == handle { "in place" } else { "moved" };
                        writeln!(
                            out,
                            "resize {name} {size} -> @{} ({how})",
                            resized.offset()
                        )?;
                    }
                    Ok(None) => writeln!(out, "resize {name} 0 -> freed")?,
                    Err(err) => self.report(out, line, &err)?,
                }
            }
            Command::Write { name, byte } => {
                let Some(handle) = self.handle(out, line, name)? else {
                    return Ok(());
                };
                match self.pool.bytes_mut(handle) {
                    Ok(bytes) => {
                        bytes.fill(*byte);
                        let len = bytes.len();
                        writeln!(out, "write {name} {byte:#04x} ({len} bytes)")?;
                    }
                    Err(err) => self.report(out, line, &err)?,
                }
            }
            Command::Dump => write!(out, "{}", self.pool)?,
            Command::Check => match self.pool.check_invariants() {
                Ok(()) => writeln!(out, "check ok")?,
                Err(err) => self.report(out, line, &err)?,
            },
        }
        Ok(())
    }

    fn handle(
        &mut self,
        out: &mut impl Write,
        line: &Line,
        name: &str,
    ) -> Result<Option<Allocation>> {
        if let Some(handle) = self.handles.get(name) {
            return Ok(Some(*handle));
        }
        self.failures += 1;
        writeln!(out, "line {}: unknown name `{name}`", line.number)?;
        Ok(None)
    }

    fn report(&mut self, out: &mut impl Write, line: &Line, err: &MemoryError) -> Result<()> {
        self.failures += 1;
        tracing::debug!(line = line.number, code = err.code(), "Command failed");
        writeln!(out, "line {}: {} [{}]", line.number, err, err.code())?;
        Ok(())
    }
}
