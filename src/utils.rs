use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::TRACE_FLUSH_ROWS;
use crate::error::Result;
use crate::types::TraceSample;

const TRACE_HEADER: &str = "tick,x,y,vx,vy,shown,frozen";

/// Per-tick trace streamed to a CSV file.
///
/// Rows are flushed every [`TRACE_FLUSH_ROWS`] rows and on [`finish`], so a
/// process killed mid-run leaves at most one unflushed window behind.
///
/// [`finish`]: TraceWriter::finish
pub struct TraceWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: u64,
}

impl TraceWriter {
    /// Create the file (and its parent directory) and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{TRACE_HEADER}")?;
        writer.flush()?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn write_sample(&mut self, s: &TraceSample) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{}",
            s.tick,
            s.position.x,
            s.position.y,
            s.velocity.x,
            s.velocity.y,
            u8::from(s.shown),
            u8::from(s.frozen)
        )?;
        self.rows += 1;

        if self.rows % TRACE_FLUSH_ROWS == 0 {
            self.writer.flush()?;
        }
        Ok(())
    }

    /// Flush everything written so far and close the file.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}
