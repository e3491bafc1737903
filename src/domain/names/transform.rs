use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::csv::{quote_field, split_record};

// ============================================================================
// Dataset Transform
// ============================================================================
//
// Turns a raw name list (one name per row in the first column, with a
// header) into the `year,id,name` layout the lookup table reads.
//
// ============================================================================

pub const DATASET_HEADER: &str = "year,id,name";

/// Rewrites `input` into `output`, numbering rows from 1. Returns rows written.
pub fn transform<R, W>(input: R, mut output: W, year: i64) -> anyhow::Result<u64>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{DATASET_HEADER}")?;

    let mut written = 0u64;
    for (index, line) in input.lines().enumerate().skip(1) {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_record(line)
            .map_err(|reason| anyhow::anyhow!("line {}: {reason}", index + 1))?;
        let Some(name) = fields.first().map(|f| f.trim()).filter(|f| !f.is_empty()) else {
            tracing::debug!(line = index + 1, "Skipping row without a name");
            continue;
        };

        written += 1;
        writeln!(output, "{year},{written},{}", quote_field(name))?;
    }

    output.flush()?;
    Ok(written)
}

pub fn transform_file(input: &Path, output: &Path, year: i64) -> anyhow::Result<u64> {
    let reader = File::open(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let writer = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    transform(BufReader::new(reader), BufWriter::new(writer), year)
}
