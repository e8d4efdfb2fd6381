//! The read–sort–write pipeline.
//!
//! The whole input is loaded into one contiguous buffer, line spans are
//! indexed, and the index vector is stably sorted by each line's key. Spans
//! include their terminators and are written back verbatim, so the output
//! is a byte-for-byte permutation of the input.

use std::fs::File;
use std::io::{self, BufWriter, IoSlice, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::key::sort_key;
use crate::common::io::{IOV_BATCH, read_file, write_all_slices};
use crate::common::io_error_msg;

/// 4MB output buffer — reduces flush frequency for large logs.
const OUTPUT_BUF_SIZE: usize = 4 * 1024 * 1024;

/// Failure modes of the pipeline. Neither is caught or retried: a read
/// failure leaves any pre-existing output untouched, a write failure may
/// leave a partially written output behind.
#[derive(Debug, Error)]
pub enum SortError {
    /// The input log could not be opened or read.
    #[error("{}: {}", .path.display(), io_error_msg(.source))]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file could not be created or written.
    #[error("{}: {}", .path.display(), io_error_msg(.source))]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counters from a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStats {
    /// Number of lines written.
    pub lines: usize,
    /// Total bytes read (and written).
    pub bytes: usize,
}

/// Compute the byte span of every line in `data`, terminator included.
/// A final line without a trailing newline still gets a span; `\r` is an
/// ordinary byte and stays inside its line.
pub fn split_lines(data: &[u8]) -> Vec<(usize, usize)> {
    let mut spans = Vec::with_capacity(data.len() / 40 + 1);
    let mut start = 0usize;

    for pos in memchr::memchr_iter(b'\n', data) {
        spans.push((start, pos + 1));
        start = pos + 1;
    }
    if start < data.len() {
        spans.push((start, data.len()));
    }

    spans
}

/// Stable index sort of `spans` by each line's key.
///
/// Keys are pre-extracted once so comparisons touch only the key slices.
/// Equal keys keep their input order, which matters here: concurrent
/// writers routinely land inside the same millisecond.
pub fn sorted_order(data: &[u8], spans: &[(usize, usize)]) -> Vec<usize> {
    let keys: Vec<&[u8]> = spans.iter().map(|&(s, e)| sort_key(&data[s..e])).collect();

    let mut indices: Vec<usize> = (0..spans.len()).collect();
    indices.sort_by(|&a, &b| keys[a].cmp(keys[b]));
    indices
}

/// Emit the spans in sorted order using vectored writes straight from the
/// input buffer, with no per-line copies.
fn write_spans(
    data: &[u8],
    spans: &[(usize, usize)],
    order: &[usize],
    out: &mut impl Write,
) -> io::Result<()> {
    let mut slices: Vec<IoSlice<'_>> = Vec::with_capacity(order.len().min(IOV_BATCH));
    for &idx in order {
        let (s, e) = spans[idx];
        slices.push(IoSlice::new(&data[s..e]));
        if slices.len() >= IOV_BATCH {
            write_all_slices(out, &slices)?;
            slices.clear();
        }
    }
    if !slices.is_empty() {
        write_all_slices(out, &slices)?;
    }
    Ok(())
}

/// Sort the log at `input` into `output`.
///
/// Reads the whole input before touching the output path, stably sorts the
/// lines by their timestamp key, and overwrites `output` wholesale. The
/// multiset of lines is preserved exactly; only their order changes.
pub fn sort_file(input: &Path, output: &Path) -> Result<SortStats, SortError> {
    let buffer = read_file(input).map_err(|source| SortError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let data: &[u8] = &buffer;

    let spans = split_lines(data);
    debug!(bytes = data.len(), lines = spans.len(), "input loaded");

    let order = sorted_order(data, &spans);

    // Input is fully in memory; only now is the output path opened.
    let write_err = |source| SortError::WriteOutput {
        path: output.to_path_buf(),
        source,
    };
    let file = File::create(output).map_err(write_err)?;
    let mut writer = BufWriter::with_capacity(OUTPUT_BUF_SIZE, file);
    write_spans(data, &spans, &order, &mut writer).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    info!(
        lines = spans.len(),
        path = %output.display(),
        "sorted log written"
    );

    Ok(SortStats {
        lines: spans.len(),
        bytes: data.len(),
    })
}
