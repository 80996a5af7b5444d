use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use memmap2::Mmap;

use crate::bed::header::BedHeader;
use crate::bed::packed::PAIRS_PER_BYTE;
use crate::error::{PlinkError, Result};

/// Rewrite the `.bed` file at `original` into `transposed` with the
/// opposite row orientation. The source is memory-mapped read-only; the
/// destination is truncated first.
pub fn transpose(
    original: &impl AsRef<Path>,
    transposed: &impl AsRef<Path>,
    num_loci: usize,
    num_samples: usize,
) -> Result<()> {
    let src = File::open(original).map_err(|e| PlinkError::Open {
        source: e,
        path: original.as_ref().to_path_buf(),
    })?;
    let mut dst = File::create(transposed).map_err(|e| PlinkError::Open {
        source: e,
        path: transposed.as_ref().to_path_buf(),
    })?;
    transpose_files(&src, &mut dst, num_loci, num_samples)
}

/// Transpose between already-open files; the ingest pipeline uses this
/// over its unlinked working bed.
pub(crate) fn transpose_files(
    src: &File,
    dst: &mut File,
    num_loci: usize,
    num_samples: usize,
) -> Result<()> {
    let map = unsafe { Mmap::map(src) }.map_err(|e| PlinkError::Mmap { source: e })?;
    let mut header = BedHeader::from_bytes(&map, num_loci, num_samples);
    let num_rows = header.num_rows();
    let num_cols = header.num_cols();

    let expected = header.file_size() as u64;
    if (map.len() as u64) < expected {
        return Err(PlinkError::BedSize {
            expected,
            found: map.len() as u64,
        });
    }
    let data = &map[header.data_offset()..];

    // Truncate first; a previously longer file must not leave trailing
    // bytes after the transposed body.
    dst.set_len(0).map_err(|e| PlinkError::WriteStream { source: e })?;
    dst.seek(SeekFrom::Start(0))
        .map_err(|e| PlinkError::WriteStream { source: e })?;

    header.transpose();
    dst.write_all(&header.to_bytes())
        .map_err(|e| PlinkError::WriteStream { source: e })?;

    debug!("transposing {num_rows}x{num_cols} bed body");
    transpose_rows(data, num_rows, num_cols, dst)
}

// Gather pass: each destination row j collects the 2-bit value at column
// j of every source row.
fn transpose_rows(rows: &[u8], num_rows: usize, num_cols: usize, out: &mut File) -> Result<()> {
    let src_row_bytes = num_cols.div_ceil(PAIRS_PER_BYTE);
    let dst_row_bytes = num_rows.div_ceil(PAIRS_PER_BYTE);
    let mut row_buf = vec![0u8; dst_row_bytes];

    for j in 0..num_cols {
        row_buf.fill(0);
        for i in 0..num_rows {
            let from = rows[i * src_row_bytes + j / PAIRS_PER_BYTE];
            let pair = (from >> ((j % PAIRS_PER_BYTE) * 2)) & 0x3;
            row_buf[i / PAIRS_PER_BYTE] |= pair << ((i % PAIRS_PER_BYTE) * 2);
        }
        out.write_all(&row_buf)
            .map_err(|e| PlinkError::WriteStream { source: e })?;
    }
    Ok(())
}
