pub mod header;
mod lookup;
mod packed;
mod transpose;

pub use transpose::transpose;

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use memmap2::MmapMut;

use crate::bed::header::{BedHeader, HEADER_MAX_SIZE, SnpOrder};
use crate::error::{PlinkError, Result};
use crate::model::Locus;

/// A streamed `.bed` file: one packed data row per `read_row`/`write_row`
/// call, decoded through the shared row buffer. After every successful
/// operation the stream sits at `data_offset + cur_row * row_bytes`.
pub struct BedFile {
    file: File,
    header: BedHeader,
    row_buf: Vec<u8>,
    cur_row: usize,
}

impl BedFile {
    /// Open an existing `.bed` file. The counts come from the sibling
    /// `.bim`/`.fam` tables; the header decides the row orientation.
    pub fn open(path: &impl AsRef<Path>, num_loci: usize, num_samples: usize) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.as_ref().to_path_buf(),
        })?;

        let mut raw = [0u8; HEADER_MAX_SIZE];
        file.read_exact(&mut raw).map_err(|_| PlinkError::BedHeader)?;
        let header = BedHeader::from_bytes(&raw, num_loci, num_samples);

        // The file must hold the declared geometry; trailing bytes are
        // tolerated and never read.
        let expected = header.file_size() as u64;
        let found = file
            .metadata()
            .map_err(|e| PlinkError::Read {
                source: e,
                path: path.as_ref().to_path_buf(),
            })?
            .len();
        if found < expected {
            return Err(PlinkError::BedSize { expected, found });
        }

        file.seek(SeekFrom::Start(header.data_offset() as u64))
            .map_err(|e| PlinkError::ReadStream { source: e })?;

        Ok(Self {
            row_buf: vec![0; header.row_bytes()],
            file,
            header,
            cur_row: 0,
        })
    }

    /// Create a new one-locus-per-row `.bed` file. Rows are appended
    /// with `write_row`, one locus at a time.
    pub fn create(path: &impl AsRef<Path>, num_samples: usize) -> Result<Self> {
        let mut file = File::create(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.as_ref().to_path_buf(),
        })?;

        let header = BedHeader::new(0, num_samples);
        file.write_all(&header.to_bytes())
            .map_err(|e| PlinkError::Write {
                source: e,
                path: path.as_ref().to_path_buf(),
            })?;

        Ok(Self {
            row_buf: vec![0; header.row_bytes()],
            file,
            header,
            cur_row: 0,
        })
    }

    /// Working bed for text ingest: an unlinked temporary file in `dir`,
    /// one sample per row, with the locus count fixed up front and the
    /// sample count growing as rows are appended.
    pub(crate) fn create_tmp_transposed(dir: &Path, num_loci: usize) -> Result<Self> {
        let mut file = tempfile::tempfile_in(dir).map_err(|e| PlinkError::Open {
            source: e,
            path: dir.to_path_buf(),
        })?;

        let header = BedHeader::new_transposed(num_loci, 0);
        file.write_all(&header.to_bytes())
            .map_err(|e| PlinkError::WriteStream { source: e })?;

        Ok(Self {
            row_buf: vec![0; header.row_bytes()],
            file,
            header,
            cur_row: 0,
        })
    }

    pub fn header(&self) -> &BedHeader {
        &self.header
    }

    pub fn snp_order(&self) -> SnpOrder {
        self.header.snp_order()
    }

    /// Genotypes per row; the smallest buffer `read_row` accepts.
    pub fn row_size(&self) -> usize {
        self.header.num_cols()
    }

    /// Decode the next row into `buf` as unpacked genotypes. Returns
    /// `Ok(false)` once all rows were read or the stream ends at a row
    /// boundary; a torn row is an error.
    pub fn read_row(&mut self, buf: &mut [u8]) -> Result<bool> {
        let num_cols = self.header.num_cols();
        if buf.len() < num_cols {
            return Err(PlinkError::RowBuffer {
                needed: num_cols,
                found: buf.len(),
            });
        }
        if self.cur_row >= self.header.num_rows() {
            return Ok(false);
        }

        let lead = loop {
            match self.file.read(&mut self.row_buf) {
                Ok(0) => return Ok(false),
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(PlinkError::ReadStream { source: e }),
            }
        };
        self.file
            .read_exact(&mut self.row_buf[lead..])
            .map_err(|e| PlinkError::ReadStream { source: e })?;

        packed::unpack_row(&self.row_buf, buf, num_cols);
        self.cur_row += 1;
        Ok(true)
    }

    /// Advance past the next row without decoding it. Returns
    /// `Ok(false)` when no rows remain.
    pub fn skip_row(&mut self) -> Result<bool> {
        if self.cur_row >= self.header.num_rows() {
            return Ok(false);
        }
        self.file
            .seek(SeekFrom::Current(self.header.row_bytes() as i64))
            .map_err(|e| PlinkError::ReadStream { source: e })?;
        self.cur_row += 1;
        Ok(true)
    }

    /// Pack and append one row of unpacked genotypes, growing the
    /// order-dependent count. `snps` must hold exactly one value per
    /// column.
    pub fn write_row(&mut self, snps: &[u8]) -> Result<()> {
        let num_cols = self.header.num_cols();
        if snps.len() != num_cols {
            return Err(PlinkError::RowLength {
                needed: num_cols,
                found: snps.len(),
            });
        }

        packed::pack_row(snps, &mut self.row_buf, num_cols);
        self.file
            .write_all(&self.row_buf)
            .map_err(|e| PlinkError::WriteStream { source: e })?;

        self.header.add_row();
        self.cur_row += 1;
        Ok(())
    }

    /// Seek back to the first data row.
    pub fn reset_row(&mut self) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(self.header.data_offset() as u64))
            .map_err(|e| PlinkError::ReadStream { source: e })?;
        self.cur_row = 0;
        Ok(())
    }

    /// Transpose this bed into `dest` and return a handle over the
    /// destination, positioned at its first row.
    pub(crate) fn into_transposed(
        self,
        mut dest: File,
        num_loci: usize,
        num_samples: usize,
    ) -> Result<Self> {
        transpose::transpose_files(&self.file, &mut dest, num_loci, num_samples)?;

        let mut header = BedHeader::from_bytes(&self.header.to_bytes(), num_loci, num_samples);
        header.transpose();

        let mut transposed = Self {
            row_buf: vec![0; header.row_bytes()],
            file: dest,
            header,
            cur_row: 0,
        };
        transposed.reset_row()?;
        Ok(transposed)
    }

    /// Minor-allele normalisation: for every locus whose first allele is
    /// the more frequent one, flip the packed row in place and swap the
    /// locus's allele labels. Afterwards `count(second) >= count(first)`
    /// holds row by row.
    ///
    /// The file must be one locus per row and open read-write; rows are
    /// rewritten through a shared mapping.
    pub fn normalize_minor_alleles(&mut self, loci: &mut [Locus]) -> Result<()> {
        debug_assert_eq!(self.header.snp_order(), SnpOrder::OneLocusPerRow);

        let num_cols = self.header.num_cols();
        let row_bytes = self.header.row_bytes();
        let num_rows = self.header.num_rows();

        let mut map =
            unsafe { MmapMut::map_mut(&self.file) }.map_err(|e| PlinkError::Mmap { source: e })?;
        let expected = self.header.file_size() as u64;
        if (map.len() as u64) < expected {
            return Err(PlinkError::BedSize {
                expected,
                found: map.len() as u64,
            });
        }

        let data = &mut map[self.header.data_offset()..];
        let mut flipped = 0usize;
        for (row, locus) in data
            .chunks_exact_mut(row_bytes)
            .take(num_rows)
            .zip(loci.iter_mut())
        {
            let (first, second) = packed::count_alleles(row, num_cols);
            if first > second {
                packed::flip_row(row, num_cols);
                std::mem::swap(&mut locus.allele1, &mut locus.allele2);
                flipped += 1;
            }
        }

        map.flush().map_err(|e| PlinkError::WriteStream { source: e })?;
        debug!("normalised {flipped} of {num_rows} loci to minor allele2");
        Ok(())
    }
}
