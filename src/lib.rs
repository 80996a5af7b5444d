//! Read, write, and transpose PLINK genotype datasets: a `.bed` file of
//! 2-bit packed genotypes plus its `.bim` (loci) and `.fam` (samples)
//! annotation tables, streamed one row at a time so multi-million-row
//! matrices never have to fit in memory. `.ped`/`.map` text pairs can be
//! ingested into the binary triple, including minor-allele
//! normalisation.
//!
//! ```no_run
//! use plinkset::PlinkFile;
//!
//! # fn main() -> plinkset::Result<()> {
//! let mut plink = PlinkFile::open(&"cohort")?;
//! let mut row = vec![0u8; plink.row_size()];
//! while plink.next_row(&mut row)? {
//!     // one locus across all samples (or one sample across all loci,
//!     // depending on the file's row order)
//! }
//! # Ok(())
//! # }
//! ```

pub mod bed;
pub mod bim;
pub mod error;
pub mod fam;
pub mod model;
pub mod plink;

mod bits;
mod ped;
mod txt;

pub use crate::bed::BedFile;
pub use crate::bed::header::{BedHeader, BedVersion, SnpOrder};
pub use crate::bed::transpose;
pub use crate::bim::BimFile;
pub use crate::error::{PlinkError, Result};
pub use crate::fam::FamFile;
pub use crate::model::{Genotype, Locus, Phenotype, Sample, Sex};
pub use crate::plink::PlinkFile;
