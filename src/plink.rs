use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;

use crate::bed::{self, BedFile, header::SnpOrder};
use crate::bim::BimFile;
use crate::error::{PlinkError, Result};
use crate::fam::FamFile;
use crate::model::{Locus, Sample};
use crate::ped;

/// One PLINK dataset: the `.fam` samples, the `.bim` loci, and the
/// packed `.bed` matrix, opened and closed together.
pub struct PlinkFile {
    fam: FamFile,
    bim: BimFile,
    bed: BedFile,
}

// PLINK prefixes are plain string prefixes; Path::set_extension would
// eat dotted directory or basename parts.
fn member_path(prefix: &impl AsRef<Path>, extension: &str) -> PathBuf {
    let mut path = prefix.as_ref().as_os_str().to_os_string();
    path.push(extension);
    PathBuf::from(path)
}

fn work_dir(prefix: &Path) -> &Path {
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl PlinkFile {
    /// Open `prefix.fam`, `prefix.bim`, and `prefix.bed`, in that order.
    /// The table sizes discovered from the text files become the bed
    /// geometry.
    pub fn open(prefix: &impl AsRef<Path>) -> Result<Self> {
        Self::open_ex(
            &member_path(prefix, ".fam"),
            &member_path(prefix, ".bim"),
            &member_path(prefix, ".bed"),
        )
    }

    /// Open a dataset whose three members live at unrelated paths.
    pub fn open_ex(
        fam_path: &impl AsRef<Path>,
        bim_path: &impl AsRef<Path>,
        bed_path: &impl AsRef<Path>,
    ) -> Result<Self> {
        let fam = FamFile::open(fam_path).map_err(|e| PlinkError::Fam {
            source: Box::new(e),
        })?;
        let bim = BimFile::open(bim_path).map_err(|e| PlinkError::Bim {
            source: Box::new(e),
        })?;
        let bed = BedFile::open(bed_path, bim.len(), fam.len()).map_err(|e| PlinkError::Bed {
            source: Box::new(e),
        })?;
        Ok(Self { fam, bim, bed })
    }

    /// Create a new dataset. The complete sample list is required up
    /// front since it fixes the `.bed` row size; loci are then appended
    /// row by row with `write_row`.
    pub fn create(prefix: &impl AsRef<Path>, samples: &[Sample]) -> Result<Self> {
        let fam = FamFile::create(&member_path(prefix, ".fam"), samples).map_err(|e| {
            PlinkError::Fam {
                source: Box::new(e),
            }
        })?;
        let bim = BimFile::create(&member_path(prefix, ".bim")).map_err(|e| PlinkError::Bim {
            source: Box::new(e),
        })?;
        let bed =
            BedFile::create(&member_path(prefix, ".bed"), fam.len()).map_err(|e| PlinkError::Bed {
                source: Box::new(e),
            })?;
        Ok(Self { fam, bim, bed })
    }

    /// Append one locus: its `.bim` row and its packed genotype row.
    /// The `.bim` write happens first, so a table failure surfaces
    /// before any `.bed` bytes land.
    pub fn write_row(&mut self, locus: &Locus, snps: &[u8]) -> Result<()> {
        self.bim.write(locus).map_err(|e| PlinkError::Bim {
            source: Box::new(e),
        })?;
        self.bed.write_row(snps).map_err(|e| PlinkError::Bed {
            source: Box::new(e),
        })?;
        Ok(())
    }

    /// Decode the next data row; `Ok(false)` after the last one.
    pub fn next_row(&mut self, buf: &mut [u8]) -> Result<bool> {
        self.bed.read_row(buf)
    }

    pub fn skip_row(&mut self) -> Result<bool> {
        self.bed.skip_row()
    }

    pub fn reset_row(&mut self) -> Result<()> {
        self.bed.reset_row()
    }

    /// Genotypes per data row; the buffer size `next_row` needs.
    pub fn row_size(&self) -> usize {
        self.bed.row_size()
    }

    pub fn num_samples(&self) -> usize {
        self.fam.len()
    }

    pub fn num_loci(&self) -> usize {
        self.bim.len()
    }

    pub fn sample(&self, id: usize) -> Option<&Sample> {
        self.fam.sample(id)
    }

    pub fn locus(&self, id: usize) -> Option<&Locus> {
        self.bim.locus(id)
    }

    pub fn samples(&self) -> &[Sample] {
        self.fam.samples()
    }

    pub fn loci(&self) -> &[Locus] {
        self.bim.loci()
    }

    pub fn one_locus_per_row(&self) -> bool {
        self.bed.snp_order() == SnpOrder::OneLocusPerRow
    }

    pub fn fam(&self) -> &FamFile {
        &self.fam
    }

    pub fn bim(&self) -> &BimFile {
        &self.bim
    }

    pub fn bed(&self) -> &BedFile {
        &self.bed
    }

    /// Transpose the dataset at `prefix` into `transposed_prefix`: the
    /// `.bed` matrix is rewritten in the opposite orientation, the
    /// `.bim` and `.fam` siblings are copied byte for byte.
    pub fn transpose(prefix: &impl AsRef<Path>, transposed_prefix: &impl AsRef<Path>) -> Result<()> {
        let plink = Self::open(prefix)?;
        let (num_loci, num_samples) = (plink.num_loci(), plink.num_samples());

        bed::transpose(
            &member_path(prefix, ".bed"),
            &member_path(transposed_prefix, ".bed"),
            num_loci,
            num_samples,
        )?;

        for extension in [".fam", ".bim"] {
            let to = member_path(transposed_prefix, extension);
            fs::copy(member_path(prefix, extension), &to).map_err(|e| PlinkError::Write {
                source: e,
                path: to,
            })?;
        }
        Ok(())
    }

    /// Build a dataset from `prefix.ped` and `prefix.map`, keeping every
    /// product in unlinked temporary storage.
    pub fn open_txt(prefix: &impl AsRef<Path>) -> Result<Self> {
        Self::ingest_txt(prefix.as_ref(), None)
    }

    /// Build persistent `.bed`/`.bim`/`.fam` files at `out_prefix` from
    /// the `.ped`/`.map` pair at `txt_prefix`, and open the result.
    pub fn convert_txt(txt_prefix: &impl AsRef<Path>, out_prefix: &impl AsRef<Path>) -> Result<Self> {
        Self::ingest_txt(txt_prefix.as_ref(), Some(out_prefix.as_ref()))
    }

    // The ingest pipeline: parse the .map into loci; stream the .ped
    // through a one-sample-per-row working bed while discovering
    // alleles; transpose to one locus per row; normalise so allele2 is
    // the minor allele; then link or keep everything temporary.
    fn ingest_txt(prefix: &Path, out_prefix: Option<&Path>) -> Result<Self> {
        let map_path = member_path(&prefix, ".map");
        let ped_path = member_path(&prefix, ".ped");
        let scratch = work_dir(prefix);

        let mut loci = ped::parse_map(&map_path)?;
        debug!("parsed {} loci from {}", loci.len(), map_path.display());

        let mut work = BedFile::create_tmp_transposed(scratch, loci.len())?;
        let samples = ped::parse_samples(&ped_path, &mut loci, &mut work)?;
        debug!("ingested {} samples from {}", samples.len(), ped_path.display());

        let dest = match out_prefix {
            Some(out) => {
                let bed_path = member_path(&out, ".bed");
                OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&bed_path)
                    .map_err(|e| PlinkError::Open {
                        source: e,
                        path: bed_path,
                    })?
            }
            None => tempfile::tempfile_in(scratch).map_err(|e| PlinkError::Open {
                source: e,
                path: scratch.to_path_buf(),
            })?,
        };

        let mut bed = work.into_transposed(dest, loci.len(), samples.len())?;
        bed.normalize_minor_alleles(&mut loci)?;

        match out_prefix {
            Some(out) => {
                let bim = BimFile::link(loci, &member_path(&out, ".bim"))?;
                let fam = FamFile::link(samples, &member_path(&out, ".fam"))?;
                // the finished .bed reopens read-only
                let bed = BedFile::open(&member_path(&out, ".bed"), bim.len(), fam.len())?;
                Ok(Self { fam, bim, bed })
            }
            None => {
                bed.reset_row()?;
                Ok(Self {
                    fam: FamFile::from_samples(samples),
                    bim: BimFile::from_loci(loci),
                    bed,
                })
            }
        }
    }
}
