use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;

use crate::error::{PlinkError, Result};
use crate::model::{Phenotype, Sample};
use crate::txt::fields::{SAMPLE_FIELD_KINDS, SAMPLE_FIELDS, SampleDraft};
use crate::txt::{self, RowSink};

/// The samples table behind a `.fam` file. Parsed once on open, or
/// written in full on create (the sample count fixes the `.bed` row
/// size, so it cannot grow afterwards).
pub struct FamFile {
    samples: Vec<Sample>,
}

#[derive(Default)]
struct FamSink {
    draft: SampleDraft,
    fields_seen: usize,
    failed_row: bool,
    row: usize,
    error: Option<PlinkError>,
    samples: Vec<Sample>,
}

impl RowSink for FamSink {
    fn field(&mut self, field: &[u8], index: usize) {
        if self.failed_row {
            return;
        }
        self.fields_seen += 1;
        if index >= SAMPLE_FIELDS {
            return;
        }

        if !self.draft.set_field(field, index) {
            self.failed_row = true;
            if self.error.is_none() {
                self.error = Some(PlinkError::FieldParse {
                    kind: SAMPLE_FIELD_KINDS[index],
                    row: self.row,
                });
            }
        }
    }

    fn row(&mut self, number: usize) {
        if !self.failed_row && self.fields_seen == SAMPLE_FIELDS {
            let draft = std::mem::take(&mut self.draft);
            let id = self.samples.len();
            self.samples.push(draft.into_sample(id));
        } else if !self.failed_row && self.fields_seen != 0 && self.error.is_none() {
            self.error = Some(PlinkError::RowShape {
                row: number,
                n_fields: self.fields_seen,
                expected: SAMPLE_FIELDS,
            });
        }

        self.draft = SampleDraft::default();
        self.fields_seen = 0;
        self.failed_row = false;
        self.row = number + 1;
    }
}

// Discrete phenotypes write their integer code, continuous ones the
// float value; sex always writes its digit.
fn format_sample(sample: &Sample) -> String {
    let lead = format!(
        "{}\t{}\t{}\t{}\t{}",
        sample.fid,
        sample.iid,
        sample.father_iid,
        sample.mother_iid,
        sample.sex.digit()
    );
    match sample.phenotype {
        Phenotype::Continuous(value) => format!("{lead}\t{value:.6}\n"),
        Phenotype::Control => format!("{lead}\t1\n"),
        Phenotype::Case => format!("{lead}\t2\n"),
        Phenotype::Missing => format!("{lead}\t0\n"),
    }
}

impl FamFile {
    /// Parse an existing `.fam` file into a read-only table.
    pub fn open(path: &impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.as_ref().to_path_buf(),
        })?;

        let mut sink = FamSink::default();
        txt::parse_stream(&mut file, &mut sink)?;
        if let Some(error) = sink.error {
            return Err(error);
        }

        debug!(
            "parsed {} samples from {}",
            sink.samples.len(),
            path.as_ref().display()
        );
        Ok(Self {
            samples: sink.samples,
        })
    }

    /// Write a complete `.fam` file; the stored copies take sequential
    /// ids.
    pub fn create(path: &impl AsRef<Path>, samples: &[Sample]) -> Result<Self> {
        let owned: Vec<Sample> = samples
            .iter()
            .enumerate()
            .map(|(id, sample)| {
                let mut copy = sample.clone();
                copy.id = id;
                copy
            })
            .collect();
        Self::link(owned, path.as_ref())
    }

    /// Wrap already-built samples without any backing file.
    pub(crate) fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Write already-built samples out as a persistent `.fam` file.
    pub(crate) fn link(samples: Vec<Sample>, path: &Path) -> Result<Self> {
        let mut file = File::create(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.to_path_buf(),
        })?;
        for sample in &samples {
            file.write_all(format_sample(sample).as_bytes())
                .map_err(|e| PlinkError::Write {
                    source: e,
                    path: path.to_path_buf(),
                })?;
        }
        Ok(Self { samples })
    }

    pub fn sample(&self, id: usize) -> Option<&Sample> {
        self.samples.get(id)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sex;
    use std::io::Write as _;

    fn write_fam(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("test.fam");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn samples_parse_with_mixed_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fam(dir.path(), "F1 P1 0 0 1 1\nF1\tP2 0 0 2 2\n");
        let fam = FamFile::open(&path).unwrap();

        assert_eq!(fam.len(), 2);
        let first = fam.sample(0).unwrap();
        assert_eq!(first.fid, "F1");
        assert_eq!(first.iid, "P1");
        assert_eq!(first.father_iid, "0");
        assert_eq!(first.mother_iid, "0");
        assert_eq!(first.sex, Sex::Male);
        assert_eq!(first.phenotype, Phenotype::Control);

        let second = fam.sample(1).unwrap();
        assert_eq!(second.iid, "P2");
        assert_eq!(second.sex, Sex::Female);
        assert_eq!(second.phenotype, Phenotype::Case);
    }

    #[test]
    fn continuous_phenotypes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fam(dir.path(), "F1 P1 0 0 1 1.25\nF1 P2 0 0 2 -9\n");
        let fam = FamFile::open(&path).unwrap();
        assert_eq!(fam.sample(0).unwrap().phenotype, Phenotype::Continuous(1.25));
        assert_eq!(fam.sample(1).unwrap().phenotype, Phenotype::Missing);

        let out = dir.path().join("out.fam");
        let written = FamFile::create(&out, fam.samples()).unwrap();
        let reread = FamFile::open(&out).unwrap();
        assert_eq!(reread.samples(), written.samples());
    }

    #[test]
    fn round_trip_preserves_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fam(dir.path(), "F1 P1 0 0 1 1\nF1\tP2 0 0 2 2\n");
        let fam = FamFile::open(&path).unwrap();

        let out = dir.path().join("out.fam");
        FamFile::create(&out, fam.samples()).unwrap();
        let reread = FamFile::open(&out).unwrap();
        assert_eq!(reread.samples(), fam.samples());
    }

    #[test]
    fn bad_sex_code_fails_the_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fam(dir.path(), "F1 P1 0 0 5 1\n");
        assert!(matches!(
            FamFile::open(&path),
            Err(PlinkError::FieldParse { kind: "sex", row: 0 })
        ));
    }

    #[test]
    fn wrong_column_count_fails_the_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fam(dir.path(), "F1 P1 0 0 1 1 extra\n");
        assert!(matches!(
            FamFile::open(&path),
            Err(PlinkError::RowShape {
                row: 0,
                n_fields: 7,
                expected: SAMPLE_FIELDS
            })
        ));
    }
}
