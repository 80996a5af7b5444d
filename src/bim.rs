use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;

use crate::error::{PlinkError, Result};
use crate::model::Locus;
use crate::txt::{self, RowSink, fields};

pub(crate) const BIM_FIELDS: usize = 6;

const BIM_FIELD_KINDS: [&str; BIM_FIELDS] = [
    "chromosome",
    "name",
    "genetic position",
    "bp position",
    "allele",
    "allele",
];

/// The loci table behind a `.bim` file. Parsed once on open and
/// immutable afterwards, or created empty and appended to one locus at
/// a time alongside the `.bed` rows.
pub struct BimFile {
    writer: Option<File>,
    loci: Vec<Locus>,
}

#[derive(Default)]
struct LocusDraft {
    chromosome: u8,
    name: String,
    position: f32,
    bp_position: i64,
    allele1: String,
    allele2: String,
}

#[derive(Default)]
struct BimSink {
    draft: LocusDraft,
    fields_seen: usize,
    failed_row: bool,
    row: usize,
    error: Option<PlinkError>,
    loci: Vec<Locus>,
}

impl RowSink for BimSink {
    fn field(&mut self, field: &[u8], index: usize) {
        if self.failed_row {
            return;
        }
        self.fields_seen += 1;
        if index >= BIM_FIELDS {
            // shape checked at the row callback
            return;
        }

        let draft = &mut self.draft;
        let ok = match index {
            0 => fields::parse_chr(field)
                .map(|v| draft.chromosome = v)
                .is_some(),
            1 => fields::parse_str(field).map(|v| draft.name = v).is_some(),
            2 => fields::parse_genetic_position(field)
                .map(|v| draft.position = v)
                .is_some(),
            3 => fields::parse_bp_position(field)
                .map(|v| draft.bp_position = v)
                .is_some(),
            4 => fields::parse_str(field).map(|v| draft.allele1 = v).is_some(),
            _ => fields::parse_str(field).map(|v| draft.allele2 = v).is_some(),
        };

        if !ok {
            self.failed_row = true;
            if self.error.is_none() {
                self.error = Some(PlinkError::FieldParse {
                    kind: BIM_FIELD_KINDS[index],
                    row: self.row,
                });
            }
        }
    }

    fn row(&mut self, number: usize) {
        if !self.failed_row && self.fields_seen == BIM_FIELDS {
            let draft = std::mem::take(&mut self.draft);
            self.loci.push(Locus {
                id: self.loci.len(),
                chromosome: draft.chromosome,
                name: draft.name,
                position: draft.position,
                bp_position: draft.bp_position,
                allele1: draft.allele1,
                allele2: draft.allele2,
            });
        } else if !self.failed_row && self.fields_seen != 0 && self.error.is_none() {
            self.error = Some(PlinkError::RowShape {
                row: number,
                n_fields: self.fields_seen,
                expected: BIM_FIELDS,
            });
        }

        self.draft = LocusDraft::default();
        self.fields_seen = 0;
        self.failed_row = false;
        self.row = number + 1;
    }
}

fn format_locus(locus: &Locus) -> String {
    format!(
        "{}\t{}\t{:.6}\t{}\t{}\t{}\n",
        locus.chromosome,
        locus.name,
        locus.position,
        locus.bp_position,
        locus.allele1,
        locus.allele2
    )
}

impl BimFile {
    /// Parse an existing `.bim` file into a read-only table.
    pub fn open(path: &impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.as_ref().to_path_buf(),
        })?;

        let mut sink = BimSink::default();
        txt::parse_stream(&mut file, &mut sink)?;
        if let Some(error) = sink.error {
            return Err(error);
        }

        debug!("parsed {} loci from {}", sink.loci.len(), path.as_ref().display());
        Ok(Self {
            writer: None,
            loci: sink.loci,
        })
    }

    /// Create an empty `.bim` file open for appending.
    pub fn create(path: &impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.as_ref().to_path_buf(),
        })?;
        Ok(Self {
            writer: Some(file),
            loci: Vec::new(),
        })
    }

    /// Append one locus row; the stored copy takes the next id.
    pub fn write(&mut self, locus: &Locus) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(PlinkError::TableReadOnly)?;
        writer
            .write_all(format_locus(locus).as_bytes())
            .map_err(|e| PlinkError::WriteStream { source: e })?;

        let mut copy = locus.clone();
        copy.id = self.loci.len();
        self.loci.push(copy);
        Ok(())
    }

    /// Wrap already-built loci without any backing file (temporary
    /// ingests keep their table in memory only).
    pub(crate) fn from_loci(loci: Vec<Locus>) -> Self {
        Self { writer: None, loci }
    }

    /// Write already-built loci out as a persistent `.bim` file.
    pub(crate) fn link(loci: Vec<Locus>, path: &Path) -> Result<Self> {
        let mut file = File::create(path).map_err(|e| PlinkError::Open {
            source: e,
            path: path.to_path_buf(),
        })?;
        for locus in &loci {
            file.write_all(format_locus(locus).as_bytes())
                .map_err(|e| PlinkError::Write {
                    source: e,
                    path: path.to_path_buf(),
                })?;
        }
        Ok(Self { writer: None, loci })
    }

    pub fn locus(&self, id: usize) -> Option<&Locus> {
        self.loci.get(id)
    }

    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }
}
