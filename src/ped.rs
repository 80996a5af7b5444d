use std::fs::File;
use std::path::Path;

use log::debug;

use crate::bed::BedFile;
use crate::error::{PlinkError, Result};
use crate::model::{Genotype, Locus, Sample};
use crate::txt::fields::{SAMPLE_FIELD_KINDS, SAMPLE_FIELDS, SampleDraft};
use crate::txt::{self, RowSink, fields};

/// The PLINK missing-allele label, doubling as the slot value for an
/// allele not yet observed during `.ped` discovery. `"0"` tokens are
/// no-calls and never occupy a slot, so the sentinel cannot collide
/// with a real allele.
const NO_ALLELE: &str = "0";

// ---- .map ----

#[derive(Default)]
struct LocusDraft {
    chromosome: u8,
    name: String,
    bp_position: i64,
}

/// `.map` rows carry 3 or 4 columns; whether the third column is the
/// genetic position or the bp position is only known once the row ends,
/// so it is stashed raw until then. The first complete row fixes the
/// shape for the rest of the file.
#[derive(Default)]
struct MapSink {
    draft: LocusDraft,
    third: Vec<u8>,
    columns: Option<usize>,
    fields_seen: usize,
    failed_row: bool,
    row: usize,
    error: Option<PlinkError>,
    loci: Vec<Locus>,
}

impl MapSink {
    fn fail(&mut self, error: PlinkError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn complete_row(&mut self, number: usize) {
        let n = self.fields_seen;
        let shape_ok = match self.columns {
            Some(expected) => n == expected,
            None if n == 3 || n == 4 => {
                self.columns = Some(n);
                true
            }
            None => false,
        };
        if !shape_ok {
            self.fail(PlinkError::RowShape {
                row: number,
                n_fields: n,
                expected: self.columns.unwrap_or(4),
            });
            return;
        }

        let draft = std::mem::take(&mut self.draft);
        let (position, bp_position) = if n == 3 {
            match fields::parse_bp_position(&self.third) {
                Some(bp) => (0.0, bp),
                None => {
                    return self.fail(PlinkError::FieldParse {
                        kind: "bp position",
                        row: number,
                    });
                }
            }
        } else {
            match fields::parse_genetic_position(&self.third) {
                Some(position) => (position, draft.bp_position),
                None => {
                    return self.fail(PlinkError::FieldParse {
                        kind: "genetic position",
                        row: number,
                    });
                }
            }
        };

        self.loci.push(Locus {
            id: self.loci.len(),
            chromosome: draft.chromosome,
            name: draft.name,
            position,
            bp_position,
            allele1: NO_ALLELE.to_string(),
            allele2: NO_ALLELE.to_string(),
        });
    }
}

impl RowSink for MapSink {
    fn field(&mut self, field: &[u8], index: usize) {
        if self.failed_row {
            return;
        }
        self.fields_seen += 1;

        let ok = match index {
            0 => fields::parse_chr(field)
                .map(|v| self.draft.chromosome = v)
                .is_some(),
            1 => fields::parse_str(field)
                .map(|v| self.draft.name = v)
                .is_some(),
            2 => {
                self.third.clear();
                self.third.extend_from_slice(field);
                true
            }
            3 => fields::parse_bp_position(field)
                .map(|v| self.draft.bp_position = v)
                .is_some(),
            _ => return, // shape checked at the row callback
        };

        if !ok {
            self.failed_row = true;
            let kind = match index {
                0 => "chromosome",
                1 => "name",
                _ => "bp position",
            };
            self.fail(PlinkError::FieldParse {
                kind,
                row: self.row,
            });
        }
    }

    fn row(&mut self, number: usize) {
        if !self.failed_row && self.fields_seen != 0 {
            self.complete_row(number);
        }
        self.draft = LocusDraft::default();
        self.fields_seen = 0;
        self.failed_row = false;
        self.row = number + 1;
    }
}

/// Parse a `.map` file into the loci table, allele slots unfilled.
pub(crate) fn parse_map(path: &Path) -> Result<Vec<Locus>> {
    let mut file = File::open(path).map_err(|e| PlinkError::Open {
        source: e,
        path: path.to_path_buf(),
    })?;

    let mut sink = MapSink::default();
    txt::parse_stream(&mut file, &mut sink)?;
    if let Some(error) = sink.error {
        return Err(error);
    }
    Ok(sink.loci)
}

// ---- .ped ----

#[derive(Clone, Copy, PartialEq, Eq)]
enum PedFormat {
    /// One allele per column: 6 sample fields + 2L allele fields.
    Simple,
    /// Two single-character alleles per column: 6 + L fields.
    Compound,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AlleleCall {
    No,
    First,
    Second,
}

struct PedSink<'a> {
    format: PedFormat,
    loci: &'a mut [Locus],
    bed: &'a mut BedFile,
    samples: Vec<Sample>,
    /// Unpacked genotypes of the sample being parsed, one per locus.
    snps: Vec<u8>,
    draft: SampleDraft,
    prev_call: AlleleCall,
    fields_seen: usize,
    failed_row: bool,
    row: usize,
    error: Option<PlinkError>,
}

impl<'a> PedSink<'a> {
    fn new(format: PedFormat, loci: &'a mut [Locus], bed: &'a mut BedFile) -> Self {
        let num_loci = loci.len();
        Self {
            format,
            loci,
            bed,
            samples: Vec::new(),
            snps: vec![0; num_loci],
            draft: SampleDraft::default(),
            prev_call: AlleleCall::No,
            fields_seen: 0,
            failed_row: false,
            row: 0,
            error: None,
        }
    }

    fn expected_columns(&self) -> usize {
        match self.format {
            PedFormat::Simple => SAMPLE_FIELDS + 2 * self.loci.len(),
            PedFormat::Compound => SAMPLE_FIELDS + self.loci.len(),
        }
    }

    /// Classify one allele token against the locus's discovery state:
    /// the first non-"0" token becomes allele1, the next distinct one
    /// allele2, and anything further is a third-allele error. The
    /// second token of each pair settles the genotype.
    fn observe_allele(&mut self, token: &[u8], locus_idx: usize, allele_idx: usize) -> Result<()> {
        let locus = &mut self.loci[locus_idx];
        let call = if token == NO_ALLELE.as_bytes() {
            AlleleCall::No
        } else if locus.allele1.as_bytes() == token {
            AlleleCall::First
        } else if locus.allele1 == NO_ALLELE {
            locus.allele1 = parse_allele_token(token, self.row)?;
            AlleleCall::First
        } else if locus.allele2.as_bytes() == token {
            AlleleCall::Second
        } else if locus.allele2 == NO_ALLELE {
            locus.allele2 = parse_allele_token(token, self.row)?;
            AlleleCall::Second
        } else {
            return Err(PlinkError::ThirdAllele {
                name: locus.name.clone(),
                allele: String::from_utf8_lossy(token).into_owned(),
            });
        };

        if allele_idx == 0 {
            self.prev_call = call;
        } else {
            self.snps[locus_idx] = match (self.prev_call, call) {
                (AlleleCall::No, _) | (_, AlleleCall::No) => Genotype::Missing,
                (AlleleCall::First, AlleleCall::First) => Genotype::HomFirst,
                (AlleleCall::Second, AlleleCall::Second) => Genotype::HomSecond,
                _ => Genotype::Het,
            }
            .as_unpacked();
        }
        Ok(())
    }

    fn genotype_field(&mut self, field: &[u8], index: usize) -> Result<()> {
        let idx = index - SAMPLE_FIELDS;
        match self.format {
            PedFormat::Simple => {
                if idx >= self.loci.len() * 2 {
                    return Ok(()); // shape error reported at the row end
                }
                self.observe_allele(field, idx >> 1, idx & 1)
            }
            PedFormat::Compound => {
                if idx >= self.loci.len() {
                    return Ok(());
                }
                if field.len() != 2 {
                    return Err(PlinkError::FieldParse {
                        kind: "allele pair",
                        row: self.row,
                    });
                }
                self.observe_allele(&field[..1], idx, 0)?;
                self.observe_allele(&field[1..], idx, 1)
            }
        }
    }
}

fn parse_allele_token(token: &[u8], row: usize) -> Result<String> {
    fields::parse_str(token).ok_or(PlinkError::FieldParse {
        kind: "allele",
        row,
    })
}

impl RowSink for PedSink<'_> {
    fn field(&mut self, field: &[u8], index: usize) {
        if self.failed_row {
            return;
        }
        self.fields_seen += 1;

        let result = if index < SAMPLE_FIELDS {
            if self.draft.set_field(field, index) {
                Ok(())
            } else {
                Err(PlinkError::FieldParse {
                    kind: SAMPLE_FIELD_KINDS[index],
                    row: self.row,
                })
            }
        } else {
            self.genotype_field(field, index)
        };

        if let Err(error) = result {
            self.failed_row = true;
            if self.error.is_none() {
                self.error = Some(error);
            }
        }
    }

    fn row(&mut self, number: usize) {
        let expected = self.expected_columns();
        if self.failed_row || self.fields_seen == 0 {
            // dropped or blank row
        } else if self.fields_seen == expected {
            let draft = std::mem::take(&mut self.draft);
            let id = self.samples.len();
            match self.bed.write_row(&self.snps) {
                Ok(()) => self.samples.push(draft.into_sample(id)),
                Err(error) => {
                    if self.error.is_none() {
                        self.error = Some(error);
                    }
                }
            }
        } else if self.error.is_none() {
            self.error = Some(PlinkError::RowShape {
                row: number,
                n_fields: self.fields_seen,
                expected,
            });
        }

        self.snps.fill(0);
        self.draft = SampleDraft::default();
        self.fields_seen = 0;
        self.failed_row = false;
        self.row = number + 1;
    }
}

/// Stream a `.ped` file: discover alleles, append one packed
/// one-sample-per-row `.bed` row per sample, and return the samples.
/// The column count of the first row decides between the simple and
/// compound layouts.
pub(crate) fn parse_samples(
    path: &Path,
    loci: &mut [Locus],
    bed: &mut BedFile,
) -> Result<Vec<Sample>> {
    let mut file = File::open(path).map_err(|e| PlinkError::Open {
        source: e,
        path: path.to_path_buf(),
    })?;

    let n_cols = txt::count_columns(&mut file)?;
    let simple = SAMPLE_FIELDS + 2 * loci.len();
    let compound = SAMPLE_FIELDS + loci.len();
    let format = if n_cols == simple {
        PedFormat::Simple
    } else if n_cols == compound {
        PedFormat::Compound
    } else {
        return Err(PlinkError::PedColumns {
            n_cols,
            simple,
            compound,
        });
    };
    debug!(
        "parsing {} as {} ped with {} loci",
        path.display(),
        match format {
            PedFormat::Simple => "simple",
            PedFormat::Compound => "compound",
        },
        loci.len()
    );

    let mut sink = PedSink::new(format, loci, bed);
    txt::parse_stream(&mut file, &mut sink)?;
    if let Some(error) = sink.error {
        return Err(error);
    }
    Ok(sink.samples)
}
