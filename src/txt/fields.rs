// Typed decoders for the whitespace-delimited table fields. Every
// parser consumes the whole token and returns None on junk; the sinks
// attach row context to failures.

use crate::model::{Phenotype, Sample, Sex};

pub(crate) fn parse_str(field: &[u8]) -> Option<String> {
    if field.is_empty() {
        return None;
    }
    String::from_utf8(field.to_vec()).ok()
}

/// Chromosomes above 255 are not used by PLINK; the low byte is kept,
/// matching the format's own truncation.
pub(crate) fn parse_chr(field: &[u8]) -> Option<u8> {
    let chr: i64 = std::str::from_utf8(field).ok()?.parse().ok()?;
    Some(chr as u8)
}

/// Genetic distance in centimorgans.
pub(crate) fn parse_genetic_position(field: &[u8]) -> Option<f32> {
    std::str::from_utf8(field).ok()?.parse().ok()
}

/// Base-pair position.
pub(crate) fn parse_bp_position(field: &[u8]) -> Option<i64> {
    std::str::from_utf8(field).ok()?.parse().ok()
}

pub(crate) fn parse_sex(field: &[u8]) -> Option<Sex> {
    match field {
        b"1" => Some(Sex::Male),
        b"2" => Some(Sex::Female),
        b"0" => Some(Sex::Unknown),
        _ => None,
    }
}

/// Phenotype column: the discrete codes decode to their implied values,
/// anything else must parse as a continuous float.
pub(crate) fn parse_phenotype(field: &[u8]) -> Option<Phenotype> {
    match field {
        b"1" => return Some(Phenotype::Control),
        b"2" => return Some(Phenotype::Case),
        b"0" | b"-9" | b"NA" => return Some(Phenotype::Missing),
        _ => {}
    }
    let value: f32 = std::str::from_utf8(field).ok()?.parse().ok()?;
    Some(Phenotype::Continuous(value))
}

pub(crate) const SAMPLE_FIELDS: usize = 6;

pub(crate) const SAMPLE_FIELD_KINDS: [&str; SAMPLE_FIELDS] = [
    "family id",
    "individual id",
    "father id",
    "mother id",
    "sex",
    "phenotype",
];

/// Accumulator for the six leading sample fields shared by `.fam` and
/// `.ped` rows.
pub(crate) struct SampleDraft {
    pub fid: String,
    pub iid: String,
    pub father_iid: String,
    pub mother_iid: String,
    pub sex: Sex,
    pub phenotype: Phenotype,
}

impl Default for SampleDraft {
    fn default() -> Self {
        Self {
            fid: String::new(),
            iid: String::new(),
            father_iid: String::new(),
            mother_iid: String::new(),
            sex: Sex::Unknown,
            phenotype: Phenotype::Missing,
        }
    }
}

impl SampleDraft {
    /// Parse sample field `index` into its slot; false on junk.
    pub fn set_field(&mut self, field: &[u8], index: usize) -> bool {
        match index {
            0 => parse_str(field).map(|v| self.fid = v).is_some(),
            1 => parse_str(field).map(|v| self.iid = v).is_some(),
            2 => parse_str(field).map(|v| self.father_iid = v).is_some(),
            3 => parse_str(field).map(|v| self.mother_iid = v).is_some(),
            4 => parse_sex(field).map(|v| self.sex = v).is_some(),
            5 => parse_phenotype(field).map(|v| self.phenotype = v).is_some(),
            _ => false,
        }
    }

    pub fn into_sample(self, id: usize) -> Sample {
        Sample {
            id,
            fid: self.fid,
            iid: self.iid,
            father_iid: self.father_iid,
            mother_iid: self.mother_iid,
            sex: self.sex,
            phenotype: self.phenotype,
        }
    }
}
