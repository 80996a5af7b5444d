/// One genotype call in the unpacked alphabet: one byte per genotype,
/// counting copies of the second (minor, after normalisation) allele.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genotype {
    HomFirst = 0,
    Het = 1,
    HomSecond = 2,
    Missing = 3,
}

impl Genotype {
    pub fn from_unpacked(value: u8) -> Option<Self> {
        match value {
            0 => Some(Genotype::HomFirst),
            1 => Some(Genotype::Het),
            2 => Some(Genotype::HomSecond),
            3 => Some(Genotype::Missing),
            _ => None,
        }
    }

    pub fn as_unpacked(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    // Text form used by both .fam and .ped
    pub(crate) fn digit(self) -> u8 {
        match self {
            Sex::Male => 1,
            Sex::Female => 2,
            Sex::Unknown => 0,
        }
    }
}

/// Affection status and phenotype value as a single sum type. PLINK
/// entangles the two: the discrete arms imply their value, and only
/// `Continuous` carries an arbitrary one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phenotype {
    Control,
    Case,
    Missing,
    Continuous(f32),
}

impl Phenotype {
    pub fn value(self) -> f32 {
        match self {
            Phenotype::Control => 0.0,
            Phenotype::Case => 1.0,
            Phenotype::Missing => -9.0,
            Phenotype::Continuous(value) => value,
        }
    }
}

/// A single variant and its .bim annotation. `id` is the zero-based
/// insertion index, which doubles as the data-row index for
/// one-locus-per-row .bed files.
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    pub id: usize,
    pub chromosome: u8,
    pub name: String,
    /// Genetic position in centimorgans.
    pub position: f32,
    pub bp_position: i64,
    pub allele1: String,
    pub allele2: String,
}

/// A single individual and its .fam annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: usize,
    pub fid: String,
    pub iid: String,
    pub father_iid: String,
    pub mother_iid: String,
    pub sex: Sex,
    pub phenotype: Phenotype,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genotype_unpacked_codes_round_trip() {
        for value in 0u8..4 {
            let genotype = Genotype::from_unpacked(value).unwrap();
            assert_eq!(genotype.as_unpacked(), value);
        }
        assert_eq!(Genotype::from_unpacked(4), None);
    }

    #[test]
    fn phenotype_discrete_arms_imply_values() {
        assert_eq!(Phenotype::Control.value(), 0.0);
        assert_eq!(Phenotype::Case.value(), 1.0);
        assert_eq!(Phenotype::Missing.value(), -9.0);
        assert_eq!(Phenotype::Continuous(1.25).value(), 1.25);
    }
}
