use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use plinkset::{Locus, Phenotype, Sample, Sex};

// Shared fixture: two loci by four samples.
//
// 0x78 unpacks to [hom-first, het, hom-second, missing],
// 0x1b to [hom-second, het, missing, hom-first].
pub const ROW1: [u8; 4] = [0, 1, 2, 3];
pub const ROW2: [u8; 4] = [2, 1, 3, 0];
pub const BED_BODY: [u8; 2] = [0x78, 0x1b];
pub const BED_HEADER: [u8; 3] = [0x6c, 0x1b, 0x01];

pub const FAM_TEXT: &str = "F1 P1 0 0 1 1\nF1 P2 0 0 2 2\nF2 P3 0 0 1 0\nF2 P4 0 0 0 1.5\n";
pub const BIM_TEXT: &str = "1 rs1 0 1234567 A C\n2 rs2 0.23 7654321 G T\n";

/// Write the binary triple under `dir` and return its prefix.
pub fn write_dataset(dir: &Path) -> PathBuf {
    let prefix = dir.join("dataset");
    write_bytes(&with_ext(&prefix, ".bed"), &[&BED_HEADER[..], &BED_BODY[..]].concat());
    write_text(&with_ext(&prefix, ".fam"), FAM_TEXT);
    write_text(&with_ext(&prefix, ".bim"), BIM_TEXT);
    prefix
}

pub const MAP_TEXT: &str = "1 rs1 1234567\n1 rs2 7654321\n";
pub const PED_TEXT: &str = "\
F1 P1 0 0 1 1 A A G G\n\
F1 P2 0 0 2 2 A T G C\n\
F1 P3 0 0 1 0 T T C C\n\
F1 P4 0 0 2 2 0 0 G G\n";

/// Write the `.ped`/`.map` text pair under `dir` and return its prefix.
pub fn write_text_dataset(dir: &Path) -> PathBuf {
    let prefix = dir.join("textset");
    write_text(&with_ext(&prefix, ".map"), MAP_TEXT);
    write_text(&with_ext(&prefix, ".ped"), PED_TEXT);
    prefix
}

pub fn with_ext(prefix: &Path, extension: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_os_string();
    path.push(extension);
    PathBuf::from(path)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) {
    let mut file = File::create(path).unwrap();
    file.write_all(bytes).unwrap();
}

pub fn write_text(path: &Path, text: &str) {
    write_bytes(path, text.as_bytes());
}

pub fn read_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

pub fn sample(fid: &str, iid: &str, sex: Sex, phenotype: Phenotype) -> Sample {
    Sample {
        id: 0,
        fid: fid.to_string(),
        iid: iid.to_string(),
        father_iid: "0".to_string(),
        mother_iid: "0".to_string(),
        sex,
        phenotype,
    }
}

pub fn locus(id: usize, name: &str, bp_position: i64, allele1: &str, allele2: &str) -> Locus {
    Locus {
        id,
        chromosome: 1,
        name: name.to_string(),
        position: 0.0,
        bp_position,
        allele1: allele1.to_string(),
        allele2: allele2.to_string(),
    }
}
