mod common;

use itertools::iproduct;
use plinkset::{Phenotype, PlinkError, PlinkFile, Sex};
use pretty_assertions::assert_eq;

#[test]
fn open_reads_every_row_then_ends() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = common::write_dataset(dir.path());

    let mut plink = PlinkFile::open(&prefix).unwrap();
    assert_eq!(plink.num_loci(), 2);
    assert_eq!(plink.num_samples(), 4);
    assert_eq!(plink.row_size(), 4);
    assert!(plink.one_locus_per_row());

    let mut buf = vec![0u8; plink.row_size()];
    assert!(plink.next_row(&mut buf).unwrap());
    assert_eq!(buf, common::ROW1);
    assert!(plink.next_row(&mut buf).unwrap());
    assert_eq!(buf, common::ROW2);
    assert!(!plink.next_row(&mut buf).unwrap());
    // END is sticky
    assert!(!plink.next_row(&mut buf).unwrap());
}

#[test]
fn tables_expose_the_parsed_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = common::write_dataset(dir.path());
    let plink = PlinkFile::open(&prefix).unwrap();

    let rs2 = plink.locus(1).unwrap();
    assert_eq!(rs2.name, "rs2");
    assert_eq!(rs2.chromosome, 2);
    assert_eq!(rs2.position, 0.23);
    assert_eq!(rs2.allele1, "G");

    let p1 = plink.sample(0).unwrap();
    assert_eq!(p1.iid, "P1");
    assert_eq!(p1.sex, Sex::Male);
    assert_eq!(p1.phenotype, Phenotype::Control);
    let p4 = plink.sample(3).unwrap();
    assert_eq!(p4.sex, Sex::Unknown);
    assert_eq!(p4.phenotype, Phenotype::Continuous(1.5));

    assert!(plink.locus(2).is_none());
    assert!(plink.sample(4).is_none());
}

#[test]
fn skip_then_read_returns_the_second_row() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = common::write_dataset(dir.path());
    let mut plink = PlinkFile::open(&prefix).unwrap();

    let mut buf = vec![0u8; plink.row_size()];
    assert!(plink.skip_row().unwrap());
    assert!(plink.next_row(&mut buf).unwrap());
    assert_eq!(buf, common::ROW2);
    assert!(!plink.skip_row().unwrap());
}

#[test]
fn reset_restores_the_first_row() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = common::write_dataset(dir.path());
    let mut plink = PlinkFile::open(&prefix).unwrap();

    let mut first = vec![0u8; plink.row_size()];
    let mut buf = vec![0u8; plink.row_size()];
    assert!(plink.next_row(&mut first).unwrap());
    while plink.next_row(&mut buf).unwrap() {}

    plink.reset_row().unwrap();
    assert!(plink.next_row(&mut buf).unwrap());
    assert_eq!(buf, first);
}

#[test]
fn member_failures_name_the_failing_file() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = common::write_dataset(dir.path());

    std::fs::remove_file(common::with_ext(&prefix, ".bed")).unwrap();
    assert!(matches!(
        PlinkFile::open(&prefix),
        Err(PlinkError::Bed { .. })
    ));

    std::fs::remove_file(common::with_ext(&prefix, ".fam")).unwrap();
    assert!(matches!(
        PlinkFile::open(&prefix),
        Err(PlinkError::Fam { .. })
    ));
}

#[test]
fn created_datasets_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("fresh");

    let mut samples = [
        common::sample("F1", "P1", Sex::Male, Phenotype::Control),
        common::sample("F1", "P2", Sex::Female, Phenotype::Case),
        common::sample("F2", "P3", Sex::Unknown, Phenotype::Continuous(-0.5)),
    ];
    for (id, sample) in samples.iter_mut().enumerate() {
        sample.id = id;
    }
    let loci = [
        common::locus(0, "rs1", 1000, "A", "C"),
        common::locus(1, "rs2", 2000, "G", "T"),
    ];
    let rows: [&[u8]; 2] = [&[0, 1, 2], &[3, 2, 0]];

    let mut plink = PlinkFile::create(&prefix, &samples).unwrap();
    for (locus, row) in loci.iter().zip(rows) {
        plink.write_row(locus, row).unwrap();
    }
    drop(plink);

    let mut reread = PlinkFile::open(&prefix).unwrap();
    assert_eq!(reread.samples(), &samples);
    assert_eq!(reread.loci(), &loci);

    let mut buf = vec![0u8; reread.row_size()];
    for row in rows {
        assert!(reread.next_row(&mut buf).unwrap());
        assert_eq!(buf, row);
    }
    assert!(!reread.next_row(&mut buf).unwrap());
}

#[test]
fn every_genotype_combination_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("grid");

    let samples = [
        common::sample("F", "S1", Sex::Male, Phenotype::Missing),
        common::sample("F", "S2", Sex::Male, Phenotype::Missing),
        common::sample("F", "S3", Sex::Male, Phenotype::Missing),
        common::sample("F", "S4", Sex::Male, Phenotype::Missing),
    ];
    let grid: Vec<[u8; 4]> = iproduct!(0..4u8, 0..4u8, 0..4u8, 0..4u8)
        .map(|(a, b, c, d)| [a, b, c, d])
        .collect();

    let mut plink = PlinkFile::create(&prefix, &samples).unwrap();
    for (index, row) in grid.iter().enumerate() {
        let locus = common::locus(index, &format!("rs{index}"), index as i64, "A", "C");
        plink.write_row(&locus, row).unwrap();
    }
    drop(plink);

    let mut reread = PlinkFile::open(&prefix).unwrap();
    assert_eq!(reread.num_loci(), grid.len());
    let mut buf = vec![0u8; reread.row_size()];
    for row in &grid {
        assert!(reread.next_row(&mut buf).unwrap());
        assert_eq!(&buf, row);
    }
    assert!(!reread.next_row(&mut buf).unwrap());
}
