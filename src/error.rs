use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlinkError {
    #[error("could not open .fam component")]
    Fam {
        #[source]
        source: Box<PlinkError>,
    },

    #[error("could not open .bim component")]
    Bim {
        #[source]
        source: Box<PlinkError>,
    },

    #[error("could not open .bed component")]
    Bed {
        #[source]
        source: Box<PlinkError>,
    },

    #[error("could not open {path}")]
    Open {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not read {path}")]
    Read {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not read genotype data")]
    ReadStream {
        #[source]
        source: std::io::Error,
    },

    #[error("could not write to {path}")]
    Write {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not write genotype data")]
    WriteStream {
        #[source]
        source: std::io::Error,
    },

    #[error("could not memory-map genotype data")]
    Mmap {
        #[source]
        source: std::io::Error,
    },

    #[error("missing or malformed .bed header")]
    BedHeader,

    #[error(".bed file too small ({found} bytes) for declared geometry ({expected} bytes)")]
    BedSize { expected: u64, found: u64 },

    #[error("row buffer holds {found} genotypes but the row needs {needed}")]
    RowBuffer { needed: usize, found: usize },

    #[error("row holds {found} genotypes but the file geometry needs {needed}")]
    RowLength { needed: usize, found: usize },

    #[error("could not parse {kind} in row {row}")]
    FieldParse { kind: &'static str, row: usize },

    #[error("expected {expected} fields (got {n_fields}) in row {row}")]
    RowShape {
        row: usize,
        n_fields: usize,
        expected: usize,
    },

    #[error("third distinct allele {allele:?} at locus {name:?}")]
    ThirdAllele { name: String, allele: String },

    #[error(
        ".ped row has {n_cols} columns; expected {simple} (one allele per column) or {compound} (two per column)"
    )]
    PedColumns {
        n_cols: usize,
        simple: usize,
        compound: usize,
    },

    #[error("table was opened read-only")]
    TableReadOnly,
}

pub type Result<T> = std::result::Result<T, PlinkError>;
