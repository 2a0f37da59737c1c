//! Error types for the zkey codec

use std::io;
use thiserror::Error;

/// Top-level codec error
#[derive(Debug, Error)]
pub enum ZKeyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    #[error("Container error: {0}")]
    BinFile(#[from] BinFileError),
}

impl ZKeyError {
    /// True for failures that mean the file content is corrupt,
    /// as opposed to unsupported or unreadable.
    pub fn is_corruption(&self) -> bool {
        matches!(self, ZKeyError::Structure(_) | ZKeyError::Range(_))
    }
}

/// The file is not something this codec understands
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid file magic: expected {expected:?}, got {actual:?}")]
    BadMagic { expected: [u8; 4], actual: [u8; 4] },

    #[error("Unsupported container version {version} (max {max})")]
    UnsupportedVersion { version: u32, max: u32 },

    #[error("Unsupported protocol tag {0} (only Groth16 = 1)")]
    UnsupportedProtocol(u32),
}

/// The file is readable but its layout is corrupt
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("Missing section {0}")]
    MissingSection(u32),

    #[error("Section {0} appears more than once")]
    DuplicateSection(u32),

    #[error("Section {section} size mismatch: expected {expected}, got {actual}")]
    SectionSize {
        section: u32,
        expected: u64,
        actual: u64,
    },

    #[error("Section {section} truncated: needed {needed} more bytes, {remaining} left")]
    Truncated {
        section: u32,
        needed: u64,
        remaining: u64,
    },

    #[error("C point for public variable {index} is not the point at infinity")]
    PublicCNotZero { index: u32 },

    #[error("Coefficient {index} has unknown matrix id {value}")]
    InvalidMatrix { index: u32, value: u32 },

    #[error("Declared {field} byte width {declared} does not match modulus width {derived}")]
    FieldWidth {
        field: &'static str,
        declared: u32,
        derived: u32,
    },

    #[error("Invalid variable counts: nPublic={n_public}, nVars={n_vars}")]
    InvalidCounts { n_vars: u32, n_public: u32 },

    #[error("Domain size {0} is not a power of two")]
    DomainSize(u32),

    #[error("Modulus {field} cannot be used for Montgomery conversion")]
    InvalidModulus { field: &'static str },
}

/// A wire integer is not a reduced Montgomery residue
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Field element in section {section} is not below the {field} modulus")]
pub struct RangeError {
    pub section: u32,
    pub field: &'static str,
}

/// Write-side validation of an in-memory key
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("nPublic ({n_public}) must be smaller than nVars ({n_vars})")]
    PublicNotBelowVars { n_vars: u32, n_public: u32 },

    #[error("{name} has {actual} entries, expected {expected}")]
    Length {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Domain size {0} is not a power of two")]
    DomainSize(u32),

    #[error("C[{index}] must be the point at infinity for public variables")]
    PublicCNotInfinity { index: u32 },

    #[error("{name}[{index}] has a coordinate outside the base field")]
    CoordinateRange { name: &'static str, index: usize },

    #[error("Coefficient {index} value is outside the scalar field")]
    CoefficientRange { index: usize },

    #[error("Count of {name} ({count}) does not fit in 32 bits")]
    TooLarge { name: &'static str, count: usize },
}

/// Field codec construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Modulus is not usable for Montgomery conversion")]
    InvalidModulus,

    #[error("Wire value is not reduced modulo the field prime")]
    NotReduced,
}

/// Misuse of the section container
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinFileError {
    #[error("Section {0} started while another section is open")]
    SectionAlreadyOpen(u32),

    #[error("No section is open")]
    NoOpenSection,

    #[error("Section {0} was never closed")]
    UnclosedSection(u32),

    #[error("Declared {declared} sections but wrote {written}")]
    SectionCount { declared: u32, written: u32 },

    #[error("Value does not fit in {n8} bytes")]
    BigIntOverflow { n8: usize },
}

pub type Result<T> = std::result::Result<T, ZKeyError>;
