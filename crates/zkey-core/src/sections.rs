//! Bulk sections 3 to 6
//!
//! | id | contents |
//! |----|----------|
//! | 3  | (nPublic + 1) x G1 |
//! | 4  | u32 count, count x (u32 matrix, u32 constraint, u32 signal, Fr) |
//! | 5  | nVars x (G1 A, G1 B1, G2 B2, G1 C) |
//! | 6  | domainSize x G1 |
//!
//! Section 4 values are doubly Montgomery scaled (`x * R^2 mod r`).

use std::io::{Read, Seek, Write};

use crate::binfile::{BinFileReader, BinFileWriter};
use crate::constants::{SECTION_ABC, SECTION_COEFFS, SECTION_H, SECTION_IC};
use crate::errors::{Result, StructureError};
use crate::field::FieldCodec;
use crate::key::{Coefficient, Matrix};
use crate::point::PointCodec;
use crate::types::{G1Affine, G2Affine};

/// Per-variable query points from section 5
#[derive(Debug, Clone, Default)]
pub struct AbcPoints {
    pub a: Vec<G1Affine>,
    pub b1: Vec<G1Affine>,
    pub b2: Vec<G2Affine>,
    pub c: Vec<G1Affine>,
}

pub fn write_ic<W: Write + Seek>(
    w: &mut BinFileWriter<W>,
    points: &PointCodec<'_>,
    ic: &[G1Affine],
) -> Result<()> {
    w.start_section(SECTION_IC)?;
    for p in ic {
        points.write_g1(w, p)?;
    }
    w.end_section()
}

pub fn read_ic<R: Read + Seek>(
    r: &mut BinFileReader<R>,
    points: &PointCodec<'_>,
    n_public: u32,
) -> Result<Vec<G1Affine>> {
    let count = n_public as u64 + 1;
    read_g1_array(r, points, SECTION_IC, count)
}

pub fn write_coefficients<W: Write + Seek>(
    w: &mut BinFileWriter<W>,
    fr: &FieldCodec,
    ccoefs: &[Coefficient],
) -> Result<()> {
    w.start_section(SECTION_COEFFS)?;
    w.write_u32(ccoefs.len() as u32)?;
    for coef in ccoefs {
        w.write_u32(coef.matrix.id())?;
        w.write_u32(coef.constraint)?;
        w.write_u32(coef.signal)?;
        fr.write_double(w, &coef.value)?;
    }
    w.end_section()
}

pub fn read_coefficients<R: Read + Seek>(
    r: &mut BinFileReader<R>,
    fr: &FieldCodec,
) -> Result<Vec<Coefficient>> {
    let size = r.start_unique_section(SECTION_COEFFS)?;
    let count = r.read_u32()?;
    let expected = 4 + count as u64 * (12 + fr.n8() as u64);
    check_size(SECTION_COEFFS, expected, size)?;

    let mut ccoefs = Vec::with_capacity(count as usize);
    for index in 0..count {
        let matrix = r.read_u32()?;
        let matrix = Matrix::try_from(matrix)
            .map_err(|value| StructureError::InvalidMatrix { index, value })?;
        let constraint = r.read_u32()?;
        let signal = r.read_u32()?;
        let value = fr.read_double(r)?;
        ccoefs.push(Coefficient {
            matrix,
            constraint,
            signal,
            value,
        });
    }
    r.end_section()?;
    Ok(ccoefs)
}

/// Write section 5. The C slot of every public variable (`i <= n_public`)
/// is the G1 zero encoding whatever `c[i]` holds; callers that want that
/// enforced must validate the key first.
pub fn write_abc<W: Write + Seek>(
    w: &mut BinFileWriter<W>,
    points: &PointCodec<'_>,
    n_public: u32,
    abc: AbcRef<'_>,
) -> Result<()> {
    w.start_section(SECTION_ABC)?;
    for (i, (((a, b1), b2), c)) in abc
        .a
        .iter()
        .zip(abc.b1)
        .zip(abc.b2)
        .zip(abc.c)
        .enumerate()
    {
        points.write_g1(w, a)?;
        points.write_g1(w, b1)?;
        points.write_g2(w, b2)?;
        if i as u64 <= n_public as u64 {
            points.write_g1_zero(w)?;
        } else {
            points.write_g1(w, c)?;
        }
    }
    w.end_section()
}

/// Borrowed view of the section 5 arrays
#[derive(Debug, Clone, Copy)]
pub struct AbcRef<'a> {
    pub a: &'a [G1Affine],
    pub b1: &'a [G1Affine],
    pub b2: &'a [G2Affine],
    pub c: &'a [G1Affine],
}

/// Read section 5, failing if a public variable's C point is finite
pub fn read_abc<R: Read + Seek>(
    r: &mut BinFileReader<R>,
    points: &PointCodec<'_>,
    n_vars: u32,
    n_public: u32,
) -> Result<AbcPoints> {
    let size = r.start_unique_section(SECTION_ABC)?;
    let per_var = 3 * points.g1_size() as u64 + points.g2_size() as u64;
    check_size(SECTION_ABC, n_vars as u64 * per_var, size)?;

    let n = n_vars as usize;
    let mut abc = AbcPoints {
        a: Vec::with_capacity(n),
        b1: Vec::with_capacity(n),
        b2: Vec::with_capacity(n),
        c: Vec::with_capacity(n),
    };
    for i in 0..n_vars {
        abc.a.push(points.read_g1(r)?);
        abc.b1.push(points.read_g1(r)?);
        abc.b2.push(points.read_g2(r)?);
        let c = points.read_g1(r)?;
        if i <= n_public && !c.is_infinity() {
            return Err(StructureError::PublicCNotZero { index: i }.into());
        }
        abc.c.push(c);
    }
    r.end_section()?;
    Ok(abc)
}

pub fn write_h<W: Write + Seek>(
    w: &mut BinFileWriter<W>,
    points: &PointCodec<'_>,
    h_exps: &[G1Affine],
) -> Result<()> {
    w.start_section(SECTION_H)?;
    for p in h_exps {
        points.write_g1(w, p)?;
    }
    w.end_section()
}

pub fn read_h<R: Read + Seek>(
    r: &mut BinFileReader<R>,
    points: &PointCodec<'_>,
    domain_size: u32,
) -> Result<Vec<G1Affine>> {
    read_g1_array(r, points, SECTION_H, domain_size as u64)
}

fn read_g1_array<R: Read + Seek>(
    r: &mut BinFileReader<R>,
    points: &PointCodec<'_>,
    section: u32,
    count: u64,
) -> Result<Vec<G1Affine>> {
    let size = r.start_unique_section(section)?;
    check_size(section, count * points.g1_size() as u64, size)?;

    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(points.read_g1(r)?);
    }
    r.end_section()?;
    log::debug!("section {}: {} points", section, count);
    Ok(out)
}

fn check_size(section: u32, expected: u64, actual: u64) -> Result<()> {
    if expected != actual {
        return Err(StructureError::SectionSize {
            section,
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}
