//! Affine point codec on top of the base-field [`FieldCodec`]
//!
//! G1 is `x || y` (two base-field elements), G2 is `x.c0 || x.c1 || y.c0 ||
//! y.c1`. The all-zero encoding is reserved for the point at infinity.
//!
//! Format assumption: no finite point of the curves this format targets
//! (BN254, BLS12-381) has affine coordinates that are all zero, so the
//! reserved encoding cannot collide with a real point. Nothing else in this
//! crate relies on curve properties.

use std::io::{Read, Seek, Write};

use num_traits::Zero;

use crate::binfile::{BinFileReader, BinFileWriter};
use crate::errors::Result;
use crate::field::FieldCodec;
use crate::types::{Fq2, G1Affine, G2Affine};

#[derive(Debug, Clone, Copy)]
pub struct PointCodec<'a> {
    fq: &'a FieldCodec,
}

impl<'a> PointCodec<'a> {
    pub fn new(fq: &'a FieldCodec) -> Self {
        Self { fq }
    }

    /// Wire size of a G1 point
    pub fn g1_size(&self) -> usize {
        2 * self.fq.n8()
    }

    /// Wire size of a G2 point
    pub fn g2_size(&self) -> usize {
        4 * self.fq.n8()
    }

    pub fn write_g1<W: Write + Seek>(&self, w: &mut BinFileWriter<W>, p: &G1Affine) -> Result<()> {
        if p.is_infinity() {
            return self.write_g1_zero(w);
        }
        self.fq.write(w, &p.x)?;
        self.fq.write(w, &p.y)
    }

    /// The infinity encoding, independent of any in-memory point
    pub fn write_g1_zero<W: Write + Seek>(&self, w: &mut BinFileWriter<W>) -> Result<()> {
        w.write_bytes(&vec![0u8; self.g1_size()])
    }

    pub fn write_g2<W: Write + Seek>(&self, w: &mut BinFileWriter<W>, p: &G2Affine) -> Result<()> {
        if p.is_infinity() {
            return w.write_bytes(&vec![0u8; self.g2_size()]);
        }
        self.fq.write(w, &p.x.c0)?;
        self.fq.write(w, &p.x.c1)?;
        self.fq.write(w, &p.y.c0)?;
        self.fq.write(w, &p.y.c1)
    }

    pub fn read_g1<R: Read + Seek>(&self, r: &mut BinFileReader<R>) -> Result<G1Affine> {
        let x = self.fq.read(r)?;
        let y = self.fq.read(r)?;
        if x.is_zero() && y.is_zero() {
            return Ok(G1Affine::infinity());
        }
        Ok(G1Affine::new(x, y))
    }

    pub fn read_g2<R: Read + Seek>(&self, r: &mut BinFileReader<R>) -> Result<G2Affine> {
        let x = Fq2::new(self.fq.read(r)?, self.fq.read(r)?);
        let y = Fq2::new(self.fq.read(r)?, self.fq.read(r)?);
        if x.is_zero() && y.is_zero() {
            return Ok(G2Affine::infinity());
        }
        Ok(G2Affine::new(x, y))
    }
}
