//! Header sections
//!
//! ## Section 1 (protocol)
//! - u32 protocol tag, `1` for Groth16
//!
//! ## Section 2 (Groth16 parameters)
//! - u32 n8q, q (n8q bytes)
//! - u32 n8r, r (n8r bytes)
//! - u32 nVars, u32 nPublic, u32 domainSize
//! - alfa1, beta1, delta1 (G1), beta2, gamma2, delta2 (G2)

use std::io::{Read, Seek, Write};

use num_bigint::BigUint;

use crate::binfile::{BinFileReader, BinFileWriter};
use crate::constants::{SECTION_GROTH_HEADER, SECTION_HEADER};
use crate::errors::{FormatError, Result, StructureError};
use crate::field::{n8_for, FieldCodec};
use crate::key::{Protocol, ProvingKey};
use crate::point::PointCodec;
use crate::types::{G1Affine, G2Affine};

/// Decoded section 2 together with the codecs it defines
#[derive(Debug, Clone)]
pub struct GrothHeader {
    /// Base field codec (q)
    pub fq: FieldCodec,
    /// Scalar field codec (r)
    pub fr: FieldCodec,
    pub n_vars: u32,
    pub n_public: u32,
    pub domain_size: u32,
    pub alfa1: G1Affine,
    pub beta1: G1Affine,
    pub delta1: G1Affine,
    pub beta2: G2Affine,
    pub gamma2: G2Affine,
    pub delta2: G2Affine,
}

pub fn write_protocol<W: Write + Seek>(w: &mut BinFileWriter<W>, protocol: Protocol) -> Result<()> {
    w.start_section(SECTION_HEADER)?;
    w.write_u32(protocol.tag())?;
    w.end_section()
}

pub fn read_protocol<R: Read + Seek>(r: &mut BinFileReader<R>) -> Result<Protocol> {
    r.start_unique_section(SECTION_HEADER)?;
    let tag = r.read_u32()?;
    let protocol = Protocol::from_tag(tag).ok_or(FormatError::UnsupportedProtocol(tag))?;
    r.end_section()?;
    Ok(protocol)
}

pub fn write_groth_header<W: Write + Seek>(
    w: &mut BinFileWriter<W>,
    key: &ProvingKey,
    fq: &FieldCodec,
    fr: &FieldCodec,
) -> Result<()> {
    let points = PointCodec::new(fq);

    w.start_section(SECTION_GROTH_HEADER)?;
    w.write_u32(fq.n8() as u32)?;
    w.write_bigint(fq.modulus(), fq.n8())?;
    w.write_u32(fr.n8() as u32)?;
    w.write_bigint(fr.modulus(), fr.n8())?;
    w.write_u32(key.n_vars)?;
    w.write_u32(key.n_public)?;
    w.write_u32(key.domain_size)?;

    points.write_g1(w, &key.alfa1)?;
    points.write_g1(w, &key.beta1)?;
    points.write_g1(w, &key.delta1)?;
    points.write_g2(w, &key.beta2)?;
    points.write_g2(w, &key.gamma2)?;
    points.write_g2(w, &key.delta2)?;
    w.end_section()
}

pub fn read_groth_header<R: Read + Seek>(r: &mut BinFileReader<R>) -> Result<GrothHeader> {
    r.start_unique_section(SECTION_GROTH_HEADER)?;

    let (fq, n8q) = read_modulus(r, "q")?;
    // The scalar radix is derived from n8r, not n8q.
    let (fr, n8r) = read_modulus(r, "r")?;
    log::debug!("groth header: n8q={} n8r={}", n8q, n8r);

    let n_vars = r.read_u32()?;
    let n_public = r.read_u32()?;
    let domain_size = r.read_u32()?;
    if n_public >= n_vars {
        return Err(StructureError::InvalidCounts { n_vars, n_public }.into());
    }
    if !domain_size.is_power_of_two() {
        return Err(StructureError::DomainSize(domain_size).into());
    }

    let points = PointCodec::new(&fq);
    let alfa1 = points.read_g1(r)?;
    let beta1 = points.read_g1(r)?;
    let delta1 = points.read_g1(r)?;
    let beta2 = points.read_g2(r)?;
    let gamma2 = points.read_g2(r)?;
    let delta2 = points.read_g2(r)?;
    r.end_section()?;

    crate::dbg_g1!("alfa1", &alfa1);
    crate::dbg_g1!("beta1", &beta1);
    crate::dbg_g1!("delta1", &delta1);

    Ok(GrothHeader {
        fq,
        fr,
        n_vars,
        n_public,
        domain_size,
        alfa1,
        beta1,
        delta1,
        beta2,
        gamma2,
        delta2,
    })
}

/// Read a `(u32 n8, modulus)` pair and build its codec
fn read_modulus<R: Read + Seek>(
    r: &mut BinFileReader<R>,
    field: &'static str,
) -> Result<(FieldCodec, u32)> {
    let n8 = r.read_u32()?;
    let modulus: BigUint = r.read_bigint(n8 as usize)?;
    let derived = n8_for(&modulus) as u32;
    if n8 != derived {
        return Err(StructureError::FieldWidth {
            field,
            declared: n8,
            derived,
        }
        .into());
    }
    let codec = FieldCodec::new(modulus)
        .map_err(|_| StructureError::InvalidModulus { field })?
        .named(field);
    Ok((codec, n8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{bn254_q, bn254_r, ZKEY_MAGIC};
    use crate::errors::ZKeyError;
    use crate::key::tests::sample_key;
    use std::io::Cursor;

    fn header_bytes(key: &ProvingKey, tag: u32) -> Vec<u8> {
        let fq = FieldCodec::new(key.q.clone()).unwrap();
        let fr = FieldCodec::new(key.r.clone()).unwrap();
        let mut w = BinFileWriter::create(Cursor::new(Vec::new()), &ZKEY_MAGIC, 1, 2).unwrap();
        w.start_section(SECTION_HEADER).unwrap();
        w.write_u32(tag).unwrap();
        w.end_section().unwrap();
        write_groth_header(&mut w, key, &fq, &fr).unwrap();
        w.finish().unwrap().into_inner()
    }

    fn open(bytes: Vec<u8>) -> BinFileReader<Cursor<Vec<u8>>> {
        BinFileReader::open(Cursor::new(bytes), &ZKEY_MAGIC, 1).unwrap()
    }

    #[test]
    fn test_groth_header_roundtrip() {
        let key = sample_key();
        let mut r = open(header_bytes(&key, 1));
        assert_eq!(read_protocol(&mut r).unwrap(), Protocol::Groth16);

        let header = read_groth_header(&mut r).unwrap();
        assert_eq!(header.fq.modulus(), &bn254_q());
        assert_eq!(header.fr.modulus(), &bn254_r());
        assert_eq!(header.n_vars, 4);
        assert_eq!(header.n_public, 1);
        assert_eq!(header.domain_size, 4);
        assert_eq!(header.alfa1, key.alfa1);
        assert_eq!(header.delta1, G1Affine::infinity());
        assert_eq!(header.gamma2, key.gamma2);
        assert_eq!(header.delta2, G2Affine::infinity());
    }

    #[test]
    fn test_groth_header_size() {
        let key = sample_key();
        let mut r = open(header_bytes(&key, 1));
        // 3 x u32 + 2 x (u32 + 32) + 3 x 64 + 3 x 128
        let size = r.start_unique_section(SECTION_GROTH_HEADER).unwrap();
        assert_eq!(size, 12 + 72 + 192 + 384);
    }

    #[test]
    fn test_wrong_protocol_tag() {
        let key = sample_key();
        let mut r = open(header_bytes(&key, 2));
        assert!(matches!(
            read_protocol(&mut r),
            Err(ZKeyError::Format(FormatError::UnsupportedProtocol(2)))
        ));
    }

    #[test]
    fn test_invalid_counts() {
        let mut key = sample_key();
        key.n_public = key.n_vars;
        let mut r = open(header_bytes(&key, 1));
        assert!(matches!(
            read_groth_header(&mut r),
            Err(ZKeyError::Structure(StructureError::InvalidCounts {
                n_vars: 4,
                n_public: 4
            }))
        ));
    }

    #[test]
    fn test_non_power_of_two_domain() {
        let mut key = sample_key();
        key.domain_size = 6;
        let mut r = open(header_bytes(&key, 1));
        assert!(matches!(
            read_groth_header(&mut r),
            Err(ZKeyError::Structure(StructureError::DomainSize(6)))
        ));
    }

    #[test]
    fn test_field_width_mismatch() {
        // q padded to 64 bytes although it fits in 32
        let mut w = BinFileWriter::create(Cursor::new(Vec::new()), &ZKEY_MAGIC, 1, 1).unwrap();
        w.start_section(SECTION_GROTH_HEADER).unwrap();
        w.write_u32(64).unwrap();
        w.write_bigint(&bn254_q(), 64).unwrap();
        w.end_section().unwrap();
        let mut r = open(w.finish().unwrap().into_inner());
        assert!(matches!(
            read_groth_header(&mut r),
            Err(ZKeyError::Structure(StructureError::FieldWidth {
                field: "q",
                declared: 64,
                derived: 32
            }))
        ));
    }

    fn modulus_section(n8: u32, q: u32) -> BinFileReader<Cursor<Vec<u8>>> {
        let mut w = BinFileWriter::create(Cursor::new(Vec::new()), &ZKEY_MAGIC, 1, 1).unwrap();
        w.start_section(SECTION_GROTH_HEADER).unwrap();
        w.write_u32(n8).unwrap();
        w.write_bigint(&BigUint::from(q), n8 as usize).unwrap();
        w.end_section().unwrap();
        open(w.finish().unwrap().into_inner())
    }

    #[test]
    fn test_unusable_modulus_is_corruption() {
        // even, zero and one have no Montgomery inverse
        for q in [10u32, 0, 1] {
            let err = read_groth_header(&mut modulus_section(8, q)).unwrap_err();
            assert!(err.is_corruption(), "q = {}: {:?}", q, err);
            assert!(matches!(
                err,
                ZKeyError::Structure(StructureError::InvalidModulus { field: "q" })
            ));
        }
    }
}
