//! Reading and writing complete zkey files
//!
//! Sections are always written in id order 1 to 6 and read back by id.
//! File handles live for the duration of one call and are closed on every
//! exit path.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::binfile::{BinFileReader, BinFileWriter};
use crate::constants::{ZKEY_MAGIC, ZKEY_NUM_SECTIONS, ZKEY_VERSION};
use crate::errors::Result;
use crate::field::FieldCodec;
use crate::header::{read_groth_header, read_protocol, write_groth_header, write_protocol};
use crate::key::ProvingKey;
use crate::point::PointCodec;
use crate::sections::{
    read_abc, read_coefficients, read_h, read_ic, write_abc, write_coefficients, write_h,
    write_ic, AbcRef,
};

/// Writer behaviour knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Reject keys whose public C entries are not the point at infinity.
    /// When false, those slots are written as infinity and a warning is logged.
    pub strict_public_c: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            strict_public_c: true,
        }
    }
}

impl WriteOptions {
    pub fn lenient() -> Self {
        Self {
            strict_public_c: false,
        }
    }
}

/// Read a zkey file from disk
pub fn read(path: impl AsRef<Path>) -> Result<ProvingKey> {
    let path = path.as_ref();
    log::debug!("reading zkey {}", path.display());
    let file = File::open(path)?;
    read_from(BufReader::new(file))
}

/// Write a zkey file with default (strict) options
pub fn write(path: impl AsRef<Path>, key: &ProvingKey) -> Result<()> {
    write_with(path, key, &WriteOptions::default())
}

pub fn write_with(path: impl AsRef<Path>, key: &ProvingKey, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    // Validate before touching the file system
    let (fq, fr) = check_key(key, options)?;
    log::debug!("writing zkey {}", path.display());
    write_file(path, |w| write_unchecked(w, key, &fq, &fr))
}

/// Create `path`, run `write` on it and sync. A failed write removes the file.
fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> Result<BufWriter<File>>,
{
    let file = File::create(path)?;
    let result = write(BufWriter::new(file))
        .and_then(|w| Ok(w.into_inner().map_err(|e| e.into_error())?.sync_all()?));
    if let Err(e) = &result {
        log::warn!("removing partial zkey {}: {}", path.display(), e);
        std::fs::remove_file(path).ok();
    }
    result
}

/// Decode a zkey from any seekable reader
pub fn read_from<R: Read + Seek>(reader: R) -> Result<ProvingKey> {
    let mut r = BinFileReader::open(reader, &ZKEY_MAGIC, ZKEY_VERSION)?;

    let protocol = read_protocol(&mut r)?;
    let header = read_groth_header(&mut r)?;
    let points = PointCodec::new(&header.fq);

    let ic = read_ic(&mut r, &points, header.n_public)?;
    let ccoefs = read_coefficients(&mut r, &header.fr)?;
    let abc = read_abc(&mut r, &points, header.n_vars, header.n_public)?;
    let h_exps = read_h(&mut r, &points, header.domain_size)?;

    log::debug!(
        "zkey read: nVars={} nPublic={} domainSize={} coefficients={}",
        header.n_vars,
        header.n_public,
        header.domain_size,
        ccoefs.len()
    );

    Ok(ProvingKey {
        protocol,
        q: header.fq.modulus().clone(),
        r: header.fr.modulus().clone(),
        n_vars: header.n_vars,
        n_public: header.n_public,
        domain_size: header.domain_size,
        alfa1: header.alfa1,
        beta1: header.beta1,
        delta1: header.delta1,
        beta2: header.beta2,
        gamma2: header.gamma2,
        delta2: header.delta2,
        ic,
        ccoefs,
        a: abc.a,
        b1: abc.b1,
        b2: abc.b2,
        c: abc.c,
        h_exps,
    })
}

/// Encode a zkey into any seekable writer and return it
pub fn write_to<W: Write + Seek>(writer: W, key: &ProvingKey, options: &WriteOptions) -> Result<W> {
    let (fq, fr) = check_key(key, options)?;
    write_unchecked(writer, key, &fq, &fr)
}

/// Validate the key and build its field codecs
fn check_key(key: &ProvingKey, options: &WriteOptions) -> Result<(FieldCodec, FieldCodec)> {
    key.validate_shape()?;
    if options.strict_public_c {
        key.check_public_c()?;
    } else {
        for index in key.public_c_violations() {
            log::warn!("C[{}] is not infinity, writing it as infinity", index);
        }
    }
    let fq = FieldCodec::new(key.q.clone())?.named("q");
    let fr = FieldCodec::new(key.r.clone())?.named("r");
    Ok((fq, fr))
}

fn write_unchecked<W: Write + Seek>(
    writer: W,
    key: &ProvingKey,
    fq: &FieldCodec,
    fr: &FieldCodec,
) -> Result<W> {
    let points = PointCodec::new(fq);

    let mut w = BinFileWriter::create(writer, &ZKEY_MAGIC, ZKEY_VERSION, ZKEY_NUM_SECTIONS)?;
    write_protocol(&mut w, key.protocol)?;
    write_groth_header(&mut w, key, fq, fr)?;
    write_ic(&mut w, &points, &key.ic)?;
    write_coefficients(&mut w, fr, &key.ccoefs)?;
    let abc = AbcRef {
        a: &key.a,
        b1: &key.b1,
        b2: &key.b2,
        c: &key.c,
    };
    write_abc(&mut w, &points, key.n_public, abc)?;
    write_h(&mut w, &points, &key.h_exps)?;
    w.finish()
}
