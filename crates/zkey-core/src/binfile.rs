//! Section-framed binary container
//!
//! ## Layout (all integers little-endian)
//!
//! - [0..4]: file magic (e.g. `b"zkey"`)
//! - [4..8]: container version (u32)
//! - [8..12]: number of sections (u32)
//! - then, per section: id (u32), payload length (u64), payload
//!
//! Sections are looked up by id on read, so their physical order does not
//! matter to the reader. Unknown ids are indexed but never consumed.

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};

use num_bigint::BigUint;

use crate::errors::{BinFileError, FormatError, Result, StructureError};

/// Position and declared length of one section payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    /// Absolute offset of the first payload byte
    pub offset: u64,
    /// Declared payload length in bytes
    pub size: u64,
}

#[derive(Debug)]
struct OpenWriteSection {
    id: u32,
    size_pos: u64,
    written: u64,
}

/// Sequential writer for a section container.
///
/// The inner writer must be seekable so that `end_section` can patch the
/// length field once the payload is known.
pub struct BinFileWriter<W: Write + Seek> {
    inner: W,
    declared_sections: u32,
    written_sections: u32,
    open: Option<OpenWriteSection>,
}

impl<W: Write + Seek> BinFileWriter<W> {
    /// Write the container header and return a writer positioned after it
    pub fn create(mut inner: W, magic: &[u8; 4], version: u32, n_sections: u32) -> Result<Self> {
        inner.write_all(magic)?;
        inner.write_all(&version.to_le_bytes())?;
        inner.write_all(&n_sections.to_le_bytes())?;
        Ok(Self {
            inner,
            declared_sections: n_sections,
            written_sections: 0,
            open: None,
        })
    }

    pub fn start_section(&mut self, id: u32) -> Result<()> {
        if self.open.is_some() {
            return Err(BinFileError::SectionAlreadyOpen(id).into());
        }
        self.inner.write_all(&id.to_le_bytes())?;
        let size_pos = self.inner.stream_position()?;
        // Placeholder, patched by end_section
        self.inner.write_all(&0u64.to_le_bytes())?;
        self.open = Some(OpenWriteSection {
            id,
            size_pos,
            written: 0,
        });
        Ok(())
    }

    pub fn end_section(&mut self) -> Result<()> {
        let section = self.open.take().ok_or(BinFileError::NoOpenSection)?;
        self.inner.seek(SeekFrom::Start(section.size_pos))?;
        self.inner.write_all(&section.written.to_le_bytes())?;
        self.inner.seek(SeekFrom::End(0))?;
        self.written_sections += 1;
        log::trace!("section {} closed, {} bytes", section.id, section.written);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let section = self.open.as_mut().ok_or(BinFileError::NoOpenSection)?;
        self.inner.write_all(bytes)?;
        section.written += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write `value` as an `n8`-byte little-endian unsigned integer
    pub fn write_bigint(&mut self, value: &BigUint, n8: usize) -> Result<()> {
        let bytes = bigint_to_le(value, n8)?;
        self.write_bytes(&bytes)
    }

    /// Check the section count, flush, and hand back the inner writer
    pub fn finish(mut self) -> Result<W> {
        if let Some(section) = &self.open {
            return Err(BinFileError::UnclosedSection(section.id).into());
        }
        if self.written_sections != self.declared_sections {
            return Err(BinFileError::SectionCount {
                declared: self.declared_sections,
                written: self.written_sections,
            }
            .into());
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[derive(Debug)]
struct OpenReadSection {
    id: u32,
    size: u64,
    remaining: u64,
}

/// Random-access reader for a section container
pub struct BinFileReader<R: Read + Seek> {
    inner: R,
    version: u32,
    sections: BTreeMap<u32, Vec<SectionEntry>>,
    open: Option<OpenReadSection>,
}

impl<R: Read + Seek> BinFileReader<R> {
    /// Check magic and version, then index every section by id
    pub fn open(mut inner: R, magic: &[u8; 4], max_version: u32) -> Result<Self> {
        let file_len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        let mut actual = [0u8; 4];
        inner.read_exact(&mut actual)?;
        if &actual != magic {
            return Err(FormatError::BadMagic {
                expected: *magic,
                actual,
            }
            .into());
        }

        let version = read_u32_raw(&mut inner)?;
        if version > max_version {
            return Err(FormatError::UnsupportedVersion {
                version,
                max: max_version,
            }
            .into());
        }

        let n_sections = read_u32_raw(&mut inner)?;
        let mut sections: BTreeMap<u32, Vec<SectionEntry>> = BTreeMap::new();
        for _ in 0..n_sections {
            let id = read_u32_raw(&mut inner)?;
            let size = read_u64_raw(&mut inner)?;
            let offset = inner.stream_position()?;
            let remaining = file_len.saturating_sub(offset);
            if size > remaining {
                return Err(StructureError::Truncated {
                    section: id,
                    needed: size,
                    remaining,
                }
                .into());
            }
            sections
                .entry(id)
                .or_default()
                .push(SectionEntry { offset, size });
            inner.seek(SeekFrom::Start(offset + size))?;
        }

        log::debug!(
            "container v{} with {} sections: {:?}",
            version,
            n_sections,
            sections.keys().collect::<Vec<_>>()
        );

        Ok(Self {
            inner,
            version,
            sections,
            open: None,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// All indexed sections, ordered by id
    pub fn sections(&self) -> impl Iterator<Item = (u32, &SectionEntry)> {
        self.sections
            .iter()
            .flat_map(|(id, entries)| entries.iter().map(move |e| (*id, e)))
    }

    /// Position the reader at the single section with this id.
    /// Returns the declared payload length.
    pub fn start_unique_section(&mut self, id: u32) -> Result<u64> {
        if self.open.is_some() {
            return Err(BinFileError::SectionAlreadyOpen(id).into());
        }
        let entry = match self.sections.get(&id).map(Vec::as_slice) {
            None | Some([]) => return Err(StructureError::MissingSection(id).into()),
            Some([entry]) => *entry,
            Some(_) => return Err(StructureError::DuplicateSection(id).into()),
        };
        self.inner.seek(SeekFrom::Start(entry.offset))?;
        self.open = Some(OpenReadSection {
            id,
            size: entry.size,
            remaining: entry.size,
        });
        Ok(entry.size)
    }

    /// Close the open section; the payload must have been fully consumed
    pub fn end_section(&mut self) -> Result<()> {
        let section = self.open.take().ok_or(BinFileError::NoOpenSection)?;
        if section.remaining != 0 {
            return Err(StructureError::SectionSize {
                section: section.id,
                expected: section.size,
                actual: section.size - section.remaining,
            }
            .into());
        }
        Ok(())
    }

    /// Id of the open section
    pub fn current_section(&self) -> Option<u32> {
        self.open.as_ref().map(|s| s.id)
    }

    /// Fail unless `needed` more bytes are left in the open section
    pub fn ensure_remaining(&self, needed: u64) -> Result<()> {
        let section = self.open.as_ref().ok_or(BinFileError::NoOpenSection)?;
        if needed > section.remaining {
            return Err(StructureError::Truncated {
                section: section.id,
                needed,
                remaining: section.remaining,
            }
            .into());
        }
        Ok(())
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let needed = buf.len() as u64;
        self.ensure_remaining(needed)?;
        self.inner.read_exact(buf)?;
        if let Some(section) = self.open.as_mut() {
            section.remaining -= needed;
        }
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read an `n8`-byte little-endian unsigned integer
    pub fn read_bigint(&mut self, n8: usize) -> Result<BigUint> {
        self.ensure_remaining(n8 as u64)?;
        let mut buf = vec![0u8; n8];
        self.read_exact(&mut buf)?;
        Ok(BigUint::from_bytes_le(&buf))
    }
}

/// Encode `value` as exactly `n8` little-endian bytes
pub fn bigint_to_le(value: &BigUint, n8: usize) -> Result<Vec<u8>> {
    let mut bytes = value.to_bytes_le();
    // to_bytes_le of zero is [0]
    if bytes.len() > n8 && bytes[n8..].iter().any(|&b| b != 0) {
        return Err(BinFileError::BigIntOverflow { n8 }.into());
    }
    bytes.resize(n8, 0);
    Ok(bytes)
}

fn read_u32_raw<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_raw<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ZKeyError;
    use std::io::Cursor;

    const MAGIC: [u8; 4] = *b"test";

    fn two_section_file() -> Vec<u8> {
        let mut w = BinFileWriter::create(Cursor::new(Vec::new()), &MAGIC, 1, 2).unwrap();
        w.start_section(7).unwrap();
        w.write_u32(0xdeadbeef).unwrap();
        w.end_section().unwrap();
        w.start_section(2).unwrap();
        w.write_bigint(&BigUint::from(258u32), 8).unwrap();
        w.end_section().unwrap();
        w.finish().unwrap().into_inner()
    }

    #[test]
    fn test_header_layout() {
        let bytes = two_section_file();
        assert_eq!(&bytes[0..4], b"test");
        assert_eq!(&bytes[4..8], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[2, 0, 0, 0]);
        // first section: id 7, length 4
        assert_eq!(&bytes[12..16], &[7, 0, 0, 0]);
        assert_eq!(&bytes[16..24], &[4, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[24..28], &[0xef, 0xbe, 0xad, 0xde]);
        // bigint 258 as 8 LE bytes
        assert_eq!(&bytes[40..48], &[2, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), 48);
    }

    #[test]
    fn test_read_by_id_in_any_order() {
        let bytes = two_section_file();
        let mut r = BinFileReader::open(Cursor::new(bytes), &MAGIC, 1).unwrap();
        assert_eq!(r.version(), 1);

        assert_eq!(r.start_unique_section(2).unwrap(), 8);
        assert_eq!(r.read_bigint(8).unwrap(), BigUint::from(258u32));
        r.end_section().unwrap();

        assert_eq!(r.start_unique_section(7).unwrap(), 4);
        assert_eq!(r.read_u32().unwrap(), 0xdeadbeef);
        r.end_section().unwrap();
    }

    #[test]
    fn test_bad_magic_and_version() {
        let bytes = two_section_file();
        assert!(matches!(
            BinFileReader::open(Cursor::new(bytes.clone()), b"zkey", 1),
            Err(ZKeyError::Format(FormatError::BadMagic { .. }))
        ));

        let mut newer = bytes;
        newer[4] = 2;
        assert!(matches!(
            BinFileReader::open(Cursor::new(newer), &MAGIC, 1),
            Err(ZKeyError::Format(FormatError::UnsupportedVersion { version: 2, max: 1 }))
        ));
    }

    #[test]
    fn test_missing_and_duplicate_sections() {
        let mut w = BinFileWriter::create(Cursor::new(Vec::new()), &MAGIC, 1, 2).unwrap();
        for _ in 0..2 {
            w.start_section(3).unwrap();
            w.write_u32(1).unwrap();
            w.end_section().unwrap();
        }
        let bytes = w.finish().unwrap().into_inner();

        let mut r = BinFileReader::open(Cursor::new(bytes), &MAGIC, 1).unwrap();
        assert!(matches!(
            r.start_unique_section(3),
            Err(ZKeyError::Structure(StructureError::DuplicateSection(3)))
        ));
        assert!(matches!(
            r.start_unique_section(4),
            Err(ZKeyError::Structure(StructureError::MissingSection(4)))
        ));
    }

    #[test]
    fn test_over_and_under_read() {
        let bytes = two_section_file();
        let mut r = BinFileReader::open(Cursor::new(bytes), &MAGIC, 1).unwrap();

        r.start_unique_section(7).unwrap();
        assert!(matches!(
            r.read_bigint(8),
            Err(ZKeyError::Structure(StructureError::Truncated {
                section: 7,
                needed: 8,
                remaining: 4
            }))
        ));
        r.end_section().unwrap_err();

        r.start_unique_section(2).unwrap();
        r.read_u32().unwrap();
        assert!(matches!(
            r.end_section(),
            Err(ZKeyError::Structure(StructureError::SectionSize {
                section: 2,
                expected: 8,
                actual: 4
            }))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let mut bytes = two_section_file();
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            BinFileReader::open(Cursor::new(bytes), &MAGIC, 1),
            Err(ZKeyError::Structure(StructureError::Truncated { section: 2, .. }))
        ));
    }

    #[test]
    fn test_writer_misuse() {
        let mut w = BinFileWriter::create(Cursor::new(Vec::new()), &MAGIC, 1, 1).unwrap();
        assert!(matches!(
            w.write_u32(1),
            Err(ZKeyError::BinFile(BinFileError::NoOpenSection))
        ));
        w.start_section(1).unwrap();
        assert!(matches!(
            w.start_section(2),
            Err(ZKeyError::BinFile(BinFileError::SectionAlreadyOpen(2)))
        ));
        w.end_section().unwrap();

        let w = BinFileWriter::create(Cursor::new(Vec::new()), &MAGIC, 1, 2).unwrap();
        assert!(matches!(
            w.finish(),
            Err(ZKeyError::BinFile(BinFileError::SectionCount {
                declared: 2,
                written: 0
            }))
        ));
    }

    #[test]
    fn test_bigint_width() {
        assert_eq!(bigint_to_le(&BigUint::from(0u32), 4).unwrap(), vec![0; 4]);
        assert!(matches!(
            bigint_to_le(&BigUint::from(0x1_0000u32), 2),
            Err(ZKeyError::BinFile(BinFileError::BigIntOverflow { n8: 2 }))
        ));
    }
}
