use std::fmt::Display;
use std::io::{ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{Result, StoreError};

/// One student record.
///
/// The identifier is private: once a record sits in a store, changing its
/// id would silently break the tree ordering, so the only way to re-key a
/// record is remove + reinsert. The remaining fields may be edited in
/// place through [StudentStore::find_mut](super::StudentStore::find_mut).
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    id: i32,
    pub name: String,
    pub age: i32,
    pub grade: f64,
}

impl Student {
    pub fn new(id: i32, name: impl Into<String>, age: i32, grade: f64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            grade,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Encodes one record onto a byte sink.
    ///
    /// Layout, little-endian, no padding or separators:
    /// id (i32) | age (i32) | grade (f64) | name length (u64) | name bytes
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_i32::<LittleEndian>(self.id)?;
        out.write_i32::<LittleEndian>(self.age)?;
        out.write_f64::<LittleEndian>(self.grade)?;
        out.write_u64::<LittleEndian>(self.name.len() as u64)?;
        out.write_all(self.name.as_bytes())?;
        Ok(())
    }

    /// Decodes one record from a byte source.
    ///
    /// Returns `Ok(None)` when the source is already exhausted at the
    /// record boundary, and [StoreError::Truncated] when it runs out
    /// mid-record; the partially read record is discarded.
    pub fn read_from<R: Read>(input: &mut R) -> Result<Option<Self>> {
        let id = match read_leading_i32(input)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let age = input.read_i32::<LittleEndian>().map_err(eof_is_truncated)?;
        let grade = input.read_f64::<LittleEndian>().map_err(eof_is_truncated)?;
        let name_len = input.read_u64::<LittleEndian>().map_err(eof_is_truncated)?;

        // read_to_end via take() rather than read_exact into a
        // pre-sized buffer: a corrupt length prefix must not trigger a
        // huge upfront allocation.
        let mut name_bytes = Vec::new();
        input.take(name_len).read_to_end(&mut name_bytes)?;
        if (name_bytes.len() as u64) < name_len {
            return Err(StoreError::Truncated);
        }

        Ok(Some(Self {
            id,
            name: String::from_utf8(name_bytes)?,
            age,
            grade,
        }))
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} | Age: {} | Grade: {}",
            self.id, self.name, self.age, self.grade
        )
    }
}

/// Reads the leading id field, distinguishing a clean end of stream
/// (zero bytes available) from a cut-off record.
fn read_leading_i32<R: Read>(input: &mut R) -> Result<Option<i32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;

    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StoreError::Io(e)),
        }
    }

    match filled {
        0 => Ok(None),
        n if n == buf.len() => Ok(Some(i32::from_le_bytes(buf))),
        _ => Err(StoreError::Truncated),
    }
}

fn eof_is_truncated(e: std::io::Error) -> StoreError {
    if e.kind() == ErrorKind::UnexpectedEof {
        StoreError::Truncated
    } else {
        StoreError::Io(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Student {
        Student::new(7, "Ann", 20, 3.5)
    }

    #[test]
    fn round_trip() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).unwrap();

        let decoded = Student::read_from(&mut buf.as_slice()).unwrap().unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn layout_is_fixed_prefix_plus_name() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), 4 + 4 + 8 + 8 + 3);
        assert_eq!(buf[0..4], 7_i32.to_le_bytes());
        assert_eq!(buf[4..8], 20_i32.to_le_bytes());
        assert_eq!(buf[8..16], 3.5_f64.to_le_bytes());
        assert_eq!(buf[16..24], 3_u64.to_le_bytes());
        assert_eq!(&buf[24..], b"Ann");
    }

    #[test]
    fn empty_source_is_clean_end() {
        let mut empty: &[u8] = &[];
        assert!(Student::read_from(&mut empty).unwrap().is_none());
    }

    #[test]
    fn truncation_at_each_field_boundary() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).unwrap();

        // cut inside id, age, grade, length prefix and name bytes
        for cut in [2, 6, 12, 20, buf.len() - 1] {
            let result = Student::read_from(&mut &buf[..cut]);
            assert!(
                matches!(result, Err(StoreError::Truncated)),
                "cut at {cut} should report truncation"
            );
        }
    }

    #[test]
    fn empty_name_round_trips() {
        let student = Student::new(1, "", 30, 0.0);
        let mut buf = Vec::new();
        student.write_to(&mut buf).unwrap();

        let decoded = Student::read_from(&mut buf.as_slice()).unwrap().unwrap();
        assert_eq!(decoded.name, "");
    }

    #[test]
    fn invalid_utf8_name_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1_i32.to_le_bytes());
        buf.extend_from_slice(&20_i32.to_le_bytes());
        buf.extend_from_slice(&1.0_f64.to_le_bytes());
        buf.extend_from_slice(&2_u64.to_le_bytes());
        buf.extend_from_slice(&[0xff, 0xfe]);

        let result = Student::read_from(&mut buf.as_slice());
        assert!(matches!(result, Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn oversized_length_prefix_reports_truncation() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1_i32.to_le_bytes());
        buf.extend_from_slice(&20_i32.to_le_bytes());
        buf.extend_from_slice(&1.0_f64.to_le_bytes());
        buf.extend_from_slice(&u64::MAX.to_le_bytes());
        buf.extend_from_slice(b"short");

        let result = Student::read_from(&mut buf.as_slice());
        assert!(matches!(result, Err(StoreError::Truncated)));
    }
}
