//! Reader and writer for the numeric subset of MATLAB Level-5 MAT files.
//!
//! A Level-5 file is a 128-byte header followed by a stream of tagged data
//! elements. Each element is either a full tag (`u32` type, `u32` byte count,
//! payload padded to 8 bytes) or a small element packing type, count and up to
//! four payload bytes into a single 8-byte word. Variables are `miMATRIX`
//! elements, optionally wrapped in a zlib-compressed `miCOMPRESSED` element.
//!
//! Only numeric arrays are decoded; character arrays, cells, structs, sparse
//! matrices and objects are skipped.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use thiserror::Error;

const HEADER_LEN: usize = 128;
const HEADER_TEXT_LEN: usize = 116;
const VERSION: u16 = 0x0100;

// data element types
const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;
const MI_UTF8: u32 = 16;

// array classes
const MX_DOUBLE_CLASS: u32 = 6;
const MX_UINT64_CLASS: u32 = 15;

#[derive(Debug, Error)]
pub enum MatError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("file is {0} bytes, too short for a MAT header")]
    ShortHeader(usize),

    #[error("unknown endian indicator {0:?}")]
    Endian([u8; 2]),

    #[error("unsupported MAT version {0:#06x}")]
    Version(u16),

    #[error("data element at offset {offset} runs past the end of the data")]
    Truncated { offset: usize },

    #[error("data element at offset {offset} has type {found}, expected one of {expected:?}")]
    UnexpectedElement {
        offset: usize,
        found: u32,
        expected: &'static [u32],
    },

    #[error("unsupported numeric storage type {0}")]
    StorageType(u32),

    #[error("array '{name}' holds {found} values but its dimensions {dims:?} need {expected}")]
    Shape {
        name: String,
        dims: Vec<usize>,
        found: usize,
        expected: usize,
    },

    #[error("failed to inflate compressed element at offset {offset}")]
    Inflate {
        offset: usize,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Byte order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

macro_rules! endian_reader {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        impl Endian {
            $(
                fn $name(self, bytes: &[u8]) -> $ty {
                    match self {
                        Endian::Little => LittleEndian::$name(bytes),
                        Endian::Big => BigEndian::$name(bytes),
                    }
                }
            )*
        }
    };
}

endian_reader! {
    read_u16 -> u16,
    read_i16 -> i16,
    read_u32 -> u32,
    read_i32 -> i32,
    read_u64 -> u64,
    read_i64 -> i64,
    read_f32 -> f32,
    read_f64 -> f64,
}

// ---------------------------------------------------------------------------
// Element stream
// ---------------------------------------------------------------------------

struct Element<'a> {
    data_type: u32,
    data: &'a [u8],
    offset: usize,
}

struct ElementReader<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Offset of `buf` within the file, for error messages.
    base: usize,
    endian: Endian,
}

impl<'a> ElementReader<'a> {
    fn new(buf: &'a [u8], base: usize, endian: Endian) -> Self {
        Self {
            buf,
            pos: 0,
            base,
            endian,
        }
    }

    fn take(&mut self, len: usize, offset: usize) -> Result<&'a [u8], MatError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(MatError::Truncated { offset })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn next_element(&mut self) -> Result<Option<Element<'a>>, MatError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }

        let offset = self.base + self.pos;
        let tag = self.take(8, offset)?;
        let first = self.endian.read_u32(&tag[0..4]);

        // small data element: byte count in the upper half of the first word
        let packed_len = (first >> 16) as usize;
        if packed_len != 0 {
            if packed_len > 4 {
                return Err(MatError::Truncated { offset });
            }
            return Ok(Some(Element {
                data_type: first & 0xffff,
                data: &tag[4..4 + packed_len],
                offset,
            }));
        }

        let len = self.endian.read_u32(&tag[4..8]) as usize;
        let data = self.take(len, offset)?;
        // compressed elements are not padded
        if first != MI_COMPRESSED {
            self.pos = ((self.pos + 7) & !7).min(self.buf.len());
        }

        Ok(Some(Element {
            data_type: first,
            data,
            offset,
        }))
    }

    fn expect(&mut self, expected: &'static [u32]) -> Result<Element<'a>, MatError> {
        let offset = self.base + self.pos;
        let element = self.next_element()?.ok_or(MatError::Truncated { offset })?;
        if !expected.contains(&element.data_type) {
            return Err(MatError::UnexpectedElement {
                offset: element.offset,
                found: element.data_type,
                expected,
            });
        }
        Ok(element)
    }
}

// ---------------------------------------------------------------------------
// Decoded arrays
// ---------------------------------------------------------------------------

/// A numeric variable, values stored column-major as `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatArray {
    pub name: String,
    pub dims: Vec<usize>,
    pub data: Vec<f64>,
}

impl MatArray {
    /// A 2-D array from row-major values.
    pub fn from_rows(name: &str, rows: usize, cols: usize, row_major: &[f64]) -> Self {
        let data = (0..cols)
            .flat_map(|col| (0..rows).map(move |row| row_major[row * cols + col]))
            .collect();
        Self {
            name: name.to_string(),
            dims: vec![rows, cols],
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    /// Row `index`, treating trailing dimensions as columns.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        let rows = self.rows();
        if index >= rows {
            return None;
        }
        let cols = self.data.len() / rows;
        Some((0..cols).map(|col| self.data[index + col * rows]).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Zlib,
}

/// The numeric variables of one MAT file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatFile {
    variables: Vec<MatArray>,
}

impl MatFile {
    pub fn new(variables: Vec<MatArray>) -> Self {
        Self { variables }
    }

    pub fn open(path: &Path) -> Result<Self, MatError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, MatError> {
        if bytes.len() < HEADER_LEN {
            return Err(MatError::ShortHeader(bytes.len()));
        }

        let endian = match [bytes[126], bytes[127]] {
            [b'I', b'M'] => Endian::Little,
            [b'M', b'I'] => Endian::Big,
            other => return Err(MatError::Endian(other)),
        };
        let version = endian.read_u16(&bytes[124..126]);
        if version != VERSION {
            return Err(MatError::Version(version));
        }

        let mut variables = Vec::new();
        let mut reader = ElementReader::new(&bytes[HEADER_LEN..], HEADER_LEN, endian);

        while let Some(element) = reader.next_element()? {
            match element.data_type {
                MI_MATRIX => variables.extend(parse_matrix(&element, endian)?),
                MI_COMPRESSED => {
                    let mut inflated = Vec::new();
                    ZlibDecoder::new(element.data)
                        .read_to_end(&mut inflated)
                        .map_err(|source| MatError::Inflate {
                            offset: element.offset,
                            source,
                        })?;

                    let mut inner = ElementReader::new(&inflated, element.offset, endian);
                    while let Some(element) = inner.next_element()? {
                        if element.data_type == MI_MATRIX {
                            variables.extend(parse_matrix(&element, endian)?);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(Self { variables })
    }

    pub fn variable(&self, name: &str) -> Option<&MatArray> {
        self.variables.iter().find(|var| var.name == name)
    }

    pub fn variables(&self) -> &[MatArray] {
        &self.variables
    }

    /// Encode as a little-endian Level-5 file holding double arrays.
    pub fn to_bytes(&self, compression: Compression) -> Result<Vec<u8>, MatError> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        let mut text = format!(
            "MATLAB 5.0 MAT-file, Platform: {}, Created by: {} {}",
            std::env::consts::OS,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        )
        .into_bytes();
        text.resize(HEADER_TEXT_LEN, b' ');
        out.extend_from_slice(&text);
        out.extend_from_slice(&[0; 8]);
        out.write_u16::<LittleEndian>(VERSION)?;
        out.extend_from_slice(b"IM");

        for var in &self.variables {
            let matrix = encode_matrix(var)?;
            match compression {
                Compression::None => out.extend_from_slice(&matrix),
                Compression::Zlib => {
                    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                    encoder.write_all(&matrix)?;
                    let compressed = encoder.finish()?;
                    out.write_u32::<LittleEndian>(MI_COMPRESSED)?;
                    out.write_u32::<LittleEndian>(compressed.len() as u32)?;
                    out.extend_from_slice(&compressed);
                }
            }
        }

        Ok(out)
    }

    pub fn save(&self, path: &Path, compression: Compression) -> Result<(), MatError> {
        fs::write(path, self.to_bytes(compression)?)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// miMATRIX decoding
// ---------------------------------------------------------------------------

fn parse_matrix(element: &Element<'_>, endian: Endian) -> Result<Option<MatArray>, MatError> {
    if element.data.is_empty() {
        return Ok(None);
    }

    let mut reader = ElementReader::new(element.data, element.offset + 8, endian);

    let flags = reader.expect(&[MI_UINT32])?;
    if flags.data.len() < 8 {
        return Err(MatError::Truncated {
            offset: flags.offset,
        });
    }
    let class = endian.read_u32(&flags.data[0..4]) & 0xff;

    let dims = reader.expect(&[MI_INT32])?;
    let dims: Vec<usize> = dims
        .data
        .chunks_exact(4)
        .map(|chunk| endian.read_i32(chunk).max(0) as usize)
        .collect();

    let name = reader.expect(&[MI_INT8, MI_UINT8, MI_UTF8])?;
    let name = String::from_utf8_lossy(name.data).into_owned();

    if !(MX_DOUBLE_CLASS..=MX_UINT64_CLASS).contains(&class) {
        log::debug!("skipping non-numeric variable '{name}' (class {class})");
        return Ok(None);
    }

    let offset = reader.base + reader.pos;
    let real = reader
        .next_element()?
        .ok_or(MatError::Truncated { offset })?;
    let data = decode_numeric(real.data_type, real.data, endian)?;

    let expected: usize = dims.iter().product();
    if data.len() != expected {
        return Err(MatError::Shape {
            name,
            dims,
            found: data.len(),
            expected,
        });
    }

    Ok(Some(MatArray { name, dims, data }))
}

fn decode_numeric(data_type: u32, bytes: &[u8], endian: Endian) -> Result<Vec<f64>, MatError> {
    fn each<const N: usize>(bytes: &[u8], f: impl Fn(&[u8]) -> f64) -> Vec<f64> {
        bytes.chunks_exact(N).map(f).collect()
    }

    let values: Vec<f64> = match data_type {
        MI_INT8 => bytes.iter().map(|&b| b as i8 as f64).collect(),
        MI_UINT8 => bytes.iter().map(|&b| b as f64).collect(),
        MI_INT16 => each::<2>(bytes, |c| endian.read_i16(c) as f64),
        MI_UINT16 => each::<2>(bytes, |c| endian.read_u16(c) as f64),
        MI_INT32 => each::<4>(bytes, |c| endian.read_i32(c) as f64),
        MI_UINT32 => each::<4>(bytes, |c| endian.read_u32(c) as f64),
        MI_SINGLE => each::<4>(bytes, |c| endian.read_f32(c) as f64),
        MI_DOUBLE => each::<8>(bytes, |c| endian.read_f64(c)),
        MI_INT64 => each::<8>(bytes, |c| endian.read_i64(c) as f64),
        MI_UINT64 => each::<8>(bytes, |c| endian.read_u64(c) as f64),
        other => return Err(MatError::StorageType(other)),
    };
    Ok(values)
}

// ---------------------------------------------------------------------------
// miMATRIX encoding
// ---------------------------------------------------------------------------

fn write_element(out: &mut Vec<u8>, data_type: u32, data: &[u8]) -> io::Result<()> {
    if data.len() <= 4 && !data.is_empty() {
        out.write_u32::<LittleEndian>((data.len() as u32) << 16 | data_type)?;
        out.extend_from_slice(data);
        out.resize(out.len() + 4 - data.len(), 0);
        return Ok(());
    }

    out.write_u32::<LittleEndian>(data_type)?;
    out.write_u32::<LittleEndian>(data.len() as u32)?;
    out.extend_from_slice(data);
    out.resize(out.len() + (8 - data.len() % 8) % 8, 0);
    Ok(())
}

fn encode_matrix(var: &MatArray) -> io::Result<Vec<u8>> {
    let mut flags = Vec::with_capacity(8);
    flags.write_u32::<LittleEndian>(MX_DOUBLE_CLASS)?;
    flags.write_u32::<LittleEndian>(0)?;

    let mut dims = Vec::with_capacity(var.dims.len() * 4);
    for &dim in &var.dims {
        dims.write_i32::<LittleEndian>(dim as i32)?;
    }

    let mut real = Vec::with_capacity(var.data.len() * 8);
    for &value in &var.data {
        real.write_f64::<LittleEndian>(value)?;
    }

    let mut body = Vec::new();
    write_element(&mut body, MI_UINT32, &flags)?;
    write_element(&mut body, MI_INT32, &dims)?;
    write_element(&mut body, MI_INT8, var.name.as_bytes())?;
    write_element(&mut body, MI_DOUBLE, &real)?;

    let mut out = Vec::with_capacity(body.len() + 8);
    out.write_u32::<LittleEndian>(MI_MATRIX)?;
    out.write_u32::<LittleEndian>(body.len() as u32)?;
    out.extend_from_slice(&body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const POSE: [f64; 7] = [-0.25, 0.5, 0.125, 120.0, 130.0, -4.0, 0.0012];

    fn header(indicator: &[u8; 2], version: [u8; 2]) -> Vec<u8> {
        let mut out = vec![b' '; HEADER_TEXT_LEN];
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&version);
        out.extend_from_slice(indicator);
        out
    }

    #[test]
    fn reads_hand_built_little_endian_file() {
        let mut bytes = header(b"IM", [0x00, 0x01]);
        let mut body = Vec::new();
        // array flags: double class
        body.extend_from_slice(&[6, 0, 0, 0, 8, 0, 0, 0, 6, 0, 0, 0, 0, 0, 0, 0]);
        // dimensions 1x2
        body.extend_from_slice(&[5, 0, 0, 0, 8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
        // small-element name "ab"
        body.extend_from_slice(&[1, 0, 2, 0, b'a', b'b', 0, 0]);
        // real part stored as int16 [3, -4]
        body.extend_from_slice(&[3, 0, 4, 0, 3, 0, 0xfc, 0xff]);
        bytes.extend_from_slice(&[14, 0, 0, 0, body.len() as u8, 0, 0, 0]);
        bytes.extend_from_slice(&body);

        let mat = MatFile::parse(&bytes).unwrap();
        let ab = mat.variable("ab").unwrap();
        assert_eq!(ab.dims, vec![1, 2]);
        assert_eq!(ab.data, vec![3.0, -4.0]);
    }

    #[test]
    fn reads_big_endian_file() {
        let mut bytes = header(b"MI", [0x01, 0x00]);
        let mut body = Vec::new();
        body.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 8, 0, 0, 0, 6, 0, 0, 0, 0]);
        body.extend_from_slice(&[0, 0, 0, 5, 0, 0, 0, 8, 0, 0, 0, 1, 0, 0, 0, 1]);
        body.extend_from_slice(&[0, 2, 0, 1, b'v', b'x', 0, 0]);
        body.extend_from_slice(&[0, 0, 0, 9, 0, 0, 0, 8]);
        body.extend_from_slice(&1.5f64.to_be_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 14, 0, 0, 0, body.len() as u8]);
        bytes.extend_from_slice(&body);

        let mat = MatFile::parse(&bytes).unwrap();
        assert_eq!(mat.variable("vx").unwrap().data, vec![1.5]);
    }

    #[test]
    fn reads_compressed_and_plain_variables() {
        let file = MatFile::new(vec![
            MatArray::from_rows("Pose_Para", 1, 7, &POSE),
            MatArray::from_rows("roi", 2, 2, &[1.0, 2.0, 3.0, 4.0]),
        ]);

        for compression in [Compression::None, Compression::Zlib] {
            let parsed = MatFile::parse(&file.to_bytes(compression).unwrap()).unwrap();
            let pose = parsed.variable("Pose_Para").unwrap();
            assert_eq!(pose.dims, vec![1, 7]);
            for (read, expected) in pose.row(0).unwrap().iter().zip(POSE) {
                assert_relative_eq!(*read, expected);
            }
            assert_eq!(parsed.variable("roi").unwrap().row(1), Some(vec![3.0, 4.0]));
        }
    }

    #[test]
    fn rows_are_read_column_major() {
        let array = MatArray {
            name: "m".into(),
            dims: vec![2, 3],
            data: vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0],
        };
        assert_eq!(array.row(0), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(array.row(1), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(array.row(2), None);
    }

    #[test]
    fn skips_character_arrays() {
        let mut bytes = header(b"IM", [0x00, 0x01]);
        let mut body = Vec::new();
        // char class
        body.extend_from_slice(&[6, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0]);
        body.extend_from_slice(&[5, 0, 0, 0, 8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
        body.extend_from_slice(&[1, 0, 1, 0, b's', 0, 0, 0]);
        body.extend_from_slice(&[4, 0, 4, 0, b'h', 0, b'i', 0]);
        bytes.extend_from_slice(&[14, 0, 0, 0, body.len() as u8, 0, 0, 0]);
        bytes.extend_from_slice(&body);

        let mat = MatFile::parse(&bytes).unwrap();
        assert!(mat.variables().is_empty());
    }

    #[test]
    fn rejects_truncated_and_foreign_input() {
        assert!(matches!(MatFile::parse(b"MATLAB"), Err(MatError::ShortHeader(6))));
        assert!(matches!(
            MatFile::parse(&header(b"XX", [0x00, 0x01])),
            Err(MatError::Endian(_))
        ));

        let mut bytes = MatFile::new(vec![MatArray::from_rows("Pose_Para", 1, 7, &POSE)])
            .to_bytes(Compression::None)
            .unwrap();
        bytes.truncate(bytes.len() - 16);
        assert!(matches!(MatFile::parse(&bytes), Err(MatError::Truncated { .. })));
    }
}
