// src/data_input/cdr.rs
//
// Minimal reader for OMG CDR payloads as stored in ROS 2 bags.
// Layout: 4-byte encapsulation header, then fields aligned to their own size
// relative to the first byte after the header.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{AnalysisError, Result};

const ENCAPSULATION_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

pub struct CdrReader<'a> {
    payload: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> CdrReader<'a> {
    /// Wraps a full serialized message (encapsulation header included).
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < ENCAPSULATION_HEADER_LEN {
            return Err(AnalysisError::CdrDecode {
                offset: 0,
                reason: format!("payload of {} bytes has no encapsulation header", data.len()),
            });
        }
        // Byte 1 carries the representation id: 0x00 CDR_BE, 0x01 CDR_LE.
        let endianness = if data[1] & 0x01 == 1 {
            Endianness::Little
        } else {
            Endianness::Big
        };
        Ok(Self {
            payload: &data[ENCAPSULATION_HEADER_LEN..],
            pos: 0,
            endianness,
        })
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn align(&mut self, size: usize) {
        let rem = self.pos % size;
        if rem != 0 {
            self.pos += size - rem;
        }
    }

    fn take(&mut self, size: usize) -> Result<&'a [u8]> {
        self.align(size.min(8));
        self.take_unaligned(size)
    }

    fn take_unaligned(&mut self, size: usize) -> Result<&'a [u8]> {
        let end = self.pos + size;
        if end > self.payload.len() {
            return Err(AnalysisError::CdrDecode {
                offset: self.pos + ENCAPSULATION_HEADER_LEN,
                reason: format!(
                    "need {size} bytes but only {} remain",
                    self.payload.len().saturating_sub(self.pos)
                ),
            });
        }
        let bytes = &self.payload[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_i32(bytes),
            Endianness::Big => BigEndian::read_i32(bytes),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u32(bytes),
            Endianness::Big => BigEndian::read_u32(bytes),
        })
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_f32(bytes),
            Endianness::Big => BigEndian::read_f32(bytes),
        })
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_f64(bytes),
            Endianness::Big => BigEndian::read_f64(bytes),
        })
    }

    /// Length-prefixed string; the length includes the trailing NUL.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take_unaligned(len)?;
        let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
        Ok(String::from_utf8_lossy(text).into_owned())
    }

    /// Element count prefix of a sequence.
    pub fn read_sequence_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    pub fn read_u16_sequence(&mut self) -> Result<Vec<u16>> {
        let len = self.read_sequence_len()?;
        (0..len).map(|_| self.read_u16()).collect()
    }

    pub fn read_f64_array<const N: usize>(&mut self) -> Result<[f64; N]> {
        let mut out = [0.0; N];
        for slot in out.iter_mut() {
            *slot = self.read_f64()?;
        }
        Ok(out)
    }
}

/// Little-endian CDR writer, used to build fixtures and re-encode messages.
#[derive(Default)]
pub struct CdrWriter {
    payload: Vec<u8>,
}

impl CdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn align(&mut self, size: usize) {
        while self.payload.len() % size != 0 {
            self.payload.push(0);
        }
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.payload.push(v);
        self
    }

    pub fn write_i8(&mut self, v: i8) -> &mut Self {
        self.write_u8(v as u8)
    }

    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.write_u8(v as u8)
    }

    pub fn write_u16(&mut self, v: u16) -> &mut Self {
        self.align(2);
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, v);
        self.payload.extend_from_slice(&buf);
        self
    }

    pub fn write_i32(&mut self, v: i32) -> &mut Self {
        self.align(4);
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, v);
        self.payload.extend_from_slice(&buf);
        self
    }

    pub fn write_u32(&mut self, v: u32) -> &mut Self {
        self.align(4);
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, v);
        self.payload.extend_from_slice(&buf);
        self
    }

    pub fn write_f32(&mut self, v: f32) -> &mut Self {
        self.align(4);
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, v);
        self.payload.extend_from_slice(&buf);
        self
    }

    pub fn write_f64(&mut self, v: f64) -> &mut Self {
        self.align(8);
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, v);
        self.payload.extend_from_slice(&buf);
        self
    }

    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_u32(s.len() as u32 + 1);
        self.payload.extend_from_slice(s.as_bytes());
        self.payload.push(0);
        self
    }

    pub fn write_u16_sequence(&mut self, values: &[u16]) -> &mut Self {
        self.write_u32(values.len() as u32);
        for v in values {
            self.write_u16(*v);
        }
        self
    }

    /// Serialized bytes with a CDR_LE encapsulation header.
    pub fn finish(&self) -> Vec<u8> {
        let mut out = vec![0x00, 0x01, 0x00, 0x00];
        out.extend_from_slice(&self.payload);
        out
    }
}
