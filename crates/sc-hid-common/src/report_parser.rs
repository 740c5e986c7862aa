//! Fixed-layout HID report reading and building

use crate::{HidCommonError, HidCommonResult};

/// Zero-copy little-endian reader over a borrowed report.
///
/// Reads advance a cursor; `seek` jumps to an absolute offset so fixed-layout
/// reports can be read field by field without intermediate copies.
#[derive(Debug, Clone)]
pub struct ReportParser<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            position: 0,
        }
    }

    /// Parser positioned at `offset`.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        let mut parser = Self::new(data);
        parser.seek(offset);
        parser
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Move the cursor to `offset`, clamped to the end of the buffer.
    pub fn seek(&mut self, offset: usize) {
        self.position = offset.min(self.buffer.len());
    }

    pub fn skip(&mut self, count: usize) {
        self.seek(self.position.saturating_add(count));
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn read_u8(&mut self) -> HidCommonResult<u8> {
        let value = self.peek_u8()?;
        self.position += 1;
        Ok(value)
    }

    pub fn peek_u8(&self) -> HidCommonResult<u8> {
        self.buffer
            .get(self.position)
            .copied()
            .ok_or_else(|| end_of_data(self.position, 1))
    }

    pub fn read_u16_le(&mut self) -> HidCommonResult<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_i16_le(&mut self) -> HidCommonResult<i16> {
        let bytes = self.read_array::<2>()?;
        Ok(i16::from_le_bytes(bytes))
    }

    pub fn read_u32_le(&mut self) -> HidCommonResult<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_bytes(&mut self, count: usize) -> HidCommonResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .ok_or_else(|| end_of_data(self.position, count))?;
        let bytes = self
            .buffer
            .get(self.position..end)
            .ok_or_else(|| end_of_data(self.position, count))?;
        self.position = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> HidCommonResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn slice(&self) -> &'a [u8] {
        self.buffer
    }
}

fn end_of_data(position: usize, wanted: usize) -> HidCommonError {
    HidCommonError::InvalidReport(format!(
        "Unexpected end of data: wanted {wanted} bytes at offset {position}"
    ))
}

/// Builder for fixed-length reports.
///
/// The buffer starts zero-filled at the requested length; writes land at the
/// cursor and grow the buffer if they run past the end.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    buffer: Vec<u8>,
    position: usize,
}

impl ReportBuilder {
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0u8; len],
            position: 0,
        }
    }

    pub fn seek(&mut self, offset: usize) -> &mut Self {
        self.position = offset;
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.write_bytes(&[value])
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i16_le(&mut self, value: i16) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        let end = self.position.saturating_add(data.len());
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        if let Some(dst) = self.buffer.get_mut(self.position..end) {
            dst.copy_from_slice(data);
        }
        self.position = end;
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Copy the report into a fixed array, truncating or zero-padding.
    pub fn to_array<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        let len = self.buffer.len().min(N);
        if let (Some(dst), Some(src)) = (out.get_mut(..len), self.buffer.get(..len)) {
            dst.copy_from_slice(src);
        }
        out
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(64)
    }
}
