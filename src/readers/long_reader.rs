use crate::error::{ProcessingError, Result};
use crate::models::{LongHeader, LongRecord};
use crate::readers::input::{csv_reader, open_input};
use crate::utils::format::parse_float;
use csv::{Reader, StringRecord};
use std::io::Read;
use std::path::Path;

/// Streaming reader for `id,date,value` files, parsing `value` as a float
pub struct LongReader<R: Read = Box<dyn Read>> {
    reader: Reader<R>,
    header: LongHeader,
    record: StringRecord,
}

impl LongReader<Box<dyn Read>> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_reader(open_input(path)?)
    }
}

impl<R: Read> LongReader<R> {
    pub fn from_reader(input: R) -> Result<Self> {
        let mut reader = csv_reader(input);
        let header = LongHeader::from_header(reader.headers()?)?;

        Ok(Self {
            reader,
            header,
            record: StringRecord::new(),
        })
    }

    pub fn header(&self) -> &LongHeader {
        &self.header
    }

    /// Read the next record, or `None` at end of stream
    pub fn next_record(&mut self) -> Result<Option<LongRecord>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        let line = self.record.position().map_or(0, |p| p.line());
        let field = |index: usize| self.record.get(index).unwrap_or_default();

        let raw_value = field(self.header.value_index);
        let value = parse_float(raw_value).ok_or_else(|| ProcessingError::ValueParse {
            field: "value",
            value: raw_value.to_string(),
            line,
        })?;

        Ok(Some(LongRecord {
            id: field(self.header.id_index).to_string(),
            date: field(self.header.date_index).to_string(),
            value,
            line,
        }))
    }

    /// Advance past the next record without parsing its value.
    /// Returns `false` at end of stream.
    pub fn skip_record(&mut self) -> Result<bool> {
        Ok(self.reader.read_record(&mut self.record)?)
    }

    /// Input line of the most recently read record
    pub fn line(&self) -> u64 {
        self.record.position().map_or(0, |p| p.line())
    }
}

impl<R: Read> Iterator for LongReader<R> {
    type Item = Result<LongRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
