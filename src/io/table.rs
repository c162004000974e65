//! Delimited table reading and writing
//!
//! Reads simple tabular files: records separated by newlines, fields by
//! tabs or commas, `#` starting a comment record. The whole input is
//! slurped up front, so no I/O happens once loading is over. Record
//! numbers are tracked for error reporting.

use std::io::Read;

use crate::error::{PredictError, Result};

/// Delimiter that ended the last field read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// end of input
    Eof,
    /// field separator
    Field,
    /// record separator (end of input after data counts as one)
    Record,
}

fn is_recsep(c: char) -> bool {
    c == '\n'
}
fn is_fldsep(c: char) -> bool {
    c == '\t' || c == ','
}
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\r'
}
fn is_comment(c: char) -> bool {
    c == '#'
}

/// Reader for simple table formats.
pub struct TableReader {
    text: Vec<char>,
    pos: usize,
    field: String,
    delim: Delim,
    recno: usize,
}

impl TableReader {
    /// Slurp the whole input and set up the reader.
    pub fn new(mut reader: impl Read) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_string(text))
    }

    pub fn from_string(text: String) -> Self {
        TableReader {
            text: text.chars().collect(),
            pos: 0,
            field: String::new(),
            delim: Delim::Eof,
            recno: 1,
        }
    }

    /// The field read by the last [`TableReader::read_field`] call.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Current record number (1-based), for error reporting.
    pub fn record(&self) -> usize {
        self.recno
    }

    /// Whether the end of the input has been reached.
    pub fn eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Read the next field, returning the delimiter that ended it.
    ///
    /// A record separator is implied at the end of input if data was
    /// read; [`Delim::Eof`] is only returned when nothing was.
    pub fn read_field(&mut self) -> Delim {
        self.field.clear();
        let mut c = match self.bump() {
            Some(c) => c,
            None => {
                self.delim = Delim::Eof;
                return self.delim;
            }
        };

        // Skip comment records (only at the start of a record).
        if self.delim != Delim::Field {
            while is_comment(c) {
                self.recno += 1;
                while !is_recsep(c) {
                    c = match self.bump() {
                        Some(c) => c,
                        None => {
                            self.delim = Delim::Eof;
                            return self.delim;
                        }
                    };
                }
                c = match self.bump() {
                    Some(c) => c,
                    None => {
                        self.delim = Delim::Eof;
                        return self.delim;
                    }
                };
            }
        }

        // Skip leading blanks.
        while is_blank(c) {
            c = match self.bump() {
                Some(c) => c,
                None => {
                    self.delim = Delim::Record;
                    return self.delim;
                }
            };
        }

        if is_recsep(c) {
            self.recno += 1;
            self.delim = Delim::Record;
            return self.delim;
        }
        if is_fldsep(c) {
            self.delim = Delim::Field;
            return self.delim;
        }

        // Read the field value up to a separator.
        loop {
            self.field.push(c);
            c = match self.bump() {
                Some(c) => c,
                None => {
                    self.delim = Delim::Record;
                    break;
                }
            };
            if is_recsep(c) {
                self.recno += 1;
                self.delim = Delim::Record;
                break;
            }
            if is_fldsep(c) {
                self.delim = Delim::Field;
                break;
            }
        }

        // Remove trailing blanks from the field.
        // Nothing past the ending separator is consumed, so an empty
        // field between two separators is reported by the next call.
        while self.field.ends_with(|c: char| is_blank(c)) {
            self.field.pop();
        }
        self.delim
    }

    /// Read a field and check the delimiter that ends it.
    fn require(&mut self, want: Delim) -> Result<()> {
        if self.read_field() != want {
            return Err(PredictError::FieldCount {
                record: self.recno,
            });
        }
        Ok(())
    }

    /// Read a string field.
    pub fn next_str(&mut self, want: Delim) -> Result<String> {
        self.require(want)?;
        Ok(self.field.clone())
    }

    /// Read a field and check it against an expected header name.
    pub fn expect(&mut self, name: &'static str, want: Delim) -> Result<()> {
        self.require(want)?;
        if self.field != name {
            return Err(PredictError::HeaderField {
                record: self.recno,
                expect: name,
                found: self.field.clone(),
            });
        }
        Ok(())
    }

    /// Read an integer field.
    pub fn next_int(&mut self, want: Delim) -> Result<i64> {
        self.require(want)?;
        self.field
            .parse()
            .map_err(|_| PredictError::MalformedNumber {
                record: self.recno,
                text: self.field.clone(),
            })
    }

    /// Read an integer field, treating an empty field as zero.
    pub fn next_int_or_zero(&mut self, want: Delim) -> Result<i64> {
        self.require(want)?;
        if self.field.is_empty() {
            return Ok(0);
        }
        self.field
            .parse()
            .map_err(|_| PredictError::MalformedNumber {
                record: self.recno,
                text: self.field.clone(),
            })
    }

    /// Read a floating point field.
    pub fn next_f64(&mut self, want: Delim) -> Result<f64> {
        self.require(want)?;
        self.field
            .parse()
            .map_err(|_| PredictError::MalformedNumber {
                record: self.recno,
                text: self.field.clone(),
            })
    }
}

/// Writer for simple table formats (one record per line).
pub struct TableWriter<W: std::io::Write> {
    writer: W,
}

impl<W: std::io::Write> TableWriter<W> {
    pub fn new(writer: W) -> Self {
        TableWriter { writer }
    }

    /// Write one record, fields tab-separated.
    pub fn record<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b"\t")?;
            }
            self.writer.write_all(f.as_ref().as_bytes())?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(text: &str) -> Vec<(String, Delim)> {
        let mut rdr = TableReader::from_string(text.to_string());
        let mut out = Vec::new();
        loop {
            let d = rdr.read_field();
            if d == Delim::Eof {
                break;
            }
            out.push((rdr.field().to_string(), d));
        }
        out
    }

    #[test]
    fn test_fields_and_records() {
        let got = fields_of("a\tb\nc\td\n");
        assert_eq!(
            got,
            vec![
                ("a".into(), Delim::Field),
                ("b".into(), Delim::Record),
                ("c".into(), Delim::Field),
                ("d".into(), Delim::Record),
            ]
        );
    }

    #[test]
    fn test_missing_final_newline_is_record() {
        let got = fields_of("a\tb");
        assert_eq!(got.last().unwrap(), &("b".to_string(), Delim::Record));
    }

    #[test]
    fn test_comment_records_skipped() {
        let mut rdr = TableReader::from_string("# header comment\nx\n".into());
        assert_eq!(rdr.read_field(), Delim::Record);
        assert_eq!(rdr.field(), "x");
        // the comment record still counts for numbering
        assert_eq!(rdr.record(), 3);
    }

    #[test]
    fn test_empty_field_between_separators() {
        let got = fields_of("a\t\tb\n");
        assert_eq!(
            got,
            vec![
                ("a".into(), Delim::Field),
                ("".into(), Delim::Field),
                ("b".into(), Delim::Record),
            ]
        );
    }

    #[test]
    fn test_empty_field_is_blank_only() {
        let got = fields_of("a\t \t b \n");
        assert_eq!(
            got,
            vec![
                ("a".into(), Delim::Field),
                ("".into(), Delim::Field),
                ("b".into(), Delim::Record),
            ]
        );
    }

    #[test]
    fn test_trailing_empty_field() {
        let got = fields_of("a\t\n");
        assert_eq!(
            got,
            vec![("a".into(), Delim::Field), ("".into(), Delim::Record)]
        );
    }

    #[test]
    fn test_empty_field_reads_as_zero() {
        let mut rdr = TableReader::from_string("1\t\t100\n".into());
        assert_eq!(rdr.next_int(Delim::Field).unwrap(), 1);
        assert_eq!(rdr.next_int_or_zero(Delim::Field).unwrap(), 0);
        assert_eq!(rdr.next_int(Delim::Record).unwrap(), 100);
    }

    #[test]
    fn test_blank_trimming() {
        let got = fields_of("  a  \t b \n");
        assert_eq!(
            got,
            vec![("a".into(), Delim::Field), ("b".into(), Delim::Record)]
        );
    }

    #[test]
    fn test_record_numbers_in_errors() {
        let mut rdr = TableReader::from_string("1\n2\nx\n".into());
        assert_eq!(rdr.next_int(Delim::Record).unwrap(), 1);
        assert_eq!(rdr.next_int(Delim::Record).unwrap(), 2);
        let err = rdr.next_int(Delim::Record).unwrap_err();
        match err {
            PredictError::MalformedNumber { record, text } => {
                assert_eq!(record, 4);
                assert_eq!(text, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_field_count() {
        let mut rdr = TableReader::from_string("a\tb\n".into());
        // expecting the record to end after one field
        let err = rdr.next_str(Delim::Record).unwrap_err();
        assert!(matches!(err, PredictError::FieldCount { .. }));
    }

    #[test]
    fn test_writer_roundtrip() {
        let mut w = TableWriter::new(Vec::new());
        w.record(&["graph", "src", "dst"]).unwrap();
        w.record(&["g1", "1", "2"]).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(text, "graph\tsrc\tdst\ng1\t1\t2\n");
    }
}
