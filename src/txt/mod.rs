pub(crate) mod fields;

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::{PlinkError, Result};

pub(crate) const READ_BUFFER_SIZE: usize = 4096;

/// Receives the tokeniser's push events. `field` sees each
/// whitespace-delimited token with its zero-based column index; `row`
/// fires at every line end with the zero-based row number.
pub(crate) trait RowSink {
    fn field(&mut self, field: &[u8], index: usize);
    fn row(&mut self, number: usize);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Graph,
    Delim,
    Eol,
}

/// Single-pass whitespace tokeniser. Fields are runs of printable
/// characters separated by spaces or tabs; rows end at `\n`; a NUL
/// terminates the stream. No quoting, escapes, or comments.
pub(crate) struct Tokenizer {
    prev: CharClass,
    field: Vec<u8>,
    field_num: usize,
    row_num: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            prev: CharClass::Delim,
            field: Vec::with_capacity(16),
            field_num: 0,
            row_num: 0,
        }
    }

    /// Push one chunk of input through the state machine. Field bytes
    /// accumulate across chunk boundaries.
    pub fn feed(&mut self, chunk: &[u8], sink: &mut impl RowSink) {
        for &byte in chunk {
            let class = match byte {
                b' ' | b'\t' => CharClass::Delim,
                b'\n' => CharClass::Eol,
                b'\0' => return,
                _ => CharClass::Graph,
            };

            if class == CharClass::Graph {
                self.field.push(byte);
            } else if self.prev == CharClass::Graph {
                sink.field(&self.field, self.field_num);
                self.field.clear();
                self.field_num += 1;
            }

            if class == CharClass::Eol {
                sink.row(self.row_num);
                self.row_num += 1;
                self.field_num = 0;
            }

            self.prev = class;
        }
    }

    /// Flush a dangling field and an unterminated final row, then reset.
    pub fn finish(&mut self, sink: &mut impl RowSink) {
        if self.prev == CharClass::Graph {
            sink.field(&self.field, self.field_num);
        }
        if self.prev != CharClass::Eol {
            sink.row(self.row_num);
        }
        self.field.clear();
        self.field_num = 0;
        self.row_num = 0;
        self.prev = CharClass::Delim;
    }
}

/// Drive `sink` with the whole stream in fixed-size chunks.
pub(crate) fn parse_stream<R: Read, S: RowSink>(reader: &mut R, sink: &mut S) -> Result<()> {
    let mut tokenizer = Tokenizer::new();
    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(PlinkError::ReadStream { source: e }),
        };
        tokenizer.feed(&buf[..n], sink);
    }
    tokenizer.finish(sink);
    Ok(())
}

/// Count the fields of the first row, then rewind the reader.
pub(crate) fn count_columns<R: Read + Seek>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let mut in_field = false;
    let mut columns = 0usize;

    'scan: loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(PlinkError::ReadStream { source: e }),
        };
        for &byte in &buf[..n] {
            match byte {
                b' ' | b'\t' => in_field = false,
                b'\n' | b'\0' => break 'scan,
                _ => {
                    if !in_field {
                        columns += 1;
                    }
                    in_field = true;
                }
            }
        }
    }

    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| PlinkError::ReadStream { source: e })?;
    Ok(columns)
}
