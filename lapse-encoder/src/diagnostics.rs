//! Line splitting for the encoder's diagnostic stream
//!
//! ffmpeg redraws its status line with bare carriage returns, so a plain
//! `BufRead::lines` would hold back every progress update until the final
//! newline. Both `\r` and `\n` end a line here.

use std::io::{self, BufRead};

/// Iterator over the non-empty lines of a blocking reader
pub struct DiagnosticLines<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> DiagnosticLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    /// Reads up to the next line terminator; returns the bytes and whether the
    /// stream ended
    fn read_fragment(&mut self) -> io::Result<(Vec<u8>, bool)> {
        let mut fragment = Vec::new();
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                return Ok((fragment, true));
            }
            match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    fragment.extend_from_slice(&buf[..end]);
                    self.reader.consume(end + 1);
                    return Ok((fragment, false));
                }
                None => {
                    let len = buf.len();
                    fragment.extend_from_slice(buf);
                    self.reader.consume(len);
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for DiagnosticLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let (fragment, eof) = match self.read_fragment() {
                Ok(read) => read,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.done = eof;
            if !fragment.is_empty() {
                return Some(Ok(String::from_utf8_lossy(&fragment).into_owned()));
            }
        }
        None
    }
}
