//! Line-oriented reading of CIP property files.
//!
//! ```text
//! # comment
//! Name   = "warlock"
//! Flags  = {KickBoxes,
//!           SeeInvisible}
//! ```
//! yields `("name", "\"warlock\"")` and `("flags", "{KickBoxes, SeeInvisible}")`.

use crate::error::{CipError, Result};
use encoding_rs::WINDOWS_1252;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

const COMMENT_SYMBOL: char = '#';
const PROPERTY_VALUE_SEPARATOR: char = '=';

/// Lazily decodes Latin-1 (Windows-1252) lines from a reader.
pub struct CipLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> CipLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for CipLines<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n') | Some(b'\r')) {
                    self.buf.pop();
                }
                let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(&self.buf);
                if had_errors {
                    return Some(Err(CipError::MalformedLine(text.into_owned())));
                }
                Some(Ok(text.into_owned()))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Open a CIP file for lazy line reading. Returns `None` if it does not exist.
pub fn open_cip_lines(path: &Path) -> Result<Option<CipLines<BufReader<File>>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(CipLines::new(BufReader::new(file)))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Single-pass stream of `(name, value)` property pairs.
///
/// Names are trimmed and lowercased. Lines without `=` continue the previous
/// value. Pairs with an empty name or value are dropped.
pub struct PropertyPairs<I> {
    lines: I,
    name: String,
    value: String,
    done: bool,
}

impl<I> PropertyPairs<I>
where
    I: Iterator<Item = Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            name: String::new(),
            value: String::new(),
            done: false,
        }
    }

    fn take_pending(&mut self) -> Option<(String, String)> {
        let name = std::mem::take(&mut self.name);
        let value = std::mem::take(&mut self.value);
        if name.is_empty() || value.is_empty() {
            None
        } else {
            Some((name, value))
        }
    }

    fn fail(&mut self, err: CipError) -> Option<Result<(String, String)>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<I> Iterator for PropertyPairs<I>
where
    I: Iterator<Item = Result<String>>,
{
    type Item = Result<(String, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    return self.take_pending().map(Ok);
                }
            };

            let line = line.trim_start();
            if line.is_empty() || line.starts_with(COMMENT_SYMBOL) {
                continue;
            }

            match line.split_once(PROPERTY_VALUE_SEPARATOR) {
                None => {
                    let continuation = line.trim();
                    if !self.value.is_empty() {
                        self.value.push(' ');
                    }
                    self.value.push_str(continuation);
                }
                Some((name, _)) if name.trim().is_empty() => {
                    return self.fail(CipError::MalformedLine(line.to_string()));
                }
                Some((name, value)) => {
                    let finished = self.take_pending();
                    self.name = name.trim().to_lowercase();
                    self.value = value.trim().to_string();
                    if let Some(pair) = finished {
                        return Some(Ok(pair));
                    }
                }
            }
        }
    }
}

/// Property pairs from in-memory lines.
pub fn read_property_pairs<I, S>(lines: I) -> PropertyPairs<impl Iterator<Item = Result<String>>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PropertyPairs::new(lines.into_iter().map(|line| Ok(line.as_ref().to_string())))
}
