//! Raw series source reading JSON-lines document exports.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use chronofold::{Query, RawFragment, SeriesSource, SourceError};

use crate::filter::Filter;

/// Reads documents from a JSON-lines file, one [`RawFragment`] object per line.
///
/// The connection is the file path. Blank lines are skipped. Documents are
/// decoded lazily as the cursor is pulled; a line that fails to decode ends
/// the stream with [`SourceError::Decode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesSource;

impl JsonLinesSource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl SeriesSource for JsonLinesSource {
    type Connection = Path;
    type Fragment = RawFragment;
    type Iter = JsonLinesCursor<BufReader<File>>;

    fn fetch(
        &self,
        connection: &Path,
        query: &Query,
        page_size: usize,
    ) -> Result<Self::Iter, SourceError> {
        let filter = Filter::parse(query.filter())?;
        let file = File::open(connection)?;

        #[cfg(feature = "logging")]
        log::debug!("json-lines source: reading {}", connection.display());

        // Roughly one page of typical documents per read.
        let capacity = page_size.max(1).saturating_mul(256);
        Ok(JsonLinesCursor::new(
            BufReader::with_capacity(capacity, file),
            filter,
        ))
    }
}

/// Lazy cursor decoding documents from a buffered reader.
#[derive(Debug)]
pub struct JsonLinesCursor<R> {
    lines: Lines<R>,
    filter: Filter,
    line: usize,
    finished: bool,
}

impl<R: BufRead> JsonLinesCursor<R> {
    /// Wraps a reader, yielding documents that match `filter`.
    pub fn new(reader: R, filter: Filter) -> Self {
        Self {
            lines: reader.lines(),
            filter,
            line: 0,
            finished: false,
        }
    }

    /// Number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for JsonLinesCursor<R> {
    type Item = Result<RawFragment, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let text = match self.lines.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
                Some(Ok(text)) => text,
            };
            self.line += 1;

            if text.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RawFragment>(&text) {
                Ok(document) if self.filter.matches(&document) => return Some(Ok(document)),
                Ok(_) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(SourceError::Decode {
                        line: self.line,
                        message: err.to_string(),
                    }));
                }
            }
        }
    }
}
