//! Streaming roster reader over the `csv` crate.

use crate::error::RosterError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use teamsync_common::TeamRecord;
use tracing::debug;

/// One data row of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterRow {
    /// A usable team.
    Team {
        /// 1-based line in the file.
        line: u64,
        /// Parsed record.
        record: TeamRecord,
    },
    /// A row with a blank team name or no member names.
    Skipped {
        /// 1-based line in the file.
        line: u64,
        /// Trimmed fields as read.
        fields: Vec<String>,
    },
}

impl RosterRow {
    /// The team record, if this row produced one.
    pub const fn record(&self) -> Option<&TeamRecord> {
        match self {
            Self::Team { record, .. } => Some(record),
            Self::Skipped { .. } => None,
        }
    }
}

/// Iterator over roster rows, in file order.
///
/// The header row is consumed up front. After the first read error the
/// iterator yields that error once and then ends.
pub struct RosterReader<R> {
    records: StringRecordsIntoIter<R>,
    failed: bool,
}

impl RosterReader<File> {
    /// Opens a roster file. A missing file is reported as
    /// [`RosterError::NotFound`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RosterError::NotFound {
                path: path.to_path_buf(),
            },
            _ => RosterError::Open {
                path: path.to_path_buf(),
                source,
            },
        })?;

        debug!(path = %path.display(), "Opened roster file");
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> RosterReader<R> {
    /// Wraps any reader producing roster CSV.
    pub fn from_reader(reader: R) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader)
            .into_records();

        Self {
            records,
            failed: false,
        }
    }
}

impl<R: Read> Iterator for RosterReader<R> {
    type Item = Result<RosterRow, RosterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.records.next()? {
            Ok(record) => Some(Ok(classify(&record))),
            Err(source) => {
                self.failed = true;
                let line = source.position().map(csv::Position::line);
                Some(Err(RosterError::Read { line, source }))
            }
        }
    }
}

fn classify(record: &StringRecord) -> RosterRow {
    let line = record.position().map_or(0, csv::Position::line);
    let mut fields = record.iter();
    let team_name = fields.next().unwrap_or_default();

    match TeamRecord::new(team_name, fields) {
        Some(record) => RosterRow::Team { line, record },
        None => RosterRow::Skipped {
            line,
            fields: record.iter().map(ToString::to_string).collect(),
        },
    }
}

/// Reads a whole roster into memory, stopping at the first read error.
pub fn read_roster(path: impl AsRef<Path>) -> Result<Vec<RosterRow>, RosterError> {
    RosterReader::open(path)?.collect()
}
