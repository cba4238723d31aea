//! Mentor roster import from CSV exports.

mod parser;

pub use parser::RowError;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use super::domain::Mentor;

#[derive(Debug, thiserror::Error)]
pub enum MentorRosterImportError {
    #[error("failed to read mentor roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid mentor roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid mentor roster row {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: RowError,
    },
    #[error("duplicate mentor id '{mentor_id}' on row {line}")]
    DuplicateMentor { line: usize, mentor_id: String },
}

pub struct MentorRosterImporter;

impl MentorRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Mentor>, MentorRosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Mentor>, MentorRosterImportError> {
        let mut seen = HashSet::new();
        let mut mentors = Vec::new();

        for (line, row) in parser::parse_rows(reader)? {
            let mentor = row.map_err(|source| MentorRosterImportError::InvalidRow { line, source })?;
            if !seen.insert(mentor.mentor_id.clone()) {
                return Err(MentorRosterImportError::DuplicateMentor {
                    line,
                    mentor_id: mentor.mentor_id.0,
                });
            }
            mentors.push(mentor);
        }

        Ok(mentors)
    }
}
