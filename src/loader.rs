use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::StudentError;
use crate::metrics::score_student;
use crate::models::{RawScoreSet, ScoredStudent};

/// Reads roster rows. Missing columns and non-numeric scores are rejected
/// with the row number, before any scoring happens.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<RawScoreSet>, StudentError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize::<RawScoreSet>().enumerate() {
        let row = result.map_err(|err| {
            StudentError::validation("row", format!("row {}: {}", index + 1, err))
        })?;
        row.validate()?;
        rows.push(row);
    }

    Ok(rows)
}

/// Loads and scores a roster file. Duplicate identifiers in the file are rejected.
pub fn load_scored(path: &Path) -> Result<Vec<ScoredStudent>, StudentError> {
    let file = std::fs::File::open(path)?;
    let rows = read_roster(file)?;
    debug!(path = %path.display(), rows = rows.len(), "roster parsed");

    let mut seen = std::collections::HashSet::new();
    let mut students = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert(row.student_id.clone()) {
            return Err(StudentError::DuplicateId(row.student_id));
        }
        students.push(score_student(row)?);
    }

    Ok(students)
}
