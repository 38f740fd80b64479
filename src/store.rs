use crate::error::StudentError;
use crate::models::{ScoredStudent, StudentFilter};

/// In-memory roster of scored students. Insertion order is preserved, which
/// is the tie-break order for top-decile ranking.
#[derive(Debug, Default)]
pub struct StudentStore {
    students: Vec<ScoredStudent>,
}

impl StudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_students(students: Vec<ScoredStudent>) -> Result<Self, StudentError> {
        let mut store = Self::new();
        for student in students {
            store.append(student)?;
        }
        Ok(store)
    }

    pub fn append(&mut self, student: ScoredStudent) -> Result<(), StudentError> {
        if self.get(student.student_id()).is_some() {
            return Err(StudentError::DuplicateId(student.raw.student_id));
        }
        self.students.push(student);
        Ok(())
    }

    pub fn get(&self, student_id: &str) -> Option<&ScoredStudent> {
        self.students.iter().find(|s| s.student_id() == student_id)
    }

    pub fn all(&self) -> &[ScoredStudent] {
        &self.students
    }

    pub fn filtered(&self, filter: &StudentFilter) -> Vec<ScoredStudent> {
        self.students
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.students.clear();
    }
}
