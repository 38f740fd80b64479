use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StudentError;

/// One student's raw inputs, as read from the roster CSV or a POST body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScoreSet {
    pub student_id: String,
    pub name: String,
    pub program: String,
    pub attendance_percentage: f64,
    pub assignment_1: f64,
    pub assignment_2: f64,
    pub assignment_3: f64,
    pub quiz_1: f64,
    pub quiz_2: f64,
    pub midterm_score: f64,
    pub final_exam_score: f64,
}

impl RawScoreSet {
    pub fn numeric_fields(&self) -> [(&'static str, f64); 8] {
        [
            ("attendance_percentage", self.attendance_percentage),
            ("assignment_1", self.assignment_1),
            ("assignment_2", self.assignment_2),
            ("assignment_3", self.assignment_3),
            ("quiz_1", self.quiz_1),
            ("quiz_2", self.quiz_2),
            ("midterm_score", self.midterm_score),
            ("final_exam_score", self.final_exam_score),
        ]
    }

    /// Boundary check: a usable identifier and every score inside 0..=100.
    pub fn validate(&self) -> Result<(), StudentError> {
        if self.student_id.trim().is_empty() {
            return Err(StudentError::validation("student_id", "must not be empty"));
        }
        if self.student_id.trim() != self.student_id {
            return Err(StudentError::validation(
                "student_id",
                "must not start or end with whitespace",
            ));
        }

        for (field, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(StudentError::validation(field, "must be a number"));
            }
            if !(0.0..=100.0).contains(&value) {
                return Err(StudentError::validation(
                    field,
                    format!("{value} is outside 0-100"),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Excellent => "Excellent",
            Category::Good => "Good",
            Category::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = StudentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Excellent" => Ok(Category::Excellent),
            "Good" => Ok(Category::Good),
            "Needs Improvement" => Ok(Category::NeedsImprovement),
            other => Err(StudentError::validation(
                "category",
                format!("unknown category {other:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredStudent {
    #[serde(flatten)]
    pub raw: RawScoreSet,
    pub assignment_avg: f64,
    pub quiz_avg: f64,
    pub final_score: f64,
    pub category: Category,
    pub is_at_risk: bool,
}

impl ScoredStudent {
    pub fn student_id(&self) -> &str {
        &self.raw.student_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_students: usize,
    pub category_counts: std::collections::BTreeMap<Category, usize>,
    pub at_risk_count: usize,
    pub top_10_percent_students: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub category: Option<Category>,
    pub at_risk: Option<bool>,
}

impl StudentFilter {
    pub fn matches(&self, student: &ScoredStudent) -> bool {
        self.category.map_or(true, |c| student.category == c)
            && self.at_risk.map_or(true, |r| student.is_at_risk == r)
    }
}

#[cfg(test)]
pub(crate) fn sample_raw(student_id: &str) -> RawScoreSet {
    RawScoreSet {
        student_id: student_id.to_string(),
        name: "Avery Lee".to_string(),
        program: "Computer Science".to_string(),
        attendance_percentage: 85.0,
        assignment_1: 80.0,
        assignment_2: 85.0,
        assignment_3: 90.0,
        quiz_1: 75.0,
        quiz_2: 80.0,
        midterm_score: 85.0,
        final_exam_score: 90.0,
    }
}
