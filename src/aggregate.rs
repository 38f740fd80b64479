use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{Category, ScoredStudent, Summary};

/// Students per category. Categories nobody falls into are left out.
pub fn category_counts(students: &[ScoredStudent]) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();

    for student in students {
        *counts.entry(student.category).or_insert(0) += 1;
    }

    counts
}

pub fn at_risk_count(students: &[ScoredStudent]) -> usize {
    students.iter().filter(|student| student.is_at_risk).count()
}

/// Highest scorers first, ties kept in input order. A non-empty collection
/// always yields at least one identifier.
pub fn top_decile(students: &[ScoredStudent]) -> Vec<String> {
    if students.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<&ScoredStudent> = students.iter().collect();
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
    });

    let take = (students.len() / 10).max(1);
    ranked
        .into_iter()
        .take(take)
        .map(|student| student.student_id().to_string())
        .collect()
}

pub fn summarize(students: &[ScoredStudent]) -> Summary {
    Summary {
        total_students: students.len(),
        category_counts: category_counts(students),
        at_risk_count: at_risk_count(students),
        top_10_percent_students: top_decile(students),
    }
}
