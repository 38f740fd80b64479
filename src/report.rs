use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::summarize;
use crate::error::StudentError;
use crate::models::{ScoredStudent, Summary};

pub const STUDENTS_REPORT: &str = "students_report.csv";
pub const SUMMARY_JSON: &str = "summary_report.json";
pub const SUMMARY_MARKDOWN: &str = "summary_report.md";

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    student_id: &'a str,
    name: &'a str,
    program: &'a str,
    attendance_percentage: f64,
    assignment_1: f64,
    assignment_2: f64,
    assignment_3: f64,
    quiz_1: f64,
    quiz_2: f64,
    midterm_score: f64,
    final_exam_score: f64,
    assignment_avg: f64,
    quiz_avg: f64,
    final_score: f64,
    category: &'static str,
    is_at_risk: bool,
}

impl<'a> From<&'a ScoredStudent> for ReportRow<'a> {
    fn from(student: &'a ScoredStudent) -> Self {
        let raw = &student.raw;
        ReportRow {
            student_id: &raw.student_id,
            name: &raw.name,
            program: &raw.program,
            attendance_percentage: raw.attendance_percentage,
            assignment_1: raw.assignment_1,
            assignment_2: raw.assignment_2,
            assignment_3: raw.assignment_3,
            quiz_1: raw.quiz_1,
            quiz_2: raw.quiz_2,
            midterm_score: raw.midterm_score,
            final_exam_score: raw.final_exam_score,
            assignment_avg: student.assignment_avg,
            quiz_avg: student.quiz_avg,
            final_score: student.final_score,
            category: student.category.label(),
            is_at_risk: student.is_at_risk,
        }
    }
}

#[derive(Debug)]
pub struct ReportPaths {
    pub students_csv: PathBuf,
    pub summary_json: PathBuf,
    pub summary_markdown: PathBuf,
}

pub fn write_students_csv(path: &Path, students: &[ScoredStudent]) -> Result<(), StudentError> {
    let mut writer = csv::Writer::from_path(path)?;
    for student in students {
        writer.serialize(ReportRow::from(student))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn build_markdown(
    source: &str,
    generated_at: DateTime<Utc>,
    students: &[ScoredStudent],
    summary: &Summary,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Performance Report");
    let _ = writeln!(
        output,
        "Generated from {} at {}",
        source,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");

    if summary.category_counts.is_empty() {
        let _ = writeln!(output, "No students recorded.");
    } else {
        for (category, count) in summary.category_counts.iter() {
            let _ = writeln!(output, "- {}: {} students", category, count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top 10% Students");

    if summary.top_10_percent_students.is_empty() {
        let _ = writeln!(output, "No students recorded.");
    } else {
        for student_id in summary.top_10_percent_students.iter() {
            if let Some(student) = students.iter().find(|s| s.student_id() == student_id) {
                let _ = writeln!(
                    output,
                    "- {} ({}, {}) final score {:.2}",
                    student.raw.name, student_id, student.raw.program, student.final_score
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## At-Risk Students ({} of {})",
        summary.at_risk_count, summary.total_students
    );

    let mut at_risk: Vec<&ScoredStudent> = students.iter().filter(|s| s.is_at_risk).collect();
    at_risk.sort_by(|a, b| {
        a.final_score
            .partial_cmp(&b.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if at_risk.is_empty() {
        let _ = writeln!(output, "No students flagged.");
    } else {
        for student in at_risk {
            let _ = writeln!(
                output,
                "- {} ({}) attendance {:.1}%, final score {:.2}",
                student.raw.name,
                student.student_id(),
                student.raw.attendance_percentage,
                student.final_score
            );
        }
    }

    output
}

/// Writes the student CSV, the JSON summary and the markdown digest into `out_dir`.
pub fn generate_reports(
    source: &Path,
    out_dir: &Path,
    students: &[ScoredStudent],
) -> Result<(Summary, ReportPaths), StudentError> {
    std::fs::create_dir_all(out_dir)?;
    let summary = summarize(students);

    let paths = ReportPaths {
        students_csv: out_dir.join(STUDENTS_REPORT),
        summary_json: out_dir.join(SUMMARY_JSON),
        summary_markdown: out_dir.join(SUMMARY_MARKDOWN),
    };

    write_students_csv(&paths.students_csv, students)?;

    let json = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
    std::fs::write(&paths.summary_json, json)?;

    let markdown = build_markdown(
        &source.display().to_string(),
        Utc::now(),
        students,
        &summary,
    );
    std::fs::write(&paths.summary_markdown, markdown)?;

    Ok((summary, paths))
}
