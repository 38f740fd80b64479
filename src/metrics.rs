use crate::error::StudentError;
use crate::models::{Category, RawScoreSet, ScoredStudent};

pub const ASSIGNMENT_WEIGHT: f64 = 0.30;
pub const QUIZ_WEIGHT: f64 = 0.20;
pub const MIDTERM_WEIGHT: f64 = 0.20;
pub const FINAL_EXAM_WEIGHT: f64 = 0.30;

const EXCELLENT_FLOOR: f64 = 85.0;
const GOOD_FLOOR: f64 = 70.0;
const MIN_ATTENDANCE: f64 = 60.0;
const MIN_PASSING_SCORE: f64 = 65.0;

/// Rounds half away from zero to two decimals. Negative zero comes back as zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

pub fn assignment_average(a1: f64, a2: f64, a3: f64) -> f64 {
    round2((a1 + a2 + a3) / 3.0)
}

pub fn quiz_average(q1: f64, q2: f64) -> f64 {
    round2((q1 + q2) / 2.0)
}

pub fn final_score(assignment_avg: f64, quiz_avg: f64, midterm: f64, final_exam: f64) -> f64 {
    round2(
        assignment_avg * ASSIGNMENT_WEIGHT
            + quiz_avg * QUIZ_WEIGHT
            + midterm * MIDTERM_WEIGHT
            + final_exam * FINAL_EXAM_WEIGHT,
    )
}

pub fn category(final_score: f64) -> Category {
    if final_score >= EXCELLENT_FLOOR {
        Category::Excellent
    } else if final_score >= GOOD_FLOOR {
        Category::Good
    } else {
        Category::NeedsImprovement
    }
}

pub fn is_at_risk(attendance_pct: f64, final_score: f64) -> bool {
    attendance_pct < MIN_ATTENDANCE || final_score < MIN_PASSING_SCORE
}

/// Derives every metric for one student. Scores are not range-checked here,
/// only rejected when they are not numbers at all.
pub fn score_student(raw: RawScoreSet) -> Result<ScoredStudent, StudentError> {
    if let Some((field, _)) = raw
        .numeric_fields()
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(StudentError::validation(field, "must be a number"));
    }

    let assignment_avg = assignment_average(raw.assignment_1, raw.assignment_2, raw.assignment_3);
    let quiz_avg = quiz_average(raw.quiz_1, raw.quiz_2);
    let final_score = final_score(
        assignment_avg,
        quiz_avg,
        raw.midterm_score,
        raw.final_exam_score,
    );

    Ok(ScoredStudent {
        category: category(final_score),
        is_at_risk: is_at_risk(raw.attendance_percentage, final_score),
        raw,
        assignment_avg,
        quiz_avg,
        final_score,
    })
}
