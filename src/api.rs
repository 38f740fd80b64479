use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::info;

use crate::aggregate::summarize;
use crate::error::StudentError;
use crate::metrics::score_student;
use crate::models::{Category, RawScoreSet, ScoredStudent, StudentFilter, Summary};
use crate::store::StudentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<StudentStore>>,
}

impl AppState {
    pub fn new(store: StudentStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

/// Query parameters for the student listing
#[derive(Debug, Default, Deserialize)]
pub struct StudentQuery {
    /// Category label, e.g. "Excellent" or "Needs Improvement"
    pub category: Option<String>,
    pub at_risk: Option<bool>,
}

impl StudentQuery {
    fn into_filter(self) -> Result<StudentFilter, StudentError> {
        Ok(StudentFilter {
            category: self
                .category
                .as_deref()
                .map(str::parse::<Category>)
                .transpose()?,
            at_risk: self.at_risk,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AddStudentResponse {
    pub message: String,
    pub student_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/students", get(list_students).post(add_student))
        .route("/students/performance-summary", get(performance_summary))
        .route("/students/:student_id", get(get_student))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "API is working" }))
}

async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<Vec<ScoredStudent>>, StudentError> {
    let filter = query.into_filter()?;
    let store = state.store.read().await;
    Ok(Json(store.filtered(&filter)))
}

async fn performance_summary(State(state): State<AppState>) -> Json<Summary> {
    let store = state.store.read().await;
    Json(summarize(store.all()))
}

async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<ScoredStudent>, StudentError> {
    let store = state.store.read().await;
    store
        .get(&student_id)
        .cloned()
        .map(Json)
        .ok_or(StudentError::NotFound(student_id))
}

async fn add_student(
    State(state): State<AppState>,
    Json(raw): Json<RawScoreSet>,
) -> Result<Json<AddStudentResponse>, StudentError> {
    raw.validate()?;
    let scored = score_student(raw)?;
    let student_id = scored.student_id().to_string();

    let mut store = state.store.write().await;
    store.append(scored)?;
    info!(student_id = %student_id, total = store.len(), "student added");

    Ok(Json(AddStudentResponse {
        message: "Student added successfully".to_string(),
        student_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_raw;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn seeded_state() -> AppState {
        let mut weak = sample_raw("S002");
        weak.name = "Jules Moreno".to_string();
        weak.final_exam_score = 20.0;
        let store = StudentStore::from_students(vec![
            score_student(sample_raw("S001")).unwrap(),
            score_student(weak).unwrap(),
        ])
        .unwrap();
        AppState::new(store)
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/students")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn root_reports_working() {
        let (status, body) = send(&seeded_state(), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "API is working");
    }

    #[tokio::test]
    async fn lists_students_with_derived_fields() {
        let (status, body) = send(&seeded_state(), get("/students")).await;
        assert_eq!(status, StatusCode::OK);
        let students = body.as_array().unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0]["student_id"], "S001");
        assert_eq!(students[0]["category"], "Excellent");
        assert_eq!(students[0]["is_at_risk"], false);
        assert!(students[0]["final_score"].is_number());
        assert!(students[0]["attendance_percentage"].is_number());
    }

    #[tokio::test]
    async fn filters_by_category_and_at_risk() {
        let state = seeded_state();

        let (status, body) = send(&state, get("/students?category=Excellent")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = send(&state, get("/students?at_risk=true")).await;
        let students = body.as_array().unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0]["student_id"], "S002");

        let (status, _) = send(&state, get("/students?category=Average")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn fetches_single_student_or_404() {
        let state = seeded_state();

        let (status, body) = send(&state, get("/students/S001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student_id"], "S001");
        assert_eq!(body["name"], "Avery Lee");

        let (status, body) = send(&state, get("/students/INVALID_ID")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Student INVALID_ID not found");
    }

    #[tokio::test]
    async fn summary_route_is_not_treated_as_an_id() {
        let (status, body) = send(&seeded_state(), get("/students/performance-summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_students"], 2);
        assert_eq!(body["at_risk_count"], 1);
        assert_eq!(body["top_10_percent_students"], json!(["S001"]));
    }

    #[tokio::test]
    async fn empty_store_summary() {
        let state = AppState::new(StudentStore::new());
        let (status, body) = send(&state, get("/students/performance-summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "total_students": 0,
                "category_counts": {},
                "at_risk_count": 0,
                "top_10_percent_students": []
            })
        );
    }

    #[tokio::test]
    async fn adds_student_then_serves_it() {
        let state = seeded_state();
        let mut raw = sample_raw("TEST001");
        raw.name = "Élève Français & Español".to_string();

        let (status, body) = send(&state, post_json(&serde_json::to_value(&raw).unwrap())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Student added successfully");
        assert_eq!(body["student_id"], "TEST001");

        let (status, body) = send(&state, get("/students/TEST001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Élève Français & Español");
    }

    #[tokio::test]
    async fn rejects_duplicate_without_mutation() {
        let state = seeded_state();
        let raw = serde_json::to_value(sample_raw("S001")).unwrap();

        let (status, _) = send(&state, post_json(&raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.store.read().await.len(), 2);
    }

    #[tokio::test]
    async fn rejects_out_of_range_scores() {
        let state = seeded_state();
        let mut raw = serde_json::to_value(sample_raw("INVALID001")).unwrap();
        raw["attendance_percentage"] = json!(150);
        raw["assignment_1"] = json!(-10);

        let (status, _) = send(&state, post_json(&raw)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.store.read().await.len(), 2);
    }

    #[tokio::test]
    async fn rejects_padded_duplicate_id() {
        let state = seeded_state();
        let raw = serde_json::to_value(sample_raw("S001 ")).unwrap();

        let (status, _) = send(&state, post_json(&raw)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.store.read().await.len(), 2);
    }

    #[tokio::test]
    async fn rejects_missing_student_id() {
        let mut raw = serde_json::to_value(sample_raw("S100")).unwrap();
        raw.as_object_mut().unwrap().remove("student_id");

        let (status, _) = send(&seeded_state(), post_json(&raw)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn accepts_boundary_and_decimal_scores() {
        let state = seeded_state();

        let mut min = sample_raw("BOUNDARY001");
        min.attendance_percentage = 0.0;
        min.assignment_1 = 0.0;
        min.final_exam_score = 0.0;
        let (status, _) = send(&state, post_json(&serde_json::to_value(&min).unwrap())).await;
        assert_eq!(status, StatusCode::OK);

        let mut decimal = sample_raw("DECIMAL001");
        decimal.assignment_1 = 89.5;
        decimal.quiz_2 = 90.5;
        let (status, _) = send(&state, post_json(&serde_json::to_value(&decimal).unwrap())).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(state.store.read().await.len(), 4);
    }
}
