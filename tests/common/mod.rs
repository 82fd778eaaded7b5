//! 集成测试用的内存后端
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, OriginalUri, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use exam_portal_client::{ApiClient, Config};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const PASSWORD: &str = "secret";
const SESSION_COOKIE: &str = "sessionid=teacher-session";

#[derive(Default)]
pub struct MockState {
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub summary_queries: Mutex<Vec<HashMap<String, String>>>,
    pub upload_fields: Mutex<Vec<(String, usize)>>,
    pub saved_answer_keys: Mutex<Option<Value>>,
    pub roster: Mutex<Vec<Value>>,
    pub logout_fails: AtomicBool,
    pub student_queries: Mutex<Vec<HashMap<String, String>>>,
    /// 题库列表接口收到的查询参数，按路径记录
    pub bank_queries: Mutex<Vec<(String, HashMap<String, String>)>>,
    /// 题目导入收到的 multipart 字段：(字段名, 文件名, 内容)
    pub bank_upload: Mutex<Vec<(String, Option<String>, String)>>,
    pub deleted: Mutex<Vec<String>>,
    next_student_id: AtomicUsize,
}

pub type Shared = Arc<MockState>;

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    pub fn config(&self) -> Config {
        Config::with_base_url(self.base_url.clone())
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).unwrap()
    }

    /// 指向后端没有挂载的前缀；每个请求都得到空响应体的 404
    pub fn unrouted_client(&self) -> ApiClient {
        ApiClient::new(&Config::with_base_url(format!("{}gone/", self.base_url))).unwrap()
    }
}

pub async fn spawn() -> MockBackend {
    let state: Shared = Arc::new(MockState::default());
    state.next_student_id.store(100, Ordering::SeqCst);
    state.roster.lock().unwrap().push(json!({
        "id": 1, "name": "Lan", "student_id": "SV001", "classroom": 1
    }));

    let app = Router::new()
        .route("/users/login/", post(login))
        .route("/users/logout/", post(logout))
        .route("/users/user-info/", get(user_info))
        .route("/users/register/", post(register))
        .route("/users/refresh/", post(refresh))
        .route("/classroom/", get(classrooms).post(create_classroom))
        .route("/classroom/students/", post(add_student))
        .route("/classroom/students/{id}/", delete(delete_student))
        .route("/classroom/{id}/", get(classroom).delete(delete_classroom))
        .route("/classroom/{id}/students/", get(students))
        .route("/api/tests/", get(tests))
        .route("/api/tests/preview_test_pdf/", post(preview_pdf))
        .route("/api/tests/{id}/", delete(delete_test))
        .route("/api/tests/{id}/save_answer_keys/", post(save_answer_keys))
        .route("/api/tests/{id}/get_answer_keys/", get(get_answer_keys))
        .route("/api/submissions/upload_submission/", post(upload_submission))
        .route("/api/submissions/submission_summary/", get(submission_summary))
        .route("/api/submissions/student_details/", get(student_details))
        .route("/api/submissions/{id}/detail/", get(submission_detail))
        .route("/api/statistics/top-students/", get(top_students))
        .route("/api/statistics/test-statistics/", get(test_statistics))
        .route("/api/statistics/{id}/test-question-stats/", get(question_stats))
        .route("/api/question-bank/subjects/", get(subjects).post(create_subject))
        .route("/api/question-bank/subjects/{id}/", put(update_subject).delete(delete_bank_item))
        .route("/api/question-bank/subjects/{id}/chapters/", get(subject_chapters))
        .route("/api/question-bank/chapters/", get(chapters).post(create_chapter))
        .route("/api/question-bank/chapters/{id}/", delete(delete_bank_item))
        .route("/api/question-bank/chapters/{id}/sections/", get(chapter_sections))
        .route("/api/question-bank/sections/", get(sections))
        .route("/api/question-bank/sections/{id}/questions/", get(section_questions))
        .route("/api/question-bank/questions/", get(questions).post(create_question))
        .route("/api/question-bank/questions/by-type/", get(questions_by_type))
        .route("/api/question-bank/questions/upload-questions/", post(upload_questions))
        .route(
            "/api/question-bank/questions/{id}/",
            get(question).put(update_question).delete(delete_bank_item),
        )
        .route("/api/question-bank/questions/{id}/duplicate/", post(duplicate_question))
        .route("/slow/", get(slow))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{}/", addr),
        state,
    }
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(SESSION_COOKIE))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    if body["password"] == PASSWORD && body["username"] == "teacher" {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, format!("{}; Path=/; HttpOnly", SESSION_COOKIE))],
            Json(json!({"message": "Login successful"})),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password"})),
        )
            .into_response()
    }
}

async fn logout(State(state): State<Shared>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    if state.logout_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "logout exploded"}))).into_response();
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "sessionid=; Path=/; Max-Age=0".to_string())],
        Json(json!({"message": "Logged out"})),
    )
        .into_response()
}

async fn user_info(headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(json!({"id": 1, "username": "teacher", "email": "teacher@school.edu", "role": "teacher"})).into_response()
}

async fn classrooms(headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {"id": 1, "name": "10A1", "description": "Math", "teacher": "teacher"},
            {"id": 2, "name": "10A2", "description": null, "teacher": "teacher"}
        ]
    }))
    .into_response()
}

async fn students(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    let roster = state.roster.lock().unwrap();
    let members: Vec<Value> = roster.iter().filter(|s| s["classroom"] == id).cloned().collect();
    Json(Value::Array(members))
}

async fn add_student(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body.get("name").and_then(Value::as_str).unwrap_or("").is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"name": ["This field may not be blank."]}))).into_response();
    }
    let id = state.next_student_id.fetch_add(1, Ordering::SeqCst);
    let mut student = body.clone();
    student["id"] = json!(id);
    state.roster.lock().unwrap().push(student.clone());
    (StatusCode::CREATED, Json(student)).into_response()
}

async fn delete_student(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut roster = state.roster.lock().unwrap();
    let before = roster.len();
    roster.retain(|s| s["id"] != id);
    if roster.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn tests() -> Json<Value> {
    Json(json!([
        {"id": 7, "title": "Midterm", "num_questions": 40, "num_choices": 4, "classroom": 1}
    ]))
}

async fn preview_pdf() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/pdf")],
        b"%PDF-1.4 preview".to_vec(),
    )
        .into_response()
}

async fn delete_test(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn save_answer_keys(State(state): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    *state.saved_answer_keys.lock().unwrap() = Some(body.clone());
    Json(json!({"test_id": id, "saved": true}))
}

async fn get_answer_keys(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({"answer_keys": {"1": "A", "2": "C", "3": null}}))
}

async fn upload_submission(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);

    let mut test_id = String::new();
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();
        if name == "test_id" {
            test_id = String::from_utf8_lossy(&bytes).to_string();
        }
        fields.push((name, bytes.len()));
    }
    *state.upload_fields.lock().unwrap() = fields;

    if test_id == "500" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "grading service unavailable"})),
        )
            .into_response();
    }

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "submission_id": 17,
            "image_url": "https://cdn.example/submissions/17.png",
            "message": "Submission uploaded successfully and is being processed"
        })),
    )
        .into_response()
}

async fn submission_summary(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let test_id: i64 = query.get("test_id").and_then(|v| v.parse().ok()).unwrap_or(0);
    state.summary_queries.lock().unwrap().push(query);
    Json(json!([
        {"id": 17, "test_id": test_id, "participant_name": "Lan", "score": 8.5}
    ]))
}

async fn top_students() -> Json<Value> {
    Json(json!({"data": [{"student_name": "Lan", "average_score": 9.1}]}))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(10)).await;
    Json(json!({"late": true}))
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "teacher" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["A user with that username already exists."]})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": 2, "username": body["username"], "email": body.get("email")})),
    )
        .into_response()
}

async fn refresh(headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(json!({"message": "Token refreshed"})).into_response()
}

async fn create_classroom(Json(body): Json<Value>) -> Response {
    let mut classroom = body.clone();
    classroom["id"] = json!(3);
    classroom["teacher"] = json!("teacher");
    (StatusCode::CREATED, Json(classroom)).into_response()
}

async fn classroom(Path(id): Path<i64>) -> Response {
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    Json(json!({"id": 1, "name": "10A1", "description": "Math", "teacher": "teacher"})).into_response()
}

async fn delete_classroom(State(state): State<Shared>, OriginalUri(uri): OriginalUri) -> StatusCode {
    state.deleted.lock().unwrap().push(uri.path().to_string());
    StatusCode::NO_CONTENT
}

async fn student_details(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let name = query.get("name").cloned().unwrap_or_default();
    let class_name = query.get("class").cloned().unwrap_or_default();
    state.student_queries.lock().unwrap().push(query);
    Json(json!([
        {"student_name": name, "mssv": "SV001", "class_name": class_name, "score": 8.5, "test_title": "Midterm"}
    ]))
}

async fn submission_detail(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({"id": id, "score": 8.5, "answers": {"1": "A", "2": "C"}}))
}

async fn test_statistics() -> Json<Value> {
    Json(json!({"data": {"total_tests": 1, "total_submissions": 12, "average_score": 7.4}}))
}

async fn question_stats(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({"data": {"test_id": id, "questions": [{"number": 1, "correct_rate": 0.75}]}}))
}

fn record_bank_query(state: &Shared, uri: &axum::http::Uri, query: HashMap<String, String>) {
    state.bank_queries.lock().unwrap().push((uri.path().to_string(), query));
}

async fn subjects() -> Json<Value> {
    Json(json!([{"id": 1, "name": "Math"}, {"id": 2, "name": "Physics"}]))
}

async fn create_subject(Json(body): Json<Value>) -> Response {
    (StatusCode::CREATED, Json(json!({"id": 3, "name": body["name"]}))).into_response()
}

async fn update_subject(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"id": id, "name": body["name"]}))
}

async fn subject_chapters(Path(id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": 10, "name": "Algebra", "subject": id, "order": 1}]))
}

async fn chapters(
    State(state): State<Shared>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let subject: i64 = query.get("subject_id").and_then(|v| v.parse().ok()).unwrap_or(1);
    record_bank_query(&state, &uri, query);
    Json(json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{"id": 10, "name": "Algebra", "subject": subject, "order": 1}]
    }))
}

async fn create_chapter(Json(body): Json<Value>) -> Response {
    let mut chapter = body.clone();
    chapter["id"] = json!(11);
    (StatusCode::CREATED, Json(chapter)).into_response()
}

async fn chapter_sections(Path(id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": 100, "name": "Linear equations", "chapter": id}]))
}

async fn sections(
    State(state): State<Shared>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let chapter: i64 = query.get("chapter_id").and_then(|v| v.parse().ok()).unwrap_or(10);
    record_bank_query(&state, &uri, query);
    Json(json!([{"id": 100, "name": "Linear equations", "chapter": chapter}]))
}

fn sample_question(id: i64, kind: &str) -> Value {
    json!({"id": id, "prompt": "2 + 2 = ?", "question_type": kind, "points": 1.0, "section": 100, "difficulty": "easy"})
}

async fn section_questions(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!([sample_question(1000, "MC")]))
}

async fn questions(
    State(state): State<Shared>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record_bank_query(&state, &uri, query);
    Json(json!([sample_question(1000, "MC"), sample_question(1001, "TFE")]))
}

async fn questions_by_type(
    State(state): State<Shared>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let kind = query.get("type").cloned().unwrap_or_default();
    record_bank_query(&state, &uri, query);
    Json(json!([sample_question(1002, &kind)]))
}

async fn question(Path(id): Path<i64>) -> Json<Value> {
    Json(sample_question(id, "FIB"))
}

async fn create_question(Json(body): Json<Value>) -> Response {
    let mut question = body.clone();
    question["id"] = json!(1003);
    (StatusCode::CREATED, Json(question)).into_response()
}

async fn update_question(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    let mut question = body.clone();
    question["id"] = json!(id);
    Json(question)
}

async fn duplicate_question(Path(id): Path<i64>) -> Response {
    let mut copy = sample_question(id + 1, "MC");
    copy["duplicated_from"] = json!(id);
    (StatusCode::CREATED, Json(copy)).into_response()
}

async fn delete_bank_item(State(state): State<Shared>, OriginalUri(uri): OriginalUri) -> StatusCode {
    state.deleted.lock().unwrap().push(uri.path().to_string());
    StatusCode::NO_CONTENT
}

async fn upload_questions(State(state): State<Shared>, mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap_or_default();
        fields.push((name, file_name, String::from_utf8_lossy(&bytes).to_string()));
    }
    let count = fields
        .iter()
        .find(|(name, _, _)| name == "file")
        .map(|(_, _, content)| content.lines().count())
        .unwrap_or(0);
    *state.bank_upload.lock().unwrap() = fields;
    Json(json!({"message": "Questions imported", "created": count}))
}
