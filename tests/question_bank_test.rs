mod common;

use std::collections::HashMap;

use exam_portal_client::models::{ChapterInput, QuestionFilter, QuestionKind, SubjectInput};
use exam_portal_client::services::QuestionBankService;
use exam_portal_client::FailureKind;
use serde_json::json;
use tokio_test::assert_ok;

fn queries_for(backend: &common::MockBackend, path: &str) -> Vec<HashMap<String, String>> {
    backend
        .state
        .bank_queries
        .lock()
        .unwrap()
        .iter()
        .filter(|(p, _)| p == path)
        .map(|(_, q)| q.clone())
        .collect()
}

#[tokio::test]
async fn test_subject_crud_and_chapters() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.client());

    let subjects = bank.get_all_subjects().await.unwrap();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[1].name, "Physics");

    let created = bank
        .create_subject(&SubjectInput {
            name: "Chemistry".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(created.name, "Chemistry");

    let renamed = bank
        .update_subject(3, &SubjectInput {
            name: "Organic chemistry".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Organic chemistry");

    let chapters = bank.get_subject_chapters(1).await.unwrap();
    assert_eq!(chapters[0].subject, Some(1));

    assert_ok!(bank.delete_subject(3).await);
    assert_eq!(
        *backend.state.deleted.lock().unwrap(),
        vec!["/api/question-bank/subjects/3/".to_string()]
    );
}

#[tokio::test]
async fn test_chapter_and_section_filters_are_sent_only_when_set() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.client());

    let chapters = bank.get_all_chapters(Some(2)).await.unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].subject, Some(2));
    bank.get_all_chapters(None).await.unwrap();

    let chapter_queries = queries_for(&backend, "/api/question-bank/chapters/");
    assert_eq!(chapter_queries.len(), 2);
    assert_eq!(chapter_queries[0].get("subject_id").map(String::as_str), Some("2"));
    assert!(chapter_queries[1].is_empty());

    let sections = bank.get_all_sections(Some(10)).await.unwrap();
    assert_eq!(sections[0].chapter, Some(10));
    let section_queries = queries_for(&backend, "/api/question-bank/sections/");
    assert_eq!(section_queries[0].get("chapter_id").map(String::as_str), Some("10"));

    let created = bank
        .create_chapter(&ChapterInput {
            name: "Geometry".to_string(),
            subject: 1,
            order: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 11);
    assert_eq!(created.order, None);

    let nested = bank.get_chapter_sections(10).await.unwrap();
    assert_eq!(nested[0].name, "Linear equations");
    let in_section = bank.get_section_questions(100).await.unwrap();
    assert_eq!(in_section[0].kind(), Some(QuestionKind::MultipleChoice));
}

#[tokio::test]
async fn test_question_listing_filters_and_type_lookup() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.client());

    let filter = QuestionFilter {
        subject_id: Some(1),
        question_type: Some(QuestionKind::TrueFalseExtended),
        search: Some("   ".to_string()),
        ..QuestionFilter::default()
    };
    let listed = bank.get_all_questions(&filter).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].kind(), Some(QuestionKind::TrueFalseExtended));
    assert_eq!(listed[0].extra.get("difficulty"), Some(&json!("easy")));

    let sent = queries_for(&backend, "/api/question-bank/questions/");
    assert_eq!(sent[0].get("subject_id").map(String::as_str), Some("1"));
    assert_eq!(sent[0].get("question_type").map(String::as_str), Some("TFE"));
    assert!(!sent[0].contains_key("search"));
    assert!(!sent[0].contains_key("chapter_id"));

    let ordering = bank.get_questions_by_type(QuestionKind::Ordering).await.unwrap();
    assert_eq!(ordering[0].kind(), Some(QuestionKind::Ordering));
    let by_type = queries_for(&backend, "/api/question-bank/questions/by-type/");
    assert_eq!(by_type[0].get("type").map(String::as_str), Some("ORD"));
}

#[tokio::test]
async fn test_question_lifecycle() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.client());

    let detail = bank.get_question_details(42).await.unwrap();
    assert_eq!(detail.id, 42);
    assert_eq!(detail.kind(), Some(QuestionKind::FillInBlank));

    let created = bank
        .create_question(&json!({"prompt": "Order the steps", "question_type": "ORD", "section": 100}))
        .await
        .unwrap();
    assert_eq!(created.id, 1003);
    assert_eq!(created.kind(), Some(QuestionKind::Ordering));

    let updated = bank
        .update_question(1003, &json!({"prompt": "Order the four steps", "question_type": "ORD"}))
        .await
        .unwrap();
    assert_eq!(updated.prompt.as_deref(), Some("Order the four steps"));

    let copy = bank.duplicate_question(1003).await.unwrap();
    assert_eq!(copy.id, 1004);
    assert_eq!(copy.extra.get("duplicated_from"), Some(&json!(1003)));

    assert_ok!(bank.delete_question(1003).await);
    assert_eq!(
        *backend.state.deleted.lock().unwrap(),
        vec!["/api/question-bank/questions/1003/".to_string()]
    );
}

#[tokio::test]
async fn test_upload_questions_sends_file_and_section() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.client());

    let path = std::env::temp_dir().join(format!("question-import-{}.csv", std::process::id()));
    tokio::fs::write(&path, "prompt,answer\n2 + 2,4\n3 + 3,6\n").await.unwrap();

    let result = bank.upload_questions(100, &path).await;
    let _ = tokio::fs::remove_file(&path).await;
    let result = result.unwrap();
    assert_eq!(result["created"], 3);

    let fields = backend.state.bank_upload.lock().unwrap().clone();
    let section = fields.iter().find(|(name, _, _)| name == "section_id").unwrap();
    assert_eq!(section.2, "100");
    let file = fields.iter().find(|(name, _, _)| name == "file").unwrap();
    assert_eq!(file.1.as_deref(), path.file_name().and_then(|n| n.to_str()));
    assert!(file.2.starts_with("prompt,answer"));
}

#[tokio::test]
async fn test_missing_import_file_is_setup_error_without_request() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.client());

    let err = bank
        .upload_questions(100, std::path::Path::new("/definitely/not/here.csv"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Setup);
    assert!(err.message().starts_with("Request setup error: "));
    assert!(backend.state.bank_upload.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fallback_messages() {
    let backend = common::spawn().await;
    let bank = QuestionBankService::new(backend.unrouted_client());
    let subject = SubjectInput {
        name: "Math".to_string(),
    };

    let cases = vec![
        (bank.get_all_subjects().await.unwrap_err(), "Failed to fetch subjects"),
        (bank.create_subject(&subject).await.unwrap_err(), "Failed to create subject"),
        (bank.update_subject(1, &subject).await.unwrap_err(), "Failed to update subject"),
        (bank.delete_subject(1).await.unwrap_err(), "Failed to delete subject"),
        (bank.get_subject_chapters(1).await.unwrap_err(), "Failed to fetch chapters"),
        (bank.get_all_chapters(Some(1)).await.unwrap_err(), "Failed to fetch chapters"),
        (bank.delete_chapter(1).await.unwrap_err(), "Failed to delete chapter"),
        (bank.get_chapter_sections(1).await.unwrap_err(), "Failed to fetch sections"),
        (bank.get_all_sections(None).await.unwrap_err(), "Failed to fetch sections"),
        (bank.delete_section(1).await.unwrap_err(), "Failed to delete section"),
        (bank.get_section_questions(1).await.unwrap_err(), "Failed to fetch questions"),
        (
            bank.get_all_questions(&QuestionFilter::default()).await.unwrap_err(),
            "Failed to fetch questions",
        ),
        (bank.get_question_details(1).await.unwrap_err(), "Failed to fetch question details"),
        (bank.create_question(&json!({})).await.unwrap_err(), "Failed to create question"),
        (bank.update_question(1, &json!({})).await.unwrap_err(), "Failed to update question"),
        (bank.delete_question(1).await.unwrap_err(), "Failed to delete question"),
        (bank.duplicate_question(1).await.unwrap_err(), "Failed to duplicate question"),
        (
            bank.get_questions_by_type(QuestionKind::MultipleChoice).await.unwrap_err(),
            "Failed to fetch questions",
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(err.message(), expected);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), FailureKind::Rejected);
    }
}
