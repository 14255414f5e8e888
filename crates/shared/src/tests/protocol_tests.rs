use super::*;
use crate::error::{ApiError, ErrorCode};

#[test]
fn log_entry_uses_submission_file_field_names() {
    let entry = LogEntry::graded(
        "식초",
        IndicatorKind::LitmusPaper,
        Property::Basic,
        Property::Acidic,
    );
    let value = serde_json::to_value(&entry).expect("json");
    assert_eq!(
        value,
        serde_json::json!({
            "용액": "식초",
            "사용한 지시약": "리트머스 종이",
            "나의 예상": "염기성",
            "실제 결과": "산성",
            "정답 여부": "❌ 오답",
        })
    );
}

#[test]
fn graded_entry_marks_matching_prediction_correct() {
    let entry = LogEntry::graded(
        "비눗물",
        IndicatorKind::Phenolphthalein,
        Property::Basic,
        Property::Basic,
    );
    assert!(entry.correct);
    assert_eq!(entry.verdict_label(), "✅ 정답");
}

#[test]
fn unknown_verdict_label_is_rejected() {
    let raw = r#"{"용액":"x","사용한 지시약":"리트머스 종이","나의 예상":"산성","실제 결과":"산성","정답 여부":"maybe"}"#;
    assert!(serde_json::from_str::<LogEntry>(raw).is_err());
}

#[test]
fn identity_requires_all_fields_after_trimming() {
    let mut identity = StudentIdentity {
        grade: "6".into(),
        class_num: "2".into(),
        student_num: "14".into(),
        name: "  ".into(),
    };
    assert!(!identity.is_complete());

    identity.name = " 김하늘 ".into();
    assert!(identity.is_complete());
    assert_eq!(identity.info_line(), "6학년 2반 14번 김하늘");
}

#[test]
fn api_errors_map_onto_notice_levels() {
    let notice: Notice = ApiError::new(ErrorCode::Duplicate, "already queued").into();
    assert_eq!(notice.level, NoticeLevel::Info);

    let notice: Notice = ApiError::new(ErrorCode::Unauthorized, "wrong secret").into();
    assert_eq!(notice.level, NoticeLevel::Error);

    let notice: Notice = ApiError::new(ErrorCode::Validation, "missing choice").into();
    assert_eq!(notice.level, NoticeLevel::Warning);
}
