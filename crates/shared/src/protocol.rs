use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorKind, Property};

/// One graded attempt. Field names follow the submission file shared with the
/// classroom's existing tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "용액")]
    pub solution_name: String,
    #[serde(rename = "사용한 지시약")]
    pub indicator: IndicatorKind,
    #[serde(rename = "나의 예상")]
    pub predicted: Property,
    #[serde(rename = "실제 결과")]
    pub actual: Property,
    #[serde(rename = "정답 여부", with = "verdict")]
    pub correct: bool,
}

impl LogEntry {
    pub fn graded(
        solution_name: impl Into<String>,
        indicator: IndicatorKind,
        predicted: Property,
        actual: Property,
    ) -> Self {
        Self {
            solution_name: solution_name.into(),
            indicator,
            predicted,
            actual,
            correct: predicted == actual,
        }
    }

    pub fn verdict_label(&self) -> &'static str {
        verdict::label(self.correct)
    }
}

mod verdict {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const PASS: &str = "✅ 정답";
    const FAIL: &str = "❌ 오답";

    pub fn label(correct: bool) -> &'static str {
        if correct {
            PASS
        } else {
            FAIL
        }
    }

    pub fn serialize<S: Serializer>(correct: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(label(*correct))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            PASS => Ok(true),
            FAIL => Ok(false),
            other => Err(D::Error::custom(format!("unknown verdict label '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdentity {
    pub grade: String,
    pub class_num: String,
    pub student_num: String,
    pub name: String,
}

impl StudentIdentity {
    pub fn is_complete(&self) -> bool {
        [&self.grade, &self.class_num, &self.student_num, &self.name]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn info_line(&self) -> String {
        format!(
            "{}학년 {}반 {}번 {}",
            self.grade.trim(),
            self.class_num.trim(),
            self.student_num.trim(),
            self.name.trim()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub info: String,
    pub log: Vec<LogEntry>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
