//! Password-gated moderation: request triage and submission review.
//!
//! Nothing here remembers a successful login. Every view and every action
//! carries the secret and is authorized again.

use sha2::{Digest, Sha256};
use shared::{
    domain::Property,
    error::{ApiError, ErrorCode},
    protocol::Notice,
};
use tracing::{info, warn};

use crate::{
    internal,
    view::{TeacherPanel, TeacherView},
    ApiContext,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeacherAccess {
    Disabled,
    /// Nothing was entered yet.
    Anonymous,
    Denied,
    Granted,
}

pub fn authorize(ctx: &ApiContext, secret: &str) -> TeacherAccess {
    let Some(expected) = ctx.teacher_secret.as_deref() else {
        return TeacherAccess::Disabled;
    };
    if secret.is_empty() {
        return TeacherAccess::Anonymous;
    }
    if secrets_match(secret, expected) {
        TeacherAccess::Granted
    } else {
        warn!("teacher panel secret mismatch");
        TeacherAccess::Denied
    }
}

/// Compares fixed-length digests without an early exit, so timing reveals
/// neither the secret's length nor the matching prefix.
fn secrets_match(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn require_teacher(ctx: &ApiContext, secret: &str) -> Result<(), ApiError> {
    match authorize(ctx, secret) {
        TeacherAccess::Granted => Ok(()),
        TeacherAccess::Disabled => Err(ApiError::new(
            ErrorCode::Disabled,
            "교사 관리 페이지가 설정되지 않았습니다.",
        )),
        TeacherAccess::Anonymous | TeacherAccess::Denied => Err(ApiError::new(
            ErrorCode::Unauthorized,
            "비밀번호가 올바르지 않습니다. 다시 시도해주세요.",
        )),
    }
}

/// Builds the panel for `secret`. `notices` are only shown once access is
/// granted.
pub async fn teacher_view(ctx: &ApiContext, secret: &str, notices: Vec<Notice>) -> TeacherView {
    match authorize(ctx, secret) {
        TeacherAccess::Disabled => TeacherView::Disabled,
        TeacherAccess::Anonymous => TeacherView::Locked { notice: None },
        TeacherAccess::Denied => TeacherView::Locked {
            notice: Some(Notice::error(
                "비밀번호가 올바르지 않습니다. 다시 시도해주세요.",
            )),
        },
        TeacherAccess::Granted => {
            let lab = ctx.lab().await;
            let requests = lab.requests.snapshot();
            let mut submissions = lab.store.load_all().await;
            drop(lab);
            submissions.reverse();

            TeacherView::Unlocked(TeacherPanel {
                secret: secret.to_string(),
                requests,
                submissions,
                notices,
            })
        }
    }
}

pub async fn approve_request(
    ctx: &ApiContext,
    secret: &str,
    name: &str,
    property: Option<Property>,
) -> Result<Notice, ApiError> {
    require_teacher(ctx, secret)?;
    let Some(property) = property else {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "용액의 성질을 선택해주세요.",
        ));
    };
    ctx.lab().await.approve(name, property)
}

pub async fn clear_submissions(ctx: &ApiContext, secret: &str) -> Result<Notice, ApiError> {
    require_teacher(ctx, secret)?;
    let lab = ctx.lab().await;
    lab.store.clear_all().await.map_err(internal)?;
    info!(path = %lab.store.path().display(), "submission store cleared");
    Ok(Notice::success("제출된 모든 탐구일지를 삭제했습니다."))
}

#[cfg(test)]
#[path = "tests/teacher_tests.rs"]
mod tests;
