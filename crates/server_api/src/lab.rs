use shared::{
    domain::Property,
    error::{ApiError, ErrorCode},
    protocol::Notice,
};
use storage::SubmissionStore;
use tracing::info;

use crate::{catalog::SolutionCatalog, requests::RequestQueue};

/// State shared by every session. Only reachable through the mutex in
/// [`crate::ApiContext`], which makes it the single writer for the catalog,
/// the request queue and the submission file.
pub struct Lab {
    pub catalog: SolutionCatalog,
    pub requests: RequestQueue,
    pub store: SubmissionStore,
}

impl Lab {
    pub fn new(catalog: SolutionCatalog, store: SubmissionStore) -> Self {
        Self {
            catalog,
            requests: RequestQueue::default(),
            store,
        }
    }

    pub fn request_solution(&mut self, raw_name: &str) -> Result<Notice, ApiError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "요청할 용액의 이름을 입력해주세요.",
            ));
        }
        if self.catalog.contains(name) {
            return Err(ApiError::new(
                ErrorCode::Duplicate,
                format!("'{name}'은(는) 이미 실험 목록에 있어요!"),
            ));
        }
        if !self.requests.enqueue(name) {
            return Err(ApiError::new(
                ErrorCode::Duplicate,
                format!("'{name}'은(는) 이미 선생님께 요청했어요!"),
            ));
        }

        info!(solution = name, pending = self.requests.len(), "solution requested");
        Ok(Notice::success(format!(
            "'{name}' 용액을 선생님께 요청했습니다! 선생님이 추가해주시면 목록에 나타날 거예요."
        )))
    }

    /// Promotes a pending request into the catalog.
    pub fn approve(&mut self, name: &str, property: Property) -> Result<Notice, ApiError> {
        if !self.requests.dequeue(name) {
            return Err(ApiError::new(
                ErrorCode::NotFound,
                format!("'{name}'은(는) 대기 중인 요청이 아닙니다."),
            ));
        }
        self.catalog.insert(name, property);

        info!(
            solution = name,
            property = property.label(),
            catalog_size = self.catalog.len(),
            "solution request approved"
        );
        Ok(Notice::success(format!(
            "'{name}'({})을(를) 실험 목록에 추가했습니다.",
            property.label()
        )))
    }
}

#[cfg(test)]
#[path = "tests/lab_tests.rs"]
mod tests;
