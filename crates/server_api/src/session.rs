use std::time::{Duration, Instant};

use shared::{
    domain::{ExperimentSelection, IndicatorKind, Property, SolutionEntry, Step},
    error::{ApiError, ErrorCode},
    protocol::{LogEntry, Notice},
};
use tracing::debug;

use crate::catalog::SolutionCatalog;

/// One learner's walk through `ready -> result -> done -> ready`.
#[derive(Debug, Clone)]
pub struct ExperimentSession {
    step: Step,
    selection: Option<ExperimentSelection>,
    log: Vec<LogEntry>,
    resume_at: Option<Instant>,
    notices: Vec<Notice>,
    last_seen: Instant,
}

impl Default for ExperimentSession {
    fn default() -> Self {
        Self {
            step: Step::Ready,
            selection: None,
            log: Vec::new(),
            resume_at: None,
            notices: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

impl ExperimentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_seen = self.last_seen.max(now);
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selection(&self) -> Option<&ExperimentSelection> {
        self.selection.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Moves from `ready` to `result`.
    ///
    /// Returns `Ok(false)` without touching state when the session is not
    /// ready or the solution is not in the catalog.
    pub fn start(
        &mut self,
        catalog: &SolutionCatalog,
        solution: Option<&str>,
        indicator: Option<IndicatorKind>,
    ) -> Result<bool, ApiError> {
        if self.step != Step::Ready {
            return Ok(false);
        }

        let solution = solution.filter(|name| !name.trim().is_empty());
        let (Some(name), Some(indicator)) = (solution, indicator) else {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "용액과 지시약을 모두 선택해주세요!",
            ));
        };

        let Some(property) = catalog.lookup(name) else {
            debug!(solution = name, "solution not in catalog; staying in ready");
            return Ok(false);
        };

        self.selection = Some(ExperimentSelection {
            solution: SolutionEntry {
                name: name.to_string(),
                property,
            },
            indicator,
        });
        self.step = Step::Result;
        Ok(true)
    }

    /// Grades the learner's call, logs it and enters `done` until
    /// `now + pause`. Returns `Ok(None)` when there is nothing to grade.
    pub fn check(
        &mut self,
        choice: Option<Property>,
        now: Instant,
        pause: Duration,
    ) -> Result<Option<LogEntry>, ApiError> {
        if self.step != Step::Result {
            return Ok(None);
        }
        let Some(selection) = self.selection.as_ref() else {
            return Ok(None);
        };
        let Some(choice) = choice else {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "자신의 생각을 선택해주세요!",
            ));
        };

        let entry = LogEntry::graded(
            selection.solution.name.clone(),
            selection.indicator,
            choice,
            selection.solution.property,
        );
        self.append_log(entry.clone());
        self.step = Step::Done;
        self.resume_at = Some(now + pause);
        Ok(Some(entry))
    }

    /// Leaves `done` once the pause is over. Returns whether the step changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.step != Step::Done {
            return false;
        }
        if self.resume_at.is_some_and(|resume_at| now < resume_at) {
            return false;
        }
        self.step = Step::Ready;
        self.selection = None;
        self.resume_at = None;
        true
    }

    pub fn remaining_pause(&self, now: Instant) -> Option<Duration> {
        match (self.step, self.resume_at) {
            (Step::Done, Some(resume_at)) => Some(resume_at.saturating_duration_since(now)),
            _ => None,
        }
    }

    pub fn append_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
