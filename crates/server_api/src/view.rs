//! Render-ready snapshots handed to the HTML layer.

use std::time::Duration;

use shared::{
    domain::{ExperimentSelection, IndicatorKind, Outcome, Step},
    protocol::{LogEntry, Notice, Submission},
};

#[derive(Debug, Clone)]
pub struct LearnerView {
    pub step: Step,
    pub solutions: Vec<String>,
    pub indicators: Vec<IndicatorKind>,
    pub selection: Option<ExperimentSelection>,
    /// Newest entry first.
    pub log: Vec<LogEntry>,
    pub notices: Vec<Notice>,
    pub resume_in: Option<Duration>,
}

impl LearnerView {
    pub fn outcome(&self) -> Option<Outcome> {
        self.selection.as_ref().map(ExperimentSelection::outcome)
    }
}

#[derive(Debug, Clone)]
pub enum TeacherView {
    /// No secret is configured.
    Disabled,
    Locked { notice: Option<Notice> },
    Unlocked(TeacherPanel),
}

#[derive(Debug, Clone)]
pub struct TeacherPanel {
    /// Echoed back into the panel's forms so each action is re-authorized.
    pub secret: String,
    pub requests: Vec<String>,
    /// Newest submission first.
    pub submissions: Vec<Submission>,
    pub notices: Vec<Notice>,
}
