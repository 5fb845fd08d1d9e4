//! Step-by-step scenario reports for golden snapshot tests.
//!
//! A scenario is a short script of labelled steps against one world. After
//! each step the test records a serializable summary; the collected report
//! is compared against a golden JSON file (or written when
//! `VOXEDIT_UPDATE_SNAPSHOTS=1` is set).

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// One recorded step.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioFrame<S> {
    /// Position of the step in the report, starting at 0.
    pub step: usize,
    /// What the step did.
    pub label: String,
    /// Summary captured after the step.
    pub snapshot: S,
}

/// Ordered frames of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport<S> {
    name: String,
    frames: Vec<ScenarioFrame<S>>,
}

impl<S: Serialize> ScenarioReport<S> {
    /// Start an empty report.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Append a frame.
    pub fn record(&mut self, label: impl Into<String>, snapshot: S) {
        let step = self.frames.len();
        self.frames.push(ScenarioFrame {
            step,
            label: label.into(),
            snapshot,
        });
    }

    /// Recorded frames in order.
    pub fn frames(&self) -> &[ScenarioFrame<S>] {
        &self.frames
    }

    /// Compare (or update) the golden file at `path`.
    pub fn assert_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        assert_json_snapshot(path, self)
    }
}
