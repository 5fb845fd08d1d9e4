//! Limits and defaults that govern every edit.

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// Radius `extinguish` uses when neither the user nor the limit says otherwise.
pub const EXTINGUISH_RADIUS: i32 = 40;

/// Engine configuration. Negative values mean "unlimited".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Largest radius/size an operation may request.
    pub max_radius: i32,
    /// Radius `butcher` uses when none is given.
    pub butcher_default_radius: i32,
    /// Largest number of distinct cells one operation may change.
    pub max_changed_blocks: i64,
    /// Number of committed operations kept for undo.
    pub history_size: usize,
    /// Count replacement writes that leave a cell's value unchanged.
    pub count_unchanged_replacements: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            max_radius: -1,
            butcher_default_radius: -1,
            max_changed_blocks: -1,
            history_size: 15,
            count_unchanged_replacements: false,
        }
    }
}

impl EditConfig {
    /// Fail when `radius` exceeds a positive `max_radius`.
    pub fn check_max_radius(&self, radius: f64) -> EditResult<()> {
        if self.max_radius > 0 && radius > f64::from(self.max_radius) {
            return Err(EditError::MaxRadius {
                max: self.max_radius,
            });
        }
        Ok(())
    }

    /// `extinguish` radius when none is given: 40, capped by `max_radius`.
    pub fn extinguish_default_radius(&self) -> i32 {
        if self.max_radius != -1 {
            EXTINGUISH_RADIUS.min(self.max_radius)
        } else {
            EXTINGUISH_RADIUS
        }
    }

    /// Change limit, `None` when unlimited.
    pub fn change_limit(&self) -> Option<usize> {
        usize::try_from(self.max_changed_blocks).ok()
    }
}
