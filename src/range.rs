//! Dual-handle range coordinator.
//!
//! Two thumbs share one track. Which one ends up holding the minimum is
//! decided by their current values, not by which one is drawn further left:
//! during a drag the widget can briefly render them out of order.

use tracing::{debug, info, warn};

use crate::converge::converge_with;
use crate::handle::require_box;
use crate::{read_value, Convergence, ConvergePolicy, Geometry, Pointer, Result, SliderHandle};

/// Position and value of one handle at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleSnapshot {
    /// Left edge of the bounding box.
    pub x: f64,
    pub value: f64,
}

/// Which handle receives the minimum target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    FirstIsMin,
    SecondIsMin,
}

/// Decide which handle is the minimum.
///
/// The smaller value wins. Equal values fall back to screen order, with the
/// first handle winning a tie.
pub fn resolve_assignment(first: HandleSnapshot, second: HandleSnapshot) -> Assignment {
    let by_screen = if first.x <= second.x {
        Assignment::FirstIsMin
    } else {
        Assignment::SecondIsMin
    };

    let by_value = if first.value < second.value {
        Assignment::FirstIsMin
    } else if first.value > second.value {
        Assignment::SecondIsMin
    } else {
        by_screen
    };

    if by_value != by_screen {
        warn!(
            "handle screen order disagrees with values (x {} / {}, values {} / {}), using values",
            first.x, second.x, first.value, second.value
        );
    }
    by_value
}

/// What a range-set run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeOutcome {
    pub assignment: Assignment,
    /// Main pass on the minimum handle.
    pub min: Convergence,
    /// Main pass on the maximum handle.
    pub max: Convergence,
    /// Final nudge on the minimum handle, if it was needed.
    pub min_nudge: Option<Convergence>,
    /// Final nudge on the maximum handle, if it was needed.
    pub max_nudge: Option<Convergence>,
}

impl RangeOutcome {
    /// Total drag gestures across all passes.
    pub fn gestures(&self) -> u32 {
        [Some(self.min), Some(self.max), self.min_nudge, self.max_nudge]
            .iter()
            .flatten()
            .map(|c| c.gestures)
            .sum()
    }
}

async fn snapshot<H: SliderHandle>(handle: &H) -> Result<HandleSnapshot> {
    let bbox = require_box(handle, &handle.label()).await?;
    Ok(HandleSnapshot {
        x: bbox.x,
        value: read_value(handle).await,
    })
}

/// Set `[min, max]` across two handles with the default policy.
pub async fn set_range<P, H, T>(
    pointer: &P,
    first: &H,
    second: &H,
    track: &T,
    min: f64,
    max: f64,
) -> Result<RangeOutcome>
where
    P: Pointer,
    H: SliderHandle,
    T: Geometry,
{
    set_range_with(pointer, first, second, track, min, max, &ConvergePolicy::default()).await
}

/// Set `[min, max]` across two handles.
///
/// Handles are driven one after the other, never concurrently. A second
/// pass nudges any handle the other one knocked out of tolerance. Missing
/// geometry aborts with an error; a value that stays off target does not.
pub async fn set_range_with<P, H, T>(
    pointer: &P,
    first: &H,
    second: &H,
    track: &T,
    min: f64,
    max: f64,
    policy: &ConvergePolicy,
) -> Result<RangeOutcome>
where
    P: Pointer,
    H: SliderHandle,
    T: Geometry,
{
    if min > max {
        warn!("range min {} is above max {}", min, max);
    }

    let track_box = require_box(track, "slider track").await?;
    let y = track_box.center_y();

    let a = snapshot(first).await?;
    let b = snapshot(second).await?;
    let assignment = resolve_assignment(a, b);
    let (lo, hi) = match assignment {
        Assignment::FirstIsMin => (first, second),
        Assignment::SecondIsMin => (second, first),
    };
    debug!(
        "set_range [{}, {}]: {} -> min, {} -> max",
        min,
        max,
        lo.label(),
        hi.label()
    );

    let min_pass = converge_with(pointer, lo, min, y, policy).await?;
    let max_pass = converge_with(pointer, hi, max, y, policy).await?;

    let final_lo = read_value(lo).await;
    let final_hi = read_value(hi).await;

    let min_nudge = if (final_lo - min).abs() > policy.tolerance {
        debug!("nudging {}: {} vs {}", lo.label(), final_lo, min);
        Some(converge_with(pointer, lo, min, y, policy).await?)
    } else {
        None
    };
    let max_nudge = if (final_hi - max).abs() > policy.tolerance {
        debug!("nudging {}: {} vs {}", hi.label(), final_hi, max);
        Some(converge_with(pointer, hi, max, y, policy).await?)
    } else {
        None
    };

    let outcome = RangeOutcome {
        assignment,
        min: min_pass,
        max: max_pass,
        min_nudge,
        max_nudge,
    };
    info!(
        "range set towards [{}, {}] in {} gestures",
        min,
        max,
        outcome.gestures()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converge::Exit;

    fn at(x: f64, value: f64) -> HandleSnapshot {
        HandleSnapshot { x, value }
    }

    #[test]
    fn test_consistent_order() {
        assert_eq!(
            resolve_assignment(at(100.0, 20.0), at(300.0, 80.0)),
            Assignment::FirstIsMin
        );
        assert_eq!(
            resolve_assignment(at(300.0, 80.0), at(100.0, 20.0)),
            Assignment::SecondIsMin
        );
    }

    #[test]
    fn test_values_win_over_screen_order() {
        // Left handle holds the larger value.
        assert_eq!(
            resolve_assignment(at(100.0, 80.0), at(300.0, 20.0)),
            Assignment::SecondIsMin
        );
        assert_eq!(
            resolve_assignment(at(300.0, 20.0), at(100.0, 80.0)),
            Assignment::FirstIsMin
        );
    }

    #[test]
    fn test_equal_values_use_screen_order() {
        assert_eq!(
            resolve_assignment(at(250.0, 40.0), at(120.0, 40.0)),
            Assignment::SecondIsMin
        );
        assert_eq!(
            resolve_assignment(at(120.0, 40.0), at(120.0, 40.0)),
            Assignment::FirstIsMin
        );
    }

    #[test]
    fn test_outcome_gestures_sum_all_passes() {
        let pass = |gestures| Convergence {
            iterations: gestures,
            gestures,
            exit: Exit::WithinTolerance,
            coarse: false,
        };
        let outcome = RangeOutcome {
            assignment: Assignment::FirstIsMin,
            min: pass(3),
            max: pass(4),
            min_nudge: Some(pass(2)),
            max_nudge: None,
        };
        assert_eq!(outcome.gestures(), 9);
    }
}
