//! Convergence controller: drive one handle to a target value.
//!
//! The widget's pixel-to-value mapping is unknown, so the controller works in
//! closed loop on the value attribute. It drags in tiered steps (large while
//! far away, single pixels when close), tracks the pointer x locally instead
//! of re-measuring after every micro-drag, and gives up after a fixed number
//! of iterations with one coarse best-effort correction.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::handle::{drag, require_box, settle};
use crate::{read_value, Point, Pointer, Rect, Result, SliderHandle};

/// Tuning for the convergence loop. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvergePolicy {
    /// Maximum distance, in logical units, counted as "on target".
    pub tolerance: f64,
    /// Iteration cap before the coarse correction.
    pub max_iterations: u32,
    /// Lower edge of the screen-x safety window.
    pub min_x: f64,
    /// Upper edge of the screen-x safety window.
    pub max_x: f64,
    /// Assumed screen units per logical unit for the coarse correction.
    pub coarse_ratio: f64,
    /// Pause after each gesture, in milliseconds.
    pub settle_ms: u64,
}

impl Default for ConvergePolicy {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            max_iterations: 50,
            min_x: 0.0,
            max_x: 1000.0,
            coarse_ratio: 2.0,
            settle_ms: 0,
        }
    }
}

impl ConvergePolicy {
    /// Narrow the safety window to the horizontal extent of `track`.
    pub fn within(mut self, track: Rect) -> Self {
        self.min_x = track.x;
        self.max_x = track.right();
        self
    }

    /// Widen the safety window by `margin` on both sides.
    ///
    /// The tracked x is a handle's left edge, which sits up to half a handle
    /// width outside the track when the handle is at either end.
    pub fn padded(mut self, margin: f64) -> Self {
        self.min_x -= margin;
        self.max_x += margin;
        self
    }

    fn out_of_bounds(&self, x: f64) -> bool {
        x < self.min_x || x > self.max_x
    }
}

/// Step size, in screen units, for a given distance to target.
pub fn step_for(distance: f64) -> f64 {
    if distance > 20.0 {
        20.0
    } else if distance > 10.0 {
        10.0
    } else if distance > 5.0 {
        5.0
    } else {
        1.0
    }
}

/// Signed step: positive when the value has to grow.
pub fn direction(current: f64, target: f64, step: f64) -> f64 {
    if current < target {
        step
    } else {
        -step
    }
}

/// Transient per-handle loop state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceState {
    /// Last value read from the handle.
    pub current: f64,
    pub target: f64,
    /// Locally tracked pointer x. Not re-measured between drags.
    pub x: f64,
    pub iterations: u32,
}

impl ConvergenceState {
    pub fn distance(&self) -> f64 {
        (self.current - self.target).abs()
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Last read value was within tolerance.
    WithinTolerance,
    /// Tracked x left the safety window.
    OutOfBounds,
    /// Iteration cap reached.
    IterationCap,
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exit::WithinTolerance => f.write_str("within tolerance"),
            Exit::OutOfBounds => f.write_str("out of bounds"),
            Exit::IterationCap => f.write_str("iteration cap"),
        }
    }
}

/// What a convergence run did.
///
/// This is not a success signal: the value is not re-read after a coarse
/// correction. Callers that need precision must read the value themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    /// Loop iterations performed.
    pub iterations: u32,
    /// Drag gestures issued, including the coarse correction.
    pub gestures: u32,
    pub exit: Exit,
    /// Whether the coarse correction ran.
    pub coarse: bool,
}

impl Convergence {
    fn idle() -> Self {
        Self {
            iterations: 0,
            gestures: 0,
            exit: Exit::WithinTolerance,
            coarse: false,
        }
    }
}

impl fmt::Display for Convergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} iterations ({} gestures",
            self.exit, self.iterations, self.gestures
        )?;
        if self.coarse {
            f.write_str(", coarse")?;
        }
        f.write_str(")")
    }
}

/// Drive `handle` towards `target` with the default policy.
///
/// Gestures are issued along the horizontal line `y`.
pub async fn converge<P, H>(pointer: &P, handle: &H, target: f64, y: f64) -> Result<Convergence>
where
    P: Pointer,
    H: SliderHandle,
{
    converge_with(pointer, handle, target, y, &ConvergePolicy::default()).await
}

/// Drive `handle` towards `target` with an explicit policy.
///
/// Errors only come from the driver (missing geometry, failed gesture).
/// Not reaching the target is reported through [`Convergence::exit`].
pub async fn converge_with<P, H>(
    pointer: &P,
    handle: &H,
    target: f64,
    y: f64,
    policy: &ConvergePolicy,
) -> Result<Convergence>
where
    P: Pointer,
    H: SliderHandle,
{
    let label = handle.label();
    let current = read_value(handle).await;
    if (current - target).abs() <= policy.tolerance || target.is_nan() {
        debug!("{}: already at {} (target {})", label, current, target);
        return Ok(Convergence::idle());
    }

    let mut state = ConvergenceState {
        current,
        target,
        x: require_box(handle, &label).await?.x,
        iterations: 0,
    };

    let mut report = Convergence::idle();
    let mut exit = None;

    while state.distance() > policy.tolerance && state.iterations < policy.max_iterations {
        let step = step_for(state.distance());
        let dx = direction(state.current, state.target, step);

        drag(pointer, handle, Point::new(state.x + dx, y)).await?;
        settle(policy.settle_ms).await;
        report.gestures += 1;

        state.current = read_value(handle).await;
        state.x += dx;
        state.iterations += 1;
        debug!(
            "{}: iteration {} step {:+} -> value {} (x {:.1})",
            label, state.iterations, dx, state.current, state.x
        );

        if policy.out_of_bounds(state.x) {
            warn!(
                "{}: tracked x {:.1} left [{}, {}], stopping",
                label, state.x, policy.min_x, policy.max_x
            );
            exit = Some(Exit::OutOfBounds);
            break;
        }
    }

    report.iterations = state.iterations;

    if state.iterations >= policy.max_iterations && state.distance() > policy.tolerance {
        let dx = (state.target - state.current) * policy.coarse_ratio;
        warn!(
            "{}: no convergence after {} iterations (value {}, target {}), coarse move {:+.1}",
            label, state.iterations, state.current, state.target, dx
        );
        drag(pointer, handle, Point::new(state.x + dx, y)).await?;
        settle(policy.settle_ms).await;
        report.gestures += 1;
        report.coarse = true;
    }

    report.exit = exit.unwrap_or(if state.distance() <= policy.tolerance {
        Exit::WithinTolerance
    } else {
        Exit::IterationCap
    });
    debug!("{}: {}", label, report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_tiers() {
        assert_eq!(step_for(25.0), 20.0);
        assert_eq!(step_for(15.0), 10.0);
        assert_eq!(step_for(7.0), 5.0);
        assert_eq!(step_for(3.0), 1.0);
    }

    #[test]
    fn test_step_tier_boundaries_are_exclusive() {
        assert_eq!(step_for(20.0), 10.0);
        assert_eq!(step_for(20.01), 20.0);
        assert_eq!(step_for(10.0), 5.0);
        assert_eq!(step_for(5.0), 1.0);
        assert_eq!(step_for(0.6), 1.0);
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(10.0, 30.0, 5.0), 5.0);
        assert_eq!(direction(30.0, 10.0, 5.0), -5.0);
        assert_eq!(direction(-4.0, -2.0, 1.0), 1.0);
    }

    #[test]
    fn test_policy_defaults() {
        let p = ConvergePolicy::default();
        assert_eq!(p.tolerance, 0.5);
        assert_eq!(p.max_iterations, 50);
        assert_eq!((p.min_x, p.max_x), (0.0, 1000.0));
        assert_eq!(p.coarse_ratio, 2.0);
        assert_eq!(p.settle_ms, 0);
    }

    #[test]
    fn test_policy_within_track() {
        let p = ConvergePolicy::default().within(Rect::new(120.0, 300.0, 400.0, 6.0));
        assert!(p.out_of_bounds(119.0));
        assert!(!p.out_of_bounds(120.0));
        assert!(!p.out_of_bounds(520.0));
        assert!(p.out_of_bounds(521.0));
    }

    #[test]
    fn test_policy_padded_track() {
        let p = ConvergePolicy::default()
            .within(Rect::new(120.0, 300.0, 400.0, 6.0))
            .padded(8.0);
        assert!(!p.out_of_bounds(112.0));
        assert!(p.out_of_bounds(111.0));
        assert!(!p.out_of_bounds(528.0));
        assert!(p.out_of_bounds(529.0));
    }

    #[test]
    fn test_policy_partial_deserialize() {
        let p: ConvergePolicy = serde_json::from_str(r#"{"max_iterations": 10}"#).unwrap();
        assert_eq!(p.max_iterations, 10);
        assert_eq!(p.tolerance, 0.5);
    }

    #[test]
    fn test_convergence_display() {
        let c = Convergence {
            iterations: 50,
            gestures: 51,
            exit: Exit::IterationCap,
            coarse: true,
        };
        assert_eq!(c.to_string(), "iteration cap after 50 iterations (51 gestures, coarse)");
        assert_eq!(
            Convergence::idle().to_string(),
            "within tolerance after 0 iterations (0 gestures)"
        );
    }
}
