//! The `RangeInput` seam.
//!
//! Code that only needs "set this range" should depend on [`RangeInput`].
//! The drag heuristic is one implementation; a widget with a real value
//! setter (see [`crate::page::NativeRange`]) is another.

#![allow(async_fn_in_trait)]

use crate::handle::require_box;
use crate::range::set_range_with;
use crate::{read_value, ConvergePolicy, Geometry, Pointer, RangeOutcome, Result, SliderHandle};

/// A two-ended numeric range control.
pub trait RangeInput {
    /// Move the control towards `[min, max]`. Best-effort: verify with [`RangeInput::range`].
    async fn set_range(&self, min: f64, max: f64) -> Result<()>;

    /// Current `(lower, upper)` values.
    async fn range(&self) -> Result<(f64, f64)>;
}

/// Approximate comparison for checking a range after it was set.
pub fn within(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance
}

/// Range control driven by simulated drags on two handles sharing a track.
pub struct DragRange<P, H, T> {
    pointer: P,
    first: H,
    second: H,
    track: T,
    policy: ConvergePolicy,
    track_bounded: bool,
}

impl<P, H, T> DragRange<P, H, T>
where
    P: Pointer,
    H: SliderHandle,
    T: Geometry,
{
    pub fn new(pointer: P, first: H, second: H, track: T) -> Self {
        Self {
            pointer,
            first,
            second,
            track,
            policy: ConvergePolicy::default(),
            track_bounded: false,
        }
    }

    /// Use a custom convergence policy.
    pub fn with_policy(mut self, policy: ConvergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound drags by the track's extent instead of the fixed safety window.
    pub fn bounded_by_track(mut self, on: bool) -> Self {
        self.track_bounded = on;
        self
    }

    pub fn policy(&self) -> &ConvergePolicy {
        &self.policy
    }

    /// Set the range and return the full report.
    pub async fn set_range_report(&self, min: f64, max: f64) -> Result<RangeOutcome> {
        let policy = if self.track_bounded {
            let track = require_box(&self.track, "slider track").await?;
            let a = require_box(&self.first, &self.first.label()).await?;
            let b = require_box(&self.second, &self.second.label()).await?;
            self.policy
                .clone()
                .within(track)
                .padded(a.width.max(b.width) / 2.0)
        } else {
            self.policy.clone()
        };
        set_range_with(
            &self.pointer,
            &self.first,
            &self.second,
            &self.track,
            min,
            max,
            &policy,
        )
        .await
    }
}

impl<P, H, T> RangeInput for DragRange<P, H, T>
where
    P: Pointer,
    H: SliderHandle,
    T: Geometry,
{
    async fn set_range(&self, min: f64, max: f64) -> Result<()> {
        self.set_range_report(min, max).await.map(|_| ())
    }

    async fn range(&self) -> Result<(f64, f64)> {
        let a = read_value(&self.first).await;
        let b = read_value(&self.second).await;
        Ok((a.min(b), a.max(b)))
    }
}
