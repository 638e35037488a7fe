//! Driver seams: what a slider handle, its track and the pointer must provide.
//!
//! The browser adapter in [`crate::page`] implements these over CDP. Anything
//! else (a simulated widget, a different driver) can implement them too.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use tracing::trace;

use crate::{Error, Point, Rect, Result};

/// Something with an on-screen bounding box.
pub trait Geometry {
    /// Current bounding box, or `None` if the element is not rendered.
    async fn bounding_box(&self) -> Result<Option<Rect>>;
}

/// One draggable thumb of a slider.
pub trait SliderHandle: Geometry {
    /// Raw state attribute holding the logical value (e.g. `aria-valuenow`).
    async fn value_text(&self) -> Result<Option<String>>;

    /// Human-readable identity, used in logs.
    fn label(&self) -> String;
}

/// Low-level mouse input.
pub trait Pointer {
    async fn move_to(&self, at: Point) -> Result<()>;
    async fn down(&self, at: Point) -> Result<()>;
    async fn up(&self, at: Point) -> Result<()>;
}

/// Bounding box of `el`, failing if it is not rendered.
pub async fn require_box<G: Geometry>(el: &G, what: &str) -> Result<Rect> {
    el.bounding_box()
        .await?
        .ok_or_else(|| Error::GeometryUnavailable(format!("{} has no bounding box", what)))
}

/// Press on the handle's current center, move to `to`, release.
///
/// The press point is re-measured on every call, the same way a hover
/// re-locates the element before acting.
pub async fn drag<P, H>(pointer: &P, handle: &H, to: Point) -> Result<()>
where
    P: Pointer,
    H: SliderHandle,
{
    let from = require_box(handle, &handle.label()).await?.center();
    trace!(
        "drag {}: ({:.1}, {:.1}) -> ({:.1}, {:.1})",
        handle.label(),
        from.x,
        from.y,
        to.x,
        to.y
    );
    pointer.move_to(from).await?;
    pointer.down(from).await?;
    pointer.move_to(to).await?;
    pointer.up(to).await
}

/// Optional pause after a gesture so the widget can re-render.
pub(crate) async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
