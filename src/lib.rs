//! # rangeslide
//!
//! Drive range-slider widgets to target values through simulated pointer drags.
//!
//! Third-party slider widgets rarely expose a value setter. This crate moves their
//! handles the way a user would: press on the thumb, drag, release, read the value
//! back, repeat with smaller steps until the value is close enough.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rangeslide::{page, RangeInput};
//!
//! # #[tokio::main]
//! # async fn main() -> rangeslide::Result<()> {
//! let browser = eoka::Browser::launch().await?;
//! let page = browser.new_page("https://shop.example.com").await?;
//!
//! let slider = page::price_slider(&page, &Default::default(), Default::default()).await?;
//! slider.set_range(10.0, 50.0).await?;
//!
//! // Convergence is best-effort: verify with a tolerant comparison.
//! let (min, max) = slider.range().await?;
//! assert!(rangeslide::within(min, 10.0, 0.5) && rangeslide::within(max, 50.0, 0.5));
//! # browser.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod converge;
pub mod geometry;
pub mod handle;
pub mod input;
pub mod page;
pub mod range;
pub mod reader;

pub use converge::{converge, converge_with, Convergence, ConvergePolicy, Exit};
pub use geometry::{Point, Rect};
pub use handle::{drag, Geometry, Pointer, SliderHandle};
pub use input::{within, DragRange, RangeInput};
pub use range::{resolve_assignment, set_range, set_range_with, Assignment, RangeOutcome};
pub use reader::{parse_value, read_value};

/// Result type for rangeslide operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while driving a slider.
///
/// Failing to reach the target value is not an error. Only driver-level
/// failures end up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("geometry unavailable: {0}")]
    GeometryUnavailable(String),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("gesture failed: {0}")]
    Gesture(String),
}
