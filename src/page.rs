//! Browser adapter: slider handles, tracks and the pointer on an `eoka::Page`.

use eoka::cdp::{MouseButton, MouseEventType};
use eoka::Page;
use serde::Deserialize;
use tracing::debug;

use crate::input::{DragRange, RangeInput};
use crate::{
    parse_value, ConvergePolicy, Error, Geometry, Point, Pointer, Rect, Result, SliderHandle,
};

/// Bounding box of the first element matching a selector, or null when it is
/// missing or has no layout.
const RECT_JS: &str = r#"((sel) => {
    const el = document.querySelector(sel);
    if (!el) return null;
    const r = el.getBoundingClientRect();
    if (r.width === 0 && r.height === 0) return null;
    return { x: r.x, y: r.y, width: r.width, height: r.height };
})"#;

const ATTR_JS: &str = r#"((sel, name) => {
    const el = document.querySelector(sel);
    return el ? el.getAttribute(name) : null;
})"#;

/// Set a native `<input type="range">` and fire the events frameworks listen to.
const SET_INPUT_JS: &str = r#"((sel, val) => {
    const el = document.querySelector(sel);
    if (!el) return null;
    el.value = String(val);
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return el.value;
})"#;

const INPUT_VALUE_JS: &str = r#"((sel) => {
    const el = document.querySelector(sel);
    return el ? el.value : null;
})"#;

fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// An element addressed by CSS selector.
pub struct PageElement<'a> {
    page: &'a Page,
    selector: String,
    value_attribute: String,
}

impl<'a> PageElement<'a> {
    /// Element whose value lives in `aria-valuenow`.
    pub fn new(page: &'a Page, selector: impl Into<String>) -> Self {
        Self::with_attribute(page, selector, "aria-valuenow")
    }

    pub fn with_attribute(
        page: &'a Page,
        selector: impl Into<String>,
        value_attribute: impl Into<String>,
    ) -> Self {
        Self {
            page,
            selector: selector.into(),
            value_attribute: value_attribute.into(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl Geometry for PageElement<'_> {
    async fn bounding_box(&self) -> Result<Option<Rect>> {
        let js = format!("{}({})", RECT_JS, js_str(&self.selector));
        Ok(self.page.evaluate(&js).await?)
    }
}

impl SliderHandle for PageElement<'_> {
    async fn value_text(&self) -> Result<Option<String>> {
        let js = format!(
            "{}({}, {})",
            ATTR_JS,
            js_str(&self.selector),
            js_str(&self.value_attribute)
        );
        Ok(self.page.evaluate(&js).await?)
    }

    fn label(&self) -> String {
        self.selector.clone()
    }
}

/// The page's mouse, driven through CDP input events.
pub struct PagePointer<'a> {
    page: &'a Page,
}

impl<'a> PagePointer<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }
}

impl Pointer for PagePointer<'_> {
    async fn move_to(&self, at: Point) -> Result<()> {
        self.page
            .session()
            .dispatch_mouse_event(MouseEventType::MouseMoved, at.x, at.y, None, None)
            .await?;
        Ok(())
    }

    async fn down(&self, at: Point) -> Result<()> {
        self.page
            .session()
            .dispatch_mouse_event(
                MouseEventType::MousePressed,
                at.x,
                at.y,
                Some(MouseButton::Left),
                Some(1),
            )
            .await?;
        Ok(())
    }

    async fn up(&self, at: Point) -> Result<()> {
        self.page
            .session()
            .dispatch_mouse_event(
                MouseEventType::MouseReleased,
                at.x,
                at.y,
                Some(MouseButton::Left),
                Some(1),
            )
            .await?;
        Ok(())
    }
}

fn default_min_handle() -> String {
    ".ngx-slider-pointer-min".into()
}
fn default_max_handle() -> String {
    ".ngx-slider-pointer-max".into()
}
fn default_track() -> String {
    ".ngx-slider-full-bar".into()
}
fn default_value_attribute() -> String {
    "aria-valuenow".into()
}
fn default_visible_timeout_ms() -> u64 {
    5000
}

/// Where to find a dual-handle slider on the page.
///
/// Defaults match the storefront's ngx-slider price filter.
#[derive(Debug, Clone, Deserialize)]
pub struct SliderSelectors {
    #[serde(default = "default_min_handle")]
    pub min_handle: String,
    #[serde(default = "default_max_handle")]
    pub max_handle: String,
    #[serde(default = "default_track")]
    pub track: String,
    #[serde(default = "default_value_attribute")]
    pub value_attribute: String,
    /// How long to wait for each part to become visible.
    #[serde(default = "default_visible_timeout_ms")]
    pub visible_timeout_ms: u64,
}

impl Default for SliderSelectors {
    fn default() -> Self {
        Self {
            min_handle: default_min_handle(),
            max_handle: default_max_handle(),
            track: default_track(),
            value_attribute: default_value_attribute(),
            visible_timeout_ms: default_visible_timeout_ms(),
        }
    }
}

/// Drag-driven range control bound to a page.
pub type PageSlider<'a> = DragRange<PagePointer<'a>, PageElement<'a>, PageElement<'a>>;

/// Wait for the slider to render, then return a drag-driven control for it.
pub async fn price_slider<'a>(
    page: &'a Page,
    selectors: &SliderSelectors,
    policy: ConvergePolicy,
) -> Result<PageSlider<'a>> {
    for sel in [&selectors.track, &selectors.min_handle, &selectors.max_handle] {
        page.wait_for_visible(sel, selectors.visible_timeout_ms)
            .await
            .map_err(|e| Error::GeometryUnavailable(format!("{} not visible: {}", sel, e)))?;
    }
    debug!(
        "slider ready: {} / {} on {}",
        selectors.min_handle, selectors.max_handle, selectors.track
    );

    let handle = |sel: &str| PageElement::with_attribute(page, sel, &selectors.value_attribute);
    Ok(DragRange::new(
        PagePointer::new(page),
        handle(&selectors.min_handle),
        handle(&selectors.max_handle),
        PageElement::new(page, selectors.track.clone()),
    )
    .with_policy(policy))
}

/// A pair of native `<input type="range">` elements, set directly.
pub struct NativeRange<'a> {
    page: &'a Page,
    min_input: String,
    max_input: String,
}

impl<'a> NativeRange<'a> {
    pub fn new(page: &'a Page, min_input: impl Into<String>, max_input: impl Into<String>) -> Self {
        Self {
            page,
            min_input: min_input.into(),
            max_input: max_input.into(),
        }
    }

    async fn set_one(&self, selector: &str, value: f64) -> Result<f64> {
        let js = format!("{}({}, {})", SET_INPUT_JS, js_str(selector), value);
        let applied: Option<String> = self.page.evaluate(&js).await?;
        match applied {
            Some(v) => Ok(parse_value(&v)),
            None => Err(Error::GeometryUnavailable(format!(
                "range input '{}' not found",
                selector
            ))),
        }
    }

    async fn get_one(&self, selector: &str) -> Result<f64> {
        let js = format!("{}({})", INPUT_VALUE_JS, js_str(selector));
        let v: Option<String> = self.page.evaluate(&js).await?;
        Ok(v.map(|s| parse_value(&s)).unwrap_or(0.0))
    }
}

impl RangeInput for NativeRange<'_> {
    async fn set_range(&self, min: f64, max: f64) -> Result<()> {
        // Widen first so neither input gets clamped by the other's bound.
        let (first, second) = if min > self.get_one(&self.max_input).await? {
            ((&self.max_input, max), (&self.min_input, min))
        } else {
            ((&self.min_input, min), (&self.max_input, max))
        };
        let a = self.set_one(first.0, first.1).await?;
        let b = self.set_one(second.0, second.1).await?;
        debug!("native range set: {} = {}, {} = {}", first.0, a, second.0, b);
        Ok(())
    }

    async fn range(&self) -> Result<(f64, f64)> {
        let a = self.get_one(&self.min_input).await?;
        let b = self.get_one(&self.max_input).await?;
        Ok((a.min(b), a.max(b)))
    }
}
