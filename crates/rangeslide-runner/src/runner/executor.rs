use super::RangeStep;
use crate::config::{Action, SliderConfig, SliderMode, Target};
use crate::{Error, Result};
use eoka::Page;
use rangeslide::page::{self, NativeRange};
use rangeslide::{within, RangeInput, RangeOutcome};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Context for action execution.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Base path for resolving relative output paths.
    pub base_path: PathBuf,
    /// The slider `set_range` / `assert_range` operate on.
    pub slider: SliderConfig,
}

impl ExecutionContext {
    pub fn new(base_path: impl Into<PathBuf>, slider: SliderConfig) -> Self {
        Self {
            base_path: base_path.into(),
            slider,
        }
    }

    /// Resolve a relative path against the base path.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

/// Find element by text - returns CSS selector.
const FIND_BY_TEXT_JS: &str = r#"(() => {
    const text = arguments[0];
    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_ELEMENT, null);
    while (walker.nextNode()) {
        const el = walker.currentNode;
        if (el.textContent?.trim().toLowerCase().includes(text.toLowerCase())) {
            if (el.matches('a, button, input, label, select, [role="button"], [role="checkbox"], [onclick]')) {
                if (el.id) return '#' + el.id;
                const path = [];
                let node = el;
                while (node && node !== document.body) {
                    let selector = node.tagName.toLowerCase();
                    if (node.id) {
                        path.unshift('#' + node.id);
                        break;
                    }
                    const siblings = Array.from(node.parentNode?.children || []);
                    const index = siblings.indexOf(node) + 1;
                    if (siblings.length > 1) selector += ':nth-child(' + index + ')';
                    path.unshift(selector);
                    node = node.parentNode;
                }
                return path.join(' > ');
            }
        }
    }
    return null;
})()"#;

/// Execute a single action on the page.
///
/// Returns the step report for `set_range`, `None` for every other action.
pub async fn execute(
    page: &Page,
    action: &Action,
    ctx: &ExecutionContext,
) -> Result<Option<RangeStep>> {
    match action {
        Action::Goto(a) => {
            info!("goto: {}", a.url);
            page.goto(&a.url).await?;
        }
        Action::Back => {
            debug!("back");
            page.back().await?;
        }
        Action::Reload => {
            debug!("reload");
            page.reload().await?;
        }
        Action::Wait(a) => {
            debug!("wait: {}ms", a.ms);
            page.wait(a.ms).await;
        }
        Action::WaitForNetworkIdle(a) => {
            debug!(
                "wait_for_network_idle: idle={}ms, timeout={}ms",
                a.idle_ms, a.timeout_ms
            );
            page.wait_for_network_idle(a.idle_ms, a.timeout_ms).await?;
        }
        Action::WaitFor(a) => {
            debug!("wait_for: {} (visible: {})", a.selector, a.visible);
            if a.visible {
                page.wait_for_visible(&a.selector, a.timeout_ms).await?;
            } else {
                page.wait_for(&a.selector, a.timeout_ms).await?;
            }
        }
        Action::WaitForText(a) => {
            debug!("wait_for_text: '{}'", a.text);
            page.wait_for_text(&a.text, a.timeout_ms).await?;
        }
        Action::WaitForUrl(a) => {
            debug!("wait_for_url: contains '{}'", a.contains);
            page.wait_for_url_contains(&a.contains, a.timeout_ms)
                .await?;
        }
        Action::Click(a) => {
            let selector = resolve_target(page, &a.target).await?;
            info!("click: {}", a.target);
            page.click(&selector).await?;
        }
        Action::Fill(a) => {
            info!("fill: {} = '{}'", a.target, a.value);
            let selector = resolve_target(page, &a.target).await?;
            page.fill(&selector, &a.value).await?;
        }
        Action::Select(a) => {
            info!("select: {} = '{}'", a.target, a.value);
            let selector = resolve_target(page, &a.target).await?;
            select_option(page, &selector, &a.value, &a.target).await?;
        }
        Action::Check(a) => {
            info!("check: {} = {}", a.target, a.checked);
            let selector = resolve_target(page, &a.target).await?;
            set_checked(page, &selector, a.checked, &a.target).await?;
        }
        Action::PressKey(a) => {
            debug!("press_key: {}", a.key);
            page.human().press_key(&a.key).await?;
        }
        Action::SetRange(a) => {
            info!("set_range: [{}, {}]", a.min, a.max);
            let outcome = set_range(page, &ctx.slider, a.min, a.max).await?;
            return Ok(Some(RangeStep {
                min: a.min,
                max: a.max,
                outcome,
            }));
        }
        Action::AssertRange(a) => {
            let (min, max) = read_range(page, &ctx.slider).await?;
            debug!(
                "assert_range: [{}, {}] vs expected [{}, {}] ±{}",
                min, max, a.min, a.max, a.tolerance
            );
            if !within(min, a.min, a.tolerance) || !within(max, a.max, a.tolerance) {
                return Err(Error::AssertionFailed(format!(
                    "slider reads [{}, {}], expected [{}, {}] within {}",
                    min, max, a.min, a.max, a.tolerance
                )));
            }
        }
        Action::Screenshot(a) => {
            let path = ctx.resolve_path(&a.path);
            info!("screenshot: {}", path.display());
            let data = page.screenshot().await?;
            std::fs::write(&path, data)?;
        }
        Action::Log(a) => {
            info!("[log] {}", a.message);
        }
        Action::AssertText(a) => {
            debug!("assert_text: '{}'", a.text);
            let text = page.text().await?;
            if !text.contains(&a.text) {
                return Err(Error::AssertionFailed(format!(
                    "text '{}' not found",
                    a.text
                )));
            }
        }
        Action::AssertUrl(a) => {
            debug!("assert_url: contains '{}'", a.contains);
            let url = page.url().await?;
            if !url.contains(&a.contains) {
                return Err(Error::AssertionFailed(format!(
                    "url does not contain '{}'",
                    a.contains
                )));
            }
        }
    }
    Ok(None)
}

fn native_range<'a>(page: &'a Page, slider: &SliderConfig) -> Result<NativeRange<'a>> {
    let inputs = slider
        .native
        .as_ref()
        .ok_or_else(|| Error::Config("slider.native is not configured".into()))?;
    Ok(NativeRange::new(page, &inputs.min, &inputs.max))
}

/// Drive the slider; the drag report is `None` for native inputs.
async fn set_range(
    page: &Page,
    slider: &SliderConfig,
    min: f64,
    max: f64,
) -> Result<Option<RangeOutcome>> {
    let outcome = match slider.mode {
        SliderMode::Drag => {
            let control = page::price_slider(page, &slider.selectors, slider.policy.clone())
                .await?
                .bounded_by_track(slider.bounded_by_track);
            let outcome = control.set_range_report(min, max).await?;
            debug!(
                "set_range: {:?}, min {}, max {}, {} gestures",
                outcome.assignment,
                outcome.min,
                outcome.max,
                outcome.gestures()
            );
            // Falling short is not an error here; assert_range decides.
            if outcome.min_nudge.is_some() || outcome.max_nudge.is_some() {
                warn!("set_range: handles needed a final nudge");
            }
            Some(outcome)
        }
        SliderMode::Native => {
            native_range(page, slider)?.set_range(min, max).await?;
            None
        }
    };
    Ok(outcome)
}

pub(crate) async fn read_range(page: &Page, slider: &SliderConfig) -> Result<(f64, f64)> {
    let range = match slider.mode {
        SliderMode::Drag => {
            page::price_slider(page, &slider.selectors, slider.policy.clone())
                .await?
                .range()
                .await?
        }
        SliderMode::Native => native_range(page, slider)?.range().await?,
    };
    Ok(range)
}

fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Resolve a Target to a CSS selector.
pub async fn resolve_target(page: &Page, target: &Target) -> Result<String> {
    if let Some(ref sel) = target.selector {
        return Ok(sel.clone());
    }
    if let Some(ref txt) = target.text {
        let js = FIND_BY_TEXT_JS.replace("arguments[0]", &js_str(txt));
        let result: Option<String> = page.evaluate(&js).await?;
        if let Some(sel) = result {
            return Ok(sel);
        }
        return Err(Error::ActionFailed(format!(
            "element with text '{}' not found",
            txt
        )));
    }
    Err(Error::ActionFailed(
        "either selector or text must be provided".into(),
    ))
}

async fn select_option(page: &Page, selector: &str, value: &str, target: &Target) -> Result<()> {
    let js = format!(
        r#"(() => {{
            const sel = document.querySelector({sel});
            if (!sel) return 'element_not_found';
            const opt = Array.from(sel.options).find(o => o.value === {val} || o.text === {val});
            if (!opt) return 'option_not_found';
            sel.value = opt.value;
            sel.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return 'ok';
        }})()"#,
        sel = js_str(selector),
        val = js_str(value)
    );
    let result: String = page.evaluate(&js).await?;
    match result.as_str() {
        "ok" => Ok(()),
        "element_not_found" => Err(Error::ActionFailed(format!(
            "select element '{}' not found",
            target
        ))),
        "option_not_found" => Err(Error::ActionFailed(format!(
            "option '{}' not found in select",
            value
        ))),
        _ => Err(Error::ActionFailed(format!("select failed: {}", result))),
    }
}

/// Click a checkbox (or its label) only when its state differs from `checked`.
async fn set_checked(page: &Page, selector: &str, checked: bool, target: &Target) -> Result<()> {
    let js = format!(
        r#"(() => {{
            let el = document.querySelector({sel});
            if (!el) return null;
            if (el.tagName === 'LABEL' && el.control) el = el.control;
            if (el.checked !== {want}) el.click();
            return el.checked;
        }})()"#,
        sel = js_str(selector),
        want = checked
    );
    let state: Option<bool> = page.evaluate(&js).await?;
    match state {
        Some(s) if s == checked => Ok(()),
        Some(s) => Err(Error::ActionFailed(format!(
            "checkbox {} stayed {}",
            target,
            if s { "checked" } else { "unchecked" }
        ))),
        None => Err(Error::ActionFailed(format!(
            "checkbox {} not found",
            target
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        let ctx = ExecutionContext::new("/tmp/runs", SliderConfig::default());
        assert_eq!(
            ctx.resolve_path("shot.png"),
            PathBuf::from("/tmp/runs/shot.png")
        );
        assert_eq!(ctx.resolve_path("/abs/shot.png"), PathBuf::from("/abs/shot.png"));
    }

    #[test]
    fn test_js_str_quotes() {
        assert_eq!(js_str("Hand Tools"), "\"Hand Tools\"");
        assert_eq!(js_str("it's \"x\""), "\"it's \\\"x\\\"\"");
    }
}
