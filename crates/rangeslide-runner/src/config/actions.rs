use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A target element - either by CSS selector or visible text.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Target {
    pub selector: Option<String>,
    pub text: Option<String>,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.selector, &self.text) {
            (Some(s), _) => write!(f, "selector '{}'", s),
            (_, Some(t)) => write!(f, "text '{}'", t),
            _ => write!(f, "unknown"),
        }
    }
}

/// One scenario step.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    Goto(GotoAction),
    Back,
    Reload,

    // Waiting
    Wait(WaitAction),
    WaitForNetworkIdle(WaitForNetworkIdleAction),
    WaitFor(WaitForAction),
    WaitForText(WaitForTextAction),
    WaitForUrl(WaitForUrlAction),

    // Interaction
    Click(TargetAction),
    Fill(FillAction),
    Select(SelectAction),
    Check(CheckAction),
    PressKey(PressKeyAction),

    // Range sliders
    SetRange(SetRangeAction),
    AssertRange(AssertRangeAction),

    // Debug / assertions
    Screenshot(ScreenshotAction),
    Log(LogAction),
    AssertText(AssertTextAction),
    AssertUrl(AssertUrlAction),
}

const ACTION_NAMES: &[&str] = &[
    "goto",
    "back",
    "reload",
    "wait",
    "wait_for_network_idle",
    "wait_for",
    "wait_for_text",
    "wait_for_url",
    "click",
    "fill",
    "select",
    "check",
    "press_key",
    "set_range",
    "assert_range",
    "screenshot",
    "log",
    "assert_text",
    "assert_url",
];

impl Action {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Goto(_) => "goto",
            Self::Back => "back",
            Self::Reload => "reload",
            Self::Wait(_) => "wait",
            Self::WaitForNetworkIdle(_) => "wait_for_network_idle",
            Self::WaitFor(_) => "wait_for",
            Self::WaitForText(_) => "wait_for_text",
            Self::WaitForUrl(_) => "wait_for_url",
            Self::Click(_) => "click",
            Self::Fill(_) => "fill",
            Self::Select(_) => "select",
            Self::Check(_) => "check",
            Self::PressKey(_) => "press_key",
            Self::SetRange(_) => "set_range",
            Self::AssertRange(_) => "assert_range",
            Self::Screenshot(_) => "screenshot",
            Self::Log(_) => "log",
            Self::AssertText(_) => "assert_text",
            Self::AssertUrl(_) => "assert_url",
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ActionVisitor)
    }
}

struct ActionVisitor;

impl<'de> Visitor<'de> for ActionVisitor {
    type Value = Action;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an action (string for back/reload, or map with single key)")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value {
            "back" => Ok(Action::Back),
            "reload" => Ok(Action::Reload),
            other => Err(de::Error::unknown_variant(other, &["back", "reload"])),
        }
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("expected action type key"))?;

        let action = match key.as_str() {
            "goto" => Action::Goto(map.next_value()?),
            "back" => {
                let _: serde_yaml::Value = map.next_value()?;
                Action::Back
            }
            "reload" => {
                let _: serde_yaml::Value = map.next_value()?;
                Action::Reload
            }
            "wait" => Action::Wait(map.next_value()?),
            "wait_for_network_idle" => Action::WaitForNetworkIdle(map.next_value()?),
            "wait_for" => Action::WaitFor(map.next_value()?),
            "wait_for_text" => Action::WaitForText(map.next_value()?),
            "wait_for_url" => Action::WaitForUrl(map.next_value()?),
            "click" => Action::Click(map.next_value()?),
            "fill" => Action::Fill(map.next_value()?),
            "select" => Action::Select(map.next_value()?),
            "check" => Action::Check(map.next_value()?),
            "press_key" => Action::PressKey(map.next_value()?),
            "set_range" => Action::SetRange(map.next_value()?),
            "assert_range" => Action::AssertRange(map.next_value()?),
            "screenshot" => Action::Screenshot(map.next_value()?),
            "log" => Action::Log(map.next_value()?),
            "assert_text" => Action::AssertText(map.next_value()?),
            "assert_url" => Action::AssertUrl(map.next_value()?),
            other => return Err(de::Error::unknown_variant(other, ACTION_NAMES)),
        };

        Ok(action)
    }
}

// --- Action payloads ---

#[derive(Debug, Clone, Deserialize)]
pub struct GotoAction {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitAction {
    pub ms: u64,
}

fn default_idle_ms() -> u64 {
    500
}
fn default_timeout_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForNetworkIdleAction {
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForAction {
    pub selector: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Wait for the element to be visible, not just attached.
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForTextAction {
    pub text: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForUrlAction {
    pub contains: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Generic action that just needs a target element.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetAction {
    #[serde(flatten)]
    pub target: Target,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FillAction {
    #[serde(flatten)]
    pub target: Target,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectAction {
    #[serde(flatten)]
    pub target: Target,
    pub value: String,
}

fn default_checked() -> bool {
    true
}

/// Tick (or untick) a checkbox, e.g. a category or brand filter.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckAction {
    #[serde(flatten)]
    pub target: Target,
    #[serde(default = "default_checked")]
    pub checked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PressKeyAction {
    pub key: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// Accepts `12.5` as well as `"12.5"`, so bounds can come from `${params}`.
fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected a number, got '{}'", s))),
    }
}

/// Move the scenario's range slider towards `[min, max]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRangeAction {
    #[serde(deserialize_with = "number")]
    pub min: f64,
    #[serde(deserialize_with = "number")]
    pub max: f64,
}

fn default_tolerance() -> f64 {
    0.5
}

/// Fail unless the slider reads `[min, max]` within `tolerance`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssertRangeAction {
    #[serde(deserialize_with = "number")]
    pub min: f64,
    #[serde(deserialize_with = "number")]
    pub max: f64,
    #[serde(default = "default_tolerance", deserialize_with = "number")]
    pub tolerance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotAction {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogAction {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssertTextAction {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssertUrlAction {
    pub contains: String,
}
