mod executor;

use crate::config::{BrowserConfig, Condition, Config, SuccessCondition};
use crate::Result;
use eoka::{Browser, Page};
use executor::ExecutionContext;
use rangeslide::{within, RangeOutcome};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// One `set_range` step as it played out.
#[derive(Debug, Clone, Copy)]
pub struct RangeStep {
    /// Requested bounds.
    pub min: f64,
    pub max: f64,
    /// Drag report; `None` when the slider is driven as native inputs.
    pub outcome: Option<RangeOutcome>,
}

impl RangeStep {
    pub fn gestures(&self) -> u32 {
        self.outcome.map(|o| o.gestures()).unwrap_or(0)
    }

    /// Whether either handle needed the final nudge.
    pub fn nudged(&self) -> bool {
        self.outcome
            .is_some_and(|o| o.min_nudge.is_some() || o.max_nudge.is_some())
    }
}

/// Result of running a scenario.
#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    /// Error message if failed.
    pub error: Option<String>,
    /// Actions completed in the last attempt.
    pub actions_executed: usize,
    /// `set_range` steps of the last attempt that got that far.
    pub range_steps: Vec<RangeStep>,
    pub duration_ms: u64,
    /// Attempts beyond the first.
    pub retries: u32,
}

impl RunResult {
    /// Drag gestures across all range steps.
    pub fn gestures(&self) -> u32 {
        self.range_steps.iter().map(RangeStep::gestures).sum()
    }
}

/// What one pass over the scenario produced.
#[derive(Default)]
struct Attempt {
    actions: usize,
    range_steps: Vec<RangeStep>,
    passed: bool,
}

/// Executes scenarios against one browser page.
pub struct Runner {
    browser: Browser,
    page: Page,
}

impl Runner {
    /// Launch a browser for the given config.
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let viewport = config.viewport.as_ref();
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: viewport.map(|v| v.width).unwrap_or(1280),
            viewport_height: viewport.map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    pub async fn run(&mut self, config: &Config) -> Result<RunResult> {
        self.run_with_base_path(config, ".").await
    }

    /// Run the scenario, resolving relative output paths against `base_path`.
    ///
    /// Failed attempts are retried per `on_failure.retry`; the failure
    /// screenshot is taken once, after the last attempt.
    pub async fn run_with_base_path(
        &mut self,
        config: &Config,
        base_path: impl AsRef<Path>,
    ) -> Result<RunResult> {
        let ctx = ExecutionContext::new(base_path.as_ref(), config.slider.clone());
        let start = Instant::now();
        let retry = config.on_failure.as_ref().and_then(|f| f.retry.as_ref());
        let attempts = retry.map(|r| r.attempts).unwrap_or(1);
        let delay = Duration::from_millis(retry.map(|r| r.delay_ms).unwrap_or(0));

        let mut last = Attempt::default();
        let mut error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                info!("Retry attempt {}/{}", attempt, attempts);
                tokio::time::sleep(delay).await;
            }
            match self.attempt(config, &ctx).await {
                Ok(a) if a.passed => {
                    return Ok(RunResult {
                        success: true,
                        error: None,
                        actions_executed: a.actions,
                        range_steps: a.range_steps,
                        duration_ms: start.elapsed().as_millis() as u64,
                        retries: attempt - 1,
                    });
                }
                Ok(a) => {
                    last = a;
                    error = Some("success conditions not met".to_string());
                }
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt, e);
                    error = Some(e.to_string());
                }
            }
        }

        self.save_failure_screenshot(config, &ctx).await;

        Ok(RunResult {
            success: false,
            error,
            actions_executed: last.actions,
            range_steps: last.range_steps,
            duration_ms: start.elapsed().as_millis() as u64,
            retries: attempts - 1,
        })
    }

    async fn attempt(&mut self, config: &Config, ctx: &ExecutionContext) -> Result<Attempt> {
        info!("Navigating to: {}", config.target.url);
        self.page.goto(&config.target.url).await?;

        let mut attempt = Attempt::default();
        for (i, action) in config.actions.iter().enumerate() {
            debug!("Executing action {}: {}", i + 1, action.name());
            if let Some(step) = executor::execute(&self.page, action, ctx).await? {
                attempt.range_steps.push(step);
            }
            attempt.actions += 1;
        }

        attempt.passed = self.success_holds(config.success.as_ref(), ctx).await?;
        debug!("Success check: {}", attempt.passed);
        Ok(attempt)
    }

    async fn success_holds(
        &self,
        success: Option<&SuccessCondition>,
        ctx: &ExecutionContext,
    ) -> Result<bool> {
        let Some(success) = success else {
            return Ok(true);
        };
        if let Some(ref any) = success.any {
            for cond in any {
                if self.holds(cond, ctx).await? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        for cond in success.all.iter().flatten() {
            if !self.holds(cond, ctx).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn holds(&self, condition: &Condition, ctx: &ExecutionContext) -> Result<bool> {
        Ok(match condition {
            Condition::UrlContains(pattern) => self.page.url().await?.contains(pattern),
            Condition::TextContains(pattern) => self.page.text().await?.contains(pattern),
            Condition::Range(r) => {
                let (min, max) = executor::read_range(&self.page, &ctx.slider).await?;
                debug!("range condition: slider reads [{}, {}]", min, max);
                within(min, r.min, r.tolerance) && within(max, r.max, r.tolerance)
            }
        })
    }

    async fn save_failure_screenshot(&self, config: &Config, ctx: &ExecutionContext) {
        let Some(template) = config
            .on_failure
            .as_ref()
            .and_then(|f| f.screenshot.as_deref())
        else {
            return;
        };
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = ctx.resolve_path(&template.replace("{timestamp}", &timestamp.to_string()));
        info!("Saving failure screenshot to: {}", path.display());
        match self.page.screenshot().await {
            Ok(data) => {
                if let Err(e) = std::fs::write(&path, data) {
                    warn!("Failed to save screenshot: {}", e);
                }
            }
            Err(e) => warn!("Failed to capture screenshot: {}", e),
        }
    }

    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
