//! # rangeslide-runner
//!
//! YAML-scripted storefront scenarios. A scenario opens a page, runs a list
//! of actions (navigation, form input, checkbox filters, range sliders) and
//! checks success conditions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rangeslide_runner::{Config, Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> rangeslide_runner::Result<()> {
//! let config = Config::load("configs/price-filter.yaml")?;
//! let mut runner = Runner::new(&config.browser).await?;
//! let result = runner.run(&config).await?;
//! println!("Success: {}", result.success);
//! runner.close().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod runner;

pub use config::{
    Action, BrowserConfig, Condition, Config, NativeInputs, ParamDef, Params, SliderConfig,
    SliderMode, SuccessCondition, Target, TargetUrl,
};
pub use runner::{RangeStep, RunResult, Runner};

/// Result type for rangeslide-runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during scenario loading or execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("slider error: {0}")]
    Slider(#[from] rangeslide::Error),

    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("assertion failed: {0}")]
    AssertionFailed(String),
}
