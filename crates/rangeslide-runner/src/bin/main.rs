use clap::Parser;
use rangeslide_runner::{Action, Config, Params, Runner, SliderMode};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "rangeslide-runner")]
#[command(about = "Run YAML storefront scenarios, range sliders included")]
#[command(version)]
struct Cli {
    /// Scenario file to run
    config: PathBuf,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate the scenario without running it
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> rangeslide_runner::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let params = Params::from_args(&cli.params)?;
    let mut config = Config::load_with_params(&cli.config, &params)?;

    if cli.check {
        print_summary(&config);
        return Ok(());
    }

    if cli.headless {
        config.browser.headless = true;
    }

    println!("Running: {}", config.name);

    // Relative output paths land next to the scenario file.
    let base_path = cli
        .config
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));

    let mut runner = Runner::new(&config.browser).await?;
    let result = runner.run_with_base_path(&config, base_path).await?;

    println!();
    if result.success {
        println!("✓ Success");
    } else {
        println!("✗ Failed");
        if let Some(ref error) = result.error {
            println!("  Error: {}", error);
        }
    }
    println!("  Actions: {}", result.actions_executed);
    for step in &result.range_steps {
        match step.outcome {
            Some(ref o) => println!(
                "  Range [{}, {}]: min {}, max {}{}",
                step.min,
                step.max,
                o.min,
                o.max,
                if step.nudged() { " (nudged)" } else { "" }
            ),
            None => println!("  Range [{}, {}]: native inputs", step.min, step.max),
        }
    }
    if !result.range_steps.is_empty() {
        println!("  Drag gestures: {}", result.gestures());
    }
    println!("  Duration: {}ms", result.duration_ms);
    if result.retries > 0 {
        println!("  Retries: {}", result.retries);
    }

    runner.close().await?;

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(config: &Config) {
    println!("Config valid: {}", config.name);
    println!("  Target: {}", config.target.url);
    println!("  Actions: {}", config.actions.len());

    let range_steps = config
        .actions
        .iter()
        .filter(|a| matches!(a, Action::SetRange(_) | Action::AssertRange(_)))
        .count();
    if range_steps > 0 {
        let slider = &config.slider;
        match slider.mode {
            SliderMode::Drag => println!(
                "  Slider: drag {} / {} on {} (tolerance {}, max {} iterations)",
                slider.selectors.min_handle,
                slider.selectors.max_handle,
                slider.selectors.track,
                slider.policy.tolerance,
                slider.policy.max_iterations
            ),
            SliderMode::Native => {
                if let Some(ref native) = slider.native {
                    println!("  Slider: native {} / {}", native.min, native.max);
                }
            }
        }
        println!("  Range steps: {}", range_steps);
    }

    if !config.params.is_empty() {
        println!("  Parameters: {}", config.params.len());
        for (name, def) in &config.params {
            let req = if def.required { " (required)" } else { "" };
            let env = def
                .env
                .as_deref()
                .map(|v| format!(" [${}]", v))
                .unwrap_or_default();
            let desc = def.description.as_deref().unwrap_or("");
            println!("    - {}{}{}: {}", name, req, env, desc);
        }
    }
    if let Some(ref success) = config.success {
        let count = success.any.as_ref().map(|v| v.len()).unwrap_or(0)
            + success.all.as_ref().map(|v| v.len()).unwrap_or(0);
        println!("  Success conditions: {}", count);
    }
    if let Some(ref on_failure) = config.on_failure {
        if let Some(ref retry) = on_failure.retry {
            println!("  Retry attempts: {}", retry.attempts);
        }
    }
}
