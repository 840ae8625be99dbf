use std::io::Write;
use std::time::Duration;

use clap::Args;
use pomodoro_core::{
    AlertDecision, Clock, Config, Event, Phase, PresetMode, SessionSnapshot, SharedController,
    SystemClock, TickDriver, TimerController,
};
use tokio::sync::{mpsc, watch};

const BAR_WIDTH: usize = 30;

#[derive(Args)]
pub struct RunArgs {
    /// Block length in minutes (defaults to the preset's study or break length)
    #[arg(long)]
    pub minutes: Option<f64>,
    /// Preset used for follow-up blocks: short (25/5) or long (50/10)
    #[arg(long)]
    pub preset: Option<PresetMode>,
    /// Start with a break instead of a study block
    #[arg(long = "break")]
    pub start_break: bool,
    /// Answer every expiry prompt automatically: accept or decline
    #[arg(long)]
    pub auto: Option<AlertDecision>,
    /// Exit after this many blocks have expired (0 runs until interrupted)
    #[arg(long, default_value_t = 1)]
    pub cycles: u32,
    /// Print a JSON snapshot per tick instead of a progress bar
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let controller = prepare(&config, &args)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(
        SharedController::new(controller),
        config.tick_interval(),
        &args,
    ))
}

/// Apply the flags and start the first block.
fn prepare(
    config: &Config,
    args: &RunArgs,
) -> Result<TimerController<SystemClock>, Box<dyn std::error::Error>> {
    let mut controller = config.build_controller(SystemClock);
    if let Some(mode) = args.preset {
        controller.select_preset(mode);
    }
    if args.start_break {
        controller.set_phase(Phase::OnBreak)?;
    }

    let mode = controller.preset_mode();
    let minutes = args.minutes.unwrap_or_else(|| {
        let durations = config.presets.get(mode);
        if args.start_break {
            f64::from(durations.break_minutes)
        } else {
            f64::from(durations.study_minutes)
        }
    });
    if args.minutes.is_some() && !args.start_break && !config.in_slider_range(minutes) {
        tracing::warn!(
            minutes,
            min = config.timer.slider_min,
            max = config.timer.slider_max,
            "duration outside the configured range"
        );
    }

    controller.start(minutes)?;
    Ok(controller)
}

/// Tick until `args.cycles` blocks have expired, answering each expiry in
/// between from `--auto` or the terminal.
async fn drive<C: Clock + 'static>(
    shared: SharedController<C>,
    period: Duration,
    args: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (expired_tx, mut expired_rx) = mpsc::unbounded_channel::<Event>();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let json = args.json;
    let driver = TickDriver::new(shared.clone(), period).spawn(shutdown_rx, move |event, snapshot| {
        if snapshot.is_active || event.is_some() {
            render(snapshot, json);
        }
        if let Some(event) = event {
            let _ = expired_tx.send(event.clone());
        }
    });

    let mut expired = 0u32;
    while let Some(event) = expired_rx.recv().await {
        let Event::TimerExpired { phase, .. } = event else {
            continue;
        };
        expired += 1;
        if args.cycles != 0 && expired >= args.cycles {
            shared.with(|c| c.clear_alert());
            if !json {
                println!();
                println!("{}", phase.prompt().0);
            }
            break;
        }

        let decision = match args.auto {
            Some(decision) => decision,
            None => prompt(phase).await?,
        };
        shared.with(|c| c.resolve_alert(decision))?;
    }

    let _ = shutdown_tx.send(true);
    driver.await?;
    Ok(())
}

async fn prompt(phase: Phase) -> Result<AlertDecision, Box<dyn std::error::Error>> {
    let (title, question) = phase.prompt();
    println!();
    loop {
        print!("{title} {question} [y/n] ");
        std::io::stdout().flush()?;

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|n| (n, line))
        })
        .await??;

        match line {
            (0, _) => return Err("stdin closed while waiting for an answer".into()),
            (_, answer) => match answer.parse::<AlertDecision>() {
                Ok(decision) => return Ok(decision),
                Err(e) => eprintln!("{e}"),
            },
        }
    }
}

fn render(snapshot: &SessionSnapshot, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(snapshot) {
            println!("{line}");
        }
        return;
    }
    let label = if snapshot.is_studying { "Study" } else { "Break" };
    print!(
        "\r{label} {:>6} {}",
        snapshot.display,
        progress_bar(snapshot.remaining_fraction, BAR_WIDTH)
    );
    let _ = std::io::stdout().flush();
}

/// `[####------]` with the filled share equal to `fraction`.
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
