use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use plastic::evaluation::{BasicClassificationEvaluator, Snapshot};
use plastic::tasks::PrequentialEvaluator;
use plastic::ui::cli::args::{Cli, Command};
use plastic::ui::types::build::{build_learner, build_stream};
use plastic::ui::types::choices::PrequentialParams;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_GREY: &str = "\x1b[90m";

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Run(args) => run(args.into_params()?),
        Command::Schema(args) => {
            println!("{}", args.render()?);
            Ok(())
        }
    }
}

fn run(params: PrequentialParams) -> Result<()> {
    let header = vec![
        format!("{BOLD}{FG_CYAN}▶ Prequential Evaluation{RESET}"),
        format!(
            "{DIM}learner={} sample_freq={} mem_check_freq={}{RESET}  {}",
            learner_name(&params),
            params.sample_frequency,
            params.mem_check_frequency,
            timestamp_now()
        ),
        format!("{FG_GREY}{}{RESET}", "─".repeat(72)),
    ];

    let stream = build_stream(params.stream).context("failed to build stream")?;
    let num_classes = stream.header().number_of_classes();
    let learner = build_learner(params.learner).context("failed to build learner")?;
    let evaluator = Box::new(BasicClassificationEvaluator::new(num_classes));

    let (tx, rx) = std::sync::mpsc::channel();
    let max_instances = params.max_instances;
    let max_seconds = params.max_seconds;
    let render = std::thread::spawn(move || {
        render_status_with_header(rx, header, 150, max_instances, max_seconds)
    });

    let mut runner = PrequentialEvaluator::new(
        learner,
        stream,
        evaluator,
        params.max_instances,
        params.max_seconds,
        params.sample_frequency,
        params.mem_check_frequency,
    )
    .context("failed to construct PrequentialEvaluator")?
    .with_progress(tx);

    runner.run().context("runner failed")?;

    if let Some(path) = params.dump_file
        && !path.as_os_str().is_empty()
    {
        runner
            .curve()
            .export(&path, params.dump_format)
            .with_context(|| format!("failed to export snapshots to {}", path.display()))?;
    }

    drop(runner);
    let _ = render.join();
    Ok(())
}

fn learner_name(params: &PrequentialParams) -> String {
    params.learner.clone().into_params().variant.to_string()
}

/// Prints the header once, then keeps rewriting one status line.
fn render_status_with_header(
    rx: Receiver<Snapshot>,
    header_lines: Vec<String>,
    repaint_every_ms: u64,
    max_instances: Option<u64>,
    max_seconds: Option<u64>,
) {
    for line in &header_lines {
        println!("{line}");
    }
    println!();
    let _ = io::stdout().flush();

    let tick = Duration::from_millis(repaint_every_ms);
    let mut last_draw = Instant::now();
    let mut last_snap: Option<Snapshot> = None;

    loop {
        match rx.recv_timeout(tick) {
            Ok(s) => last_snap = Some(s),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(s) = last_snap.take() {
                    print!("\r{}\x1B[K\n", format_status(&s, max_instances, max_seconds));
                    let _ = io::stdout().flush();
                }
                break;
            }
        }

        if last_draw.elapsed() >= tick {
            if let Some(s) = last_snap.as_ref() {
                print!("\r{}\x1B[K", format_status(s, max_instances, max_seconds));
                let _ = io::stdout().flush();
            }
            last_draw = Instant::now();
        }
    }
}

fn format_status(s: &Snapshot, max_instances: Option<u64>, max_seconds: Option<u64>) -> String {
    let mut line = format!(
        "{FG_GREEN}{BOLD}seen{RESET} {:>9}  \
         {FG_CYAN}{BOLD}acc{RESET} {:>7}% \
         {FG_MAGENTA}{BOLD}κ{RESET} {:>7}%",
        s.instances_seen,
        fmtf(s.accuracy * 100.0, 2),
        fmtf(s.kappa * 100.0, 2),
    );

    for (label, key) in [("nodes", "tree_nodes"), ("leaves", "tree_leaves"), ("depth", "tree_depth")] {
        if let Some(v) = s.extras.get(key) {
            line.push_str(&format!("  {DIM}{label}{RESET} {v:>5.0}"));
        }
    }
    if let Some(v) = s.extras.get("promotions") {
        line.push_str(&format!("  {DIM}swaps{RESET} {v:>3.0}"));
    }
    line.push_str(&format!(
        "  {DIM}ram_h{RESET} {:>10.3e}  {DIM}t{RESET} {:>7.2}s",
        s.ram_hours, s.seconds
    ));

    if let Some(mi) = max_instances {
        line.push_str(&format!(
            "  {DIM}[inst]{RESET} {}",
            progress_bar(s.instances_seen as f64, mi as f64, 15)
        ));
    }
    if let Some(ms) = max_seconds {
        line.push_str(&format!(
            "  {DIM}[time]{RESET} {}",
            progress_bar(s.seconds, ms as f64, 15)
        ));
    }
    line
}

fn progress_bar(current: f64, total: f64, width: usize) -> String {
    if !(total.is_finite() && total > 0.0) {
        return String::new();
    }
    let ratio = (current / total).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled)),
        ratio * 100.0
    )
}

fn fmtf(x: f64, prec: usize) -> String {
    if x.is_nan() {
        format!("{DIM}NaN{RESET}")
    } else {
        format!("{x:>6.prec$}")
    }
}

fn timestamp_now() -> String {
    use chrono::{Local, SecondsFormat};
    format!(
        "{DIM}{}{RESET}",
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
