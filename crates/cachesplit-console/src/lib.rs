//! Colorful console output for split search events.
//!
//! Provides a custom `tracing` layer that formats sweep events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Sweep start/end, one line per split count, policy comparisons
//! - **DEBUG**: Completion of each first-split unit
//! - **TRACE**: Individual improvements of a worker's running best

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SWEEP_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and sets up tracing. `RUST_LOG` replaces
/// [`DEFAULT_DIRECTIVES`].
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let _ = tracing_subscriber::registry()
            .with(default_filter())
            .with(SweepConsoleLayer)
            .try_init();
    });
}

/// Filter directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "cachesplit_solver=info,cachesplit=info";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

// Marks the start of a sweep for elapsed time tracking.
fn mark_sweep_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SWEEP_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since sweep start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SWEEP_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = format!("cachesplit v{} - cache boundary search", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "\n{}\n", banner.bright_cyan().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats split search events with colors.
pub struct SweepConsoleLayer;

impl<S: Subscriber> Layer<S> for SweepConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("cachesplit") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = *metadata.level();
        let output = format_event(&visitor, level);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    bounder: Option<String>,
    assignment: Option<String>,
    sequence_length: Option<u64>,
    max_splits: Option<u64>,
    thread_count: Option<u64>,
    splits: Option<u64>,
    first_split: Option<u64>,
    frames: Option<u64>,
    pruned: Option<u64>,
    duration_ms: Option<u64>,
    feasible: Option<bool>,
    cost: Option<f64>,
    pi: Option<f64>,
    tracker_cost: Option<f64>,
    baseline_cost: Option<f64>,
    ratio: Option<f64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        match field.name() {
            "event" => self.event = Some(s.trim_matches('"').to_string()),
            "bounder" => self.bounder = Some(s.trim_matches('"').to_string()),
            "assignment" => self.assignment = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "sequence_length" => self.sequence_length = Some(value),
            "max_splits" => self.max_splits = Some(value),
            "thread_count" => self.thread_count = Some(value),
            "splits" => self.splits = Some(value),
            "first_split" => self.first_split = Some(value),
            "frames" => self.frames = Some(value),
            "pruned" => self.pruned = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "cost" => self.cost = Some(value),
            "pi" => self.pi = Some(value),
            "tracker_cost" => self.tracker_cost = Some(value),
            "baseline_cost" => self.baseline_cost = Some(value),
            "ratio" => self.ratio = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "feasible" {
            self.feasible = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "bounder" => self.bounder = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "sweep_start" => format_sweep_start(v),
        "split_count_end" => format_split_count_end(v),
        "sweep_end" => format_sweep_end(v),
        "policy_end" => format_policy_end(v),
        "unit_end" => format_unit_end(v, level),
        "improvement" => format_improvement(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(c) if c.is_finite() => format!("${:.6}", c).bright_green().to_string(),
        _ => "infeasible".bright_red().to_string(),
    }
}

fn format_sweep_start(v: &EventVisitor) -> String {
    mark_sweep_start();
    let length = v.sequence_length.unwrap_or(0);
    let max_splits = v.max_splits.unwrap_or(0);
    let threads = v.thread_count.unwrap_or(0);
    let bounder = v.bounder.as_deref().unwrap_or("Unknown");

    format!(
        "{} {} Sweeping │ {} positions │ 1..={} splits │ {} workers │ {} bound",
        format_elapsed(),
        "▶".bright_green().bold(),
        length.to_formatted_string(&Locale::en).bright_yellow(),
        max_splits.to_formatted_string(&Locale::en).bright_yellow(),
        threads.to_formatted_string(&Locale::en).bright_yellow(),
        bounder.white().bold(),
    )
}

fn format_split_count_end(v: &EventVisitor) -> String {
    let splits = v.splits.unwrap_or(0);
    let frames = v.frames.unwrap_or(0);
    let pruned = v.pruned.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);
    let cost = if v.feasible == Some(false) {
        None
    } else {
        v.cost
    };

    let mut output = format!(
        "{} {} N = {:>3} │ {} │ {} frames │ {} pruned │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        splits,
        format_cost(cost),
        frames.to_formatted_string(&Locale::en).white(),
        pruned.to_formatted_string(&Locale::en).bright_magenta(),
        format_duration_ms(duration).yellow(),
    );

    if let Some(ref assignment) = v.assignment {
        if cost.is_some() {
            output.push_str(&format!(" │ splits {}", assignment));
        }
    }

    output
}

fn format_sweep_end(v: &EventVisitor) -> String {
    let splits = v.splits.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);
    let assignment = v.assignment.as_deref().unwrap_or("[]");

    let mut output = format!(
        "{} {} Sweep complete │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(duration).yellow(),
    );

    output.push_str("\n\n");
    output.push_str(&format!(
        "  {:<16}{}\n",
        "Optimal N:",
        splits.to_string().bright_white().bold()
    ));
    output.push_str(&format!("  {:<16}{}\n", "Cost:", format_cost(v.cost)));
    output.push_str(&format!("  {:<16}{}\n", "Splits:", assignment));

    output
}

fn format_policy_end(v: &EventVisitor) -> String {
    format!(
        "{} {} π = {:<5} │ tracker {} │ baseline {} │ ratio {}",
        format_elapsed(),
        "◆".bright_magenta(),
        v.pi.unwrap_or(0.0),
        format_cost(v.tracker_cost),
        format_cost(v.baseline_cost),
        format!("{:.3}", v.ratio.unwrap_or(0.0)).bright_yellow().bold(),
    )
}

fn format_unit_end(v: &EventVisitor, level: Level) -> String {
    if level != Level::DEBUG {
        return String::new();
    }

    format!(
        "{}   first split {:>5} │ {} frames │ best {}",
        format_elapsed(),
        v.first_split.unwrap_or(0),
        v.frames.unwrap_or(0).to_formatted_string(&Locale::en),
        format_cost(v.cost),
    )
    .bright_black()
    .to_string()
}

fn format_improvement(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{}     {} N = {} │ {} │ {}",
        format_elapsed(),
        "↓".bright_green(),
        v.splits.unwrap_or(0),
        format_cost(v.cost),
        v.assignment.as_deref().unwrap_or("[]"),
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_default_directives_target_crates() {
        let filter = EnvFilter::try_new(DEFAULT_DIRECTIVES).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        for directive in DEFAULT_DIRECTIVES.split(',') {
            assert!(directive.starts_with("cachesplit"));
        }
        assert!(DEFAULT_DIRECTIVES.contains("cachesplit_solver=info"));
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1_500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_unknown_event_is_silent() {
        let visitor = EventVisitor {
            event: Some("phase_start".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::INFO).is_empty());
    }

    #[test]
    fn test_infeasible_cost() {
        assert!(format_cost(Some(f64::INFINITY)).contains("infeasible"));
        assert!(format_cost(None).contains("infeasible"));
        assert!(format_cost(Some(0.5)).contains("0.500000"));
    }

    #[test]
    fn test_split_count_line() {
        let visitor = EventVisitor {
            event: Some("split_count_end".to_string()),
            splits: Some(3),
            feasible: Some(true),
            cost: Some(0.000123),
            assignment: Some("[4, 9, 20]".to_string()),
            ..EventVisitor::default()
        };
        let line = format_event(&visitor, Level::INFO);
        assert!(line.contains("N =   3"));
        assert!(line.contains("[4, 9, 20]"));
    }

    #[test]
    fn test_trace_only_events_hidden_at_info() {
        let visitor = EventVisitor {
            event: Some("improvement".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::INFO).is_empty());
        assert!(!format_event(&visitor, Level::TRACE).is_empty());
    }
}
