//! Span timing for the search entry points.
//!
//! Enable with `--features instrumentation`. The searches open a `tracing` span for every call
//! to `evaluate` and every depth pass; [`TimingLayer`] aggregates how often each span ran and for
//! how long.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use thread_local::ThreadLocal;
use tracing::span;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Calls and total nanoseconds per span name, kept per thread so searches on different threads
/// never contend.
static TIMINGS: Lazy<ThreadLocal<Mutex<HashMap<&'static str, (u64, u64)>>>> =
    Lazy::new(ThreadLocal::new);

/// Aggregated timing of one span name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanTiming {
    pub name: &'static str,
    pub calls: u64,
    pub total: Duration,
}

impl SpanTiming {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            return Duration::default();
        }
        self.total / self.calls as u32
    }
}

/// Layer that records the time spent inside every span.
pub struct TimingLayer;

impl<S> Layer<S> for TimingLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Instant::now());
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        let span = match ctx.span(id) {
            Some(span) => span,
            None => return,
        };
        let start = match span.extensions_mut().remove::<Instant>() {
            Some(start) => start,
            None => return,
        };
        let elapsed = start.elapsed().as_nanos() as u64;
        let cell = TIMINGS.get_or(|| Mutex::new(HashMap::new()));
        if let Ok(mut timings) = cell.lock() {
            let entry = timings.entry(span.name()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += elapsed;
        }
    }
}

/// Installs a global subscriber with the timing layer.
///
/// With `RUST_LOG` unset or `off`, every span is timed silently. Any other value also prints
/// span events filtered by `RUST_LOG`.
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    let filter = std::env::var("RUST_LOG").unwrap_or_default();
    if filter.is_empty() || filter == "off" {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(TimingLayer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(false)
            .compact();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(TimingLayer)
            .with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Timings gathered on every thread so far, longest total first.
pub fn timing_statistics() -> Vec<SpanTiming> {
    let mut aggregated: HashMap<&'static str, (u64, u64)> = HashMap::new();
    for cell in TIMINGS.iter() {
        if let Ok(timings) = cell.lock() {
            for (&name, &(calls, nanos)) in timings.iter() {
                let entry = aggregated.entry(name).or_insert((0, 0));
                entry.0 += calls;
                entry.1 += nanos;
            }
        }
    }
    let mut statistics: Vec<SpanTiming> = aggregated
        .into_iter()
        .map(|(name, (calls, nanos))| SpanTiming {
            name,
            calls,
            total: Duration::from_nanos(nanos),
        })
        .collect();
    statistics.sort_by_key(|timing| Reverse(timing.total));
    statistics
}

/// Prints [`timing_statistics`] as a table on stderr.
pub fn print_timing_statistics() {
    let statistics = timing_statistics();
    if statistics.is_empty() {
        eprintln!("\nNo timing data collected.");
        return;
    }

    eprintln!("\n{:=<80}", "");
    eprintln!("Search timings (sorted by total time)");
    eprintln!("{:=<80}", "");
    eprintln!(
        "{:<40} {:>12} {:>12} {:>12}",
        "Span", "Calls", "Total (ms)", "Avg (µs)"
    );
    eprintln!("{:-<80}", "");
    for timing in &statistics {
        eprintln!(
            "{:<40} {:>12} {:>12.2} {:>12.2}",
            timing.name,
            timing.calls,
            timing.total.as_secs_f64() * 1_000.0,
            timing.average().as_secs_f64() * 1_000_000.0
        );
    }
    eprintln!("{:-<80}", "");
}
