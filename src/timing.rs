// MIT License
// Copyright (c) 2024 Graham King

use std::time::{Duration, Instant};

/// Run `f`, logging how long it took.
pub fn timed<T>(what: &str, f: impl FnOnce() -> T) -> T {
    tracing::info!("{what}...");
    let start = Instant::now();
    let out = f();
    tracing::info!("{what} completed in {}", human(start.elapsed()));
    out
}

pub fn human(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.2} seconds")
    } else {
        let minutes = (secs / 60.0).floor();
        format!("{minutes}m {:.2}s", secs - minutes * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(human(Duration::from_millis(1500)), "1.50 seconds");
        assert_eq!(human(Duration::from_secs(125)), "2m 5.00s");
    }

    #[test]
    fn passes_result_through() {
        assert_eq!(timed("adding", || 2 + 2), 4);
    }
}
