use std::io::{self, Write};
use std::time::Instant;

use pvs::ProgressSink;
use pvs::log::info;

/// Shows build progress, either redrawn on a single terminal line or as
/// occasional log lines
pub struct BuildProgress {
    start: Instant,
    live: bool,
    drawn: bool,
}

impl BuildProgress {
    pub fn new(live: bool) -> Self {
        Self {
            start: Instant::now(),
            live,
            drawn: false,
        }
    }
}

/// Percent done, seconds elapsed and the estimated seconds remaining
fn estimate(current: usize, total: usize, elapsed: f32) -> (f32, f32) {
    let progress = if total > 0 {
        (current as f32 / total as f32) * 100.0
    } else {
        100.0
    };
    let remaining_time = if progress > 0.0 {
        elapsed * (100.0 - progress) / progress
    } else {
        0.0
    };
    (progress, remaining_time)
}

impl ProgressSink for BuildProgress {
    fn update(&mut self, current: usize, total: usize) {
        let elapsed = self.start.elapsed().as_secs_f32();
        let (progress, remaining_time) = estimate(current, total, elapsed);

        if self.live {
            print!(
                "\rPVS: {:.1}% | Time: {:.1}s | ETA: {:.1}s",
                progress, elapsed, remaining_time,
            );
            // A failed flush only loses a progress frame
            let _ = io::stdout().flush();
            self.drawn = true;
        } else {
            info!("PVS: {}/{} portals ({:.1}%)", current, total, progress);
        }
    }

    fn finish(&mut self) {
        if self.drawn {
            println!();
        }
    }
}
