use std::time::Duration;

use serde::Serialize;

/// Per-frame streaming statistics for instrumentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamStats {
    /// Cells in the visible window (including margin).
    pub cells_visible: usize,
    /// Cells whose category came from the cache.
    pub cache_hits: usize,
    /// Cells that had to be sampled this frame.
    pub cache_misses: usize,
    /// Cache entries dropped because they left the window.
    pub cache_evicted: usize,
    /// Cache entries retained after this frame.
    pub cached_cells: usize,
    /// Cells whose sample could not be classified.
    pub anomalies: usize,
    pub frame_time: Duration,
}

impl StreamStats {
    /// Fraction of visible cells served from the cache.
    pub fn hit_rate(&self) -> f64 {
        if self.cells_visible == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.cells_visible as f64
    }
}

/// Ring buffer of recent frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: Vec<Duration>,
    next: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            next: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.next] = dt;
        self.next = (self.next + 1) % self.history.len();
        if self.next == 0 {
            self.filled = true;
        }
    }

    fn samples(&self) -> &[Duration] {
        if self.filled {
            &self.history
        } else {
            &self.history[..self.next]
        }
    }

    pub fn count(&self) -> usize {
        self.samples().len()
    }

    pub fn average(&self) -> Duration {
        let samples = self.samples();
        if samples.is_empty() {
            return Duration::ZERO;
        }
        samples.iter().sum::<Duration>() / samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.samples().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Frames per second implied by the average frame time.
    pub fn fps(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_timer_tracks_history() {
        let mut timer = FrameTimer::new(3);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));

        assert_eq!(timer.count(), 3);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.max(), Duration::from_millis(30));
        assert_eq!(timer.min(), Duration::from_millis(10));
    }

    #[test]
    fn frame_timer_wraps_around() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));

        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(25));
    }

    #[test]
    fn empty_timer_is_zero() {
        let timer = FrameTimer::new(4);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn fps_from_average() {
        let mut timer = FrameTimer::new(4);
        timer.record(Duration::from_millis(20));
        assert!((timer.fps() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn hit_rate() {
        let stats = StreamStats {
            cells_visible: 4,
            cache_hits: 3,
            ..StreamStats::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(StreamStats::default().hit_rate(), 0.0);
    }
}
