//! Frame timing over a rolling window

use std::time::{Duration, Instant};

use crate::RingBuffer;

pub struct FrameTimer {
    frame_start: Instant,
    frame_times: RingBuffer<Duration>,
}

impl FrameTimer {
    /// Track the last `window` frames (at least one).
    pub fn new(window: usize) -> Self {
        Self {
            frame_start: Instant::now(),
            frame_times: RingBuffer::new(window),
        }
    }

    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    pub fn end(&mut self) {
        self.push(self.frame_start.elapsed());
    }

    pub fn push(&mut self, frame_time: Duration) {
        self.frame_times.push(frame_time);
    }

    pub fn average(&self) -> Duration {
        self.frame_times.average()
    }

    pub fn fps(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.average().as_secs_f64() * 1000.0
    }

    pub fn frame_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.frame_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rolls_over() {
        let mut timer = FrameTimer::new(3);
        timer.push(Duration::from_millis(10));
        assert_eq!(timer.average(), Duration::from_millis(10));

        timer.push(Duration::from_millis(20));
        timer.push(Duration::from_millis(30));
        assert_eq!(timer.average(), Duration::from_millis(20));

        // 10ms drops out
        timer.push(Duration::from_millis(40));
        assert_eq!(timer.average(), Duration::from_millis(30));
        assert_eq!(timer.frame_time_range_ms(), (20.0, 40.0));
    }

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new(0);
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.frame_time_ms(), 0.0);
        assert_eq!(timer.frame_time_range_ms(), (0.0, 0.0));
    }
}
