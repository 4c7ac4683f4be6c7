// Range slider playback: a window over an ordered dimension that advances on a timer
//
// Nothing here owns a thread or a timer. The host asks `is_due(now)` / calls
// `tick_at(now)` from its own loop, so a tick can never race a user gesture.

use serde::Serialize;
use std::time::{Duration, Instant};

pub const DEFAULT_RATE_MS: u64 = 100;

/// Inclusive window of slider positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliderRange {
    pub begin: usize,
    pub end: usize,
}

impl SliderRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn width(&self) -> usize {
        self.end - self.begin + 1
    }
}

#[derive(Debug, Clone)]
pub struct RangeSlider {
    range_min: usize,
    range_max: usize,
    current: SliderRange,
    default_range: SliderRange,
    playing: bool,
    resume_on_release: bool,
    rate: Duration,
    next_tick: Option<Instant>,
}

impl RangeSlider {
    /// A slider over `range_min..=range_max`, starting collapsed on `range_min`.
    pub fn new(range_min: usize, range_max: usize) -> Self {
        let (range_min, range_max) = (range_min.min(range_max), range_min.max(range_max));
        Self {
            range_min,
            range_max,
            current: SliderRange::new(range_min, range_min),
            default_range: SliderRange::new(range_min, range_max),
            playing: false,
            resume_on_release: false,
            rate: Duration::from_millis(DEFAULT_RATE_MS),
            next_tick: None,
        }
    }

    pub fn with_rate(mut self, rate: Duration) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_default_range(mut self, begin: usize, end: usize) -> Self {
        self.default_range = SliderRange::new(
            begin.min(end).max(self.range_min),
            begin.max(end).min(self.range_max),
        );
        self
    }

    pub fn range(&self) -> SliderRange {
        self.current
    }

    pub fn default_range(&self) -> SliderRange {
        self.default_range
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.range_min, self.range_max)
    }

    pub fn rate(&self) -> Duration {
        self.rate
    }

    /// Set both ends. The ends are ordered, then clamped to the bounds.
    pub fn set_range(&mut self, begin: usize, end: usize) -> SliderRange {
        let (mut lower, mut upper) = (begin.min(end), begin.max(end));
        if lower < self.range_min || upper > self.range_max {
            log::warn!(
                "slider range ({},{}) is outside of bounds ({},{}); clamping",
                lower,
                upper,
                self.range_min,
                self.range_max
            );
            lower = lower.max(self.range_min);
            upper = upper.min(self.range_max);
        }
        self.current = SliderRange::new(lower, upper);
        self.current
    }

    /// Move the window so it starts at `begin`, keeping its width.
    pub fn shift_to(&mut self, begin: usize) -> SliderRange {
        let span = self.current.end - self.current.begin;
        let mut lower = begin.max(self.range_min);
        if lower != begin {
            log::warn!("slider start {} is below {}; clamping", begin, self.range_min);
        }
        if lower + span > self.range_max {
            log::warn!(
                "slider window ({},{}) runs past {}; clamping",
                lower,
                lower + span,
                self.range_max
            );
            lower = self.range_max.saturating_sub(span).max(self.range_min);
        }
        let upper = (lower + span).min(self.range_max);
        self.current = SliderRange::new(lower, upper);
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playing; the first tick is due immediately. Starting twice only
    /// updates the rate.
    pub fn start_playing(&mut self, rate: Option<Duration>) {
        if let Some(rate) = rate {
            self.rate = rate;
        }
        if self.playing {
            return;
        }
        self.playing = true;
        self.next_tick = None;
    }

    pub fn stop_playing(&mut self) {
        self.playing = false;
        self.next_tick = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.playing && self.next_tick.map_or(true, |due| now >= due)
    }

    /// Advance one frame if playing. Returns the new range, or `None` when
    /// the slider is stopped.
    ///
    /// The step is the smaller of a tenth of the window and a hundredth of the
    /// whole span, rounded up. A step that would overrun the end is shortened
    /// to land on it, and playback stops there.
    pub fn tick(&mut self) -> Option<SliderRange> {
        if !self.playing {
            return None;
        }

        let limit_width = self.range_max - self.range_min + 1;
        let window = self.current.width();
        let mut delta = window.div_ceil(10).min(limit_width.div_ceil(100));

        if self.current.end + delta > self.range_max {
            delta = self.range_max - self.current.end;
            self.stop_playing();
        }

        Some(self.set_range(self.current.begin + delta, self.current.end + delta))
    }

    /// Timer-driven tick: only advances when a frame is due at `now`.
    pub fn tick_at(&mut self, now: Instant) -> Option<SliderRange> {
        if !self.is_due(now) {
            return None;
        }
        let range = self.tick();
        if self.playing {
            self.next_tick = Some(now + self.rate);
        }
        range
    }

    /// Dragging pauses playback until the drag ends.
    pub fn begin_drag(&mut self) {
        self.resume_on_release = self.playing;
        self.playing = false;
    }

    pub fn end_drag(&mut self) {
        if self.resume_on_release {
            self.resume_on_release = false;
            self.start_playing(None);
        }
    }

    /// Clicking the bar centres the window on `position` and stops playback.
    pub fn click(&mut self, position: usize) -> SliderRange {
        self.stop_playing();
        self.resume_on_release = false;
        let half = (self.current.end - self.current.begin) / 2;
        self.shift_to(position.saturating_sub(half))
    }

    /// Reset: stop, then go back to a one-step window (exclusive dimensions)
    /// or to the default range.
    pub fn reset(&mut self, exclusive: bool) -> SliderRange {
        self.stop_playing();
        self.resume_on_release = false;
        if exclusive {
            self.set_range(0, 1)
        } else {
            self.set_range(self.default_range.begin, self.default_range.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_range_orders_and_clamps() {
        let mut slider = RangeSlider::new(0, 20);
        assert_eq!(slider.set_range(8, 3), SliderRange::new(3, 8));
        assert_eq!(slider.set_range(5, 40), SliderRange::new(5, 20));
    }

    #[test]
    fn test_shift_keeps_width() {
        let mut slider = RangeSlider::new(0, 20);
        slider.set_range(2, 6);
        assert_eq!(slider.shift_to(10), SliderRange::new(10, 14));
        assert_eq!(slider.shift_to(18), SliderRange::new(16, 20));
    }

    #[test]
    fn test_playback_terminates_at_max() {
        let max = 50;
        let mut slider = RangeSlider::new(0, max);
        slider.set_range(0, max - 3);
        slider.start_playing(None);

        let mut ticks = 0;
        while slider.is_playing() {
            let range = slider.tick().unwrap();
            assert!(range.end <= max);
            ticks += 1;
            assert!(ticks < 100, "playback never stopped");
        }
        assert_eq!(slider.range().end, max);
        assert!(!slider.is_playing());
    }

    #[test]
    fn test_tick_step_size() {
        let mut slider = RangeSlider::new(0, 999);
        slider.set_range(0, 49);
        slider.start_playing(None);
        // min(ceil(50/10), ceil(1000/100)) = 5
        assert_eq!(slider.tick(), Some(SliderRange::new(5, 54)));
    }

    #[test]
    fn test_tick_after_stop_is_noop() {
        let mut slider = RangeSlider::new(0, 10);
        slider.start_playing(None);
        slider.stop_playing();
        assert_eq!(slider.tick(), None);
        assert_eq!(slider.range(), SliderRange::new(0, 0));
    }

    #[test]
    fn test_timer_pacing() {
        let mut slider = RangeSlider::new(0, 100).with_rate(Duration::from_millis(100));
        let start = Instant::now();
        slider.start_playing(None);
        assert!(slider.tick_at(start).is_some());
        assert!(slider.tick_at(start + Duration::from_millis(50)).is_none());
        assert!(slider.tick_at(start + Duration::from_millis(100)).is_some());
    }

    #[test]
    fn test_drag_resumes_click_does_not() {
        let mut slider = RangeSlider::new(0, 100);
        slider.start_playing(None);
        slider.begin_drag();
        assert!(!slider.is_playing());
        slider.end_drag();
        assert!(slider.is_playing());

        slider.click(40);
        assert!(!slider.is_playing());
        slider.end_drag();
        assert!(!slider.is_playing());
    }

    #[test]
    fn test_drag_while_stopped_stays_stopped() {
        let mut slider = RangeSlider::new(0, 100);
        slider.begin_drag();
        slider.end_drag();
        assert!(!slider.is_playing());
    }

    #[test]
    fn test_reset() {
        let mut slider = RangeSlider::new(0, 10).with_default_range(2, 5);
        slider.set_range(7, 9);
        slider.start_playing(None);
        assert_eq!(slider.reset(false), SliderRange::new(2, 5));
        assert!(!slider.is_playing());
        assert_eq!(slider.reset(true), SliderRange::new(0, 1));
    }
}
