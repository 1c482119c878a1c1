//! Simulation clock.
//!
//! Scene time advances at a configurable multiple of wall time while
//! playing. Wall instants are always passed in by the caller, so tests
//! drive the clock without real waiting.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use tracing::warn;

/// Default refresh period of the active constellation.
pub const DEFAULT_TICK_INTERVAL: StdDuration = StdDuration::from_millis(50);

/// Upper bound on the scene-time rate multiplier.
pub const MAX_TIME_SCALE: f64 = 1000.0;

/// Scene dates are confined to this calendar range.
pub const MIN_SCENE_YEAR: i32 = 2000;
pub const MAX_SCENE_YEAR: i32 = 3000;

/// Two-state (paused/playing) simulated clock.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    scene_time: DateTime<Utc>,
    last_wall_update: DateTime<Utc>,
    time_scale: f64,
    tick_interval: StdDuration,
    playing: bool,
}

impl SimulationClock {
    /// A paused clock whose scene time starts at `wall_now`, real-time
    /// rate, default tick interval.
    pub fn new(wall_now: DateTime<Utc>) -> Self {
        Self {
            scene_time: wall_now,
            last_wall_update: wall_now,
            time_scale: 1.0,
            tick_interval: DEFAULT_TICK_INTERVAL,
            playing: false,
        }
    }

    pub fn scene_time(&self) -> DateTime<Utc> {
        self.scene_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn tick_interval(&self) -> StdDuration {
        self.tick_interval
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance scene time by the scaled wall delta since the previous
    /// update. No effect while paused. Returns true if scene time moved.
    pub fn advance(&mut self, wall_now: DateTime<Utc>) -> bool {
        if !self.playing {
            return false;
        }
        let wall_delta = wall_now.signed_duration_since(self.last_wall_update);
        if wall_delta <= Duration::zero() {
            return false;
        }
        self.last_wall_update = wall_now;

        let scaled_us = (wall_delta.num_microseconds().unwrap_or(i64::MAX) as f64
            * self.time_scale) as i64;
        self.scene_time += Duration::microseconds(scaled_us);
        true
    }

    /// Start playing. Resets the wall reference to `wall_now` so the next
    /// `advance` measures from resume time, not from when pause began.
    pub fn play(&mut self, wall_now: DateTime<Utc>) {
        self.playing = true;
        self.last_wall_update = wall_now;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Change the rate without touching scene time. Non-positive factors
    /// are rejected; factors above [`MAX_TIME_SCALE`] are capped.
    pub fn set_time_scale(&mut self, factor: f64) {
        if !(factor > 0.0) {
            warn!("ignoring non-positive time scale {}", factor);
            return;
        }
        self.time_scale = factor.min(MAX_TIME_SCALE);
    }

    /// Store a new refresh period. The periodic scheduler is owned by the
    /// host, which must stop and restart its timer to apply this; the
    /// clock never hot-swaps a running interval.
    pub fn set_tick_interval(&mut self, interval: StdDuration) {
        self.tick_interval = interval;
    }

    /// Jump scene time to `instant`, clamped to the supported calendar
    /// range. The wall reference is untouched; rate and play state keep
    /// their values.
    pub fn set_scene_time(&mut self, instant: DateTime<Utc>) {
        self.scene_time = clamp_scene_time(instant);
    }
}

fn clamp_scene_time(instant: DateTime<Utc>) -> DateTime<Utc> {
    if instant.year() < MIN_SCENE_YEAR {
        Utc.with_ymd_and_hms(MIN_SCENE_YEAR, 1, 1, 0, 0, 0).unwrap()
    } else if instant.year() > MAX_SCENE_YEAR {
        Utc.with_ymd_and_hms(MAX_SCENE_YEAR, 12, 31, 23, 59, 59).unwrap()
    } else {
        instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = SimulationClock::new(wall(0));
        assert!(!clock.advance(wall(10)));
        assert_eq!(clock.scene_time(), wall(0));
    }

    #[test]
    fn playing_clock_advances_at_scale() {
        let mut clock = SimulationClock::new(wall(0));
        clock.set_time_scale(60.0);
        clock.play(wall(0));

        assert!(clock.advance(wall(2)));
        assert_eq!(clock.scene_time(), wall(0) + Duration::seconds(120));
    }

    #[test]
    fn scene_time_delta_is_scaled_wall_delta() {
        // Several ticks: total scene delta == scale * total wall delta.
        let mut clock = SimulationClock::new(wall(0));
        clock.set_time_scale(10.0);
        clock.play(wall(0));

        let start = clock.scene_time();
        for s in 1..=5 {
            clock.advance(wall(s));
        }
        let scene_delta = clock.scene_time().signed_duration_since(start);
        assert_eq!(scene_delta, Duration::seconds(50));
    }

    #[test]
    fn resume_does_not_jump_over_the_pause() {
        let mut clock = SimulationClock::new(wall(0));
        clock.play(wall(0));
        clock.advance(wall(5));
        clock.pause();

        // A long pause, then resume: the next advance only measures from
        // the resume instant.
        clock.play(wall(1000));
        clock.advance(wall(1001));
        assert_eq!(clock.scene_time(), wall(6));
    }

    #[test]
    fn scene_time_is_monotonic_while_playing() {
        let mut clock = SimulationClock::new(wall(0));
        clock.play(wall(0));
        let mut previous = clock.scene_time();
        for s in 1..=20 {
            clock.advance(wall(s));
            assert!(clock.scene_time() >= previous);
            previous = clock.scene_time();
        }
    }

    #[test]
    fn time_scale_is_capped_and_positive() {
        let mut clock = SimulationClock::new(wall(0));
        clock.set_time_scale(5000.0);
        assert_eq!(clock.time_scale(), MAX_TIME_SCALE);

        clock.set_time_scale(-3.0);
        assert_eq!(clock.time_scale(), MAX_TIME_SCALE);

        clock.set_time_scale(0.5);
        assert_eq!(clock.time_scale(), 0.5);
    }

    #[test]
    fn scene_time_clamps_to_calendar_range() {
        let mut clock = SimulationClock::new(wall(0));

        clock.set_scene_time(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(clock.scene_time().year(), MIN_SCENE_YEAR);

        clock.set_scene_time(Utc.with_ymd_and_hms(3120, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(clock.scene_time().year(), MAX_SCENE_YEAR);

        let in_range = Utc.with_ymd_and_hms(2150, 6, 1, 0, 0, 0).unwrap();
        clock.set_scene_time(in_range);
        assert_eq!(clock.scene_time(), in_range);
    }

    #[test]
    fn rate_change_keeps_scene_time() {
        let mut clock = SimulationClock::new(wall(0));
        clock.play(wall(0));
        clock.advance(wall(3));
        let before = clock.scene_time();
        clock.set_time_scale(100.0);
        assert_eq!(clock.scene_time(), before);
    }
}
