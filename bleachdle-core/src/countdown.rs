use chrono::{DateTime, FixedOffset, TimeZone};
use std::time::Duration;

/// Period of the countdown timer
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

pub const COUNTDOWN_FINISHED: &str = "00:00:00";

/// Start of the next calendar day in `now`'s offset.
pub fn next_local_midnight(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    now.date_naive()
        .succ_opt()
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
        .and_then(|midnight| now.offset().from_local_datetime(&midnight).single())
        .unwrap_or(now)
}

/// Zero-padded `HH:MM:SS`. Zero or negative input renders as `00:00:00`.
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let total_ms = remaining.num_milliseconds();
    if total_ms <= 0 {
        return COUNTDOWN_FINISHED.to_string();
    }

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTick {
    pub display: String,
    pub finished: bool,
}

/// Countdown to a fixed target, chosen once when the puzzle is solved.
#[derive(Debug, Clone)]
pub struct Countdown {
    target: DateTime<FixedOffset>,
    finished: bool,
}

impl Countdown {
    pub fn until(target: DateTime<FixedOffset>) -> Self {
        Self {
            target,
            finished: false,
        }
    }

    pub fn until_next_midnight(now: DateTime<FixedOffset>) -> Self {
        Self::until(next_local_midnight(now))
    }

    pub fn target(&self) -> DateTime<FixedOffset> {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// One timer firing. Returns `None` once the countdown has stopped.
    pub fn tick(&mut self, now: DateTime<FixedOffset>) -> Option<CountdownTick> {
        if self.finished {
            return None;
        }

        let remaining = self.target.signed_duration_since(now);
        if remaining.num_milliseconds() <= 0 {
            self.finished = true;
            tracing::debug!("Countdown reached {}", self.target);
            return Some(CountdownTick {
                display: COUNTDOWN_FINISHED.to_string(),
                finished: true,
            });
        }

        Some(CountdownTick {
            display: format_remaining(remaining),
            finished: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 10, h, m, s)
            .unwrap()
    }

    #[test]
    fn test_next_midnight_same_offset() {
        let midnight = next_local_midnight(at(18, 30, 0));
        assert_eq!(
            midnight,
            FixedOffset::east_opt(2 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 11, 0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_next_midnight_from_midnight_is_a_day_away() {
        let midnight = next_local_midnight(at(0, 0, 0));
        assert_eq!(midnight.signed_duration_since(at(0, 0, 0)).num_hours(), 24);
    }

    #[test]
    fn test_format_remaining_pads() {
        assert_eq!(format_remaining(chrono::Duration::seconds(5)), "00:00:05");
        assert_eq!(format_remaining(chrono::Duration::seconds(3 * 3600 + 7 * 60 + 9)), "03:07:09");
        assert_eq!(format_remaining(chrono::Duration::milliseconds(59_999)), "00:00:59");
        assert_eq!(format_remaining(chrono::Duration::hours(24)), "24:00:00");
    }

    #[test]
    fn test_format_remaining_never_negative() {
        assert_eq!(format_remaining(chrono::Duration::zero()), "00:00:00");
        assert_eq!(format_remaining(chrono::Duration::seconds(-42)), "00:00:00");
    }

    #[test]
    fn test_countdown_ticks_then_stops() {
        let mut countdown = Countdown::until_next_midnight(at(23, 59, 58));

        let tick = countdown.tick(at(23, 59, 59)).unwrap();
        assert_eq!(tick.display, "00:00:01");
        assert!(!tick.finished);

        let tick = countdown
            .tick(at(23, 59, 59) + chrono::Duration::seconds(1))
            .unwrap();
        assert_eq!(tick.display, "00:00:00");
        assert!(tick.finished);
        assert!(countdown.is_finished());

        // Stopped timers never fire again
        assert!(countdown.tick(at(23, 59, 59) + chrono::Duration::seconds(2)).is_none());
    }

    #[test]
    fn test_countdown_past_target() {
        let mut countdown = Countdown::until(at(12, 0, 0));
        let tick = countdown.tick(at(13, 0, 0)).unwrap();
        assert_eq!(tick.display, "00:00:00");
        assert!(tick.finished);
    }
}
