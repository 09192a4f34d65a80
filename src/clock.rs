use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// In-game time span covered by a clip, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameClockWindow {
    pub start_sec: u64,
    pub end_sec: u64,
}

impl GameClockWindow {
    pub fn new(start_sec: u64, end_sec: u64) -> Self {
        Self { start_sec, end_sec }
    }

    pub fn start_ms(&self) -> u64 {
        self.start_sec.saturating_mul(1000)
    }

    pub fn end_ms(&self) -> u64 {
        self.end_sec.saturating_mul(1000)
    }

    pub fn start_minute(&self) -> usize {
        (self.start_sec / 60) as usize
    }

    pub fn end_minute(&self) -> usize {
        (self.end_sec / 60) as usize
    }

    pub fn is_inverted(&self) -> bool {
        self.start_sec > self.end_sec
    }

    pub fn contains_ms(&self, timestamp_ms: u64) -> bool {
        self.start_ms() <= timestamp_ms && timestamp_ms <= self.end_ms()
    }
}

/// Builds a window from the clock texts read off the first and last frames of a clip.
///
/// The first two `M:S` readings across both texts, in order, become start and
/// end. An inverted pair is returned as read.
pub fn parse_clock_window(start_text: &str, end_text: &str) -> Result<GameClockWindow> {
    let mut readings = find_clock_readings(start_text).chain(find_clock_readings(end_text));

    let (Some(start_sec), Some(end_sec)) = (readings.next(), readings.next()) else {
        return Err(AnalysisError::ClockParse {
            start_text: start_text.to_string(),
            end_text: end_text.to_string(),
        });
    };

    let window = GameClockWindow::new(start_sec, end_sec);
    if window.is_inverted() {
        tracing::warn!(
            start_sec,
            end_sec,
            start_text,
            end_text,
            "Clock readings produced an inverted window"
        );
    }

    Ok(window)
}

/// Yields every `digits:digits` reading in `text` as seconds, left to right.
pub fn find_clock_readings(text: &str) -> impl Iterator<Item = u64> + '_ {
    ClockReadings {
        bytes: text.as_bytes(),
        position: 0,
    }
}

struct ClockReadings<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl Iterator for ClockReadings<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.position < self.bytes.len() {
            let minutes_start = self.position;
            let minutes_end = digit_run_end(self.bytes, minutes_start);
            if minutes_end == minutes_start {
                self.position += 1;
                continue;
            }

            if self.bytes.get(minutes_end) != Some(&b':') {
                self.position = minutes_end;
                continue;
            }

            let seconds_start = minutes_end + 1;
            let seconds_end = digit_run_end(self.bytes, seconds_start);
            if seconds_end == seconds_start {
                self.position = seconds_start;
                continue;
            }

            self.position = seconds_end;
            let total_seconds = parse_digits(&self.bytes[minutes_start..minutes_end])
                .zip(parse_digits(&self.bytes[seconds_start..seconds_end]))
                .and_then(|(minutes, seconds)| minutes.checked_mul(60)?.checked_add(seconds));
            if total_seconds.is_some() {
                return total_seconds;
            }
            tracing::debug!("Skipping clock reading that overflows the seconds range");
        }

        None
    }
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .position(|byte| !byte.is_ascii_digit())
        .map(|offset| start + offset)
        .unwrap_or(bytes.len())
}

fn parse_digits(digits: &[u8]) -> Option<u64> {
    std::str::from_utf8(digits).ok()?.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{find_clock_readings, parse_clock_window, GameClockWindow};
    use crate::error::AnalysisError;

    #[test]
    fn parses_one_reading_from_each_text() {
        let window = parse_clock_window("15:30", "15:50").expect("Expected a valid window");
        assert_eq!(window, GameClockWindow::new(930, 950));
    }

    #[test]
    fn takes_first_two_readings_across_both_texts() {
        let window = parse_clock_window(
            r#"{"start_time_str": "15:30", "end_time_str": "15:50"}"#,
            "",
        )
        .expect("Expected both readings from the first text");
        assert_eq!(window, GameClockWindow::new(930, 950));

        let window = parse_clock_window("clip starts at 01:05 then 02:00", "03:00")
            .expect("Expected the first two readings to win");
        assert_eq!(window, GameClockWindow::new(65, 120));
    }

    #[test]
    fn fails_when_fewer_than_two_readings_exist() {
        let error = parse_clock_window("15:30", "timer hidden").unwrap_err();
        match error {
            AnalysisError::ClockParse {
                start_text,
                end_text,
            } => {
                assert_eq!(start_text, "15:30");
                assert_eq!(end_text, "timer hidden");
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn keeps_inverted_windows_unmodified() {
        let window = parse_clock_window("16:10", "15:50").expect("Expected a window");
        assert_eq!(window.start_sec, 970);
        assert_eq!(window.end_sec, 950);
        assert!(window.is_inverted());
    }

    #[test]
    fn scans_like_a_leftmost_digit_colon_digit_pattern() {
        let readings: Vec<u64> = find_clock_readings("1:2:3 x: 4: :5 10:07").collect();
        assert_eq!(readings, vec![62, 607]);
    }

    #[test]
    fn derives_minute_buckets_and_millisecond_bounds() {
        let window = GameClockWindow::new(930, 950);
        assert_eq!(window.start_minute(), 15);
        assert_eq!(window.end_minute(), 15);
        assert_eq!(window.start_ms(), 930_000);
        assert_eq!(window.end_ms(), 950_000);
        assert!(window.contains_ms(930_000));
        assert!(window.contains_ms(950_000));
        assert!(!window.contains_ms(950_001));
    }
}
