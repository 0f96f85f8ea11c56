use chrono::{Duration, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    config::SAMPLE_PERIOD_SECS,
    db::{helpers::CLOCK_FORMAT, NewLogRow},
};

const ANOMALY_HIGH_PROBABILITY: f64 = 0.05;
const ANOMALY_LOW_PROBABILITY: f64 = 0.10;

pub const COMMENT_NORMAL: &str = "Normal mode";
pub const COMMENT_SPIKE: &str = "Anomalous value";
pub const COMMENT_DROP: &str = "Temperature drop";

/// Endless stream of plausible readings for demos and tests.
///
/// Readings are spaced one sampling period apart. Reactor temperature wanders ±2.5 °C
/// around the base, vapor follows at half of it ±1 °C. Each reading independently has a
/// 5 % chance of a spike (+5..15 °C) and a 10 % chance of a drop (−5..10 °C).
pub struct RunGenerator {
    time: NaiveTime,
    base_temp: f64,
    rng: StdRng,
}

impl RunGenerator {
    pub fn seeded(start: NaiveTime, base_temp: f64, seed: u64) -> Self {
        Self::with_rng(start, base_temp, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(start: NaiveTime, base_temp: f64, rng: StdRng) -> Self {
        Self {
            time: start,
            base_temp,
            rng,
        }
    }
}

impl Iterator for RunGenerator {
    type Item = NewLogRow;

    fn next(&mut self) -> Option<Self::Item> {
        let mut reactor = self.base_temp + self.rng.gen_range(-2.5..=2.5);
        let vapor = reactor * 0.5 + self.rng.gen_range(-1.0..=1.0);

        // One draw decides the band so the two anomaly kinds never overlap.
        let roll: f64 = self.rng.gen();
        let comment = if roll < ANOMALY_HIGH_PROBABILITY {
            reactor += self.rng.gen_range(5.0..=15.0);
            COMMENT_SPIKE
        } else if roll < ANOMALY_HIGH_PROBABILITY + ANOMALY_LOW_PROBABILITY {
            reactor -= self.rng.gen_range(5.0..=10.0);
            COMMENT_DROP
        } else {
            COMMENT_NORMAL
        };

        let row = NewLogRow {
            time: self.time.format(CLOCK_FORMAT).to_string(),
            reactor: round2(reactor),
            vapor: round2(vapor),
            comment: comment.to_string(),
        };
        self.time += Duration::seconds(SAMPLE_PERIOD_SECS);
        Some(row)
    }
}

/// Collect `points` readings starting at `start`.
pub fn generate_rows(start: NaiveTime, points: usize, base_temp: f64, rng: StdRng) -> Vec<NewLogRow> {
    RunGenerator::with_rng(start, base_temp, rng).take(points).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_spaced_one_period_apart() {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let rows: Vec<NewLogRow> = RunGenerator::seeded(start, 245.0, 7).take(5).collect();
        let times: Vec<&str> = rows.iter().map(|r| r.time.as_str()).collect();
        assert_eq!(times, vec!["08:00:00", "08:00:15", "08:00:30", "08:00:45", "08:01:00"]);
    }

    #[test]
    fn clock_wraps_past_midnight() {
        let start = NaiveTime::from_hms_opt(23, 59, 45).unwrap();
        let rows: Vec<NewLogRow> = RunGenerator::seeded(start, 245.0, 7).take(2).collect();
        assert_eq!(rows[1].time, "00:00:00");
    }

    #[test]
    fn values_stay_within_their_bands() {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        for row in RunGenerator::seeded(start, 245.0, 42).take(2000) {
            let expected = match row.comment.as_str() {
                COMMENT_SPIKE => 245.0 - 2.5 + 5.0..=245.0 + 2.5 + 15.0,
                COMMENT_DROP => 245.0 - 2.5 - 10.0..=245.0 + 2.5 - 5.0,
                COMMENT_NORMAL => 245.0 - 2.5..=245.0 + 2.5,
                other => panic!("unexpected comment {other}"),
            };
            assert!(
                expected.contains(&row.reactor),
                "{} outside {expected:?} for {}",
                row.reactor,
                row.comment
            );
            assert!((row.vapor - 122.5).abs() <= 1.25 + 1.0 + 0.01);
            assert_eq!(row.reactor, round2(row.reactor));
        }
    }

    #[test]
    fn anomaly_rates_match_disjoint_bands() {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let rows: Vec<NewLogRow> = RunGenerator::seeded(start, 235.0, 1).take(20_000).collect();
        let rate = |comment: &str| {
            rows.iter().filter(|r| r.comment == comment).count() as f64 / rows.len() as f64
        };
        assert!((rate(COMMENT_SPIKE) - 0.05).abs() < 0.01);
        assert!((rate(COMMENT_DROP) - 0.10).abs() < 0.015);
    }

    #[test]
    fn generate_rows_takes_the_requested_count() {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let rows = generate_rows(start, 12, 245.0, StdRng::seed_from_u64(9));
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[11].time, "08:02:45");
        assert!(generate_rows(start, 0, 245.0, StdRng::seed_from_u64(9)).is_empty());
    }

    #[test]
    fn same_seed_same_run() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let a: Vec<NewLogRow> = RunGenerator::seeded(start, 235.0, 3).take(50).collect();
        let b: Vec<NewLogRow> = RunGenerator::seeded(start, 235.0, 3).take(50).collect();
        assert_eq!(a, b);
    }
}
