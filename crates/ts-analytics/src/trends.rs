//! Time-windowed trend series

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day in a trend series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub created: i64,
    pub completed: i64,
}

/// Build a dense per-day series over the window ending at `today`
///
/// `created` and `completed` hold sparse per-day counts from the store;
/// days without activity appear with zeros so charts stay contiguous.
pub fn trend_series(
    days: u32,
    today: NaiveDate,
    created: &[(NaiveDate, i64)],
    completed: &[(NaiveDate, i64)],
) -> Vec<TrendPoint> {
    let days = days.max(1) as i64;
    let start = today - Duration::days(days - 1);

    (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset);
            TrendPoint {
                date,
                created: lookup(created, date),
                completed: lookup(completed, date),
            }
        })
        .collect()
}

fn lookup(counts: &[(NaiveDate, i64)], date: NaiveDate) -> i64 {
    counts
        .iter()
        .find(|(d, _)| *d == date)
        .map(|(_, n)| *n)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_window_is_dense() {
        let series = trend_series(7, date(10), &[(date(8), 2)], &[(date(9), 1)]);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, date(4));
        assert_eq!(series[6].date, date(10));

        assert_eq!(series[4], TrendPoint { date: date(8), created: 2, completed: 0 });
        assert_eq!(series[5], TrendPoint { date: date(9), created: 0, completed: 1 });
    }

    #[test]
    fn test_counts_outside_window_ignored() {
        let series = trend_series(3, date(10), &[(date(1), 99)], &[]);
        assert!(series.iter().all(|p| p.created == 0));
    }

    #[test]
    fn test_zero_days_clamps_to_one() {
        let series = trend_series(0, date(10), &[], &[]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, date(10));
    }
}
