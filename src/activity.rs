use crate::models::TransactionRecord;
use crate::summary::{BiggestDay, DailyActivity, MonthlyActivity};
use crate::window::{TimeWindow, epoch_zero};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Calendar-based activity statistics derived from the native stream.
#[derive(Debug, Clone, Default)]
pub struct ActivityMetrics {
    pub active_days: usize,
    pub longest_streak_days: u32,
    pub biggest_day: Option<BiggestDay>,
    pub most_active_months: Vec<MonthlyActivity>,
    pub daily_activity: Vec<DailyActivity>,
    pub first_tx_date: Option<String>,
    pub last_tx_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct DayBucket {
    count: u64,
    volume_usd: f64,
}

/// Per-day buckets in first-seen order. The order is what makes the
/// biggest-day tie-break reproducible: when counts tie, the day whose first
/// transaction appeared earliest in the record stream wins, which is not
/// necessarily the chronologically earliest day.
#[derive(Debug, Default)]
struct DayBuckets {
    by_date: HashMap<NaiveDate, DayBucket>,
    order: Vec<NaiveDate>,
}

impl DayBuckets {
    fn add(&mut self, date: NaiveDate, volume_usd: f64) {
        let bucket = match self.by_date.entry(date) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(date);
                entry.insert(DayBucket::default())
            }
        };
        bucket.count += 1;
        bucket.volume_usd += volume_usd;
    }

    fn iter_first_seen(&self) -> impl Iterator<Item = (NaiveDate, DayBucket)> + '_ {
        self.order.iter().map(|date| (*date, self.by_date[date]))
    }
}

fn heatmap_level(count: u64) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=10 => 3,
        _ => 4,
    }
}

fn longest_streak(dates: &mut Vec<NaiveDate>) -> u32 {
    if dates.is_empty() {
        return 0;
    }
    dates.sort();

    let mut longest = 1u32;
    let mut current = 1u32;
    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

/// Compute all calendar metrics for the window.
///
/// An empty input yields zeroed metrics with empty month and heatmap lists,
/// not a zero-filled year. That asymmetry is part of the output contract the
/// presentation layer relies on.
pub fn calculate_activity_metrics(
    transactions: &[TransactionRecord],
    window: &TimeWindow,
    avax_usd_price: f64,
) -> ActivityMetrics {
    if transactions.is_empty() {
        return ActivityMetrics::default();
    }

    let mut days = DayBuckets::default();
    let mut months: [DayBucket; 12] = [DayBucket::default(); 12];
    let mut first_seen = transactions[0].timestamp;
    let mut last_seen = transactions[0].timestamp;

    for tx in transactions {
        if tx.timestamp == epoch_zero() {
            continue;
        }

        let date = tx.timestamp.date_naive();
        let volume_usd = tx.value_avax() * avax_usd_price;

        days.add(date, volume_usd);

        let month = months
            .get_mut(date.month0() as usize)
            .expect("month index in range");
        month.count += 1;
        month.volume_usd += volume_usd;

        if tx.timestamp < first_seen {
            first_seen = tx.timestamp;
        }
        if tx.timestamp > last_seen {
            last_seen = tx.timestamp;
        }
    }

    let active_days = days.by_date.len();

    let mut sorted_dates: Vec<NaiveDate> = days.by_date.keys().copied().collect();
    let longest_streak_days = longest_streak(&mut sorted_dates);

    // Strictly-greater comparison over first-seen order.
    let mut biggest_day: Option<BiggestDay> = None;
    for (date, bucket) in days.iter_first_seen() {
        let is_bigger = biggest_day
            .as_ref()
            .map(|b| bucket.count > b.tx_count)
            .unwrap_or(true);
        if is_bigger {
            biggest_day = Some(BiggestDay {
                date: date.to_string(),
                tx_count: bucket.count,
                volume_usd: bucket.volume_usd,
            });
        }
    }

    let most_active_months = (1..=12u32)
        .map(|month| {
            let bucket = months[(month - 1) as usize];
            MonthlyActivity {
                month,
                tx_count: bucket.count,
                volume_usd: bucket.volume_usd,
            }
        })
        .collect();

    // Full-year heatmap: every day of the year zero-initialized, then actual
    // counts overlaid.
    let daily_activity = window
        .days()
        .into_iter()
        .map(|date| {
            let count = days.by_date.get(&date).map(|b| b.count).unwrap_or(0);
            DailyActivity {
                date: date.to_string(),
                count,
                level: heatmap_level(count),
            }
        })
        .collect();

    ActivityMetrics {
        active_days,
        longest_streak_days,
        biggest_day,
        most_active_months,
        daily_activity,
        first_tx_date: Some(first_seen.to_rfc3339()),
        last_tx_date: Some(last_seen.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use chrono::{TimeZone, Utc};

    const PRICE: f64 = 50.0;

    fn tx_at(iso: &str, value_avax: u64) -> TransactionRecord {
        TransactionRecord {
            hash: format!("0x{iso}"),
            timestamp: iso.parse().unwrap(),
            from: None,
            to: None,
            value: U256::from(value_avax) * U256::from(10u64).pow(U256::from(18u64)),
            gas_used: U256::ZERO,
            gas_price: U256::ZERO,
        }
    }

    #[test]
    fn test_empty_input_contract_exception() {
        let window = TimeWindow::for_year(2025);
        let metrics = calculate_activity_metrics(&[], &window, PRICE);
        assert_eq!(metrics.active_days, 0);
        assert_eq!(metrics.longest_streak_days, 0);
        assert!(metrics.biggest_day.is_none());
        assert!(metrics.most_active_months.is_empty());
        assert!(metrics.daily_activity.is_empty());
        assert!(metrics.first_tx_date.is_none());
    }

    #[test]
    fn test_single_day_metrics() {
        let window = TimeWindow::for_year(2025);
        let txs = vec![tx_at("2025-03-10T08:00:00Z", 2)];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);

        assert_eq!(metrics.active_days, 1);
        assert_eq!(metrics.longest_streak_days, 1);
        let biggest = metrics.biggest_day.unwrap();
        assert_eq!(biggest.date, "2025-03-10");
        assert_eq!(biggest.tx_count, 1);
        assert_eq!(biggest.volume_usd, 100.0);
    }

    #[test]
    fn test_streak_counts_consecutive_days_and_resets_on_gap() {
        let window = TimeWindow::for_year(2025);
        let txs = vec![
            tx_at("2025-01-01T01:00:00Z", 0),
            tx_at("2025-01-02T01:00:00Z", 0),
            tx_at("2025-01-03T01:00:00Z", 0),
            // gap
            tx_at("2025-01-10T01:00:00Z", 0),
            tx_at("2025-01-11T01:00:00Z", 0),
        ];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        assert_eq!(metrics.active_days, 5);
        assert_eq!(metrics.longest_streak_days, 3);
    }

    #[test]
    fn test_heatmap_covers_full_year_sorted() {
        let window = TimeWindow::for_year(2025);
        let txs = vec![tx_at("2025-07-04T12:00:00Z", 1)];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);

        assert_eq!(metrics.daily_activity.len(), 365);
        assert_eq!(metrics.daily_activity[0].date, "2025-01-01");
        assert_eq!(metrics.daily_activity[364].date, "2025-12-31");
        assert!(
            metrics
                .daily_activity
                .windows(2)
                .all(|pair| pair[0].date < pair[1].date)
        );

        let active: Vec<_> = metrics
            .daily_activity
            .iter()
            .filter(|d| d.count > 0)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].date, "2025-07-04");
        assert_eq!(active[0].level, 1);
    }

    #[test]
    fn test_heatmap_leap_year_length() {
        let window = TimeWindow::for_year(2024);
        let txs = vec![tx_at("2024-02-29T12:00:00Z", 0)];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        assert_eq!(metrics.daily_activity.len(), 366);
    }

    #[test]
    fn test_heatmap_level_thresholds() {
        assert_eq!(heatmap_level(0), 0);
        assert_eq!(heatmap_level(1), 1);
        assert_eq!(heatmap_level(2), 1);
        assert_eq!(heatmap_level(3), 2);
        assert_eq!(heatmap_level(5), 2);
        assert_eq!(heatmap_level(6), 3);
        assert_eq!(heatmap_level(10), 3);
        assert_eq!(heatmap_level(11), 4);
        assert_eq!(heatmap_level(500), 4);
    }

    #[test]
    fn test_biggest_day_tie_keeps_first_seen() {
        let window = TimeWindow::for_year(2025);
        // The later calendar day shows up first in the stream; on a count tie
        // it must win.
        let txs = vec![
            tx_at("2025-09-20T10:00:00Z", 0),
            tx_at("2025-02-01T10:00:00Z", 0),
        ];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        assert_eq!(metrics.biggest_day.unwrap().date, "2025-09-20");
    }

    #[test]
    fn test_biggest_day_strictly_greater_wins() {
        let window = TimeWindow::for_year(2025);
        let txs = vec![
            tx_at("2025-09-20T10:00:00Z", 0),
            tx_at("2025-02-01T10:00:00Z", 0),
            tx_at("2025-02-01T11:00:00Z", 0),
        ];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        let biggest = metrics.biggest_day.unwrap();
        assert_eq!(biggest.date, "2025-02-01");
        assert_eq!(biggest.tx_count, 2);
    }

    #[test]
    fn test_monthly_buckets_always_twelve_when_active() {
        let window = TimeWindow::for_year(2025);
        let txs = vec![tx_at("2025-05-05T00:00:00Z", 1)];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        assert_eq!(metrics.most_active_months.len(), 12);
        assert_eq!(metrics.most_active_months[4].month, 5);
        assert_eq!(metrics.most_active_months[4].tx_count, 1);
        assert_eq!(metrics.most_active_months[0].tx_count, 0);
    }

    #[test]
    fn test_epoch_zero_records_excluded() {
        let window = TimeWindow::for_year(2025);
        let mut bad = tx_at("2025-05-05T00:00:00Z", 1);
        bad.timestamp = Utc.timestamp_opt(0, 0).unwrap();
        let txs = vec![tx_at("2025-05-06T00:00:00Z", 1), bad];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        assert_eq!(metrics.active_days, 1);
    }

    #[test]
    fn test_active_days_not_exceeding_tx_count() {
        let window = TimeWindow::for_year(2025);
        let txs = vec![
            tx_at("2025-05-05T00:00:00Z", 0),
            tx_at("2025-05-05T01:00:00Z", 0),
            tx_at("2025-05-06T00:00:00Z", 0),
        ];
        let metrics = calculate_activity_metrics(&txs, &window, PRICE);
        assert_eq!(metrics.active_days, 2);
        assert!(metrics.active_days <= txs.len());
    }
}
