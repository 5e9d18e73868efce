//! Weekly chart aggregation for income/expense records.
//!
//! Everything in here is a pure transform over a snapshot of records the
//! caller fetched elsewhere. Malformed input never errors: records that a
//! step cannot use are skipped, non-numeric amounts count as zero, and the
//! moving-average window shrinks at the start of the series.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use models::{ChartPoint, Record, WeekBucket};

/// Trailing window used for the moving-average line (current week plus up
/// to two preceding ones).
pub const MOVING_AVG_WINDOW: usize = 3;

/// Rows shown per page in the records table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Returns the Monday on or before `date` (ISO week, week starts Monday).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Parses the leading `YYYY-MM-DD` portion of a record's date string.
///
/// The backend usually sends plain dates but has been seen sending full
/// timestamps; anything beyond the first ten characters is ignored.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Selects the records feeding the chart.
///
/// `currency` is an exact-match code; `date_fragment` is a literal
/// substring tested against the raw date string (the month picker sends
/// e.g. "2025-01"). Either filter may be absent. Original relative order
/// is preserved. A record missing the filtered field is excluded only
/// while that filter is active.
pub fn filter_records(
    records: &[Record],
    currency: Option<&str>,
    date_fragment: Option<&str>,
) -> Vec<Record> {
    records
        .iter()
        .filter(|record| {
            let currency_ok = match currency {
                Some(code) => record.currency.as_deref() == Some(code),
                None => true,
            };
            let date_ok = match date_fragment {
                Some(fragment) => record
                    .date
                    .as_deref()
                    .map(|d| d.contains(fragment))
                    .unwrap_or(false),
                None => true,
            };
            currency_ok && date_ok
        })
        .cloned()
        .collect()
}

/// Accumulates record amounts into Monday-aligned weekly buckets.
///
/// One bucket per distinct week start, ascending by date. Weeks with no
/// records are omitted rather than emitted as zero. Records whose date is
/// missing or unparsable are skipped; non-finite amounts count as zero.
pub fn group_by_week(records: &[Record]) -> Vec<WeekBucket> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records {
        let Some(day) = record.date.as_deref().and_then(parse_day) else {
            continue;
        };
        let amount = if record.amount.is_finite() {
            record.amount
        } else {
            0.0
        };
        *totals.entry(week_start(day)).or_insert(0.0) += amount;
    }

    totals
        .into_iter()
        .map(|(week_start, total)| WeekBucket { week_start, total })
        .collect()
}

/// Attaches the trailing moving average to an ascending bucket sequence.
///
/// Point `i` averages the totals over `[max(0, i-2), i]`; the window never
/// looks ahead. Output has the same order and length as the input.
pub fn with_moving_average(buckets: &[WeekBucket]) -> Vec<ChartPoint> {
    buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let window = &buckets[i.saturating_sub(MOVING_AVG_WINDOW - 1)..=i];
            let moving_avg =
                window.iter().map(|b| b.total).sum::<f64>() / window.len() as f64;
            ChartPoint {
                week_start: bucket.week_start,
                total: bucket.total,
                moving_avg,
            }
        })
        .collect()
}

/// Full chart pipeline: filter, bucket by week, attach the moving average.
pub fn weekly_chart_points(
    records: &[Record],
    currency: Option<&str>,
    date_fragment: Option<&str>,
) -> Vec<ChartPoint> {
    let filtered = filter_records(records, currency, date_fragment);
    with_moving_average(&group_by_week(&filtered))
}

/// Free-text column filters for the records table. An unset or empty
/// pattern leaves its column unfiltered, matching a cleared search box.
#[derive(Debug, Default, Clone)]
pub struct TableFilters {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub note: Option<String>,
}

impl TableFilters {
    fn matches(&self, record: &Record) -> bool {
        if let Some(pattern) = active(&self.date) {
            let hit = record
                .date
                .as_deref()
                .map(|d| d.contains(pattern))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if let Some(pattern) = active(&self.amount) {
            // Matched against the displayed number, not the raw payload.
            if !format_amount(record.amount).contains(pattern) {
                return false;
            }
        }
        if let Some(pattern) = active(&self.currency) {
            let hit = record
                .currency
                .as_deref()
                .map(|c| c.to_lowercase().contains(&pattern.to_lowercase()))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if let Some(pattern) = active(&self.note) {
            let hit = record
                .note
                .as_deref()
                .map(|n| n.to_lowercase().contains(&pattern.to_lowercase()))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn active(pattern: &Option<String>) -> Option<&str> {
    pattern.as_deref().filter(|p| !p.is_empty())
}

fn format_amount(amount: f64) -> String {
    format!("{}", amount)
}

/// Applies every active column filter, preserving order.
pub fn filter_table(records: &[Record], filters: &TableFilters) -> Vec<Record> {
    records
        .iter()
        .filter(|record| filters.matches(record))
        .cloned()
        .collect()
}

/// Returns the 1-based `page` of `rows`. Out-of-range pages (including
/// page 0) yield an empty slice.
pub fn paginate<T>(rows: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + per_page).min(rows.len());
    &rows[start..end]
}

/// Number of pages needed for `len` rows, rounding up.
pub fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    len.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: f64, currency: &str, date: &str) -> Record {
        Record {
            id: None,
            amount,
            currency: Some(currency.to_string()),
            date: Some(date.to_string()),
            note: None,
            category: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_start_aligns_to_monday() {
        // 2025-01-06 is a Monday; the following Sunday still maps to it.
        assert_eq!(week_start(date("2025-01-06")), date("2025-01-06"));
        assert_eq!(week_start(date("2025-01-09")), date("2025-01-06"));
        assert_eq!(week_start(date("2025-01-12")), date("2025-01-06"));
        assert_eq!(week_start(date("2025-01-13")), date("2025-01-13"));
    }

    #[test]
    fn test_filter_by_currency_and_month() {
        let records = vec![
            record(10.0, "USD", "2025-01-06"),
            record(20.0, "GBP", "2025-01-07"),
            record(30.0, "USD", "2025-02-01"),
            record(40.0, "USD", "2025-01-20"),
        ];

        let filtered = filter_records(&records, Some("USD"), Some("2025-01"));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].amount, 10.0);
        assert_eq!(filtered[1].amount, 40.0);
    }

    #[test]
    fn test_filter_excludes_missing_fields_only_when_active() {
        let mut no_currency = record(10.0, "USD", "2025-01-06");
        no_currency.currency = None;
        let mut no_date = record(20.0, "USD", "2025-01-07");
        no_date.date = None;
        let records = vec![no_currency, no_date];

        assert_eq!(filter_records(&records, None, None).len(), 2);
        assert_eq!(filter_records(&records, Some("USD"), None).len(), 1);
        assert_eq!(filter_records(&records, None, Some("2025-01")).len(), 1);
    }

    #[test]
    fn test_group_by_week_worked_example() {
        let records = vec![
            record(10.0, "GBP", "2025-01-06"),
            record(20.0, "GBP", "2025-01-07"),
            record(5.0, "GBP", "2025-01-13"),
        ];

        let buckets = group_by_week(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].week_start, date("2025-01-06"));
        assert_eq!(buckets[0].total, 30.0);
        assert_eq!(buckets[1].week_start, date("2025-01-13"));
        assert_eq!(buckets[1].total, 5.0);
    }

    #[test]
    fn test_group_by_week_sorted_unique_and_order_invariant() {
        let mut records = vec![
            record(1.0, "GBP", "2025-03-05"),
            record(2.0, "GBP", "2025-01-06"),
            record(3.0, "GBP", "2025-03-03"),
            record(4.0, "GBP", "2025-02-14"),
        ];

        let forward = group_by_week(&records);
        records.reverse();
        let backward = group_by_week(&records);
        assert_eq!(forward, backward);

        for pair in forward.windows(2) {
            assert!(pair[0].week_start < pair[1].week_start);
        }

        let grand_total: f64 = forward.iter().map(|b| b.total).sum();
        assert_eq!(grand_total, 10.0);
    }

    #[test]
    fn test_group_by_week_skips_bad_dates_and_zeroes_bad_amounts() {
        let bad_date = record(100.0, "GBP", "not-a-date");
        let mut missing_date = record(100.0, "GBP", "2025-01-06");
        missing_date.date = None;
        let nan_amount = record(f64::NAN, "GBP", "2025-01-06");
        let good = record(10.0, "GBP", "2025-01-06");

        let buckets = group_by_week(&[bad_date, missing_date, nan_amount, good]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total, 10.0);
    }

    #[test]
    fn test_group_by_week_accepts_timestamp_dates() {
        let buckets = group_by_week(&[record(7.0, "GBP", "2025-01-08T09:30:00")]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].week_start, date("2025-01-06"));
    }

    #[test]
    fn test_moving_average_window_shrinks_at_start() {
        let buckets = vec![
            WeekBucket {
                week_start: date("2025-01-06"),
                total: 30.0,
            },
            WeekBucket {
                week_start: date("2025-01-13"),
                total: 5.0,
            },
            WeekBucket {
                week_start: date("2025-01-20"),
                total: 10.0,
            },
            WeekBucket {
                week_start: date("2025-01-27"),
                total: 21.0,
            },
        ];

        let points = with_moving_average(&buckets);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].moving_avg, 30.0);
        assert_eq!(points[1].moving_avg, 17.5);
        assert_eq!(points[2].moving_avg, 15.0);
        assert_eq!(points[3].moving_avg, 12.0);
    }

    #[test]
    fn test_full_pipeline_matches_worked_example() {
        let records = vec![
            record(10.0, "GBP", "2025-01-06"),
            record(20.0, "GBP", "2025-01-07"),
            record(5.0, "GBP", "2025-01-13"),
        ];

        let points = weekly_chart_points(&records, Some("GBP"), None);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].total, 30.0);
        assert_eq!(points[0].moving_avg, 30.0);
        assert_eq!(points[1].total, 5.0);
        assert_eq!(points[1].moving_avg, 17.5);
    }

    #[test]
    fn test_empty_input_is_empty_at_every_stage() {
        assert!(filter_records(&[], Some("GBP"), Some("2025")).is_empty());
        assert!(group_by_week(&[]).is_empty());
        assert!(with_moving_average(&[]).is_empty());
        assert!(weekly_chart_points(&[], None, None).is_empty());
    }

    #[test]
    fn test_table_filters_substring_and_case_semantics() {
        let mut salary = record(1250.0, "GBP", "2025-01-06");
        salary.note = Some("January Salary".to_string());
        let mut lunch = record(12.5, "gbp", "2025-02-03");
        lunch.note = Some("lunch".to_string());
        let mut unnoted = record(3.0, "USD", "2025-02-04");
        unnoted.note = None;
        let records = vec![salary, lunch, unnoted];

        let by_note = filter_table(
            &records,
            &TableFilters {
                note: Some("SALARY".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_note.len(), 1);
        assert_eq!(by_note[0].amount, 1250.0);

        // Missing note fails an active note filter.
        let by_any_note = filter_table(
            &records,
            &TableFilters {
                note: Some("l".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_any_note.len(), 2);

        let by_currency = filter_table(
            &records,
            &TableFilters {
                currency: Some("GB".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_currency.len(), 2);

        let by_amount = filter_table(
            &records,
            &TableFilters {
                amount: Some("12.5".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_amount.len(), 1);
        assert_eq!(by_amount[0].amount, 12.5);
    }

    #[test]
    fn test_empty_pattern_is_inactive() {
        let records = vec![record(1.0, "GBP", "2025-01-06")];
        let filters = TableFilters {
            note: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_table(&records, &filters).len(), 1);
    }

    #[test]
    fn test_paginate_clamps_and_counts() {
        let rows: Vec<u32> = (0..23).collect();

        assert_eq!(paginate(&rows, 1, DEFAULT_PAGE_SIZE), &rows[0..10]);
        assert_eq!(paginate(&rows, 3, DEFAULT_PAGE_SIZE), &rows[20..23]);
        assert!(paginate(&rows, 4, DEFAULT_PAGE_SIZE).is_empty());
        assert!(paginate(&rows, 0, DEFAULT_PAGE_SIZE).is_empty());
        assert!(paginate::<u32>(&[], 1, DEFAULT_PAGE_SIZE).is_empty());

        assert_eq!(page_count(23, DEFAULT_PAGE_SIZE), 3);
        assert_eq!(page_count(0, DEFAULT_PAGE_SIZE), 0);
        assert_eq!(page_count(10, DEFAULT_PAGE_SIZE), 1);
    }
}
