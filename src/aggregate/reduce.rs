//! Full reduction of sale events to `(hour, article)` totals.

use std::collections::BTreeMap;

use crate::domain::{AggregateRecord, HourKey, SaleEvent};

/// Sum `price` per `(hour, article)`.
///
/// Output is ordered by hour, then article, so identical input always yields an
/// identical file. A total that overflows to a non-finite value is an error.
pub fn reduce(events: &[SaleEvent]) -> Result<Vec<AggregateRecord>, String> {
    let mut groups: BTreeMap<(HourKey, &str), f64> = BTreeMap::new();
    for ev in events {
        *groups
            .entry((HourKey::from_datetime(ev.hour), ev.article.as_str()))
            .or_insert(0.0) += ev.price;
    }

    groups
        .into_iter()
        .map(|((key, article), total_sales)| {
            if !total_sales.is_finite() {
                return Err(format!("total for '{article}' in {key} is not finite ({total_sales})"));
            }
            Ok(AggregateRecord {
                formatted_date: key.formatted(),
                article: article.to_string(),
                total_sales,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::parse_timestamp;

    fn ev(ts: &str, article: &str, price: f64) -> SaleEvent {
        SaleEvent {
            hour: crate::domain::truncate_to_hour(parse_timestamp(ts).unwrap()),
            article: article.to_string(),
            price,
        }
    }

    #[test]
    fn groups_by_hour_and_article() {
        let events = vec![
            ev("2024-11-20 14:01:00", "B", 1.0),
            ev("2024-11-20 14:59:59", "A", 2.0),
            ev("2024-11-20 14:30:00", "B", 3.0),
            ev("2024-11-20 14:10:00", "A", 4.5),
        ];
        let out = reduce(&events).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].article, "A");
        assert_eq!(out[0].formatted_date, "2024/11/20 14");
        assert!((out[0].total_sales - 6.5).abs() < 1e-12);
        assert_eq!(out[1].article, "B");
        assert!((out[1].total_sales - 4.0).abs() < 1e-12);
    }

    #[test]
    fn preserves_total_and_distinct_pairs() {
        let events = vec![
            ev("2024-11-20 14:00:00", "A", 1.25),
            ev("2024-11-20 14:00:00", "A", 1.25),
            ev("2024-11-20 15:00:00", "A", 7.0),
            ev("2024-11-20 14:00:00", "C", 0.5),
        ];
        let out = reduce(&events).unwrap();
        assert_eq!(out.len(), 3);
        let sum_in: f64 = events.iter().map(|e| e.price).sum();
        let sum_out: f64 = out.iter().map(|r| r.total_sales).sum();
        assert!((sum_in - sum_out).abs() < 1e-9);
    }

    #[test]
    fn empty_input_reduces_to_nothing() {
        assert!(reduce(&[]).unwrap().is_empty());
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let events = vec![
            ev("2024-11-20 14:00:00", "A", 1e308),
            ev("2024-11-20 14:10:00", "A", 1e308),
            ev("2024-11-20 14:20:00", "B", 1.0),
        ];
        let err = reduce(&events).unwrap_err();
        assert!(err.contains("'A'"), "{err}");
        assert!(err.contains("2024112014"), "{err}");
    }
}
