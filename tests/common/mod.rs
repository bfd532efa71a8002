#![allow(dead_code)]

use chrono::NaiveDate;
pub use rulebt::domain::bar::Bar;
use rulebt::domain::signal::SignalSeries;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A bar whose open/high/low bracket the given close.
pub fn make_bar(day: &str, close: f64) -> Bar {
    Bar {
        date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Daily bars starting 2024-01-01, flat OHLC at each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn signals_at(len: usize, entries: &[usize], exits: &[usize]) -> SignalSeries {
    let mut entry = vec![false; len];
    let mut exit = vec![false; len];
    for &i in entries {
        entry[i] = true;
    }
    for &i in exits {
        exit[i] = true;
    }
    SignalSeries { entry, exit }
}
