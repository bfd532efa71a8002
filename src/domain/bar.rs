//! OHLCV bar representation.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// One of the five named series a rule can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl SeriesField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "open" => Some(SeriesField::Open),
            "high" => Some(SeriesField::High),
            "low" => Some(SeriesField::Low),
            "close" => Some(SeriesField::Close),
            "volume" => Some(SeriesField::Volume),
            _ => None,
        }
    }

    pub fn of(&self, bar: &Bar) -> f64 {
        match self {
            SeriesField::Open => bar.open,
            SeriesField::High => bar.high,
            SeriesField::Low => bar.low,
            SeriesField::Close => bar.close,
            SeriesField::Volume => bar.volume as f64,
        }
    }
}

impl fmt::Display for SeriesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeriesField::Open => "open",
            SeriesField::High => "high",
            SeriesField::Low => "low",
            SeriesField::Close => "close",
            SeriesField::Volume => "volume",
        };
        write!(f, "{}", name)
    }
}
