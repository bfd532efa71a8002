//! CSV file data adapter.
//!
//! Reads a `date,open,high,low,close,volume` file into a bar sequence,
//! sorted by date. Duplicate dates are rejected so the loaded sequence
//! always has strictly increasing timestamps.

use crate::domain::bar::Bar;
use crate::domain::error::RulebtError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvFileAdapter {
    path: PathBuf,
}

impl CsvFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn parse_column<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<T, RulebtError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| RulebtError::Data {
        reason: format!("row {}: missing {} column", row, name),
    })?;
    raw.trim().parse::<T>().map_err(|e| RulebtError::Data {
        reason: format!("row {}: invalid {} value '{}': {}", row, name, raw, e),
    })
}

impl DataPort for CsvFileAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, RulebtError> {
        let content = fs::read_to_string(&self.path).map_err(|e| RulebtError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| RulebtError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| RulebtError::Data {
                reason: format!("row {}: missing date column", row),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                    RulebtError::Data {
                        reason: format!("row {}: invalid date '{}': {}", row, date_str, e),
                    }
                })?;

            bars.push(Bar {
                date,
                open: parse_column(&record, 1, "open", row)?,
                high: parse_column(&record, 2, "high", row)?,
                low: parse_column(&record, 3, "low", row)?,
                close: parse_column(&record, 4, "close", row)?,
                volume: parse_column(&record, 5, "volume", row)?,
            });
        }

        bars.sort_by_key(|b| b.date);

        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(RulebtError::Data {
                    reason: format!("duplicate date {}", pair[0].date),
                });
            }
        }

        Ok(bars)
    }
}
