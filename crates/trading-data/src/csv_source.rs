//! CSV candle source.

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;
use trading_core::error::FeedError;
use trading_core::types::{Candle, Timeframe};
use tracing::info;

use crate::replay::ReplayFeed;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "open_time"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Loads OHLCV rows from a CSV file.
///
/// Headers are matched case-insensitively by common names; the volume
/// column is optional. Rows are sorted by open time and each candle closes
/// one `timeframe` after it opens.
pub struct CsvCandleFeed;

impl CsvCandleFeed {
    /// Load every row of `path` as a candle.
    pub fn load(path: impl AsRef<Path>, timeframe: Timeframe) -> Result<Vec<Candle>, FeedError> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| FeedError::Connection(format!("{}: {}", path.display(), e)))?;

        let mut candles = parse_records(reader, timeframe)?;
        candles.sort_by_key(|c| c.open_time);

        info!(path = %path.display(), candles = candles.len(), "loaded CSV candles");
        Ok(candles)
    }

    /// Build a replay feed over the file's candles.
    pub fn open(path: impl AsRef<Path>, timeframe: Timeframe) -> Result<ReplayFeed, FeedError> {
        let name = format!("csv:{}", path.as_ref().display());
        Ok(ReplayFeed::new(name, Self::load(path, timeframe)?))
    }
}

fn parse_records<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    timeframe: Timeframe,
) -> Result<Vec<Candle>, FeedError> {
    let mut candles = Vec::new();
    for (row, result) in reader.deserialize::<CsvRecord>().enumerate() {
        let record = result.map_err(|e| FeedError::Parse(format!("row {}: {}", row + 1, e)))?;
        let open_time = parse_timestamp(&record.date)?;
        candles.push(Candle::new(
            open_time,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
            open_time + timeframe.as_millis() - 1,
        ));
    }
    Ok(candles)
}

/// Parse a date, datetime or Unix timestamp (seconds or milliseconds).
fn parse_timestamp(date_str: &str) -> Result<i64, FeedError> {
    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    if let Ok(ts) = date_str.parse::<i64>() {
        // Ten digits or fewer is seconds.
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(FeedError::Parse(format!("Could not parse date: {}", date_str)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes())
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(parse_timestamp("1970-01-01 00:01:00").unwrap(), 60_000);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_records() {
        let data = "\
timestamp,Open,High,Low,Close,Volume
60000,100,101,99,100.5,12
120000,100.5,102,100,101.5,8
";
        let candles = parse_records(reader(data), Timeframe::Minute1).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time, 60_000_000);
        assert_eq!(candles[0].close_time, 60_000_000 + 59_999);
        assert_eq!(candles[1].close, 101.5);
        assert_eq!(candles[1].volume, 8.0);
    }

    #[test]
    fn test_missing_volume_defaults_to_zero() {
        let data = "date,open,high,low,close\n2024-01-15,1,2,0.5,1.5\n";
        let candles = parse_records(reader(data), Timeframe::Daily).unwrap();
        assert_eq!(candles[0].volume, 0.0);
    }

    #[test]
    fn test_bad_row_reports_position() {
        let data = "date,open,high,low,close\n2024-01-15,1,2,0.5,oops\n";
        let err = parse_records(reader(data), Timeframe::Daily).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_missing_file() {
        assert!(CsvCandleFeed::load("/nonexistent/candles.csv", Timeframe::Minute1).is_err());
    }
}
