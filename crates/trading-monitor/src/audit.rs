//! CSV audit trail.

use async_trait::async_trait;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use trading_core::error::AuditError;
use trading_core::traits::AuditSink;
use trading_core::types::ExecutionRecord;
use tracing::debug;

const HEADER: [&str; 7] = [
    "timestamp",
    "symbol",
    "side",
    "quantity",
    "price",
    "quote_balance",
    "base_balance",
];

/// Appends one row per recorded order to a CSV file.
///
/// The header is written only when the file is new or empty, so restarts
/// keep appending to the same trail. Writes and flushes run on tokio's
/// blocking pool.
pub struct CsvAuditLog {
    path: PathBuf,
    writer: Arc<Mutex<csv::Writer<File>>>,
}

impl CsvAuditLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            writer.write_record(HEADER).map_err(csv_error)?;
            writer.flush()?;
        }

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(writer)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for CsvAuditLog {
    async fn record(&self, record: &ExecutionRecord) -> Result<(), AuditError> {
        let row = [
            record.timestamp.to_rfc3339(),
            record.symbol.clone(),
            record.side.to_string(),
            record.quantity.to_string(),
            record.price.to_string(),
            record.quote_balance.to_string(),
            record.base_balance.to_string(),
        ];
        let writer = Arc::clone(&self.writer);

        tokio::task::spawn_blocking(move || -> Result<(), AuditError> {
            let mut writer = writer.blocking_lock();
            writer.write_record(&row).map_err(csv_error)?;
            writer.flush()?;
            Ok(())
        })
        .await
        .map_err(|err| AuditError::Io(std::io::Error::other(err)))??;

        debug!(path = %self.path.display(), side = %record.side, "audit record written");
        Ok(())
    }
}

/// Audit sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLog;

#[async_trait]
impl AuditSink for NullAuditLog {
    async fn record(&self, _record: &ExecutionRecord) -> Result<(), AuditError> {
        Ok(())
    }
}

fn csv_error(err: csv::Error) -> AuditError {
    AuditError::Csv(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trading_core::types::{AccountSnapshot, Order, Side};

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("audit-{}.csv", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_header_and_rows() {
        let path = temp_path();
        let log = CsvAuditLog::open(&path).unwrap();

        let order = Order::new("BTCUSDT", Side::Sell, dec!(0.5));
        let record = ExecutionRecord::new(&order, dec!(90), AccountSnapshot::new(dec!(1045), dec!(0.5)));
        log.record(&record).await.unwrap();
        log.record(&ExecutionRecord::new(&Order::hold("BTCUSDT"), dec!(91), AccountSnapshot::default()))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,symbol,side,quantity,price,quote_balance,base_balance");
        assert!(lines[1].ends_with(",BTCUSDT,SELL,0.5,90,1045,0.5"));
        assert!(lines[2].contains(",HOLD,0,91,"));

        std::fs::remove_file(path).ok();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_records_all_land() {
        let path = temp_path();
        let log = Arc::new(CsvAuditLog::open(&path).unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let order = Order::new("BTCUSDT", Side::Buy, dec!(1));
                    let record = ExecutionRecord::new(&order, Decimal::from(100 + i), AccountSnapshot::default());
                    log.record(&record).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 9);
        for i in 0..8 {
            assert!(contents.contains(&format!(",BUY,1,{},", 100 + i)));
        }

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_reopen_appends_without_header() {
        let path = temp_path();
        let record = ExecutionRecord::new(&Order::hold("BTCUSDT"), dec!(1), AccountSnapshot::default());

        CsvAuditLog::open(&path).unwrap().record(&record).await.unwrap();
        CsvAuditLog::open(&path).unwrap().record(&record).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert_eq!(contents.matches("timestamp,symbol").count(), 1);

        std::fs::remove_file(path).ok();
    }
}
