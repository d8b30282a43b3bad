//! Error types for the trading system.

use thiserror::Error;

/// Top-level trading system error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Price feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),
}

/// Price feed errors.
///
/// Every variant means "no tick" for the pipeline: the cycle is skipped and
/// the candle window is left untouched.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed candle: {0}")]
    Malformed(String),

    #[error("Out-of-order candle: open time {open_time} precedes {last_open_time}")]
    OutOfOrder { open_time: i64, last_open_time: i64 },

    #[error("Feed exhausted")]
    Exhausted,
}

/// Errors raised by the execution and balance collaborators.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Insufficient {asset}: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Audit trail errors. Never fatal to the pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}

/// Result type alias for trading operations.
pub type TradingResult<T> = Result<T, TradingError>;
