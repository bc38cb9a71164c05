use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Market data provider error: {0}")]
    Provider(String),
}
