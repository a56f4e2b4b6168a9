use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("odometer reading is not a whole number: {0}")]
    OdometerParse(String),

    #[error("odometer reading must not be negative: {0}")]
    OdometerNegative(i64),

    #[error("unable to serialize snapshot: {0}")]
    Snapshot(String),
}
