use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("{}", utils::errors::NO_WALLET_ADDRESS)]
    MissingAddress,

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Operation failed after {attempts} attempts. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}
