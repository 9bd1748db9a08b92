use thiserror::Error;

/// Error taxonomy shared across the agent (spec §7).
///
/// `Config` and `Invariant` are fatal — surfaced only during bootstrap.
/// `Transport`, `Chain` and `UnknownAsset` are recoverable: once the
/// scheduler is running, callers log these and continue rather than
/// propagating them out of a task.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("chain error: {0}")]
    Chain(String),

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type OracleResult<T> = Result<T, OracleError>;
