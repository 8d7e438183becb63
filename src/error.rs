use thiserror::Error;

/// Errors surfaced by the public [`crate::pack`] entry point.
///
/// Internal placement never raises an error: `Bin::place` and
/// `ShelfBin::place` report success or failure as a plain `bool`, and
/// algorithms treat a failed placement as a branch outcome, not a fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("invalid instance: {reason}")]
    InvalidInstance { reason: String },
}

pub type Result<T> = std::result::Result<T, PackError>;
