use thiserror::Error;

/// Failure to obtain a completion from the generation service.
///
/// None of these are retried; the message is shown to the user in place of a
/// recipe.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode service response: {0}")]
    Decode(String),
    #[error("service response contained no message")]
    EmptyResponse,
    #[error("generation stopped unexpectedly")]
    Aborted,
}
