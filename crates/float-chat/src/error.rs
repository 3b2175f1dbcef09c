use thiserror::Error;

/// Failures that can occur while answering a query.
///
/// All variants are recovered inside the pipeline; callers always receive a
/// well-formed envelope. An empty result set is not an error.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("could not resolve place '{0}' to coordinates")]
    PlaceNotResolved(String),
    #[error("no coordinates found in query text")]
    CoordinatesNotParsed,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("inconsistent constraint set: {0}")]
    MalformedConstraint(String),
}
