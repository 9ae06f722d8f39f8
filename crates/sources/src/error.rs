use catalog::{SongId, StoreError, UserId};
use thiserror::Error;

/// Errors surfaced to callers of the recommendation operations.
///
/// An empty result list is never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("Song {0} not found")]
    ItemNotFound(SongId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Upstream store error: {0}")]
    Upstream(String),
}

impl RecommendError {
    /// HTTP-equivalent status for front ends.
    pub fn status_code(&self) -> u16 {
        match self {
            RecommendError::ItemNotFound(_) | RecommendError::UserNotFound(_) => 404,
            RecommendError::Upstream(_) => 500,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RecommendError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            RecommendError::UserNotFound(_) => "USER_NOT_FOUND",
            RecommendError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

impl From<StoreError> for RecommendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SongNotFound(id) => RecommendError::ItemNotFound(id),
            StoreError::UserNotFound(id) => RecommendError::UserNotFound(id),
            StoreError::Unavailable(msg) => RecommendError::Upstream(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_error() {
        let err: RecommendError = StoreError::SongNotFound("x".to_string()).into();
        assert_eq!(err, RecommendError::ItemNotFound("x".to_string()));
        assert_eq!(err.status_code(), 404);

        let err: RecommendError = StoreError::Unavailable("timeout".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), "UPSTREAM_ERROR");
    }
}
