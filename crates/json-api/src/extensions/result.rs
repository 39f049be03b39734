//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use tracing::error;

use crate::envelope::ApiError;

/// Map any error to a logged internal server error.
pub(crate) trait ResultExt<T> {
    fn or_500(self, reason: &str) -> Result<T, ApiError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, reason: &str) -> Result<T, ApiError> {
        self.map_err(|error| {
            error!(reason, "{error}");

            ApiError::internal(reason)
        })
    }
}
