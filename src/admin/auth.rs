//! Reset authorization.

use crate::error::AppError;
use crate::http::params::Param;

/// Check a `token` query parameter against the configured reset secret.
///
/// With no secret configured every token is rejected.
pub fn authorize_reset(token: Param<'_>, secret: Option<&str>) -> Result<(), AppError> {
    let token = match token {
        Param::Single(token) if !token.is_empty() => token,
        _ => return Err(AppError::unauthorized("Invalid or missing reset token")),
    };

    match secret {
        Some(secret) if !secret.is_empty() && secret == token => Ok(()),
        _ => Err(AppError::unauthorized("Invalid reset token")),
    }
}
