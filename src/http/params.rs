//! Query-string validation for the reporting surface.
//!
//! Validation failures are raised here, before any store is touched.
//! A parameter given more than once is treated as the wrong type.

use url::form_urlencoded;

use crate::error::AppError;
use crate::observability::LogLevel;

/// One query parameter as seen by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param<'a> {
    Missing,
    Single(&'a str),
    Repeated,
}

/// Decoded query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Param<'_> {
        let mut values = self.pairs.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str());
        match (values.next(), values.next()) {
            (None, _) => Param::Missing,
            (Some(value), None) => Param::Single(value),
            (Some(_), Some(_)) => Param::Repeated,
        }
    }
}

/// Optional `level` filter, one of DEBUG/INFO/WARN/ERROR in any case.
pub fn parse_level(params: &QueryParams) -> Result<Option<LogLevel>, AppError> {
    match params.get("level") {
        Param::Missing => Ok(None),
        Param::Repeated => Err(AppError::validation("Log level must be a string")),
        Param::Single(raw) => raw.parse::<LogLevel>().map(Some).map_err(|_| {
            AppError::validation("Invalid log level. Must be one of: DEBUG, INFO, WARN, ERROR")
        }),
    }
}

/// Optional `limit`, an integer in `[1, max]`; `default` when absent.
pub fn parse_limit(params: &QueryParams, default: usize, max: usize) -> Result<usize, AppError> {
    let out_of_range = || AppError::validation(format!("Limit must be a number between 1 and {}", max));
    match params.get("limit") {
        Param::Missing => Ok(default),
        Param::Repeated => Err(AppError::validation("Limit must be a string")),
        Param::Single(raw) => match raw.trim().parse::<i64>() {
            Ok(n) if n >= 1 && (n as u64) <= max as u64 => Ok(n as usize),
            _ => Err(out_of_range()),
        },
    }
}
