use serde::Deserialize;

use crate::core::{AppError, Result};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw offset/limit query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Validated page bounds, applied before any store query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    /// Reject negative bounds and clamp `limit` to `max_limit`
    pub fn new(offset: i64, limit: i64, max_limit: i64) -> Result<Self> {
        if offset < 0 {
            return Err(AppError::invalid_argument(format!(
                "offset must be non-negative, got {}",
                offset
            )));
        }
        if limit < 0 {
            return Err(AppError::invalid_argument(format!(
                "limit must be non-negative, got {}",
                limit
            )));
        }

        let offset = u32::try_from(offset)
            .map_err(|_| AppError::invalid_argument("offset is too large"))?;
        // max_limit comes from validated config, so it always fits
        let limit = limit.min(max_limit).min(i64::from(u32::MAX)) as u32;

        Ok(Self { offset, limit })
    }
}
