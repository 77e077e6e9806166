pub mod error;
pub mod pagination;
pub mod period;

pub use error::{AppError, Result};
pub use pagination::{Page, PageQuery};
pub use period::{ReportCoordinate, ReportPeriod, MAX_YEAR, MIN_YEAR};
