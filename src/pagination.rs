//! Pagination helpers shared by the post listing endpoint.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_STEP: u32 = 10;
pub const MIN_PAGE: u32 = 1;
pub const MIN_STEP: u32 = 1;
pub const MAX_STEP: u32 = 100;

/// Page number and page size as given in the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub step: Option<u32>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub step: u32,
}

impl Pagination {
    /// Fills in defaults and checks the limits.
    pub fn from_query(query: PaginationQuery) -> Result<Self, ApiError> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        let step = query.step.unwrap_or(DEFAULT_STEP);

        if page < MIN_PAGE {
            return Err(ApiError::InvalidRequest(
                "Page number must be greater than 0".to_string(),
            ));
        }
        if !(MIN_STEP..=MAX_STEP).contains(&step) {
            return Err(ApiError::InvalidRequest(format!(
                "Page size must be between {} and {}",
                MIN_STEP, MAX_STEP
            )));
        }

        Ok(Self { page, step })
    }

    /// Rows to skip: `(page - 1) * step`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.step)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            step: DEFAULT_STEP,
        }
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub step: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pagination = Pagination::from_query(PaginationQuery::default()).unwrap();
        assert_eq!(pagination, Pagination::default());
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_offset() {
        let pagination = Pagination { page: 3, step: 20 };
        assert_eq!(pagination.offset(), 40);
    }

    #[test]
    fn test_rejects_page_zero() {
        let query = PaginationQuery {
            page: Some(0),
            step: None,
        };
        assert!(matches!(
            Pagination::from_query(query),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_step_limits() {
        for step in [0, 101] {
            let query = PaginationQuery {
                page: None,
                step: Some(step),
            };
            assert!(Pagination::from_query(query).is_err());
        }

        let query = PaginationQuery {
            page: Some(2),
            step: Some(100),
        };
        assert_eq!(
            Pagination::from_query(query).unwrap(),
            Pagination { page: 2, step: 100 }
        );
    }
}
