//! Input size caps for `$orderby`, `$skiptoken` and page sizes.
//!
//! - Maximum `$orderby` text length and clause count
//! - Maximum `$skiptoken` text length
//! - Default and maximum page size

use serde::{Deserialize, Serialize};

use crate::Error;

/// Limits applied while parsing query clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryLimits {
    /// Maximum `$orderby` length in bytes (default: 1024)
    pub max_orderby_length: usize,
    /// Maximum number of `$orderby` clauses, counted before de-duplication (default: 10)
    pub max_orderby_fields: usize,
    /// Maximum `$skiptoken` length in bytes (default: 4096)
    pub max_skiptoken_length: usize,
    /// Page size used when the caller does not ask for one (default: 25)
    pub default_page_size: usize,
    /// Largest page a caller may ask for (default: 1000)
    pub max_page_size: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_orderby_length: 1024,
            max_orderby_fields: 10,
            max_skiptoken_length: 4096,
            default_page_size: 25,
            max_page_size: 1000,
        }
    }
}

impl QueryLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_orderby_length(mut self, max: usize) -> Self {
        self.max_orderby_length = max;
        self
    }

    #[must_use]
    pub fn with_max_orderby_fields(mut self, max: usize) -> Self {
        self.max_orderby_fields = max;
        self
    }

    #[must_use]
    pub fn with_max_skiptoken_length(mut self, max: usize) -> Self {
        self.max_skiptoken_length = max;
        self
    }

    /// Set default and maximum page size together.
    #[must_use]
    pub fn with_page_sizes(mut self, default: usize, max: usize) -> Self {
        self.default_page_size = default;
        self.max_page_size = max;
        self
    }

    /// Validate `$orderby` text length.
    ///
    /// # Errors
    /// Returns `Error::LimitExceeded` when the text is too long.
    pub fn validate_orderby_length(&self, text: &str) -> Result<(), Error> {
        if text.len() > self.max_orderby_length {
            return Err(Error::LimitExceeded(format!(
                "orderby expression exceeds maximum length of {} characters",
                self.max_orderby_length
            )));
        }
        Ok(())
    }

    /// Validate number of `$orderby` clauses.
    ///
    /// # Errors
    /// Returns `Error::LimitExceeded` when there are too many clauses.
    pub fn validate_orderby_count(&self, count: usize) -> Result<(), Error> {
        if count > self.max_orderby_fields {
            return Err(Error::LimitExceeded(format!(
                "too many orderby fields (max: {})",
                self.max_orderby_fields
            )));
        }
        Ok(())
    }

    /// Validate `$skiptoken` text length.
    ///
    /// # Errors
    /// Returns `Error::LimitExceeded` when the token is too long.
    pub fn validate_skiptoken_length(&self, token: &str) -> Result<(), Error> {
        if token.len() > self.max_skiptoken_length {
            return Err(Error::LimitExceeded(format!(
                "skiptoken exceeds maximum length of {} characters",
                self.max_skiptoken_length
            )));
        }
        Ok(())
    }

    /// Resolve the requested page size, falling back to the default.
    ///
    /// # Errors
    /// Returns `Error::InvalidPageSize` for zero or for sizes above the maximum.
    pub fn validate_page_size(&self, requested: Option<usize>) -> Result<usize, Error> {
        let size = requested.unwrap_or(self.default_page_size);
        if size == 0 || size > self.max_page_size {
            return Err(Error::InvalidPageSize {
                requested: size,
                max: self.max_page_size,
            });
        }
        Ok(size)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = QueryLimits::default();
        assert_eq!(limits.max_orderby_length, 1024);
        assert_eq!(limits.max_orderby_fields, 10);
        assert_eq!(limits.max_skiptoken_length, 4096);
        assert_eq!(limits.default_page_size, 25);
        assert_eq!(limits.max_page_size, 1000);
    }

    #[test]
    fn test_orderby_limits() {
        let limits = QueryLimits::new()
            .with_max_orderby_length(8)
            .with_max_orderby_fields(2);

        assert!(limits.validate_orderby_length("ShipName").is_ok());
        assert!(matches!(
            limits.validate_orderby_length("ShipName asc"),
            Err(Error::LimitExceeded(_))
        ));
        assert!(limits.validate_orderby_count(2).is_ok());
        assert!(limits.validate_orderby_count(3).is_err());
    }

    #[test]
    fn test_skiptoken_limit() {
        let limits = QueryLimits::new().with_max_skiptoken_length(4);

        assert!(limits.validate_skiptoken_length("1, 2").is_ok());
        let err = limits.validate_skiptoken_length("1, 23").unwrap_err();
        assert!(err.to_string().contains("skiptoken exceeds maximum length of 4"));
    }

    #[test]
    fn test_page_size() {
        let limits = QueryLimits::new().with_page_sizes(10, 50);

        assert_eq!(limits.validate_page_size(None).unwrap(), 10);
        assert_eq!(limits.validate_page_size(Some(50)).unwrap(), 50);
        assert_eq!(
            limits.validate_page_size(Some(51)),
            Err(Error::InvalidPageSize {
                requested: 51,
                max: 50
            })
        );
        assert!(limits.validate_page_size(Some(0)).is_err());
    }
}
