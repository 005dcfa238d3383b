//! Mapping from paging errors to Problem (pure data)
//!
//! Bad-request categories keep the error message as the detail. Internal
//! errors get a generic detail so property names of a misused placeholder
//! never reach the client; the full error is logged instead.

use odata_errors::Problem;

use crate::errors::for_category;
use crate::{Error, ErrorCategory};

impl From<Error> for Problem {
    fn from(err: Error) -> Self {
        let category = err.category();
        let def = for_category(category);
        match category {
            ErrorCategory::Internal => {
                tracing::warn!(error = %err, "internal paging error mapped to problem");
                def.as_problem("An internal error occurred while paging the result set")
            }
            _ => def.as_problem(err.to_string()),
        }
    }
}
