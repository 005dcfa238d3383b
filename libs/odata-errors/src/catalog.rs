//! Static error definitions

use crate::problem::Problem;
use http::StatusCode;

/// One catalog entry: everything about an error except the occurrence detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    #[must_use]
    pub const fn new(
        status: u16,
        title: &'static str,
        code: &'static str,
        type_url: &'static str,
    ) -> Self {
        Self {
            status,
            title,
            code,
            type_url,
        }
    }

    /// Status as a typed `StatusCode`; unknown codes degrade to 500.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Build a `Problem` for one occurrence of this error.
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(self.status_code(), self.title, detail)
            .with_code(self.code)
            .with_type(self.type_url)
    }
}
