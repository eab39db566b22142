//! The page to display for an internal server error.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// What went wrong and what the user or operator can do about it.
pub struct InternalServerError {
    /// A short summary of the problem.
    pub description: &'static str,
    /// What to do to resolve the problem.
    pub fix: String,
}

impl Default for InternalServerError {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs".to_owned(),
        }
    }
}

impl InternalServerError {
    /// The database connection is held by a request that panicked.
    pub fn database_unavailable() -> Self {
        Self {
            description: "The database is unavailable.",
            fix: "Restart the server and try again.".to_owned(),
        }
    }

    /// The configured timezone is not one we know of.
    pub fn invalid_timezone(timezone: &str) -> Self {
        Self {
            description: "Invalid Timezone Settings",
            fix: format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
        }
    }

    /// Render the full error page.
    pub fn into_html(self) -> Html<String> {
        Html(error_view("Internal Server Error", "500", self.description, &self.fix).into_string())
    }
}

impl IntoResponse for InternalServerError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

/// A route handler that always renders the generic error page.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}
