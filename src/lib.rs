//! Finanzas is a web app for recording personal income and expenses.
//!
//! Transactions are classified by a two-level taxonomy of categories and
//! subcategories, attributed to a user and stored in a local SQLite database.
//! The taxonomy can be bootstrapped from a JSON seed file, and each new
//! transaction can optionally be copied to an external spreadsheet endpoint.
//!
//! This library provides a web server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod kind;
mod name;
mod navigation;
mod not_found;
mod routing;
mod seed;
mod subcategory;
mod sync;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{Category, CategoryId, create_category, get_categories, get_category};
pub use db::initialize as initialize_db;
pub use kind::Kind;
pub use name::Name;
pub use routing::build_router;
pub use seed::{
    ImportSummary, SeedCategory, SeedData, SeedLoad, SeedSubcategory, SeedUser, export_seed,
    import_seed, load_seed_file,
};
pub use subcategory::{Subcategory, SubcategoryId, create_subcategory, get_subcategories};
pub use sync::{SheetSync, SyncError, SyncRecord};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionId, TransactionRow, count_transactions,
    create_transaction, get_transaction, get_transaction_row, get_transaction_rows,
};
pub use user::{User, UserId, create_user, get_all_users, get_user};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a user, category or subcategory name.
    #[error("Name cannot be empty")]
    EmptyName,

    /// A string that is neither "Income" nor "Expense" was used as a kind.
    #[error("\"{0}\" is not a valid kind, expected Income or Expense")]
    InvalidKind(String),

    /// A transaction amount was below zero, or not a number.
    ///
    /// Whether money came in or went out is recorded by the kind, so amounts
    /// are always magnitudes.
    #[error("{0} is not a valid amount, amounts must be zero or greater")]
    NegativeAmount(f64),

    /// A required choice, e.g. the subcategory of a transaction, was left empty.
    #[error("no {0} was selected")]
    MissingSelection(&'static str),

    /// The category ID used to create a subcategory did not match a valid category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The subcategory ID used to create a transaction did not match a valid subcategory.
    #[error("the subcategory ID {0} does not refer to a valid subcategory")]
    InvalidSubcategory(SubcategoryId),

    /// The user ID used to create a transaction did not match a valid user.
    #[error("the user ID {0} does not refer to a valid user")]
    InvalidUser(UserId),

    /// The seed file exists but could not be read or parsed.
    #[error("could not read the seed file: {0}")]
    InvalidSeedFile(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                InternalServerError::invalid_timezone(&timezone).into_response()
            }
            Error::DatabaseLockError => {
                InternalServerError::database_unavailable().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for htmx requests.
    ///
    /// Problems with user input are shown as warnings with a 400 status, so the
    /// user can fix the form and resubmit.
    pub(crate) fn into_alert_response(self) -> Response {
        let (status, alert) = match self {
            Error::EmptyName => (
                StatusCode::BAD_REQUEST,
                Alert::Warning {
                    message: "Missing name".to_owned(),
                    details: "Enter a name before submitting.".to_owned(),
                },
            ),
            Error::InvalidKind(kind) => (
                StatusCode::BAD_REQUEST,
                Alert::Warning {
                    message: "Invalid kind".to_owned(),
                    details: format!("\"{kind}\" is not a valid kind. Choose Income or Expense."),
                },
            ),
            Error::NegativeAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Warning {
                    message: "Invalid amount".to_owned(),
                    details: format!("{amount} is not a valid amount. Enter zero or more."),
                },
            ),
            Error::MissingSelection(field) => (
                StatusCode::BAD_REQUEST,
                Alert::Warning {
                    message: format!("Select a {field}"),
                    details: format!("A {field} must be selected before submitting."),
                },
            ),
            Error::InvalidCategory(id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: format!(
                        "Could not find a category with the ID {id}. \
                        Try refreshing the page to see the current categories."
                    ),
                },
            ),
            Error::InvalidSubcategory(id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid subcategory".to_owned(),
                    details: format!(
                        "Could not find a subcategory with the ID {id}. \
                        Try refreshing the page to see the current subcategories."
                    ),
                },
            ),
            Error::InvalidUser(id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid user".to_owned(),
                    details: format!(
                        "Could not find a user with the ID {id}. \
                        Try refreshing the page to see the current users."
                    ),
                },
            ),
            Error::InvalidSeedFile(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Could not read the seed file".to_owned(),
                    details: reason,
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            ),
        };

        (status, alert.into_html()).into_response()
    }
}
