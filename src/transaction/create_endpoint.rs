//! Defines the endpoint for registering a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, Kind, SubcategoryId, UserId, endpoints,
    sync::{SheetSync, SyncRecord},
    transaction::{Transaction, create_transaction, get_transaction_row, validate_amount},
};

/// The state needed to register a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where to send a copy of each new transaction, if anywhere.
    pub sheet_sync: Option<SheetSync>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            sheet_sync: state.sheet_sync.clone(),
        }
    }
}

/// The form data for registering a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Whether money was earned or spent, parsed into a [Kind] by the endpoint.
    pub kind: String,
    /// The value of the transaction, zero or greater.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The chosen subcategory, `None` if there was nothing to choose.
    #[serde(default)]
    pub subcategory_id: Option<SubcategoryId>,
    /// The chosen user, `None` if there was nothing to choose.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

/// A route handler for registering a transaction, redirects to the transactions view on success.
///
/// If sync is configured, a copy of the stored transaction is sent in the
/// background. The response does not wait for it and a failed sync does not
/// undo the insert.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let kind = match form.kind.parse::<Kind>() {
        Ok(kind) => kind,
        Err(error) => {
            tracing::warn!("rejected transaction with invalid kind {:?}", form.kind);
            return error.into_alert_response();
        }
    };

    if let Err(error) = validate_amount(form.amount) {
        tracing::warn!("rejected transaction with invalid amount {}", form.amount);
        return error.into_alert_response();
    }

    let Some(subcategory_id) = form.subcategory_id else {
        return Error::MissingSelection("subcategory").into_alert_response();
    };

    let Some(user_id) = form.user_id else {
        return Error::MissingSelection("user").into_alert_response();
    };

    let transaction = Transaction::build(form.date, kind, form.amount, subcategory_id, user_id)
        .description(form.description.as_deref());

    let row = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        let transaction = match create_transaction(transaction, &connection) {
            Ok(transaction) => transaction,
            Err(error) => {
                tracing::error!("could not create transaction: {error}");
                return error.into_alert_response();
            }
        };

        tracing::info!(
            id = transaction.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            "registered transaction"
        );

        get_transaction_row(transaction.id, &connection)
            .inspect_err(|error| {
                tracing::error!(
                    "could not load transaction {} for sync: {error}",
                    transaction.id
                )
            })
            .ok()
    };

    if let (Some(sheet_sync), Some(row)) = (&state.sheet_sync, row) {
        sheet_sync.notify(vec![SyncRecord::from(row)]);
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Kind, Name, create_category, create_subcategory, create_user, endpoints,
        sync::{SheetSync, SyncRecord, test_server::spawn_sync_endpoint},
        test_utils::{
            assert_hx_redirect, assert_valid_html, get_test_connection, must_get_text,
            parse_html_fragment,
        },
        transaction::{
            count_transactions,
            create_endpoint::{CreateTransactionState, TransactionForm},
            create_transaction_endpoint, get_transaction,
        },
    };

    fn get_seeded_connection() -> Connection {
        let connection = get_test_connection();
        let salary =
            create_category(Name::new_unchecked("Salary"), Kind::Income, &connection).unwrap();
        create_subcategory(salary.id, Name::new_unchecked("Payroll"), &connection).unwrap();
        create_user(Name::new_unchecked("Ana"), &connection).unwrap();
        connection
    }

    fn get_state() -> CreateTransactionState {
        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(get_seeded_connection())),
            sheet_sync: None,
        }
    }

    fn salary_form() -> TransactionForm {
        TransactionForm {
            kind: Kind::Income.to_string(),
            amount: 1500.0,
            date: date!(2024 - 01 - 15),
            subcategory_id: Some(1),
            user_id: Some(1),
            description: Some("January".to_owned()),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_state();

        let response = create_transaction_endpoint(State(state.clone()), Form(salary_form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let transaction = get_transaction(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transaction.amount, 1500.0);
        assert_eq!(transaction.kind, Kind::Income);
        assert_eq!(transaction.description.as_deref(), Some("January"));
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let state = get_state();
        let form = TransactionForm {
            amount: -10.0,
            ..salary_form()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn rejects_unknown_kind() {
        let state = get_state();
        let form = TransactionForm {
            kind: "Transfer".to_owned(),
            ..salary_form()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = must_get_text(&html, "#alert-container");
        assert!(text.contains("Invalid kind"), "got {text}");
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn accepts_spanish_kind() {
        let state = get_state();
        let form = TransactionForm {
            kind: "Ingreso".to_owned(),
            ..salary_form()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let transaction = get_transaction(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transaction.kind, Kind::Income);
    }

    #[tokio::test]
    async fn rejects_missing_subcategory() {
        let state = get_state();
        let form = TransactionForm {
            subcategory_id: None,
            ..salary_form()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn rejects_missing_user() {
        let state = get_state();
        let form = TransactionForm {
            user_id: None,
            ..salary_form()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_dangling_user() {
        let state = get_state();
        let form = TransactionForm {
            user_id: Some(9),
            ..salary_form()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn sends_new_transaction_to_sync_endpoint() {
        let (url, received) = spawn_sync_endpoint(StatusCode::OK).await;
        let state = CreateTransactionState {
            sheet_sync: Some(SheetSync::new(&url, Duration::from_secs(5)).unwrap()),
            ..get_state()
        };

        let response = create_transaction_endpoint(State(state), Form(salary_form())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let mut batches = Vec::new();
        for _ in 0..100 {
            batches = received.lock().unwrap().clone();
            if !batches.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(
            batches,
            vec![vec![SyncRecord {
                date: date!(2024 - 01 - 15),
                kind: Kind::Income,
                amount: 1500.0,
                description: "January".to_owned(),
                category: "Salary".to_owned(),
                subcategory: "Payroll".to_owned(),
                user: "Ana".to_owned(),
            }]]
        );
    }

    #[tokio::test]
    async fn failed_sync_keeps_local_insert() {
        let (url, _received) = spawn_sync_endpoint(StatusCode::INTERNAL_SERVER_ERROR).await;
        let state = CreateTransactionState {
            sheet_sync: Some(SheetSync::new(&url, Duration::from_secs(5)).unwrap()),
            ..get_state()
        };

        let response = create_transaction_endpoint(State(state.clone()), Form(salary_form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(count_transactions(&state.db_connection.lock().unwrap()), Ok(1));
    }
}
