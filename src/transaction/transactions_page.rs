//! The page listing every recorded transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, Kind, endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_amount, format_count, link,
    },
    navigation::NavBar,
    transaction::{TransactionRow, get_transaction_rows},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render every transaction, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction_rows(&connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?
    };

    Ok(transactions_view(&rows).into_response())
}

fn transactions_view(rows: &[TransactionRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let amount_style = |kind: Kind| match kind {
        Kind::Income => "text-green-700 dark:text-green-400",
        Kind::Expense => "text-red-700 dark:text-red-400",
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl"
            {
                h2 class="text-xl font-bold mb-4" { "Transactions" }

                @if rows.is_empty() {
                    p
                    {
                        "No transactions recorded yet. "
                        (link(endpoints::REGISTER_VIEW, "Register a transaction"))
                        " to get started."
                    }
                } @else {
                    p class="mb-2 text-sm" { (format_count(rows.len() as u64)) " transactions" }

                    div class="relative overflow-x-auto shadow-md sm:rounded-lg"
                    {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Subcategory" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                                }
                            }

                            tbody
                            {
                                @for row in rows {
                                    tr class=(TABLE_ROW_STYLE)
                                    {
                                        td class=(TABLE_CELL_STYLE) { (row.date) }
                                        td class=(TABLE_CELL_STYLE) { (row.kind) }
                                        td class={ (TABLE_CELL_STYLE) " text-right " (amount_style(row.kind)) }
                                        {
                                            (format_amount(row.amount))
                                        }
                                        td class=(TABLE_CELL_STYLE) { (row.category) }
                                        td class=(TABLE_CELL_STYLE) { (row.subcategory) }
                                        td class=(TABLE_CELL_STYLE) { (row.description.as_deref().unwrap_or("")) }
                                        td class=(TABLE_CELL_STYLE) { (row.user) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Kind, Name, Transaction, create_category, create_subcategory, create_transaction,
        create_user,
        html::format_amount,
        test_utils::{
            assert_content_type, assert_status_ok, assert_valid_html, get_test_connection,
            parse_html_document,
        },
        transaction::{get_transactions_page, transactions_page::TransactionsViewState},
    };

    #[tokio::test]
    async fn lists_salary_transaction() {
        let connection = get_test_connection();
        let ana = create_user(Name::new_unchecked("Ana"), &connection).unwrap();
        let salary =
            create_category(Name::new_unchecked("Salary"), Kind::Income, &connection).unwrap();
        let payroll =
            create_subcategory(salary.id, Name::new_unchecked("Payroll"), &connection).unwrap();
        create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Income, 1500.0, payroll.id, ana.id),
            &connection,
        )
        .unwrap();
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_transactions_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let cells = html
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| {
                row.select(&Selector::parse("td").unwrap())
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        assert_eq!(
            cells,
            vec![vec![
                "2024-01-15".to_owned(),
                "Income".to_owned(),
                format_amount(1500.0),
                "Salary".to_owned(),
                "Payroll".to_owned(),
                String::new(),
                "Ana".to_owned(),
            ]]
        );
    }

    #[tokio::test]
    async fn shows_message_when_empty() {
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response = get_transactions_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(html.select(&Selector::parse("table").unwrap()).count(), 0);
        assert!(
            html.root_element()
                .text()
                .collect::<String>()
                .contains("No transactions recorded yet.")
        );
    }
}
