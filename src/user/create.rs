//! User creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, Name, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    user::{User, create_user, domain::UserFormData, get_all_users},
};

/// The state needed for listing and creating users.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The connection to the application database.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the user creation page with the list of existing users.
pub async fn get_new_user_page(State(state): State<UserState>) -> Result<Response, Error> {
    let users = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_users(&connection)
            .inspect_err(|error| tracing::error!("could not get users: {error}"))?
    };

    Ok(new_user_view(&users).into_response())
}

/// Handle user creation form submission.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    Form(new_user): Form<UserFormData>,
) -> Response {
    let name = match Name::new(&new_user.name) {
        Ok(name) => name,
        Err(error) => {
            return new_user_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_user(name, &connection) {
        Ok(user) => {
            tracing::info!(id = user.id, "created user");

            (
                HxRedirect(endpoints::NEW_USER_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a user: {error}");

            error.into_alert_response()
        }
    }
}

fn new_user_view(users: &[User]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_USER_VIEW).into_html();
    let form = new_user_form_view("");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Add User" }

            (form)

            h3 class="text-lg font-semibold mt-8 mb-2 self-start" { "Existing Users" }

            @if users.is_empty() {
                p class="self-start" { "No users yet." }
            } @else {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        }
                    }

                    tbody
                    {
                        @for user in users {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (user.id) }
                                td class=(TABLE_CELL_STYLE) { (user.name) }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Add User", &content)
}

fn new_user_form_view(error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add User" }
        }
    }
}

#[cfg(test)]
mod new_user_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use scraper::Selector;

    use crate::{
        Name, endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button, assert_hx_endpoint,
            assert_status_ok, assert_valid_html, get_test_connection, must_get_form,
            parse_html_document,
        },
        user::{create::UserState, create_user, get_new_user_page},
    };

    #[tokio::test]
    async fn render_page_with_existing_users() {
        let connection = get_test_connection();
        create_user(Name::new_unchecked("Ana"), &connection).unwrap();
        create_user(Name::new_unchecked("Luis"), &connection).unwrap();
        let state = UserState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_user_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::USERS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button(&form);

        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| row.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Ana"));
        assert!(rows[1].contains("Luis"));
    }
}
