//! Category creation page and endpoint.

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
    AppState, Error, Kind, Name,
    category::{Category, create_category, domain::CategoryFormData, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for listing and creating categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The connection to the application database.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page with the list of existing categories.
pub async fn get_new_category_page(State(state): State<CategoryState>) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_categories(None, &connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?
    };

    Ok(new_category_view(&categories).into_response())
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let kind = match new_category.kind.parse::<Kind>() {
        Ok(kind) => kind,
        Err(error) => return error.into_alert_response(),
    };

    let name = match Name::new(&new_category.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(kind, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, kind, &connection) {
        Ok(category) => {
            tracing::info!(id = category.id, kind = %category.kind, "created category");

            (
                HxRedirect(endpoints::NEW_CATEGORY_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view(Kind::Income, "");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Add Category" }

            (form)

            h3 class="text-lg font-semibold mt-8 mb-2 self-start" { "Existing Categories" }

            @if categories.is_empty() {
                p class="self-start" { "No categories yet." }
            } @else {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                        }
                    }

                    tbody
                    {
                        @for category in categories {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (category.id) }
                                td class=(TABLE_CELL_STYLE) { (category.name) }
                                td class=(TABLE_CELL_STYLE) { (category.kind) }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Add Category", &content)
}

fn new_category_form_view(selected_kind: Kind, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Kind" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for kind in Kind::ALL {
                        div class="flex flex-1 items-center gap-2"
                        {
                            input
                                id={ "kind-" (kind) }
                                type="radio"
                                name="kind"
                                value=(kind)
                                required
                                checked[kind == selected_kind]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for={ "kind-" (kind) } class=(FORM_RADIO_LABEL_STYLE) { (kind) }
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}
