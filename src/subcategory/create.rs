//! Subcategory creation page and endpoint.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Category, CategoryId, Error, Name, endpoints, get_categories,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, WARNING_TEXT_STYLE, base, link,
    },
    navigation::NavBar,
    subcategory::{Subcategory, create_subcategory, domain::SubcategoryFormData, get_subcategories},
};

/// The state needed for listing and creating subcategories.
#[derive(Debug, Clone)]
pub struct SubcategoryState {
    /// The connection to the application database.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubcategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the subcategory creation page with the list of existing subcategories.
pub async fn get_new_subcategory_page(
    State(state): State<SubcategoryState>,
) -> Result<Response, Error> {
    let (categories, subcategories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let categories = get_categories(None, &connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;
        let subcategories = get_subcategories(None, &connection)
            .inspect_err(|error| tracing::error!("could not get subcategories: {error}"))?;

        (categories, subcategories)
    };

    Ok(new_subcategory_view(&categories, &subcategories).into_response())
}

/// Handle subcategory creation form submission.
pub async fn create_subcategory_endpoint(
    State(state): State<SubcategoryState>,
    Form(new_subcategory): Form<SubcategoryFormData>,
) -> Response {
    let Some(category_id) = new_subcategory.category_id else {
        return Error::MissingSelection("category").into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let name = match Name::new(&new_subcategory.name) {
        Ok(name) => name,
        Err(error) => {
            return match get_categories(None, &connection) {
                Ok(categories) => new_subcategory_form_view(
                    &categories,
                    Some(category_id),
                    &format!("Error: {error}"),
                )
                .into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match create_subcategory(category_id, name, &connection) {
        Ok(subcategory) => {
            tracing::info!(
                id = subcategory.id,
                category_id = subcategory.category_id,
                "created subcategory"
            );

            (
                HxRedirect(endpoints::NEW_SUBCATEGORY_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidCategory(category_id)) => {
            tracing::warn!("tried to create a subcategory under missing category {category_id}");

            Error::InvalidCategory(category_id).into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a subcategory: {error}");

            error.into_alert_response()
        }
    }
}

fn new_subcategory_view(categories: &[Category], subcategories: &[Subcategory]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_SUBCATEGORY_VIEW).into_html();
    let form = new_subcategory_form_view(categories, None, "");
    let category_names: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Add Subcategory" }

            (form)

            h3 class="text-lg font-semibold mt-8 mb-2 self-start" { "Existing Subcategories" }

            @if subcategories.is_empty() {
                p class="self-start" { "No subcategories yet." }
            } @else {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        }
                    }

                    tbody
                    {
                        @for subcategory in subcategories {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (subcategory.id) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @match category_names.get(&subcategory.category_id) {
                                        Some(category) => { (category.name) " (" (category.kind) ")" }
                                        None => { (subcategory.category_id) }
                                    }
                                }
                                td class=(TABLE_CELL_STYLE) { (subcategory.name) }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Add Subcategory", &content)
}

fn new_subcategory_form_view(
    categories: &[Category],
    selected_category: Option<CategoryId>,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::SUBCATEGORIES_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="category_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                @if categories.is_empty() {
                    div class=(WARNING_TEXT_STYLE)
                    {
                        "No categories yet. "
                        (link(endpoints::NEW_CATEGORY_VIEW, "Add a category"))
                        " first."
                    }
                } @else {
                    select
                        id="category_id"
                        name="category_id"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in categories {
                            option
                                value=(category.id)
                                selected[Some(category.id) == selected_category]
                            {
                                (category.name) " (" (category.kind) ")"
                            }
                        }
                    }
                }
            }

            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Subcategory Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Subcategory Name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button
                type="submit"
                disabled[categories.is_empty()]
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Add Subcategory"
            }
        }
    }
}
