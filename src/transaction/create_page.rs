//! The register page for recording a new transaction.
//!
//! The category and subcategory selects form a cascade: changing the kind
//! reloads the categories of that kind, and changing the category reloads its
//! subcategories. Both are served by [get_register_fields] as an htmx fragment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// Empty query values, e.g. `category_id=`, are parsed as None.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Category, CategoryId, Error, Kind, Subcategory, User, endpoints, get_all_users,
    get_categories, get_subcategories,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, WARNING_TEXT_STYLE,
        base, link, loading_spinner,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the register page.
#[derive(Debug, Clone)]
pub struct RegisterPageState {
    /// The local timezone as a canonical timezone name, e.g. "America/Lima".
    pub local_timezone: String,
    /// The database connection for reading the taxonomy and users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The current choices in the cascade.
///
/// Other form fields included by htmx are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CascadeQuery {
    /// The chosen kind, defaults to income.
    pub kind: Option<Kind>,
    /// The chosen category, defaults to the first category of the kind.
    pub category_id: Option<CategoryId>,
}

/// The options for the cascade given the current choices.
struct Cascade {
    kind: Kind,
    categories: Vec<Category>,
    selected_category: Option<CategoryId>,
    subcategories: Vec<Subcategory>,
    users: Vec<User>,
}

impl Cascade {
    /// A transaction can only be submitted once there is something to select.
    fn can_submit(&self) -> bool {
        !self.subcategories.is_empty() && !self.users.is_empty()
    }
}

/// Load the options for `query`, falling back to the first category of the kind when the chosen
/// category is missing or belongs to the other kind.
fn load_cascade(query: &CascadeQuery, connection: &Connection) -> Result<Cascade, Error> {
    let kind = query.kind.unwrap_or(Kind::Income);
    let categories = get_categories(Some(kind), connection)?;

    let selected_category = query
        .category_id
        .filter(|id| categories.iter().any(|category| category.id == *id))
        .or_else(|| categories.first().map(|category| category.id));

    let subcategories = match selected_category {
        Some(category_id) => get_subcategories(Some(category_id), connection)?,
        None => Vec::new(),
    };

    let users = get_all_users(connection)?;

    Ok(Cascade {
        kind,
        categories,
        selected_category,
        subcategories,
        users,
    })
}

/// Renders the page for registering a transaction.
pub async fn get_register_page(
    State(state): State<RegisterPageState>,
    Query(query): Query<CascadeQuery>,
) -> Result<Response, Error> {
    let cascade = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_cascade(&query, &connection).inspect_err(|error| {
            tracing::error!("Failed to load options for the register page: {error}")
        })?
    };

    let today = local_today(&state.local_timezone)?;

    Ok(register_view(today, &cascade).into_response())
}

/// Renders the category and subcategory selects for the current kind and category.
///
/// The submit button is swapped out-of-band so it is disabled whenever there is
/// nothing to select.
pub async fn get_register_fields(
    State(state): State<RegisterPageState>,
    Query(query): Query<CascadeQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match load_cascade(&query, &connection) {
        Ok(cascade) => html! {
            (selection_fields_view(&cascade))
            (submit_button_view(cascade.can_submit(), true))
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Failed to load options for the register form: {error}");
            error.into_alert_response()
        }
    }
}

fn register_view(today: Date, cascade: &Cascade) -> Markup {
    let nav_bar = NavBar::new(endpoints::REGISTER_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Register Transaction" }

                fieldset
                    hx-get=(endpoints::REGISTER_FIELDS)
                    hx-trigger="change"
                    hx-target="#selection-fields"
                    hx-swap="outerHTML"
                    hx-include="closest form"
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
                                    checked[kind == cascade.kind]
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label for={ "kind-" (kind) } class=(FORM_RADIO_LABEL_STYLE) { (kind) }
                            }
                        }
                    }
                }

                (selection_fields_view(cascade))

                div
                {
                    label
                        for="amount"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Amount"
                    }

                    input
                        name="amount"
                        id="amount"
                        type="number"
                        min="0"
                        step="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="date"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Date"
                    }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(today)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="description"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Description"
                    }

                    textarea
                        name="description"
                        id="description"
                        rows="2"
                        placeholder="Optional"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}
                }

                div
                {
                    label
                        for="user_id"
                        class=(FORM_LABEL_STYLE)
                    {
                        "User"
                    }

                    @if cascade.users.is_empty() {
                        div class=(WARNING_TEXT_STYLE)
                        {
                            "No users yet. "
                            (link(endpoints::NEW_USER_VIEW, "Add a user"))
                            " first."
                        }
                    } @else {
                        select
                            name="user_id"
                            id="user_id"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for user in &cascade.users {
                                option value=(user.id) { (user.name) }
                            }
                        }
                    }
                }

                (submit_button_view(cascade.can_submit(), false))
            }
        }
    };

    base("Register Transaction", &content)
}

fn selection_fields_view(cascade: &Cascade) -> Markup {
    html! {
        div id="selection-fields" class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="category_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                @if cascade.categories.is_empty() {
                    div class=(WARNING_TEXT_STYLE)
                    {
                        "No " (cascade.kind) " categories yet. "
                        (link(endpoints::NEW_CATEGORY_VIEW, "Add a category"))
                        " first."
                    }
                } @else {
                    select
                        name="category_id"
                        id="category_id"
                        required
                        hx-get=(endpoints::REGISTER_FIELDS)
                        hx-trigger="change"
                        hx-target="#selection-fields"
                        hx-swap="outerHTML"
                        hx-include="closest form"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in &cascade.categories {
                            option
                                value=(category.id)
                                selected[Some(category.id) == cascade.selected_category]
                            {
                                (category.name)
                            }
                        }
                    }
                }
            }

            @if !cascade.categories.is_empty() {
                div
                {
                    label
                        for="subcategory_id"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Subcategory"
                    }

                    @if cascade.subcategories.is_empty() {
                        div class=(WARNING_TEXT_STYLE)
                        {
                            "No subcategories for this category yet. "
                            (link(endpoints::NEW_SUBCATEGORY_VIEW, "Add a subcategory"))
                            " first."
                        }
                    } @else {
                        select
                            name="subcategory_id"
                            id="subcategory_id"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for subcategory in &cascade.subcategories {
                                option value=(subcategory.id) { (subcategory.name) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn submit_button_view(can_submit: bool, out_of_band: bool) -> Markup {
    let spinner = loading_spinner();

    html! {
        button
            type="submit"
            id="submit-button"
            hx-swap-oob=[out_of_band.then_some("true")]
            disabled[!can_submit]
            class=(BUTTON_PRIMARY_STYLE)
        {
            span
                id="indicator"
                class="inline htmx-indicator"
            {
                (spinner)
            }
            " Register Transaction"
        }
    }
}
