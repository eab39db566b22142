//! The import page and the seed import and export endpoints.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::{StatusCode, header::CONTENT_DISPOSITION},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, WARNING_TEXT_STYLE,
        base, format_count, loading_spinner,
    },
    navigation::NavBar,
    seed::{ImportSummary, export_seed, import_seed, load_seed_file},
};

/// The state needed for importing and exporting seed data.
#[derive(Debug, Clone)]
pub struct SeedState {
    /// The connection to the application database.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where the seed file is read from.
    pub seed_path: PathBuf,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            seed_path: state.seed_path.clone(),
        }
    }
}

/// Render the page for importing the seed file.
pub async fn get_import_page(State(state): State<SeedState>) -> Response {
    let seed_file_exists = state.seed_path.exists();

    if !seed_file_exists {
        tracing::warn!("seed file {} does not exist", state.seed_path.display());
    }

    import_view(&state.seed_path.display().to_string(), seed_file_exists).into_response()
}

/// Read the seed file and add the rows that are not in the store yet.
///
/// The file is read again on every request, so edits to it are picked up
/// without restarting the server.
pub async fn import_seed_endpoint(State(state): State<SeedState>) -> Response {
    let seed_path = state.seed_path.display().to_string();

    let load = match load_seed_file(&state.seed_path) {
        Ok(load) => load,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let summary = match import_seed(&load.data, &connection) {
        Ok(summary) => summary,
        Err(Error::EmptyName) => {
            tracing::error!("seed file {seed_path} contains a blank name");
            return Error::InvalidSeedFile(format!(
                "{seed_path} contains a category, subcategory or user with a blank name. \
                Nothing was imported."
            ))
            .into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not import seed file {seed_path}: {error}");
            return error.into_alert_response();
        }
    };

    let alert = match load.warning {
        Some(warning) => Alert::Warning {
            message: "Seed file not found".to_owned(),
            details: warning,
        },
        None => Alert::Success {
            message: "Import completed".to_owned(),
            details: summary_details(&summary, &seed_path),
        },
    };

    (StatusCode::OK, alert.into_html()).into_response()
}

/// Download the current categories, subcategories and users as a seed file.
pub async fn export_seed_endpoint(State(state): State<SeedState>) -> Result<Response, Error> {
    let seed = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        export_seed(&connection)
            .inspect_err(|error| tracing::error!("could not export seed data: {error}"))?
    };

    Ok((
        [(CONTENT_DISPOSITION, "attachment; filename=\"data.json\"")],
        Json(seed),
    )
        .into_response())
}

fn summary_details(summary: &ImportSummary, seed_path: &str) -> String {
    if summary.total() == 0 {
        return format!("Everything in {seed_path} was already imported.");
    }

    format!(
        "Added {}, {} and {} from {seed_path}.",
        count_of(summary.categories, "category", "categories"),
        count_of(summary.subcategories, "subcategory", "subcategories"),
        count_of(summary.users, "user", "users"),
    )
}

fn count_of(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };

    format!("{} {noun}", format_count(count as u64))
}

fn import_view(seed_path: &str, seed_file_exists: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Import from JSON" }

            p class="mb-4"
            {
                "Adds the categories, subcategories and users in "
                code { (seed_path) }
                " that are not already stored. Existing rows are never changed."
            }

            @if !seed_file_exists {
                div class={ (WARNING_TEXT_STYLE) " w-full mb-4" }
                {
                    "The seed file " code { (seed_path) } " was not found."
                }
            }

            form
                hx-post=(endpoints::IMPORT_API)
                hx-target-error="#alert-container"
                hx-swap="none"
                class="w-full space-y-4 md:space-y-6"
            {
                button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" { (spinner) }
                    " Import"
                }
            }

            a
                href=(endpoints::EXPORT_API)
                download="data.json"
                class={ (BUTTON_SECONDARY_STYLE) " mt-4 text-center" }
            {
                "Export current data as JSON"
            }
        }
    };

    base("Import", &content)
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        path::PathBuf,
        sync::{Arc, Mutex},
    };

    use axum::{
        extract::State,
        http::{StatusCode, header::CONTENT_DISPOSITION},
    };
    use scraper::Selector;
    use tempfile::NamedTempFile;

    use crate::{
        Kind, Name, SeedData, create_category, endpoints, get_all_users, get_categories,
        seed::{
            ImportSummary, export_seed_endpoint, get_import_page, import_seed_endpoint,
            page::{SeedState, summary_details},
        },
        test_utils::{
            assert_hx_endpoint, assert_status_ok, assert_valid_html, get_header,
            get_test_connection, must_get_form, must_get_text, parse_html_document,
            parse_html_fragment,
        },
    };

    const SEED_JSON: &str = r#"{
        "categorias": [
            {"id_categoria": 1, "nombre_categoria": "Sueldo", "tipo": "Ingreso",
             "subcategorias": [{"id_subcategoria": 1, "nombre_subcategoria": "Planilla"}]}
        ],
        "usuarios": [{"id_usuario": 1, "nombre": "Ana"}]
    }"#;

    fn get_state(seed_path: PathBuf) -> SeedState {
        SeedState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            seed_path,
        }
    }

    fn seed_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn alert_text(response: axum::response::Response) -> String {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        must_get_text(&html, "#alert-container")
    }

    #[tokio::test]
    async fn render_page() {
        let file = seed_file(SEED_JSON);
        let state = get_state(file.path().to_owned());

        let response = get_import_page(State(state)).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::IMPORT_API, "hx-post");
        let export_links = html
            .select(&Selector::parse(&format!("a[href=\"{}\"]", endpoints::EXPORT_API)).unwrap())
            .count();
        assert_eq!(export_links, 1);
        assert!(
            !html
                .root_element()
                .text()
                .collect::<String>()
                .contains("was not found")
        );
    }

    #[tokio::test]
    async fn page_warns_about_missing_seed_file() {
        let directory = tempfile::tempdir().unwrap();
        let state = get_state(directory.path().join("data.json"));

        let response = get_import_page(State(state)).await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(
            html.root_element()
                .text()
                .collect::<String>()
                .contains("was not found")
        );
    }

    #[tokio::test]
    async fn import_adds_rows_once() {
        let file = seed_file(SEED_JSON);
        let state = get_state(file.path().to_owned());

        let response = import_seed_endpoint(State(state.clone())).await;

        assert_status_ok(&response);
        let text = alert_text(response).await;
        assert!(text.contains("Import completed"), "got {text}");
        assert!(
            text.contains("Added 1 category, 1 subcategory and 1 user"),
            "got {text}"
        );

        let response = import_seed_endpoint(State(state.clone())).await;

        let text = alert_text(response).await;
        assert!(text.contains("already imported"), "got {text}");
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_categories(None, &connection).unwrap().len(), 1);
        assert_eq!(get_all_users(&connection).unwrap().len(), 1);
    }

    #[test]
    fn summary_counts_use_plural_nouns() {
        let summary = ImportSummary {
            categories: 2,
            subcategories: 0,
            users: 1,
        };

        assert_eq!(
            summary_details(&summary, "data.json"),
            "Added 2 categories, 0 subcategories and 1 user from data.json."
        );
    }

    #[tokio::test]
    async fn import_with_missing_file_warns() {
        let directory = tempfile::tempdir().unwrap();
        let state = get_state(directory.path().join("data.json"));

        let response = import_seed_endpoint(State(state)).await;

        assert_status_ok(&response);
        let text = alert_text(response).await;
        assert!(text.contains("Seed file not found"), "got {text}");
    }

    #[tokio::test]
    async fn import_with_malformed_file_fails() {
        let file = seed_file("[1, 2,");
        let state = get_state(file.path().to_owned());

        let response = import_seed_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn import_with_blank_name_fails() {
        let file = seed_file(r#"{"usuarios": [{"id_usuario": 1, "nombre": ""}]}"#);
        let state = get_state(file.path().to_owned());

        let response = import_seed_endpoint(State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(
            get_all_users(&state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn export_returns_stored_rows_as_json() {
        let directory = tempfile::tempdir().unwrap();
        let state = get_state(directory.path().join("data.json"));
        create_category(
            Name::new_unchecked("Food"),
            Kind::Expense,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = export_seed_endpoint(State(state)).await.unwrap();

        assert_status_ok(&response);
        assert_eq!(
            get_header(&response, CONTENT_DISPOSITION.as_str()),
            "attachment; filename=\"data.json\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let seed: SeedData = serde_json::from_slice(&body).unwrap();
        assert_eq!(seed.categories.len(), 1);
        assert_eq!(seed.categories[0].name, "Food");
        assert!(seed.users.is_empty());
    }
}
