//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    category::{create_category_endpoint, get_new_category_page},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    seed::{export_seed_endpoint, get_import_page, import_seed_endpoint},
    subcategory::{create_subcategory_endpoint, get_new_subcategory_page},
    transaction::{
        create_transaction_endpoint, get_register_fields, get_register_page,
        get_transactions_page,
    },
    user::{create_user_endpoint, get_new_user_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::REGISTER_FIELDS, get(get_register_fields))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(
            endpoints::NEW_SUBCATEGORY_VIEW,
            get(get_new_subcategory_page),
        )
        .route(endpoints::NEW_USER_VIEW, get(get_new_user_page))
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(
            endpoints::SUBCATEGORIES_API,
            post(create_subcategory_endpoint),
        )
        .route(endpoints::USERS_API, post(create_user_endpoint))
        .route(endpoints::IMPORT_API, post(import_seed_endpoint))
        .route(endpoints::EXPORT_API, get(export_seed_endpoint));

    page_routes
        .merge(api_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the register page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::REGISTER_VIEW)
}
