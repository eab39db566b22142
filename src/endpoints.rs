//! The API endpoints URIs.

/// The root route which redirects to the register page.
pub const ROOT: &str = "/";
/// The page for recording a new transaction.
pub const REGISTER_VIEW: &str = "/transactions/new";
/// The fragment with the category and subcategory selects of the register form.
pub const REGISTER_FIELDS: &str = "/transactions/new/fields";
/// The page for listing all transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for creating a new subcategory.
pub const NEW_SUBCATEGORY_VIEW: &str = "/subcategories/new";
/// The page for creating a new user.
pub const NEW_USER_VIEW: &str = "/users/new";
/// The page for importing the seed file.
pub const IMPORT_VIEW: &str = "/import";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to create a subcategory.
pub const SUBCATEGORIES_API: &str = "/api/subcategories";
/// The route to create a user.
pub const USERS_API: &str = "/api/users";
/// The route to merge the seed file into the database.
pub const IMPORT_API: &str = "/api/import";
/// The route to download the stored categories and users as a seed file.
pub const EXPORT_API: &str = "/api/export";
