//! Second level classification of transactions, nested under a category.

mod create;
mod db;
mod domain;

pub use create::{create_subcategory_endpoint, get_new_subcategory_page};
pub use db::{create_subcategory, create_subcategory_table, get_subcategories};
pub use domain::{Subcategory, SubcategoryId};
