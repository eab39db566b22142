//! The people who record transactions.

mod create;
mod db;
mod domain;

pub use create::{create_user_endpoint, get_new_user_page};
pub use db::{create_user, create_user_table, get_all_users, get_user};
pub use domain::{User, UserId};
