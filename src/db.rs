//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, subcategory::create_subcategory_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Enable foreign key checks and create the tables for the domain models.
///
/// Tables are only created if they do not already exist, so this is safe to
/// call on every start up.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_subcategory_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
