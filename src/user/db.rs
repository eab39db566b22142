//! Database operations for users.

use rusqlite::{Connection, Row};

use crate::{
    Error, Name,
    user::{User, UserId},
};

/// Create a user and return it with its generated ID.
pub fn create_user(name: Name, connection: &Connection) -> Result<User, Error> {
    connection.execute("INSERT INTO user (name) VALUES (?1);", (name.as_ref(),))?;

    let id = connection.last_insert_rowid();

    Ok(User { id, name })
}

/// Retrieve a single user by ID.
pub fn get_user(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name FROM user WHERE id = :id;")?
        .query_row(&[(":id", &user_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all users in the order they were added.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, name FROM user ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Initialize the user table.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = Name::new_unchecked(&raw_name);

    Ok(User { id, name })
}
