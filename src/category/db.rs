//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error, Kind, Name,
    category::{Category, CategoryId},
};

/// Create a category and return it with its generated ID.
pub fn create_category(name: Name, kind: Kind, connection: &Connection) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, kind) VALUES (?1, ?2);",
        (name.as_ref(), kind),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name, kind })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, kind FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the categories of `kind`, or every category if `kind` is `None`.
///
/// Categories are ordered by ID.
pub fn get_categories(kind: Option<Kind>, connection: &Connection) -> Result<Vec<Category>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, name, kind FROM category
        WHERE ?1 IS NULL OR kind = ?1
        ORDER BY id ASC;",
    )?;

    statement
        .query_map((kind,), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK(kind IN ('Income', 'Expense'))
        );

        CREATE INDEX IF NOT EXISTS idx_category_kind ON category(kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let kind = row.get(2)?;

    Ok(Category {
        id,
        name: Name::new_unchecked(&raw_name),
        kind,
    })
}
