//! Database operations for subcategories.

use rusqlite::{Connection, Row};

use crate::{
    CategoryId, Error, Name,
    subcategory::{Subcategory, SubcategoryId},
};

/// Create a subcategory under the category `category_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if `category_id` does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_subcategory(
    category_id: CategoryId,
    name: Name,
    connection: &Connection,
) -> Result<Subcategory, Error> {
    let id: SubcategoryId = connection
        .prepare(
            "INSERT INTO subcategory (category_id, name)
             VALUES (?1, ?2)
             RETURNING id",
        )?
        .query_row((category_id, name.as_ref()), |row| row.get(0))
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(category_id),
            error => error.into(),
        })?;

    Ok(Subcategory {
        id,
        category_id,
        name,
    })
}

/// Retrieve the subcategories of `category_id`, or every subcategory if `category_id` is `None`.
///
/// Subcategories are ordered by ID.
pub fn get_subcategories(
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<Vec<Subcategory>, Error> {
    connection
        .prepare(
            "SELECT id, category_id, name FROM subcategory
            WHERE ?1 IS NULL OR category_id = ?1
            ORDER BY id ASC;",
        )?
        .query_map((category_id,), map_row)?
        .map(|maybe_subcategory| maybe_subcategory.map_err(|error| error.into()))
        .collect()
}

/// Initialize the subcategory table and indexes.
pub fn create_subcategory_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS subcategory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_subcategory_category ON subcategory(category_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Subcategory, rusqlite::Error> {
    let id = row.get(0)?;
    let category_id = row.get(1)?;
    let raw_name: String = row.get(2)?;

    Ok(Subcategory {
        id,
        category_id,
        name: Name::new_unchecked(&raw_name),
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        Error, Kind, Name,
        category::create_category,
        subcategory::{Subcategory, create_subcategory, get_subcategories},
        test_utils::get_test_connection,
    };

    #[test]
    fn created_subcategory_is_listed_once_under_its_category() {
        let connection = get_test_connection();
        let salary =
            create_category(Name::new_unchecked("Salary"), Kind::Income, &connection).unwrap();

        let payroll =
            create_subcategory(salary.id, Name::new_unchecked("Payroll"), &connection).unwrap();

        let got = get_subcategories(Some(salary.id), &connection).unwrap();
        assert_eq!(
            got.iter().filter(|subcategory| **subcategory == payroll).count(),
            1
        );
        assert_eq!(
            payroll,
            Subcategory {
                id: 1,
                category_id: salary.id,
                name: Name::new_unchecked("Payroll"),
            }
        );
    }

    #[test]
    fn create_subcategory_fails_on_missing_category() {
        let connection = get_test_connection();

        let result = create_subcategory(99, Name::new_unchecked("Orphan"), &connection);

        assert_eq!(result, Err(Error::InvalidCategory(99)));
        assert_eq!(get_subcategories(None, &connection), Ok(vec![]));
    }

    #[test]
    fn get_subcategories_filters_by_category() {
        let connection = get_test_connection();
        let food = create_category(Name::new_unchecked("Food"), Kind::Expense, &connection).unwrap();
        let home = create_category(Name::new_unchecked("Home"), Kind::Expense, &connection).unwrap();
        let groceries =
            create_subcategory(food.id, Name::new_unchecked("Groceries"), &connection).unwrap();
        let rent = create_subcategory(home.id, Name::new_unchecked("Rent"), &connection).unwrap();
        let dining =
            create_subcategory(food.id, Name::new_unchecked("Dining out"), &connection).unwrap();

        assert_eq!(
            get_subcategories(Some(food.id), &connection),
            Ok(vec![groceries.clone(), dining.clone()])
        );
        assert_eq!(
            get_subcategories(Some(home.id), &connection),
            Ok(vec![rent.clone()])
        );
        assert_eq!(
            get_subcategories(None, &connection),
            Ok(vec![groceries, rent, dining])
        );
    }
}
