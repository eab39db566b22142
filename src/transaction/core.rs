//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, Kind, SubcategoryId, UserId, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// Whether money was earned or spent.
    pub kind: Kind,
    /// The amount of money spent or earned, always zero or greater.
    pub amount: f64,
    /// The subcategory, and through it the category, of the transaction.
    pub subcategory_id: SubcategoryId,
    /// An optional note about what the transaction was for.
    pub description: Option<String>,
    /// The user that recorded the transaction.
    pub user_id: UserId,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        date: Date,
        kind: Kind,
        amount: f64,
        subcategory_id: SubcategoryId,
        user_id: UserId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            date,
            kind,
            amount,
            subcategory_id,
            description: None,
            user_id,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Pass the builder to [create_transaction] to validate and store it.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The date when the transaction occurred.
    pub date: Date,
    /// Whether money was earned or spent.
    ///
    /// This is not checked against the kind of the subcategory's category.
    pub kind: Kind,
    /// The amount of money spent or earned, must be zero or greater.
    pub amount: f64,
    /// The subcategory of the transaction.
    pub subcategory_id: SubcategoryId,
    /// An optional note, blank descriptions are stored as `None`.
    pub description: Option<String>,
    /// The user that recorded the transaction.
    pub user_id: UserId,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_owned);
        self
    }
}

/// A transaction joined with the names of its category, subcategory and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// Whether money was earned or spent.
    pub kind: Kind,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The name of the category of the transaction's subcategory.
    pub category: String,
    /// The name of the transaction's subcategory.
    pub subcategory: String,
    /// An optional note about what the transaction was for.
    pub description: Option<String>,
    /// The name of the user that recorded the transaction.
    pub user: String,
}

/// Check that `amount` can be used for a transaction.
///
/// # Errors
/// Returns [Error::NegativeAmount] if `amount` is below zero or not a finite number.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::NegativeAmount(amount))
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative, in which case nothing is written,
/// - [Error::InvalidSubcategory] if the subcategory ID does not refer to a real subcategory,
/// - [Error::InvalidUser] if the user ID does not refer to a real user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (date, kind, amount, subcategory_id, description, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, date, kind, amount, subcategory_id, description, user_id",
        )?
        .query_row(
            (
                builder.date,
                builder.kind,
                builder.amount,
                builder.subcategory_id,
                &builder.description,
                builder.user_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => dangling_reference_error(&builder, connection),
            error => error.into(),
        })
}

/// SQLite does not say which foreign key failed, so check the subcategory first.
fn dangling_reference_error(builder: &TransactionBuilder, connection: &Connection) -> Error {
    let subcategory_exists = connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM subcategory WHERE id = ?1)",
            (builder.subcategory_id,),
            |row| row.get::<_, bool>(0),
        )
        .unwrap_or(false);

    if subcategory_exists {
        Error::InvalidUser(builder.user_id)
    } else {
        Error::InvalidSubcategory(builder.subcategory_id)
    }
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, date, kind, amount, subcategory_id, description, user_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

const TRANSACTION_ROW_QUERY: &str = "SELECT t.id, t.date, t.kind, t.amount, c.name, s.name, t.description, u.name
    FROM \"transaction\" t
    INNER JOIN subcategory s ON t.subcategory_id = s.id
    INNER JOIN category c ON s.category_id = c.id
    INNER JOIN user u ON t.user_id = u.id";

/// Retrieve every transaction with its category, subcategory and user names.
///
/// The newest transactions come first: rows are ordered by date descending,
/// and transactions on the same date by ID descending.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transaction_rows(connection: &Connection) -> Result<Vec<TransactionRow>, Error> {
    connection
        .prepare(&format!(
            "{TRANSACTION_ROW_QUERY} ORDER BY t.date DESC, t.id DESC"
        ))?
        .query_map([], map_joined_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single transaction with its category, subcategory and user names.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction_row(id: TransactionId, connection: &Connection) -> Result<TransactionRow, Error> {
    let row = connection
        .prepare(&format!("{TRANSACTION_ROW_QUERY} WHERE t.id = :id"))?
        .query_one(&[(":id", &id)], map_joined_row)?;

    Ok(row)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                kind TEXT NOT NULL CHECK(kind IN ('Income', 'Expense')),
                amount REAL NOT NULL CHECK(amount >= 0),
                subcategory_id INTEGER NOT NULL,
                description TEXT,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(subcategory_id) REFERENCES subcategory(id),
                FOREIGN KEY(user_id) REFERENCES user(id)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        subcategory_id: row.get(4)?,
        description: row.get(5)?,
        user_id: row.get(6)?,
    })
}

fn map_joined_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        id: row.get(0)?,
        date: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        subcategory: row.get(5)?,
        description: row.get(6)?,
        user: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, Kind, Name, create_category, create_subcategory, create_user,
        test_utils::get_test_connection,
        transaction::{
            Transaction, TransactionRow, count_transactions, create_transaction, get_transaction,
            get_transaction_row, get_transaction_rows,
        },
    };

    /// Creates Ana, Salary (Income) / Payroll and Food (Expense) / Groceries.
    fn get_seeded_connection() -> Connection {
        let connection = get_test_connection();
        create_user(Name::new_unchecked("Ana"), &connection).unwrap();
        let salary =
            create_category(Name::new_unchecked("Salary"), Kind::Income, &connection).unwrap();
        let food = create_category(Name::new_unchecked("Food"), Kind::Expense, &connection).unwrap();
        create_subcategory(salary.id, Name::new_unchecked("Payroll"), &connection).unwrap();
        create_subcategory(food.id, Name::new_unchecked("Groceries"), &connection).unwrap();
        connection
    }

    #[test]
    fn create_and_list_salary_transaction() {
        let connection = get_seeded_connection();

        let transaction = create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Income, 1500.0, 1, 1),
            &connection,
        )
        .unwrap();

        assert_eq!(get_transaction(transaction.id, &connection), Ok(transaction));
        assert_eq!(
            get_transaction_rows(&connection),
            Ok(vec![TransactionRow {
                id: 1,
                date: date!(2024 - 01 - 15),
                kind: Kind::Income,
                amount: 1500.0,
                category: "Salary".to_owned(),
                subcategory: "Payroll".to_owned(),
                description: None,
                user: "Ana".to_owned(),
            }])
        );
    }

    #[test]
    fn negative_amount_never_reaches_storage() {
        let connection = get_seeded_connection();

        let result = create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Expense, -10.0, 2, 1),
            &connection,
        );

        assert_eq!(result, Err(Error::NegativeAmount(-10.0)));
        assert_eq!(count_transactions(&connection), Ok(0));
    }

    #[test]
    fn zero_amount_is_allowed() {
        let connection = get_seeded_connection();

        let result = create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Expense, 0.0, 2, 1),
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn blank_description_is_stored_as_none() {
        let connection = get_seeded_connection();

        let transaction = create_transaction(
            Transaction::build(date!(2024 - 02 - 01), Kind::Expense, 20.0, 2, 1)
                .description(Some("   ")),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.description, None);
    }

    #[test]
    fn create_transaction_fails_on_missing_subcategory() {
        let connection = get_seeded_connection();

        let result = create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Expense, 10.0, 99, 1),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidSubcategory(99)));
        assert_eq!(count_transactions(&connection), Ok(0));
    }

    #[test]
    fn create_transaction_fails_on_missing_user() {
        let connection = get_seeded_connection();

        let result = create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Expense, 10.0, 2, 42),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidUser(42)));
        assert_eq!(count_transactions(&connection), Ok(0));
    }

    #[test]
    fn kind_is_not_checked_against_category() {
        let connection = get_seeded_connection();

        // Groceries belongs to an Expense category.
        let result = create_transaction(
            Transaction::build(date!(2024 - 01 - 15), Kind::Income, 10.0, 2, 1),
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn rows_are_ordered_by_date_then_id_descending() {
        let connection = get_seeded_connection();
        let dates = [
            date!(2024 - 01 - 10),
            date!(2024 - 03 - 01),
            date!(2024 - 01 - 10),
            date!(2023 - 12 - 31),
        ];
        for date in dates {
            create_transaction(
                Transaction::build(date, Kind::Expense, 5.0, 2, 1),
                &connection,
            )
            .unwrap();
        }

        let got = get_transaction_rows(&connection)
            .unwrap()
            .into_iter()
            .map(|row| (row.date, row.id))
            .collect::<Vec<_>>();

        assert_eq!(
            got,
            vec![
                (date!(2024 - 03 - 01), 2),
                (date!(2024 - 01 - 10), 3),
                (date!(2024 - 01 - 10), 1),
                (date!(2023 - 12 - 31), 4),
            ]
        );
    }

    #[test]
    fn rows_carry_names_of_referenced_entities() {
        let connection = get_seeded_connection();
        let luis = create_user(Name::new_unchecked("Luis"), &connection).unwrap();

        let transaction = create_transaction(
            Transaction::build(date!(2024 - 05 - 05), Kind::Expense, 42.5, 2, luis.id)
                .description(Some("Weekly shop")),
            &connection,
        )
        .unwrap();

        let row = get_transaction_row(transaction.id, &connection).unwrap();
        assert_eq!(row.category, "Food");
        assert_eq!(row.subcategory, "Groceries");
        assert_eq!(row.user, "Luis");
        assert_eq!(row.description.as_deref(), Some("Weekly shop"));
    }

    #[test]
    fn get_transaction_row_fails_on_missing_id() {
        let connection = get_seeded_connection();

        assert_eq!(get_transaction_row(3, &connection), Err(Error::NotFound));
    }
}
