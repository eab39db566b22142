use rusqlite::Connection;

use crate::db::initialize;

/// An in-memory database with all the tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}
