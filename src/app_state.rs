//! Implements a struct that holds the state of the web server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{Error, SheetSync, db::initialize, timezone::get_local_offset};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "America/Lima".
    pub local_timezone: String,

    /// The JSON file the import page reads categories, subcategories and users from.
    pub seed_path: PathBuf,

    /// Where new transactions are copied to, if anywhere.
    pub sheet_sync: Option<SheetSync>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Lima".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or `local_timezone`
    /// is not a known timezone.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        seed_path: PathBuf,
        sheet_sync: Option<SheetSync>,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: local_timezone.to_owned(),
            seed_path,
            sheet_sync,
        })
    }
}
