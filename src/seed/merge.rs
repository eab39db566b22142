//! Merging a seed document into the store, and building one from it.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    CategoryId, Error, Name, SeedCategory, SeedData, SeedSubcategory, SeedUser, get_all_users,
    get_categories, get_subcategories,
};

/// How many rows an import added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// The number of new categories.
    pub categories: usize,
    /// The number of new subcategories.
    pub subcategories: usize,
    /// The number of new users.
    pub users: usize,
}

impl ImportSummary {
    /// The total number of new rows.
    pub fn total(&self) -> usize {
        self.categories + self.subcategories + self.users
    }
}

/// Insert the rows of `seed` that are not already in the store.
///
/// Rows are matched by ID only. A row whose ID already exists is left as it is,
/// even if the seed gives it a different name, so importing the same document
/// again adds nothing. The import runs in a single SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if any name in `seed` is blank, in which case nothing is imported,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn import_seed(seed: &SeedData, connection: &Connection) -> Result<ImportSummary, Error> {
    let transaction = connection.unchecked_transaction()?;
    let mut summary = ImportSummary::default();

    for category in &seed.categories {
        if insert_category_if_absent(category, &transaction)? {
            summary.categories += 1;
        }

        for subcategory in &category.subcategories {
            if insert_subcategory_if_absent(category.id, subcategory, &transaction)? {
                summary.subcategories += 1;
            }
        }
    }

    for user in &seed.users {
        if insert_user_if_absent(user, &transaction)? {
            summary.users += 1;
        }
    }

    transaction.commit()?;

    tracing::info!(
        categories = summary.categories,
        subcategories = summary.subcategories,
        users = summary.users,
        "imported seed data"
    );

    Ok(summary)
}

fn insert_category_if_absent(
    category: &SeedCategory,
    connection: &Connection,
) -> Result<bool, Error> {
    let name = Name::new(&category.name)?;
    let rows_inserted = connection.execute(
        "INSERT INTO category (id, name, kind) VALUES (?1, ?2, ?3)
        ON CONFLICT(id) DO NOTHING",
        (category.id, name.as_ref(), category.kind),
    )?;

    Ok(rows_inserted > 0)
}

fn insert_subcategory_if_absent(
    category_id: CategoryId,
    subcategory: &SeedSubcategory,
    connection: &Connection,
) -> Result<bool, Error> {
    let name = Name::new(&subcategory.name)?;
    let rows_inserted = connection.execute(
        "INSERT INTO subcategory (id, category_id, name) VALUES (?1, ?2, ?3)
        ON CONFLICT(id) DO NOTHING",
        (subcategory.id, category_id, name.as_ref()),
    )?;

    Ok(rows_inserted > 0)
}

fn insert_user_if_absent(user: &SeedUser, connection: &Connection) -> Result<bool, Error> {
    let name = Name::new(&user.name)?;
    let rows_inserted = connection.execute(
        "INSERT INTO user (id, name) VALUES (?1, ?2)
        ON CONFLICT(id) DO NOTHING",
        (user.id, name.as_ref()),
    )?;

    Ok(rows_inserted > 0)
}

/// Build a seed document from the current store, keeping the stored IDs.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn export_seed(connection: &Connection) -> Result<SeedData, Error> {
    let mut subcategories_by_category: HashMap<CategoryId, Vec<SeedSubcategory>> =
        HashMap::new();

    for subcategory in get_subcategories(None, connection)? {
        subcategories_by_category
            .entry(subcategory.category_id)
            .or_default()
            .push(SeedSubcategory {
                id: subcategory.id,
                name: subcategory.name.to_string(),
            });
    }

    let categories = get_categories(None, connection)?
        .into_iter()
        .map(|category| SeedCategory {
            id: category.id,
            name: category.name.to_string(),
            kind: category.kind,
            subcategories: subcategories_by_category
                .remove(&category.id)
                .unwrap_or_default(),
        })
        .collect();

    let users = get_all_users(connection)?
        .into_iter()
        .map(|user| SeedUser {
            id: user.id,
            name: user.name.to_string(),
        })
        .collect();

    Ok(SeedData { categories, users })
}
