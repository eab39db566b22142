use serde::{Deserialize, Serialize};

use crate::{Name, database_id::DatabaseId};

/// Database identifier for a user.
pub type UserId = DatabaseId;

/// A person that transactions are attributed to.
///
/// Names are not unique, two users may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The ID of the user.
    pub id: UserId,
    /// The display name of the user.
    pub name: Name,
}

/// Form data for creating a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserFormData {
    /// The name of the new user.
    pub name: String,
}
