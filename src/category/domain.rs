use serde::{Deserialize, Serialize};

use crate::{Kind, Name, database_id::DatabaseId};

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A category such as "Salary" or "Food" that groups subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category, unique among categories of the same kind.
    pub name: Name,
    /// Whether transactions in this category earn or spend money.
    pub kind: Kind,
}

/// Form data for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The name of the new category.
    pub name: String,
    /// The kind as submitted, parsed into a [Kind] by the endpoint.
    pub kind: String,
}
