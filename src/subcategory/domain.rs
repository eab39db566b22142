use serde::{Deserialize, Serialize};

use crate::{CategoryId, Name, database_id::DatabaseId};

/// Database identifier for a subcategory.
pub type SubcategoryId = DatabaseId;

/// A subcategory such as "Payroll" under the category "Salary".
///
/// Transactions reference a subcategory, and through it, a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    /// The ID of the subcategory.
    pub id: SubcategoryId,
    /// The ID of the category this subcategory belongs to.
    pub category_id: CategoryId,
    /// The name of the subcategory, unique within its category.
    pub name: Name,
}

/// Form data for creating a subcategory.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubcategoryFormData {
    /// `None` when the form was submitted without choosing a category.
    pub category_id: Option<CategoryId>,
    /// The name of the new subcategory.
    pub name: String,
}
