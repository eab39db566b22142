use serde::{Deserialize, Serialize};

use crate::{CategoryId, Kind, SubcategoryId, UserId};

/// The document stored in a seed file.
///
/// Keys from older Spanish seed files, e.g. `categorias` and `usuarios`, are
/// accepted as aliases. Missing lists are treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    /// Categories with their nested subcategories.
    #[serde(default, alias = "categorias")]
    pub categories: Vec<SeedCategory>,
    /// The users that can record transactions.
    #[serde(default, alias = "usuarios")]
    pub users: Vec<SeedUser>,
}

/// A category in a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCategory {
    /// The ID to insert the category with.
    #[serde(alias = "id_categoria")]
    pub id: CategoryId,
    /// The display name of the category.
    #[serde(alias = "nombre_categoria")]
    pub name: String,
    /// Whether the category is for income or expenses.
    #[serde(alias = "tipo")]
    pub kind: Kind,
    /// The subcategories nested under this category.
    #[serde(default, alias = "subcategorias")]
    pub subcategories: Vec<SeedSubcategory>,
}

/// A subcategory in a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSubcategory {
    /// The ID to insert the subcategory with.
    #[serde(alias = "id_subcategoria")]
    pub id: SubcategoryId,
    /// The display name of the subcategory.
    #[serde(alias = "nombre_subcategoria")]
    pub name: String,
}

/// A user in a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedUser {
    /// The ID to insert the user with.
    #[serde(alias = "id_usuario")]
    pub id: UserId,
    /// The display name of the user.
    #[serde(alias = "nombre")]
    pub name: String,
}
