//! Bootstrapping the store from a JSON seed file, and exporting it back.
//!
//! The seed file is only ever read. Rows added through the app live in the
//! database alone, use the export to get a seed file that includes them.

mod domain;
mod file;
mod merge;
mod page;

pub use domain::{SeedCategory, SeedData, SeedSubcategory, SeedUser};
pub use file::{SeedLoad, load_seed_file};
pub use merge::{ImportSummary, export_seed, import_seed};
pub use page::{export_seed_endpoint, get_import_page, import_seed_endpoint};
