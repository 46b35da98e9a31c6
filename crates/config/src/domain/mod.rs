//! Domain data: the product catalog and the outlet directory
//!
//! Both load from YAML files named in `Settings::domain`, or from the copies
//! embedded in the binary when no path is set.

mod branches;
mod catalog;

pub use branches::{BranchesConfig, CityEntry};
pub use catalog::CatalogConfig;
