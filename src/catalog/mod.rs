//! Company catalog: name -> statement URLs.
//!
//! - `slug` / `build`: derive URLs from the exchange master list (offline)
//! - `verify`: drop entries whose pages don't answer a `HEAD` probe
//! - `store`: CSV read/write
//!
//! At runtime the catalog is loaded once with [`Catalog::load`] and only read
//! afterwards.

pub mod build;
pub mod slug;
pub mod store;
pub mod verify;

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{CatalogEntry, StatementRefs};
use crate::error::AppError;

/// Immutable lookup table used by the resolver.
///
/// Names keep first-seen order. A name that appears more than once keeps its
/// first position but takes the URLs of its last row.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: Vec<String>,
    refs: HashMap<String, StatementRefs>,
}

impl Catalog {
    /// Load a persisted catalog CSV.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let loaded = store::read_catalog(path)?;
        let catalog = Self::from_entries(loaded.rows);
        if catalog.is_empty() {
            return Err(AppError::no_data(format!("Catalog '{}' has no usable rows.", path.display())));
        }
        info!(path = %path.display(), companies = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            let refs = entry.refs();
            if catalog.refs.insert(entry.company.clone(), refs).is_some() {
                debug!(company = entry.company.as_str(), "duplicate catalog name, keeping last URLs");
            } else {
                catalog.names.push(entry.company);
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Company names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn get(&self, company: &str) -> Option<&StatementRefs> {
        self.refs.get(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(company: &str, bs: &str) -> CatalogEntry {
        CatalogEntry {
            company: company.to_string(),
            symbol: String::new(),
            balance_sheet_url: bs.to_string(),
            profit_loss_url: format!("{bs}-pl"),
            bs_valid: None,
            pl_valid: None,
        }
    }

    #[test]
    fn duplicates_keep_position_and_last_urls() {
        let catalog = Catalog::from_entries([
            entry("Axis Bank", "first"),
            entry("Infosys Ltd", "infy"),
            entry("Axis Bank", "second"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["Axis Bank", "Infosys Ltd"]);
        assert_eq!(catalog.get("Axis Bank").unwrap().balance_sheet, "second");
        assert!(catalog.get("Wipro").is_none());
    }

    #[test]
    fn resolver_sees_catalog_names() {
        let catalog = Catalog::from_entries([entry("Axis Bank", "bs")]);
        let m = crate::resolve::resolve("axsi bank", catalog.names());
        assert_eq!(m.candidate.as_deref(), Some("Axis Bank"));
        assert!(m.confidence >= crate::resolve::ACCEPT_THRESHOLD);
    }
}
