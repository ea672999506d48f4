//! # Reference Commands
//!
//! Catalog search and the shared service-order reference data.

use balcao_api::{Backend, ReferenceCache};
use balcao_core::{CatalogEntry, ChecklistItem, WarrantyTerm};
use tracing::debug;

use crate::error::ConsoleError;

pub async fn search_catalog<B: Backend>(
    cache: &ReferenceCache<B>,
    query: &str,
) -> Result<Vec<CatalogEntry>, ConsoleError> {
    debug!(query, "search_catalog command");

    let query = query.trim();
    if query.is_empty() {
        return Err(ConsoleError::validation("Search text is required"));
    }
    Ok(cache.backend().lookup_catalog(query).await?)
}

/// Active checklist steps.
pub async fn checklist<B: Backend>(
    cache: &ReferenceCache<B>,
) -> Result<Vec<ChecklistItem>, ConsoleError> {
    let items = cache.checklist_items().await?;
    Ok(items.iter().filter(|i| i.active).cloned().collect())
}

pub async fn warranty_terms<B: Backend>(
    cache: &ReferenceCache<B>,
) -> Result<Vec<WarrantyTerm>, ConsoleError> {
    Ok(cache.warranty_terms().await?.as_ref().clone())
}
