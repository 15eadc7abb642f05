use crate::api::{CatalogApi, Category};
use crate::Result;
use std::sync::Arc;

/// Category type of the synthetic promotional root, which holds no catalog of its own
pub const PROMO_ROOT_TYPE: &str = "promo_root";

/// Resolves the crawlable category slugs of a store
pub struct CategoryResolver {
    api: Arc<dyn CatalogApi>,
}

impl CategoryResolver {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Returns the store's category slugs in upstream order, promotional root excluded
    pub async fn resolve_categories(&self, store_id: i64) -> Result<Vec<String>> {
        let tree = self.api.category_tree(store_id).await?;

        let slugs: Vec<String> = flatten_categories(&tree)
            .into_iter()
            .filter(|category| category.category_type != PROMO_ROOT_TYPE)
            .map(|category| category.slug.clone())
            .collect();

        tracing::debug!("Store {} has {} categories", store_id, slugs.len());
        Ok(slugs)
    }
}

/// Flattens a category tree pre-order: each parent precedes its children
pub fn flatten_categories(tree: &[Category]) -> Vec<&Category> {
    let mut flat = Vec::new();
    let mut stack: Vec<&Category> = tree.iter().rev().collect();

    while let Some(category) = stack.pop() {
        flat.push(category);
        stack.extend(category.children.iter().rev());
    }

    flat
}
