use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog at {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// The full ordered list of available products.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: CatalogFile =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            products: file.products,
        })
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }
}

/// Current category value plus a free-text search keyword.
///
/// Together they define the visible subset of the catalog, independent of the
/// selection: selection membership is preserved when a product scrolls out of
/// the visible subset.
#[derive(Debug, Default, Clone)]
pub struct CatalogFilter {
    category: Option<String>,
    search: String,
}

impl CatalogFilter {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    pub fn set_search(&mut self, keyword: impl Into<String>) {
        self.search = keyword.into();
    }

    /// Advance the category value: all -> first -> ... -> last -> all.
    pub fn cycle_category(&mut self, catalog: &Catalog) {
        let categories = catalog.categories();
        self.category = match self.category.as_deref() {
            None => categories.first().map(|c| (*c).to_string()),
            Some(current) => {
                let position = categories.iter().position(|c| *c == current);
                match position {
                    Some(idx) if idx + 1 < categories.len() => {
                        Some(categories[idx + 1].to_string())
                    }
                    _ => None,
                }
            }
        };
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category.as_deref() {
            if product.category != category {
                return false;
            }
        }

        let keyword = self.search.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }

        product.name.to_lowercase().contains(&keyword)
            || product.brand.to_lowercase().contains(&keyword)
            || product.description.to_lowercase().contains(&keyword)
    }

    /// The visible subset, in catalog order.
    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        catalog
            .products()
            .iter()
            .filter(|product| self.matches(product))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn product(id: u32, name: &str, category: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            brand: "TestBrand".to_string(),
            category: category.to_string(),
            image: format!("img/{id}.png"),
            description: format!("{name} description"),
        }
    }

    #[test]
    fn filter_by_category() {
        let catalog = Catalog::from_products(vec![
            product(1, "Cleanser", "cleanser"),
            product(2, "Toner", "toner"),
        ]);
        let mut filter = CatalogFilter::default();
        filter.set_category(Some("cleanser".to_string()));

        let visible = filter.visible(&catalog);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);
    }

    #[test]
    fn search_matches_name_brand_and_description_case_insensitively() {
        let catalog = Catalog::from_products(vec![
            product(1, "Hydrating Cleanser", "cleanser"),
            product(2, "Toner", "toner"),
        ]);
        let mut filter = CatalogFilter::default();

        filter.set_search("HYDRA");
        assert_eq!(filter.visible(&catalog).len(), 1);

        filter.set_search("testbrand");
        assert_eq!(filter.visible(&catalog).len(), 2);

        filter.set_search("toner desc");
        assert_eq!(filter.visible(&catalog).len(), 1);
    }

    #[test]
    fn cycle_category_wraps_back_to_all() {
        let catalog = Catalog::from_products(vec![
            product(1, "Cleanser", "cleanser"),
            product(2, "Toner", "toner"),
        ]);
        let mut filter = CatalogFilter::default();

        filter.cycle_category(&catalog);
        assert_eq!(filter.category(), Some("cleanser"));
        filter.cycle_category(&catalog);
        assert_eq!(filter.category(), Some("toner"));
        filter.cycle_category(&catalog);
        assert_eq!(filter.category(), None);
    }

    #[test]
    fn categories_are_distinct_in_catalog_order() {
        let catalog = Catalog::from_products(vec![
            product(1, "A", "toner"),
            product(2, "B", "cleanser"),
            product(3, "C", "toner"),
        ]);
        assert_eq!(catalog.categories(), ["toner", "cleanser"]);
    }
}
