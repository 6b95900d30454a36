//! In-memory repositories loaded from a TOML catalog.
//!
//! ```toml
//! [[categories]]
//! id = 1
//! level = 1
//! type = "item"
//! linklist = true
//! details = [{ lang = "de", name = "Möbel", name_url = "moebel" }]
//!
//! [[items]]
//! item_id = 7
//! variation_id = 1001
//! texts.de = { name = "Stuhl", url_content = "stuhl" }
//!
//! [[units]]
//! id = 2
//! key = "KGM"
//! names = { de = "Kilogramm" }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{CategoryRepo, ItemRepo, RepoError, UnitRepo};
use crate::domain::entities::{
    CategoryRecord, CurrentItem, ItemText, NavigationNode, VariationUrlData,
};
use crate::domain::error::DomainError;
use crate::domain::types::{CategoryId, CategoryTypeFilter, ItemId, Lang, UnitId, VariationId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    categories: Vec<CategoryRecord>,
    items: Vec<CatalogItem>,
    units: Vec<CatalogUnit>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogItem {
    item_id: ItemId,
    variation_id: VariationId,
    #[serde(default)]
    texts: HashMap<Lang, ItemText>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogUnit {
    id: UnitId,
    key: String,
    #[serde(default)]
    names: HashMap<Lang, String>,
}

/// Category, item and unit repositories backed by a loaded catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    categories: BTreeMap<CategoryId, CategoryRecord>,
    items: HashMap<(ItemId, VariationId), CatalogItem>,
    units: Vec<CatalogUnit>,
}

impl InMemoryCatalog {
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;

        let mut categories = BTreeMap::new();
        for category in file.categories {
            let id = category.id;
            if id == 0 {
                return Err(DomainError::validation("category id 0 is reserved").into());
            }
            if categories.insert(id, category).is_some() {
                return Err(DomainError::DuplicateCategory { id }.into());
            }
        }

        let mut items = HashMap::new();
        for item in file.items {
            let key = (item.item_id, item.variation_id);
            if items.insert(key, item).is_some() {
                return Err(DomainError::validation(format!(
                    "variation {} of item {} appears more than once",
                    key.1, key.0
                ))
                .into());
            }
        }

        let catalog = Self {
            categories,
            items,
            units: file.units,
        };
        debug!(
            categories = catalog.categories.len(),
            variations = catalog.items.len(),
            units = catalog.units.len(),
            "catalog parsed"
        );
        Ok(catalog)
    }

    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let source = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_toml_str(&source)?;
        info!(path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    /// The page subject of a variation, with all its localized texts.
    pub fn current_item(&self, item_id: ItemId, variation_id: VariationId) -> Option<CurrentItem> {
        self.items
            .get(&(item_id, variation_id))
            .map(|item| CurrentItem {
                item_id: item.item_id,
                variation_id: item.variation_id,
                texts: item.texts.clone(),
            })
    }

    /// A copy of the category carrying only the details of `lang`.
    fn localized(&self, category: &CategoryRecord, lang: &Lang) -> CategoryRecord {
        let mut localized = category.clone();
        localized.details.retain(|details| &details.lang == lang);
        localized
    }

    fn shown_in_navigation(
        category: &CategoryRecord,
        filter: CategoryTypeFilter,
        lang: &Lang,
    ) -> bool {
        category.linklist
            && filter.matches(category.category_type)
            && category.details_for(lang).is_some()
    }

    fn navigation_children(
        &self,
        parent: Option<CategoryId>,
        level: u32,
        filter: CategoryTypeFilter,
        lang: &Lang,
        max_level: u32,
    ) -> Vec<NavigationNode> {
        if level > max_level {
            return Vec::new();
        }
        self.categories
            .values()
            .filter(|category| match parent {
                Some(parent) => category.parent_category_id == Some(parent),
                None => category.parent_category_id.unwrap_or(0) == 0,
            })
            .filter(|category| Self::shown_in_navigation(category, filter, lang))
            .map(|category| NavigationNode {
                category: self.localized(category, lang),
                children: self.navigation_children(
                    Some(category.id),
                    level + 1,
                    filter,
                    lang,
                    max_level,
                ),
            })
            .collect()
    }
}

#[async_trait]
impl CategoryRepo for InMemoryCatalog {
    async fn get(&self, id: CategoryId, lang: &Lang) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self
            .categories
            .get(&id)
            .map(|category| self.localized(category, lang)))
    }

    async fn children(
        &self,
        id: CategoryId,
        lang: &Lang,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(self
            .categories
            .values()
            .filter(|category| category.parent_category_id == Some(id))
            .map(|category| self.localized(category, lang))
            .collect())
    }

    async fn url(&self, id: CategoryId, lang: &Lang) -> Result<String, RepoError> {
        let mut segments = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(id);

        while let Some(current) = next.filter(|id| *id > 0) {
            if !visited.insert(current) {
                return Err(RepoError::InvalidInput {
                    message: format!("category {id} has a cyclic parent chain"),
                });
            }
            let Some(category) = self.categories.get(&current) else {
                break;
            };
            if let Some(details) = category.details_for(lang)
                && !details.name_url.trim().is_empty()
            {
                segments.push(details.name_url.trim().to_string());
            }
            next = category.parent_category_id;
        }

        segments.reverse();
        Ok(segments.join("/"))
    }

    async fn linklist_tree(
        &self,
        filter: CategoryTypeFilter,
        lang: &Lang,
        webstore_id: u32,
        max_level: u32,
    ) -> Result<Vec<NavigationNode>, RepoError> {
        debug!(webstore_id, max_level, "building navigation tree from catalog");
        Ok(self.navigation_children(None, 1, filter, lang, max_level))
    }

    async fn linklist_list(
        &self,
        filter: CategoryTypeFilter,
        lang: &Lang,
        webstore_id: u32,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        debug!(webstore_id, "listing navigation categories from catalog");
        let mut list: Vec<CategoryRecord> = self
            .categories
            .values()
            .filter(|category| Self::shown_in_navigation(category, filter, lang))
            .map(|category| self.localized(category, lang))
            .collect();
        list.sort_by_key(|category| (category.level, category.id));
        Ok(list)
    }
}

#[async_trait]
impl ItemRepo for InMemoryCatalog {
    async fn variation_url_data(
        &self,
        item_id: ItemId,
        variation_id: VariationId,
        lang: &Lang,
    ) -> Result<Option<VariationUrlData>, RepoError> {
        let data = self
            .items
            .get(&(item_id, variation_id))
            .and_then(|item| item.texts.get(lang))
            .map(|text| VariationUrlData {
                item_id,
                variation_id,
                name: text.name.clone(),
                url_content: Some(text.url_content.trim())
                    .filter(|content| !content.is_empty())
                    .map(str::to_string),
            });
        Ok(data)
    }
}

#[async_trait]
impl UnitRepo for InMemoryCatalog {
    async fn unit_id_by_key(&self, unit_key: &str) -> Result<Option<UnitId>, RepoError> {
        Ok(self
            .units
            .iter()
            .find(|unit| unit.key.eq_ignore_ascii_case(unit_key.trim()))
            .map(|unit| unit.id))
    }

    async fn unit_name(&self, id: UnitId, lang: &Lang) -> Result<Option<String>, RepoError> {
        Ok(self
            .units
            .iter()
            .find(|unit| unit.id == id)
            .and_then(|unit| unit.names.get(lang))
            .cloned())
    }
}
