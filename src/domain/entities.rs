//! Domain records handed out by the host commerce repositories.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryType, ItemId, Lang, VariationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    #[serde(default)]
    pub parent_category_id: Option<CategoryId>,
    /// Depth in the category tree, starting at 1 for top-level categories.
    pub level: u32,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Whether the category is shown in navigation and breadcrumbs.
    #[serde(default)]
    pub linklist: bool,
    #[serde(default)]
    pub details: Vec<CategoryDetails>,
}

impl CategoryRecord {
    pub fn details_for(&self, lang: &Lang) -> Option<&CategoryDetails> {
        self.details.iter().find(|details| &details.lang == lang)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetails {
    pub lang: Lang,
    pub name: String,
    #[serde(default)]
    pub name_url: String,
    /// Optional canonical link override; empty means "derive from the slug path".
    #[serde(default)]
    pub canonical_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemText {
    pub name: String,
    #[serde(default)]
    pub url_content: String,
}

/// The product a page render is scoped to, with its localized texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentItem {
    pub item_id: ItemId,
    pub variation_id: VariationId,
    pub texts: HashMap<Lang, ItemText>,
}

impl CurrentItem {
    pub fn text_for(&self, lang: &Lang) -> Option<&ItemText> {
        self.texts.get(lang)
    }
}

/// Data needed to build the URL of a variation in one language.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationUrlData {
    pub item_id: ItemId,
    pub variation_id: VariationId,
    pub name: String,
    pub url_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationNode {
    pub category: CategoryRecord,
    pub children: Vec<NavigationNode>,
}

/// One segment of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Breadcrumb {
    Category(CategoryRecord),
    Item(ItemText),
}

impl Breadcrumb {
    pub fn category_id(&self) -> Option<CategoryId> {
        match self {
            Breadcrumb::Category(category) => Some(category.id),
            Breadcrumb::Item(_) => None,
        }
    }
}
