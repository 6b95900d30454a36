//! Shared domain identifiers and enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type CategoryId = u32;
pub type ItemId = u32;
pub type VariationId = u32;
pub type UnitId = u32;

/// Language used when the session carries none.
pub const FALLBACK_LANGUAGE: &str = "de";

/// Two-letter shop language code (`de`, `en`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_lowercase())
    }

    /// Resolve the session language, falling back to `de` when unset or blank.
    pub fn resolve(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(code) if !code.is_empty() => Self::new(code),
            _ => Self::new(FALLBACK_LANGUAGE),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Lang {
    fn default() -> Self {
        Self::new(FALLBACK_LANGUAGE)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Lang {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Item,
    Content,
    Container,
    Blog,
}

impl CategoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryType::Item => "item",
            CategoryType::Content => "content",
            CategoryType::Container => "container",
            CategoryType::Blog => "blog",
        }
    }
}

/// Category type filter for navigation listings; `All` matches every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryTypeFilter {
    #[default]
    All,
    Only(CategoryType),
}

impl CategoryTypeFilter {
    pub fn matches(self, category_type: CategoryType) -> bool {
        match self {
            CategoryTypeFilter::All => true,
            CategoryTypeFilter::Only(expected) => expected == category_type,
        }
    }
}

const HOME_TEMPLATE: &str = "tpl.home";
const ITEM_TEMPLATE: &str = "tpl.item";
const CATEGORY_TEMPLATE_PREFIX: &str = "tpl.category";

/// Identifier of the template a page is rendered with.
///
/// Category templates carry the variant suffix (`tpl.category.content` has
/// the variant `content`); any identifier starting with `tpl.category` is a
/// category template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Home,
    Item,
    Category(String),
    Other(String),
}

impl TemplateId {
    pub fn category(category_type: CategoryType) -> Self {
        TemplateId::Category(category_type.as_str().to_string())
    }

    pub fn parse(value: &str) -> Self {
        match value {
            HOME_TEMPLATE => TemplateId::Home,
            ITEM_TEMPLATE => TemplateId::Item,
            other => match other.strip_prefix(CATEGORY_TEMPLATE_PREFIX) {
                Some(variant) => TemplateId::Category(variant.trim_start_matches('.').to_string()),
                None => TemplateId::Other(other.to_string()),
            },
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateId::Home => f.write_str(HOME_TEMPLATE),
            TemplateId::Item => f.write_str(ITEM_TEMPLATE),
            TemplateId::Category(variant) if variant.is_empty() => {
                f.write_str(CATEGORY_TEMPLATE_PREFIX)
            }
            TemplateId::Category(variant) => write!(f, "{CATEGORY_TEMPLATE_PREFIX}.{variant}"),
            TemplateId::Other(name) => f.write_str(name),
        }
    }
}

impl Serialize for TemplateId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
