//! Repository traits describing the host commerce framework.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{CategoryRecord, NavigationNode, VariationUrlData};
use crate::domain::types::{CategoryId, CategoryTypeFilter, ItemId, Lang, UnitId, VariationId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("repository timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// Load one category in the given language; `None` when it does not exist.
    async fn get(&self, id: CategoryId, lang: &Lang) -> Result<Option<CategoryRecord>, RepoError>;

    async fn children(&self, id: CategoryId, lang: &Lang)
    -> Result<Vec<CategoryRecord>, RepoError>;

    /// Slug path of a category (for example `moebel/stuehle`), without a leading slash.
    async fn url(&self, id: CategoryId, lang: &Lang) -> Result<String, RepoError>;

    async fn linklist_tree(
        &self,
        filter: CategoryTypeFilter,
        lang: &Lang,
        webstore_id: u32,
        max_level: u32,
    ) -> Result<Vec<NavigationNode>, RepoError>;

    async fn linklist_list(
        &self,
        filter: CategoryTypeFilter,
        lang: &Lang,
        webstore_id: u32,
    ) -> Result<Vec<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait ItemRepo: Send + Sync {
    async fn variation_url_data(
        &self,
        item_id: ItemId,
        variation_id: VariationId,
        lang: &Lang,
    ) -> Result<Option<VariationUrlData>, RepoError>;
}

#[async_trait]
pub trait UnitRepo: Send + Sync {
    /// Resolve a unit of measurement key (`C62`, `KGM`, ...) to its id.
    async fn unit_id_by_key(&self, unit_key: &str) -> Result<Option<UnitId>, RepoError>;

    async fn unit_name(&self, id: UnitId, lang: &Lang) -> Result<Option<String>, RepoError>;
}

/// The repository set one request's services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepo>,
    pub items: Arc<dyn ItemRepo>,
    pub units: Arc<dyn UnitRepo>,
}

impl Repositories {
    /// Use one backend for every repository trait.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CategoryRepo + ItemRepo + UnitRepo + 'static,
    {
        Self {
            categories: backend.clone(),
            items: backend.clone(),
            units: backend,
        }
    }
}
