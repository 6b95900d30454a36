//! Page entry points: resolve the current selection and collect what a
//! template needs to render the page.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::application::category::CategoryService;
use crate::application::repos::RepoError;
use crate::application::url::{LanguageUrl, UrlService};
use crate::config::StorefrontSettings;
use crate::domain::entities::{Breadcrumb, CategoryRecord, CurrentItem};
use crate::domain::types::{CategoryId, Lang, TemplateId};
use crate::runtime::{RuntimeStats, RuntimeTracker};

pub const COMPONENT: &str = "LayoutController";

/// Everything a template receives for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub template: TemplateId,
    pub lang: Lang,
    pub category: Option<CategoryRecord>,
    pub item: Option<CurrentItem>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub canonical_url: Option<String>,
    pub language_urls: Vec<LanguageUrl>,
}

pub struct LayoutController {
    categories: Arc<CategoryService>,
    urls: Arc<UrlService>,
    settings: Arc<StorefrontSettings>,
    tracker: RuntimeTracker,
}

impl LayoutController {
    pub fn new(
        categories: Arc<CategoryService>,
        urls: Arc<UrlService>,
        settings: Arc<StorefrontSettings>,
        stats: &RuntimeStats,
    ) -> Self {
        Self {
            categories,
            urls,
            settings,
            tracker: RuntimeTracker::new(COMPONENT, stats),
        }
    }

    /// Render a category page.
    ///
    /// A missing category falls back to the configured "page not found"
    /// category; `None` when that is missing too.
    pub async fn render_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<PageContext>, RepoError> {
        self.tracker
            .instrument("render_category", async {
                let Some(category) = self.category_or_not_found(category_id).await? else {
                    warn!(category_id, "category not found and no fallback category available");
                    return Ok(None);
                };

                let template = TemplateId::category(category.category_type);
                self.categories.set_current_category(Some(category)).await?;
                self.page_context(template).await.map(Some)
            })
            .await
    }

    /// Render the page of `item`, reached from `category_id` when given.
    pub async fn render_item(
        &self,
        item: CurrentItem,
        category_id: Option<CategoryId>,
    ) -> Result<PageContext, RepoError> {
        self.tracker
            .instrument("render_item", async {
                self.categories.set_current_item(Some(item));
                if let Some(id) = category_id {
                    self.categories.set_current_category_id(id).await?;
                }
                self.page_context(TemplateId::Item).await
            })
            .await
    }

    pub async fn render_home(&self) -> Result<PageContext, RepoError> {
        self.tracker
            .instrument("render_home", self.page_context(TemplateId::Home))
            .await
    }

    async fn category_or_not_found(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        if let Some(category) = self.categories.get(category_id, None).await? {
            return Ok(Some(category));
        }

        match self.settings.page_not_found_category {
            Some(fallback) if fallback != category_id => {
                info!(category_id, fallback, "rendering page-not-found category");
                self.categories.get(fallback, None).await
            }
            _ => Ok(None),
        }
    }

    async fn page_context(&self, template: TemplateId) -> Result<PageContext, RepoError> {
        let breadcrumbs = self.categories.get_hierarchy(0, false).await?;
        let canonical_url = self.urls.get_canonical_url(&template, None).await?;
        let language_urls = self.urls.get_language_urls(&template).await?;

        Ok(PageContext {
            template,
            lang: self.categories.lang().clone(),
            category: self.categories.current_category(),
            item: self.categories.current_item(),
            breadcrumbs,
            canonical_url,
            language_urls,
        })
    }
}
