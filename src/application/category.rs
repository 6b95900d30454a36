//! Category lookups and the current-category state of one request.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::application::repos::{CategoryRepo, RepoError};
use crate::cache::lock::mutex_lock;
use crate::cache::{CategoryKey, MemoryCache};
use crate::config::StorefrontSettings;
use crate::domain::entities::{
    Breadcrumb, CategoryDetails, CategoryRecord, CurrentItem, NavigationNode,
};
use crate::domain::slug::normalize_path;
use crate::domain::tree::{CategoryTree, CurrentSelection};
use crate::domain::types::{CategoryId, CategoryTypeFilter, Lang};
use crate::runtime::{RuntimeStats, RuntimeTracker};

pub const COMPONENT: &str = "CategoryService";

/// Depth of the navigation tree when the caller does not ask for one.
pub const DEFAULT_NAVIGATION_DEPTH: u32 = 2;

/// Request-scoped category service.
///
/// Lookups are memoized for the lifetime of the service, which is one request.
/// The service also owns the current selection (category, its ancestor chain
/// and the current item) that breadcrumbs and canonical URLs are derived from.
pub struct CategoryService {
    repo: Arc<dyn CategoryRepo>,
    settings: Arc<StorefrontSettings>,
    lang: Lang,
    tracker: RuntimeTracker,
    categories: MemoryCache<CategoryKey, Option<CategoryRecord>>,
    children: MemoryCache<CategoryKey, Option<Vec<CategoryRecord>>>,
    urls: MemoryCache<CategoryKey, Option<String>>,
    selection: Mutex<CurrentSelection>,
}

impl CategoryService {
    pub fn new(
        repo: Arc<dyn CategoryRepo>,
        settings: Arc<StorefrontSettings>,
        lang: Lang,
        stats: &RuntimeStats,
    ) -> Self {
        Self {
            repo,
            settings,
            lang,
            tracker: RuntimeTracker::new(COMPONENT, stats),
            categories: MemoryCache::new("category.get"),
            children: MemoryCache::new("category.children"),
            urls: MemoryCache::new("category.url"),
            selection: Mutex::new(CurrentSelection::default()),
        }
    }

    /// Language of the request this service belongs to.
    pub fn lang(&self) -> &Lang {
        &self.lang
    }

    pub async fn get(
        &self,
        id: CategoryId,
        lang: Option<&Lang>,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let lang = lang.unwrap_or(&self.lang);
        self.tracker.instrument("get", self.lookup(id, lang)).await
    }

    /// Children of a category; `None` for the virtual root id `0`.
    pub async fn get_children(
        &self,
        id: CategoryId,
        lang: Option<&Lang>,
    ) -> Result<Option<Vec<CategoryRecord>>, RepoError> {
        let lang = lang.unwrap_or(&self.lang);
        self.tracker
            .instrument("get_children", async {
                if id == 0 {
                    return Ok(None);
                }
                let key = CategoryKey::Children {
                    id,
                    lang: lang.clone(),
                };
                self.children
                    .get_or_try_insert_with(key, || async {
                        self.repo.children(id, lang).await.map(Some)
                    })
                    .await
            })
            .await
    }

    /// URL path of a category (`/moebel/stuehle`), or `None` when the category
    /// has no details in `lang`.
    pub async fn get_url(
        &self,
        category: &CategoryRecord,
        lang: Option<&Lang>,
    ) -> Result<Option<String>, RepoError> {
        let lang = lang.unwrap_or(&self.lang);
        self.tracker
            .instrument("get_url", async {
                let key = CategoryKey::Url {
                    id: category.id,
                    lang: lang.clone(),
                };
                self.urls
                    .get_or_try_insert_with(key, || async {
                        if category.details_for(lang).is_none() {
                            return Ok(None);
                        }
                        let path = self.repo.url(category.id, lang).await;
                        path.map(|path| Some(format!("/{}", normalize_path(&path))))
                    })
                    .await
            })
            .await
    }

    pub fn get_details(
        &self,
        category: &CategoryRecord,
        lang: Option<&Lang>,
    ) -> Option<CategoryDetails> {
        let lang = lang.unwrap_or(&self.lang);
        self.tracker
            .measure("get_details", || category.details_for(lang).cloned())
    }

    /// Load a category in the request language and make it current.
    pub async fn set_current_category_id(&self, id: CategoryId) -> Result<(), RepoError> {
        self.tracker
            .instrument("set_current_category_id", async {
                let category = self.lookup(id, &self.lang).await?;
                self.set_current_category(category).await
            })
            .await
    }

    /// Make `category` current and resolve its ancestor chain.
    ///
    /// `None` clears the selection. The walk stops at the first parent that
    /// does not resolve, so a broken reference leaves a partial chain.
    pub async fn set_current_category(
        &self,
        category: Option<CategoryRecord>,
    ) -> Result<(), RepoError> {
        const OPERATION: &str = "set_current_category";
        self.tracker.start(OPERATION);

        let Some(category) = category else {
            mutex_lock(&self.selection, COMPONENT, OPERATION).clear_category();
            return Ok(());
        };

        let tree = self.resolve_tree(&category).await?;
        debug!(
            category_id = category.id,
            depth = tree.len(),
            "resolved current category"
        );

        {
            let mut selection = mutex_lock(&self.selection, COMPONENT, OPERATION);
            selection.category = Some(category);
            selection.tree = tree;
        }

        self.tracker.track(OPERATION);
        Ok(())
    }

    pub fn current_category(&self) -> Option<CategoryRecord> {
        mutex_lock(&self.selection, COMPONENT, "current_category")
            .category
            .clone()
    }

    pub fn current_category_tree(&self) -> CategoryTree {
        mutex_lock(&self.selection, COMPONENT, "current_category_tree")
            .tree
            .clone()
    }

    pub fn current_item(&self) -> Option<CurrentItem> {
        mutex_lock(&self.selection, COMPONENT, "current_item")
            .item
            .clone()
    }

    pub fn set_current_item(&self, item: Option<CurrentItem>) {
        mutex_lock(&self.selection, COMPONENT, "set_current_item").item = item;
    }

    pub fn is_current(&self, category: &CategoryRecord) -> bool {
        self.tracker.measure("is_current", || {
            mutex_lock(&self.selection, COMPONENT, "is_current")
                .category
                .as_ref()
                .is_some_and(|current| current.id == category.id)
        })
    }

    /// Whether `category` lies on the chain from the current category to the root.
    pub fn is_open(&self, category: &CategoryRecord) -> bool {
        self.tracker.measure("is_open", || {
            mutex_lock(&self.selection, COMPONENT, "is_open")
                .tree
                .contains_id(category.id)
        })
    }

    pub fn is_active(&self, category: Option<&CategoryRecord>) -> bool {
        self.tracker.measure("is_active", || {
            category.is_some_and(|category| self.is_current(category) || self.is_open(category))
        })
    }

    /// Breadcrumb trail of the current selection.
    ///
    /// A positive `category_id` first makes that category current. Only
    /// categories shown in the link list are kept; the trail runs root first
    /// unless `bottom_up` is set. The current item, when it has a text in the
    /// request language, is always the last segment.
    pub async fn get_hierarchy(
        &self,
        category_id: CategoryId,
        bottom_up: bool,
    ) -> Result<Vec<Breadcrumb>, RepoError> {
        self.tracker
            .instrument("get_hierarchy", async {
                if category_id > 0 {
                    self.set_current_category_id(category_id).await?;
                }

                let (tree, item) = {
                    let selection = mutex_lock(&self.selection, COMPONENT, "get_hierarchy");
                    (selection.tree.clone(), selection.item.clone())
                };

                let mut hierarchy: Vec<Breadcrumb> = tree
                    .iter()
                    .filter(|category| category.linklist)
                    .cloned()
                    .map(Breadcrumb::Category)
                    .collect();
                if bottom_up {
                    hierarchy.reverse();
                }

                if let Some(text) = item.as_ref().and_then(|item| item.text_for(&self.lang)) {
                    hierarchy.push(Breadcrumb::Item(text.clone()));
                }

                Ok::<_, RepoError>(hierarchy)
            })
            .await
    }

    pub async fn get_navigation_tree(
        &self,
        filter: CategoryTypeFilter,
        lang: Option<&Lang>,
        max_level: Option<u32>,
    ) -> Result<Vec<NavigationNode>, RepoError> {
        let lang = lang.unwrap_or(&self.lang);
        let max_level = max_level.unwrap_or(DEFAULT_NAVIGATION_DEPTH);
        self.tracker
            .instrument(
                "get_navigation_tree",
                self.repo
                    .linklist_tree(filter, lang, self.settings.webstore_id, max_level),
            )
            .await
    }

    pub async fn get_navigation_list(
        &self,
        filter: CategoryTypeFilter,
        lang: Option<&Lang>,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        let lang = lang.unwrap_or(&self.lang);
        self.tracker
            .instrument(
                "get_navigation_list",
                self.repo
                    .linklist_list(filter, lang, self.settings.webstore_id),
            )
            .await
    }

    async fn lookup(
        &self,
        id: CategoryId,
        lang: &Lang,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let key = CategoryKey::Category {
            id,
            lang: lang.clone(),
        };
        self.categories
            .get_or_try_insert_with(key, || self.repo.get(id, lang))
            .await
    }

    async fn resolve_tree(&self, category: &CategoryRecord) -> Result<CategoryTree, RepoError> {
        let mut tree = CategoryTree::new();
        tree.insert(category.clone());

        // Same-level inserts replace each other, so the tree cannot tell
        // which ids were already walked.
        let mut visited = HashSet::from([category.id]);
        let mut parent_id = category.parent_category_id;
        while let Some(id) = parent_id.filter(|id| *id > 0) {
            if !visited.insert(id) {
                warn!(
                    category_id = category.id,
                    parent_id = id,
                    "category parent chain loops back on itself"
                );
                break;
            }

            match self.lookup(id, &self.lang).await? {
                Some(parent) => {
                    parent_id = parent.parent_category_id;
                    tree.insert(parent);
                }
                None => {
                    debug!(
                        category_id = category.id,
                        parent_id = id,
                        "parent category missing; keeping partial chain"
                    );
                    break;
                }
            }
        }

        Ok(tree)
    }
}
