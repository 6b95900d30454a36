#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storefront::application::repos::{CategoryRepo, ItemRepo, RepoError, Repositories, UnitRepo};
use storefront::application::request::{RequestContext, RequestServices};
use storefront::config::{StorefrontSettings, TrackingSettings};
use storefront::domain::entities::{CategoryRecord, NavigationNode, VariationUrlData};
use storefront::domain::types::{
    CategoryId, CategoryTypeFilter, ItemId, Lang, UnitId, VariationId,
};
use storefront::infra::catalog::InMemoryCatalog;
use url::Url;

/// Root (1) → child (2) → leaf (3, hidden from the link list), a content
/// category with a canonical override (5), a category whose parent is
/// missing (9), a chair variation and one unit.
pub const CATALOG: &str = r#"
[[categories]]
id = 1
parent_category_id = 0
level = 1
type = "item"
linklist = true
details = [
    { lang = "de", name = "Möbel", name_url = "moebel" },
    { lang = "en", name = "Furniture", name_url = "furniture" },
]

[[categories]]
id = 2
parent_category_id = 1
level = 2
type = "item"
linklist = true
details = [
    { lang = "de", name = "Stühle", name_url = "stuehle" },
    { lang = "en", name = "Chairs", name_url = "chairs" },
]

[[categories]]
id = 3
parent_category_id = 2
level = 3
type = "item"
linklist = false
details = [{ lang = "de", name = "Holzstühle", name_url = "holzstuehle" }]

[[categories]]
id = 5
level = 1
type = "content"
linklist = true
details = [
    { lang = "de", name = "Über uns", name_url = "ueber-uns", canonical_link = "https://brand.example/ueber-uns" },
    { lang = "en", name = "About", name_url = "about" },
]

[[categories]]
id = 9
parent_category_id = 99
level = 4
type = "item"
linklist = true
details = [{ lang = "de", name = "Verwaist", name_url = "verwaist" }]

[[categories]]
id = 404
level = 1
type = "content"
linklist = false
details = [
    { lang = "de", name = "Nicht gefunden", name_url = "nicht-gefunden" },
    { lang = "en", name = "Not found", name_url = "not-found" },
]

[[items]]
item_id = 7
variation_id = 1001
texts.de = { name = "Gartenstuhl Äsche", url_content = "gartenstuhl" }
texts.en = { name = "Garden chair" }

[[units]]
id = 2
key = "KGM"
names = { de = "Kilogramm", en = "kilogram" }
"#;

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_toml_str(CATALOG).expect("fixture catalog parses")
}

pub fn settings() -> StorefrontSettings {
    StorefrontSettings {
        default_language: Lang::new("de"),
        active_languages: vec![Lang::new("de"), Lang::new("en")],
        webstore_id: 1,
        public_url: Url::parse("https://shop.example/").expect("public url"),
        page_not_found_category: Some(404),
    }
}

/// Services for one request against `repos`, in `lang`.
pub fn request(
    repos: &Repositories,
    settings: StorefrontSettings,
    lang: &str,
) -> (RequestContext, RequestServices) {
    let context = RequestContext::new(Some(lang), TrackingSettings::default());
    let services = RequestServices::new(repos, Arc::new(settings), &context);
    (context, services)
}

/// Catalog wrapper that counts repository round trips.
#[derive(Default)]
pub struct CountingCatalog {
    inner: InMemoryCatalog,
    pub category_gets: AtomicUsize,
    pub category_urls: AtomicUsize,
    pub variation_lookups: AtomicUsize,
}

impl CountingCatalog {
    pub fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategoryRepo for CountingCatalog {
    async fn get(&self, id: CategoryId, lang: &Lang) -> Result<Option<CategoryRecord>, RepoError> {
        self.category_gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id, lang).await
    }

    async fn children(
        &self,
        id: CategoryId,
        lang: &Lang,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        self.inner.children(id, lang).await
    }

    async fn url(&self, id: CategoryId, lang: &Lang) -> Result<String, RepoError> {
        self.category_urls.fetch_add(1, Ordering::SeqCst);
        self.inner.url(id, lang).await
    }

    async fn linklist_tree(
        &self,
        filter: CategoryTypeFilter,
        lang: &Lang,
        webstore_id: u32,
        max_level: u32,
    ) -> Result<Vec<NavigationNode>, RepoError> {
        self.inner
            .linklist_tree(filter, lang, webstore_id, max_level)
            .await
    }

    async fn linklist_list(
        &self,
        filter: CategoryTypeFilter,
        lang: &Lang,
        webstore_id: u32,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        self.inner.linklist_list(filter, lang, webstore_id).await
    }
}

#[async_trait]
impl ItemRepo for CountingCatalog {
    async fn variation_url_data(
        &self,
        item_id: ItemId,
        variation_id: VariationId,
        lang: &Lang,
    ) -> Result<Option<VariationUrlData>, RepoError> {
        self.variation_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner
            .variation_url_data(item_id, variation_id, lang)
            .await
    }
}

#[async_trait]
impl UnitRepo for CountingCatalog {
    async fn unit_id_by_key(&self, unit_key: &str) -> Result<Option<UnitId>, RepoError> {
        self.inner.unit_id_by_key(unit_key).await
    }

    async fn unit_name(&self, id: UnitId, lang: &Lang) -> Result<Option<String>, RepoError> {
        self.inner.unit_name(id, lang).await
    }
}

/// Category repository whose every call fails.
pub struct FailingCategories;

#[async_trait]
impl CategoryRepo for FailingCategories {
    async fn get(&self, _id: CategoryId, _lang: &Lang) -> Result<Option<CategoryRecord>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn children(
        &self,
        _id: CategoryId,
        _lang: &Lang,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn url(&self, _id: CategoryId, _lang: &Lang) -> Result<String, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn linklist_tree(
        &self,
        _filter: CategoryTypeFilter,
        _lang: &Lang,
        _webstore_id: u32,
        _max_level: u32,
    ) -> Result<Vec<NavigationNode>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn linklist_list(
        &self,
        _filter: CategoryTypeFilter,
        _lang: &Lang,
        _webstore_id: u32,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        Err(RepoError::Timeout)
    }
}
