//! URL derivation for categories, variations and the current page.

use std::sync::Arc;

use serde::Serialize;

use crate::application::category::CategoryService;
use crate::application::repos::{ItemRepo, RepoError};
use crate::cache::{MemoryCache, PageSubject, UrlKey};
use crate::config::StorefrontSettings;
use crate::domain::types::{CategoryId, ItemId, Lang, TemplateId, VariationId};
use crate::runtime::{RuntimeStats, RuntimeTracker};

mod category_builder;
mod query;
mod variation_builder;

pub use query::UrlQuery;

pub const COMPONENT: &str = "UrlService";

/// `hreflang` value of the language-neutral alternate URL.
pub const X_DEFAULT: &str = "x-default";

/// One alternate URL of the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageUrl {
    pub hreflang: String,
    pub url: String,
}

/// Request-scoped URL service.
///
/// Category and variation URLs are memoized per language, canonical and
/// alternate URLs per template and page subject.
pub struct UrlService {
    categories: Arc<CategoryService>,
    items: Arc<dyn ItemRepo>,
    settings: Arc<StorefrontSettings>,
    tracker: RuntimeTracker,
    queries: MemoryCache<UrlKey, Option<UrlQuery>>,
    canonical: MemoryCache<UrlKey, Option<String>>,
    language_urls: MemoryCache<UrlKey, Vec<LanguageUrl>>,
}

impl UrlService {
    pub fn new(
        categories: Arc<CategoryService>,
        items: Arc<dyn ItemRepo>,
        settings: Arc<StorefrontSettings>,
        stats: &RuntimeStats,
    ) -> Self {
        Self {
            categories,
            items,
            settings,
            tracker: RuntimeTracker::new(COMPONENT, stats),
            queries: MemoryCache::new("url.query"),
            canonical: MemoryCache::new("url.canonical"),
            language_urls: MemoryCache::new("url.language_urls"),
        }
    }

    pub async fn get_category_url(
        &self,
        id: CategoryId,
        lang: Option<&Lang>,
    ) -> Result<Option<UrlQuery>, RepoError> {
        let lang = self.resolve_lang(lang);
        self.tracker
            .instrument("get_category_url", async {
                let key = UrlKey::Category {
                    id,
                    lang: lang.clone(),
                };
                self.queries
                    .get_or_try_insert_with(key, || {
                        category_builder::build_category_url(&self.categories, id, lang)
                    })
                    .await
            })
            .await
    }

    /// URL of a variation with the `_<item_id>_<variation_id>` suffix.
    pub async fn get_variation_url(
        &self,
        item_id: ItemId,
        variation_id: VariationId,
        lang: Option<&Lang>,
    ) -> Result<Option<UrlQuery>, RepoError> {
        let lang = self.resolve_lang(lang);
        self.tracker
            .instrument("get_variation_url", async {
                let key = UrlKey::Variation {
                    item_id,
                    variation_id,
                    lang: lang.clone(),
                };
                self.queries
                    .get_or_try_insert_with(key, || async {
                        let query = variation_builder::build_variation_url(
                            self.items.as_ref(),
                            item_id,
                            variation_id,
                            lang,
                        )
                        .await?;
                        Ok::<_, RepoError>(query.map(|mut query| {
                            query.append(&variation_builder::suffix(item_id, variation_id));
                            query
                        }))
                    })
                    .await
            })
            .await
    }

    /// Absolute canonical URL of the page rendered with `template`.
    ///
    /// An explicit `lang` renders the language prefix (for non-default
    /// languages); without one the request language is used unprefixed.
    pub async fn get_canonical_url(
        &self,
        template: &TemplateId,
        lang: Option<&Lang>,
    ) -> Result<Option<String>, RepoError> {
        let include_language = lang.is_some();
        let lang = self.resolve_lang(lang);
        self.tracker
            .instrument("get_canonical_url", async {
                let subject = self.page_subject(template);
                let key = UrlKey::Canonical {
                    template: template.clone(),
                    subject,
                    lang: lang.clone(),
                    include_language,
                };
                self.canonical
                    .get_or_try_insert_with(key, || async {
                        let query = match (template, subject) {
                            (
                                TemplateId::Item,
                                PageSubject::Variation {
                                    item_id,
                                    variation_id,
                                },
                            ) => {
                                self.get_variation_url(item_id, variation_id, Some(lang))
                                    .await?
                            }
                            (TemplateId::Category(_), PageSubject::Category(id)) => {
                                self.get_category_url(id, Some(lang)).await?
                            }
                            (TemplateId::Home, _) => Some(UrlQuery::root(lang.clone())),
                            _ => None,
                        };
                        Ok::<_, RepoError>(
                            query.map(|query| self.absolute(&query, include_language)),
                        )
                    })
                    .await
            })
            .await
    }

    /// Alternate URLs of the page rendered with `template`.
    ///
    /// `x-default` points at the default language; every active language
    /// follows in configuration order. Languages without a URL are skipped.
    pub async fn get_language_urls(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<LanguageUrl>, RepoError> {
        self.tracker
            .instrument("get_language_urls", async {
                let key = UrlKey::LanguageUrls {
                    template: template.clone(),
                    subject: self.page_subject(template),
                };
                self.language_urls
                    .get_or_try_insert_with(key, || async {
                        let mut urls = Vec::new();
                        let default_lang = &self.settings.default_language;
                        if let Some(url) =
                            self.get_canonical_url(template, Some(default_lang)).await?
                        {
                            urls.push(LanguageUrl {
                                hreflang: X_DEFAULT.to_string(),
                                url,
                            });
                        }

                        for lang in &self.settings.active_languages {
                            if let Some(url) =
                                self.get_canonical_url(template, Some(lang)).await?
                            {
                                urls.push(LanguageUrl {
                                    hreflang: lang.to_string(),
                                    url,
                                });
                            }
                        }

                        Ok::<_, RepoError>(urls)
                    })
                    .await
            })
            .await
    }

    fn resolve_lang<'a>(&'a self, lang: Option<&'a Lang>) -> &'a Lang {
        lang.unwrap_or_else(|| self.categories.lang())
    }

    fn page_subject(&self, template: &TemplateId) -> PageSubject {
        match template {
            TemplateId::Item => self
                .categories
                .current_item()
                .map(|item| PageSubject::Variation {
                    item_id: item.item_id,
                    variation_id: item.variation_id,
                })
                .unwrap_or(PageSubject::None),
            TemplateId::Category(_) => self
                .categories
                .current_category()
                .map(|category| PageSubject::Category(category.id))
                .unwrap_or(PageSubject::None),
            TemplateId::Home | TemplateId::Other(_) => PageSubject::None,
        }
    }

    fn absolute(&self, query: &UrlQuery, include_language: bool) -> String {
        query.to_absolute_url(
            &self.settings.public_url,
            include_language,
            &self.settings.default_language,
        )
    }
}
