use std::fmt;

use url::Url;

use crate::domain::slug::normalize_path;
use crate::domain::types::Lang;

/// A storefront path in one language, not yet rendered as a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlQuery {
    path: String,
    lang: Lang,
    /// Set when the query was built from a fully qualified link, which is
    /// then rendered verbatim as the absolute URL.
    origin: Option<Url>,
}

impl UrlQuery {
    pub fn new(path: &str, lang: Lang) -> Self {
        Self {
            path: normalize_path(path),
            lang,
            origin: None,
        }
    }

    /// Query for the language root (`/` or `/<lang>`).
    pub fn root(lang: Lang) -> Self {
        Self::new("", lang)
    }

    /// Query for a configured link, which may be a path or an absolute URL.
    pub fn from_link(link: &str, lang: Lang) -> Self {
        match Url::parse(link.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self {
                path: normalize_path(url.path()),
                lang,
                origin: Some(url),
            },
            _ => Self::new(link, lang),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn lang(&self) -> &Lang {
        &self.lang
    }

    /// Append `suffix` to the last path segment (`stuhl` + `_7_1001`).
    pub fn append(&mut self, suffix: &str) -> &mut Self {
        self.path.push_str(suffix);
        self.origin = None;
        self
    }

    /// Path with a leading slash. The language prefix is rendered only when
    /// `include_language` is set and the language is not the shop default.
    pub fn to_relative_url(&self, include_language: bool, default_lang: &Lang) -> String {
        let prefix = (include_language && &self.lang != default_lang).then(|| self.lang.as_str());
        let segments: Vec<&str> = prefix
            .into_iter()
            .chain((!self.path.is_empty()).then_some(self.path.as_str()))
            .collect();
        format!("/{}", segments.join("/"))
    }

    /// Relative URL joined onto `base`, keeping any path prefix of the base.
    pub fn to_absolute_url(&self, base: &Url, include_language: bool, default_lang: &Lang) -> String {
        if let Some(origin) = self.origin.as_ref() {
            return origin.to_string();
        }
        let relative = self.to_relative_url(include_language, default_lang);
        let mut url = base.clone();
        let base_path = base.path().trim_end_matches('/');
        url.set_path(&format!("{base_path}{relative}"));
        url.to_string()
    }
}

impl fmt::Display for UrlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path)
    }
}
