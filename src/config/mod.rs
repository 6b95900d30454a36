//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::str::FromStr;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::types::{CategoryId, FALLBACK_LANGUAGE, Lang};

mod cli;

pub use cli::{CliArgs, Command, ResolveArgs, ResolveTarget, StorefrontOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "storefront";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080/";
const DEFAULT_WEBSTORE_ID: u32 = 1;
const LANGUAGE_SEPARATOR: char = ',';

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub storefront: StorefrontSettings,
    pub tracking: TrackingSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Shop-wide settings the URL and layout services read.
#[derive(Debug, Clone)]
pub struct StorefrontSettings {
    pub default_language: Lang,
    /// Languages the shop is published in; always contains `default_language`.
    pub active_languages: Vec<Lang>,
    pub webstore_id: u32,
    pub public_url: Url,
    /// Category rendered when a requested category does not exist.
    pub page_not_found_category: Option<CategoryId>,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        let default_language = Lang::default();
        Self {
            active_languages: vec![default_language.clone()],
            default_language,
            webstore_id: DEFAULT_WEBSTORE_ID,
            public_url: default_public_url(),
            page_not_found_category: None,
        }
    }
}

impl StorefrontSettings {
    pub fn is_default_language(&self, lang: &Lang) -> bool {
        &self.default_language == lang
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackingSettings {
    /// Collect per-request runtime statistics.
    pub enabled: bool,
    /// Attach the statistics to the end-of-request log line.
    pub log_stats: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            log_stats: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("STOREFRONT").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match &cli.command {
        Command::Resolve(args) => raw.apply_overrides(&args.overrides),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    storefront: RawStorefrontSettings,
    tracking: RawTrackingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &StorefrontOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(lang) = overrides.default_language.as_ref() {
            self.storefront.default_language = Some(lang.clone());
        }
        if let Some(languages) = overrides.active_languages.as_ref() {
            self.storefront.active_languages = Some(RawLanguageList::Joined(languages.clone()));
        }
        if let Some(url) = overrides.public_url.as_ref() {
            self.storefront.public_url = Some(url.clone());
        }
        if let Some(id) = overrides.webstore_id {
            self.storefront.webstore_id = Some(id);
        }
        if let Some(enabled) = overrides.tracking {
            self.tracking.enabled = Some(enabled);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            storefront,
            tracking,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let storefront = build_storefront_settings(storefront)?;
        let tracking = build_tracking_settings(tracking);

        Ok(Self {
            logging,
            storefront,
            tracking,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_storefront_settings(
    storefront: RawStorefrontSettings,
) -> Result<StorefrontSettings, LoadError> {
    let default_language = match storefront.default_language {
        Some(value) => {
            let lang = Lang::new(&value);
            if lang.as_str().is_empty() {
                return Err(LoadError::invalid(
                    "storefront.default_language",
                    "must not be blank",
                ));
            }
            lang
        }
        None => Lang::new(FALLBACK_LANGUAGE),
    };

    let mut active_languages = storefront
        .active_languages
        .as_ref()
        .map(RawLanguageList::languages)
        .unwrap_or_default();
    if !active_languages.contains(&default_language) {
        active_languages.insert(0, default_language.clone());
    }

    let webstore_id = storefront.webstore_id.unwrap_or(DEFAULT_WEBSTORE_ID);
    if webstore_id == 0 {
        return Err(LoadError::invalid(
            "storefront.webstore_id",
            "must be greater than zero",
        ));
    }

    let public_url = match storefront.public_url {
        Some(value) => parse_public_url(value.trim())
            .map_err(|reason| LoadError::invalid("storefront.public_url", reason))?,
        None => default_public_url(),
    };

    let page_not_found_category = storefront.page_not_found_category.filter(|id| *id > 0);

    Ok(StorefrontSettings {
        default_language,
        active_languages,
        webstore_id,
        public_url,
        page_not_found_category,
    })
}

fn build_tracking_settings(tracking: RawTrackingSettings) -> TrackingSettings {
    let defaults = TrackingSettings::default();
    TrackingSettings {
        enabled: tracking.enabled.unwrap_or(defaults.enabled),
        log_stats: tracking.log_stats.unwrap_or(defaults.log_stats),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorefrontSettings {
    default_language: Option<String>,
    active_languages: Option<RawLanguageList>,
    webstore_id: Option<u32>,
    public_url: Option<String>,
    page_not_found_category: Option<CategoryId>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTrackingSettings {
    enabled: Option<bool>,
    log_stats: Option<bool>,
}

/// Active languages as configured: `"de, en"` or `["de", "en"]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum RawLanguageList {
    Joined(String),
    List(Vec<String>),
}

impl RawLanguageList {
    fn languages(&self) -> Vec<Lang> {
        match self {
            RawLanguageList::Joined(value) => parse_language_list(value.split(LANGUAGE_SEPARATOR)),
            RawLanguageList::List(values) => parse_language_list(values.iter().map(String::as_str)),
        }
    }
}

/// Normalize language codes, dropping blanks and duplicates.
fn parse_language_list<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Lang> {
    let mut languages: Vec<Lang> = Vec::new();
    for lang in values
        .map(Lang::new)
        .filter(|lang| !lang.as_str().is_empty())
    {
        if !languages.contains(&lang) {
            languages.push(lang);
        }
    }
    languages
}

fn parse_public_url(value: &str) -> Result<Url, String> {
    let mut url = Url::parse(value).map_err(|err| format!("invalid url `{value}`: {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err(format!("`{value}` cannot be used as a base url"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn default_public_url() -> Url {
    Url::parse(DEFAULT_PUBLIC_URL).expect("valid default public url")
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
