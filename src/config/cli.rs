use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::types::{CategoryId, ItemId, VariationId};

/// Command-line arguments for the storefront binary.
#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    version,
    about = "Resolve storefront page contexts against a catalog"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "STOREFRONT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Resolve the page context of a category, item or the home page and print it as JSON.
    Resolve(Box<ResolveArgs>),
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub overrides: StorefrontOverrides,

    /// TOML catalog with categories, items and units.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub catalog: PathBuf,

    /// Session language; blank or missing falls back to `de`.
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Render the category page of this id.
    #[arg(long, value_name = "ID", conflicts_with_all = ["item", "home"])]
    pub category: Option<CategoryId>,

    /// Render the item page of this item id.
    #[arg(long, value_name = "ID", requires = "variation", conflicts_with = "home")]
    pub item: Option<ItemId>,

    /// Variation shown on the item page.
    #[arg(long, value_name = "ID", requires = "item")]
    pub variation: Option<VariationId>,

    /// Category the item page is reached from, used for breadcrumbs.
    #[arg(long = "item-category", value_name = "ID", requires = "item")]
    pub item_category: Option<CategoryId>,

    /// Render the home page (the default when no other target is given).
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub home: bool,
}

/// Page a `resolve` invocation renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTarget {
    Home,
    Category(CategoryId),
    Item {
        item_id: ItemId,
        variation_id: VariationId,
        category_id: Option<CategoryId>,
    },
}

impl ResolveArgs {
    pub fn target(&self) -> ResolveTarget {
        match (self.category, self.item, self.variation) {
            (Some(id), _, _) => ResolveTarget::Category(id),
            (None, Some(item_id), Some(variation_id)) => ResolveTarget::Item {
                item_id,
                variation_id,
                category_id: self.item_category,
            },
            _ => ResolveTarget::Home,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct StorefrontOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the shop's default language.
    #[arg(long = "default-language", value_name = "LANG")]
    pub default_language: Option<String>,

    /// Override the active languages, separated by commas (`de, en`).
    #[arg(long = "active-languages", value_name = "LIST")]
    pub active_languages: Option<String>,

    /// Override the public base URL used for absolute URLs.
    #[arg(long = "public-url", value_name = "URL")]
    pub public_url: Option<String>,

    /// Override the webstore id passed to navigation lookups.
    #[arg(long = "webstore-id", value_name = "ID")]
    pub webstore_id: Option<u32>,

    /// Toggle per-request runtime tracking.
    #[arg(
        long = "tracking",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub tracking: Option<bool>,
}
