use tracing::debug;

use crate::application::repos::{ItemRepo, RepoError};
use crate::domain::entities::VariationUrlData;
use crate::domain::slug::{derive_slug, normalize_path};
use crate::domain::types::{ItemId, Lang, VariationId};

use super::query::UrlQuery;

/// Build the URL path of a variation in `lang`, without the id suffix.
///
/// The item's `url_content` is slugified segment by segment; when it is blank
/// the item name is slugified instead. `None` when the item has no data in
/// `lang` or no usable path can be derived.
pub(super) async fn build_variation_url(
    items: &dyn ItemRepo,
    item_id: ItemId,
    variation_id: VariationId,
    lang: &Lang,
) -> Result<Option<UrlQuery>, RepoError> {
    let Some(data) = items.variation_url_data(item_id, variation_id, lang).await? else {
        return Ok(None);
    };

    let path = variation_path(&data);
    if path.is_empty() {
        debug!(item_id, variation_id, lang = %lang, "no url path derivable for variation");
        return Ok(None);
    }

    Ok(Some(UrlQuery::new(&path, lang.clone())))
}

/// Suffix that makes a variation URL unique: `_<item_id>_<variation_id>`.
pub(super) fn suffix(item_id: ItemId, variation_id: VariationId) -> String {
    format!("_{item_id}_{variation_id}")
}

fn variation_path(data: &VariationUrlData) -> String {
    let from_content = data
        .url_content
        .as_deref()
        .map(slug_segments)
        .unwrap_or_default();
    if !from_content.is_empty() {
        return from_content;
    }
    derive_slug(&data.name).unwrap_or_default()
}

fn slug_segments(path: &str) -> String {
    normalize_path(path)
        .split('/')
        .filter_map(|segment| derive_slug(segment).ok())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(name: &str, url_content: Option<&str>) -> VariationUrlData {
        VariationUrlData {
            item_id: 7,
            variation_id: 1001,
            name: name.to_string(),
            url_content: url_content.map(str::to_string),
        }
    }

    #[test]
    fn url_content_is_slugified_per_segment() {
        assert_eq!(
            variation_path(&data("Stuhl", Some("/Möbel/Holz Stuhl/"))),
            "moebel/holz-stuhl"
        );
    }

    #[test]
    fn blank_url_content_falls_back_to_the_name() {
        assert_eq!(variation_path(&data("Großer Tisch", Some("  "))), "grosser-tisch");
        assert_eq!(variation_path(&data("Großer Tisch", None)), "grosser-tisch");
    }

    #[test]
    fn nothing_to_slugify_yields_an_empty_path() {
        assert_eq!(variation_path(&data("!!!", None)), "");
    }

    #[test]
    fn suffix_carries_both_ids() {
        assert_eq!(suffix(7, 1001), "_7_1001");
    }
}
