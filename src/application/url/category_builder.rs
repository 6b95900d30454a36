use crate::application::category::CategoryService;
use crate::application::repos::RepoError;
use crate::domain::types::{CategoryId, Lang};

use super::query::UrlQuery;

/// Build the URL of a category in `lang`.
///
/// A non-empty canonical link in the localized details wins over the slug path.
pub(super) async fn build_category_url(
    categories: &CategoryService,
    id: CategoryId,
    lang: &Lang,
) -> Result<Option<UrlQuery>, RepoError> {
    let Some(category) = categories.get(id, Some(lang)).await? else {
        return Ok(None);
    };

    if let Some(details) = categories.get_details(&category, Some(lang))
        && !details.canonical_link.trim().is_empty()
    {
        return Ok(Some(UrlQuery::from_link(&details.canonical_link, lang.clone())));
    }

    let path = categories.get_url(&category, Some(lang)).await?;
    Ok(path.map(|path| UrlQuery::new(&path, lang.clone())))
}
