//! Slug helpers for storefront URL paths.
//!
//! ASCII slugification comes from the `slug` crate. German umlauts are spelled
//! out first (`ä` → `ae`, `ß` → `ss`) so "Stühle" becomes `stuehle` rather
//! than `stuhle`.

use slug::slugify;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a URL slug from human-readable text such as an item name.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(spell_out_umlauts(input));
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Strip surrounding and duplicated slashes from a stored URL path.
///
/// `"/moebel//stuehle/"` becomes `"moebel/stuehle"`; a blank path stays blank.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn spell_out_umlauts(input: &str) -> String {
    let mut output = String::with_capacity(input.len() + 4);
    for ch in input.chars() {
        match ch {
            'ä' => output.push_str("ae"),
            'ö' => output.push_str("oe"),
            'ü' => output.push_str("ue"),
            'Ä' => output.push_str("Ae"),
            'Ö' => output.push_str("Oe"),
            'Ü' => output.push_str("Ue"),
            'ß' => output.push_str("ss"),
            other => output.push(other),
        }
    }
    output
}
