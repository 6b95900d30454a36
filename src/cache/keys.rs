//! Typed memo keys.
//!
//! Every key variant names the operation it memoizes and carries every input
//! that operation depends on, so two different derivations can never share a
//! slot by accident of string formatting.

use crate::domain::types::{CategoryId, ItemId, Lang, TemplateId, VariationId};

/// Keys for the category service memo tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    Category { id: CategoryId, lang: Lang },
    Children { id: CategoryId, lang: Lang },
    Url { id: CategoryId, lang: Lang },
}

/// The entity a canonical URL is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSubject {
    None,
    Category(CategoryId),
    Variation {
        item_id: ItemId,
        variation_id: VariationId,
    },
}

/// Keys for the URL service memo tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UrlKey {
    Category {
        id: CategoryId,
        lang: Lang,
    },
    Variation {
        item_id: ItemId,
        variation_id: VariationId,
        lang: Lang,
    },
    /// `include_language` is part of the key: an explicit language argument
    /// renders the language prefix, the implicit request language does not.
    Canonical {
        template: TemplateId,
        subject: PageSubject,
        lang: Lang,
        include_language: bool,
    },
    LanguageUrls {
        template: TemplateId,
        subject: PageSubject,
    },
}

/// Keys for the unit service memo table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitKey {
    Name { unit_key: String, lang: Lang },
}
