mod support;

use std::sync::Arc;

use storefront::application::repos::Repositories;
use storefront::application::url::{COMPONENT, LanguageUrl, X_DEFAULT};
use storefront::domain::types::{CategoryType, Lang, TemplateId};

use support::{CountingCatalog, catalog, request, settings};

fn de() -> Lang {
    Lang::new("de")
}

fn en() -> Lang {
    Lang::new("en")
}

fn language_url(hreflang: &str, url: &str) -> LanguageUrl {
    LanguageUrl {
        hreflang: hreflang.to_string(),
        url: url.to_string(),
    }
}

#[tokio::test]
async fn category_urls_follow_the_slug_path_per_language() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");

    let german = services
        .urls
        .get_category_url(2, None)
        .await
        .expect("url")
        .expect("german url");
    let english = services
        .urls
        .get_category_url(2, Some(&en()))
        .await
        .expect("url")
        .expect("english url");

    assert_eq!(german.to_relative_url(true, &de()), "/moebel/stuehle");
    assert_eq!(english.to_relative_url(true, &de()), "/en/furniture/chairs");
    assert_eq!(english.to_relative_url(false, &de()), "/furniture/chairs");
}

#[tokio::test]
async fn category_url_is_memoized_and_identical() {
    let backend = Arc::new(CountingCatalog::new(catalog()));
    let repos = Repositories::from_backend(backend.clone());
    let (context, services) = request(&repos, settings(), "de");

    let first = services.urls.get_category_url(3, None).await.expect("url");
    let second = services.urls.get_category_url(3, None).await.expect("url");

    assert_eq!(first, second);
    assert_eq!(CountingCatalog::count(&backend.category_urls), 1);
    assert_eq!(context.stats().call_count(COMPONENT, "get_category_url"), 2);
}

#[tokio::test]
async fn missing_category_has_no_url() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");

    assert_eq!(
        services.urls.get_category_url(777, None).await.expect("url"),
        None
    );
}

#[tokio::test]
async fn canonical_link_override_wins() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");
    let base = settings().public_url;

    let german = services
        .urls
        .get_category_url(5, None)
        .await
        .expect("url")
        .expect("german url");
    let english = services
        .urls
        .get_category_url(5, Some(&en()))
        .await
        .expect("url")
        .expect("english url");

    assert_eq!(
        german.to_absolute_url(&base, true, &de()),
        "https://brand.example/ueber-uns"
    );
    assert_eq!(
        english.to_absolute_url(&base, true, &de()),
        "https://shop.example/en/about"
    );
}

#[tokio::test]
async fn variation_urls_carry_the_id_suffix() {
    let backend = Arc::new(CountingCatalog::new(catalog()));
    let repos = Repositories::from_backend(backend.clone());
    let (_context, services) = request(&repos, settings(), "de");

    let german = services
        .urls
        .get_variation_url(7, 1001, None)
        .await
        .expect("url")
        .expect("german url");
    let again = services
        .urls
        .get_variation_url(7, 1001, None)
        .await
        .expect("url")
        .expect("german url");
    let english = services
        .urls
        .get_variation_url(7, 1001, Some(&en()))
        .await
        .expect("url")
        .expect("english url");

    assert_eq!(german.path(), "gartenstuhl_7_1001");
    assert_eq!(german, again);
    assert_eq!(english.path(), "garden-chair_7_1001");
    assert_eq!(CountingCatalog::count(&backend.variation_lookups), 2);
}

#[tokio::test]
async fn unknown_variation_has_no_url() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");

    assert_eq!(
        services
            .urls
            .get_variation_url(7, 9999, None)
            .await
            .expect("url"),
        None
    );
}

#[tokio::test]
async fn home_template_canonical_is_the_language_root() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");

    let implicit = services
        .urls
        .get_canonical_url(&TemplateId::Home, None)
        .await
        .expect("canonical");
    let english = services
        .urls
        .get_canonical_url(&TemplateId::Home, Some(&en()))
        .await
        .expect("canonical");

    assert_eq!(implicit.as_deref(), Some("https://shop.example/"));
    assert_eq!(english.as_deref(), Some("https://shop.example/en"));
}

#[tokio::test]
async fn category_template_canonical_uses_the_current_category() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");
    let template = TemplateId::category(CategoryType::Item);

    let without_selection = services
        .urls
        .get_canonical_url(&template, None)
        .await
        .expect("canonical");
    assert_eq!(without_selection, None);

    services
        .categories
        .set_current_category_id(1)
        .await
        .expect("select root");
    let root = services
        .urls
        .get_canonical_url(&template, None)
        .await
        .expect("canonical");

    services
        .categories
        .set_current_category_id(2)
        .await
        .expect("select child");
    let child = services
        .urls
        .get_canonical_url(&template, None)
        .await
        .expect("canonical");

    assert_eq!(root.as_deref(), Some("https://shop.example/moebel"));
    assert_eq!(child.as_deref(), Some("https://shop.example/moebel/stuehle"));
}

#[tokio::test]
async fn item_template_canonical_uses_the_current_variation() {
    let catalog = catalog();
    let item = catalog.current_item(7, 1001).expect("fixture item");
    let repos = Repositories::from_backend(Arc::new(catalog));
    let (_context, services) = request(&repos, settings(), "de");

    assert_eq!(
        services
            .urls
            .get_canonical_url(&TemplateId::Item, None)
            .await
            .expect("canonical"),
        None
    );

    services.categories.set_current_item(Some(item));
    let canonical = services
        .urls
        .get_canonical_url(&TemplateId::Item, Some(&en()))
        .await
        .expect("canonical");

    assert_eq!(
        canonical.as_deref(),
        Some("https://shop.example/en/garden-chair_7_1001")
    );
}

#[tokio::test]
async fn other_templates_have_no_canonical_url() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");

    let canonical = services
        .urls
        .get_canonical_url(&TemplateId::parse("tpl.basket"), None)
        .await
        .expect("canonical");

    assert_eq!(canonical, None);
}

#[tokio::test]
async fn implicit_request_language_is_rendered_without_prefix() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "en");

    services
        .categories
        .set_current_category_id(2)
        .await
        .expect("select");
    let canonical = services
        .urls
        .get_canonical_url(&TemplateId::category(CategoryType::Item), None)
        .await
        .expect("canonical");

    assert_eq!(canonical.as_deref(), Some("https://shop.example/furniture/chairs"));
}

#[tokio::test]
async fn language_urls_list_default_and_active_languages() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "en");
    let template = TemplateId::category(CategoryType::Item);

    services
        .categories
        .set_current_category_id(2)
        .await
        .expect("select");
    let urls = services
        .urls
        .get_language_urls(&template)
        .await
        .expect("language urls");

    assert_eq!(
        urls,
        vec![
            language_url(X_DEFAULT, "https://shop.example/moebel/stuehle"),
            language_url("de", "https://shop.example/moebel/stuehle"),
            language_url("en", "https://shop.example/en/furniture/chairs"),
        ]
    );
}

#[tokio::test]
async fn language_urls_skip_languages_without_a_url() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "de");
    let template = TemplateId::category(CategoryType::Item);

    services
        .categories
        .set_current_category_id(3)
        .await
        .expect("select");
    let urls = services
        .urls
        .get_language_urls(&template)
        .await
        .expect("language urls");

    let hreflangs: Vec<&str> = urls.iter().map(|url| url.hreflang.as_str()).collect();
    assert_eq!(hreflangs, vec![X_DEFAULT, "de"]);
}

#[tokio::test]
async fn unit_names_resolve_through_the_request_services() {
    let repos = Repositories::from_backend(Arc::new(catalog()));
    let (_context, services) = request(&repos, settings(), "en");

    let name = services
        .units
        .get_unit_name_by_key("KGM", None)
        .await
        .expect("unit name");
    let unknown = services
        .units
        .get_unit_name_by_key("C62", None)
        .await
        .expect("unit name");

    assert_eq!(name.as_deref(), Some("kilogram"));
    assert_eq!(unknown, None);
}
