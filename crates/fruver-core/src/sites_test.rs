use super::*;

const BUNDLED_SITES: &str = include_str!("../../../config/sites.yaml");

fn minimal_site_yaml(slug: &str, pagination: &str) -> String {
    format!(
        r#"
sites:
  - slug: {slug}
    url: https://shop.example.co/fruver
    card: {{ css: "article.product" }}
    fields:
      name: {{ css: ".name" }}
      price: {{ css: ".price" }}
    pagination:
{pagination}
"#
    )
}

#[test]
fn bundled_catalogue_parses_and_validates() {
    let sites = parse_sites(BUNDLED_SITES).expect("bundled sites.yaml must be valid");
    assert_eq!(sites.slugs(), vec!["exito", "euro", "jumbo", "merka"]);
}

#[test]
fn bundled_catalogue_uses_one_strategy_of_each_kind() {
    let sites = parse_sites(BUNDLED_SITES).unwrap();
    let kinds: Vec<&str> = sites.sites.iter().map(|s| s.pagination.kind()).collect();
    assert_eq!(kinds, vec!["next_page", "reveal", "dropdown", "city_gate"]);
}

#[test]
fn bundled_exito_retries_after_overlay_and_splits_unit_price() {
    let sites = parse_sites(BUNDLED_SITES).unwrap();
    let exito = sites.get("exito").unwrap();
    let PaginationConfig::NextPage(pages) = &exito.pagination else {
        panic!("exito should use next_page pagination");
    };
    assert!(pages.retry_after_overlay);
    assert_eq!(pages.click, ClickMode::Native);
    assert_eq!(pages.dedup, DedupPolicy::Off);
    assert_eq!(exito.overlay_close, Some(Locator::id("wps-overlay-close-button")));
    assert_eq!(
        exito.price_format.unit_price,
        UnitPriceFormat::Combined {
            strip_parens: false,
            decimal_comma: false
        }
    );
}

#[test]
fn bundled_euro_deduplicates_globally_without_unit_price() {
    let sites = parse_sites(BUNDLED_SITES).unwrap();
    let euro = sites.get("euro").unwrap();
    assert_eq!(euro.pagination.dedup(), DedupPolicy::Global);
    assert!(euro.fields.unit_price.is_none());
    assert_eq!(euro.price_format.unit_price, UnitPriceFormat::Plain);
}

#[test]
fn bundled_jumbo_visits_two_dropdown_pages() {
    let sites = parse_sites(BUNDLED_SITES).unwrap();
    let jumbo = sites.get("jumbo").unwrap();
    let PaginationConfig::Dropdown(dropdown) = &jumbo.pagination else {
        panic!("jumbo should use dropdown pagination");
    };
    assert_eq!(dropdown.max_pages, 2);
    assert_eq!(dropdown.scroll, ScrollPacing::default());
    assert_eq!(jumbo.name_column, NameColumn::Nombre);
    assert!(jumbo.card.is_none());
}

#[test]
fn bundled_merka_clicks_through_script_behind_city_gate() {
    let sites = parse_sites(BUNDLED_SITES).unwrap();
    let merka = sites.get("merka").unwrap();
    let PaginationConfig::CityGate(gate) = &merka.pagination else {
        panic!("merka should use city_gate pagination");
    };
    assert_eq!(gate.city_option, Locator::id("medellin"));
    assert_eq!(gate.pages.click, ClickMode::Script);
    assert!(!gate.pages.retry_after_overlay);
    assert!(merka.price_format.strip_cents_suffix);
}

#[test]
fn reveal_defaults_are_applied() {
    let yaml = minimal_site_yaml(
        "demo",
        "      strategy: reveal\n      button: { css: \"button.more\" }",
    );
    let sites = parse_sites(&yaml).unwrap();
    let PaginationConfig::Reveal(reveal) = &sites.sites[0].pagination else {
        panic!("expected reveal");
    };
    assert_eq!(reveal.button_timeout_secs, 10);
    assert_eq!(reveal.delay, DelayRange::between(5.0, 8.0));
    assert_eq!(reveal.dedup, DedupPolicy::Global);
    assert_eq!(sites.sites[0].initial_settle, DelayRange::between(6.0, 12.0));
    assert_eq!(sites.sites[0].name_column, NameColumn::Producto);
}

#[test]
fn dedup_policy_can_be_overridden_per_site() {
    let yaml = minimal_site_yaml(
        "demo",
        "      strategy: next_page\n      next_button: { css: \"a.next\" }\n      dedup: global",
    );
    let sites = parse_sites(&yaml).unwrap();
    assert_eq!(sites.sites[0].pagination.dedup(), DedupPolicy::Global);
}

#[test]
fn get_unknown_site_is_an_error() {
    let sites = parse_sites(BUNDLED_SITES).unwrap();
    let err = sites.get("carulla").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownSite(ref s) if s == "carulla"));
}

#[test]
fn validate_rejects_duplicate_slugs() {
    let one = minimal_site_yaml(
        "demo",
        "      strategy: reveal\n      button: { css: \"button.more\" }",
    );
    let mut sites: SitesFile = serde_yaml::from_str(&one).unwrap();
    sites.sites.push(sites.sites[0].clone());
    let err = validate_sites(&sites).unwrap_err();
    assert!(err.to_string().contains("duplicate site slug"));
}

#[test]
fn validate_rejects_uppercase_slug() {
    let yaml = minimal_site_yaml(
        "Demo",
        "      strategy: reveal\n      button: { css: \"button.more\" }",
    );
    let err = parse_sites(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
}

#[test]
fn validate_rejects_inverted_delay_range() {
    let yaml = minimal_site_yaml(
        "demo",
        "      strategy: reveal\n      button: { css: \"button.more\" }\n      delay: { min_secs: 8.0, max_secs: 5.0 }",
    );
    let err = parse_sites(&yaml).unwrap_err();
    assert!(err.to_string().contains("invalid delay range"), "got: {err}");
}

#[test]
fn validate_requires_card_for_card_based_strategies() {
    let yaml = r#"
sites:
  - slug: demo
    url: https://shop.example.co/fruver
    fields:
      name: { css: ".name" }
      price: { css: ".price" }
    pagination:
      strategy: next_page
      next_button: { css: "a.next" }
"#;
    let err = parse_sites(yaml).unwrap_err();
    assert!(err.to_string().contains("needs a card locator"), "got: {err}");
}

#[test]
fn validate_rejects_zero_dropdown_pages() {
    let yaml = r#"
sites:
  - slug: demo
    url: https://shop.example.co/fruver
    fields:
      name: { css: ".name" }
      price: { css: ".price" }
    pagination:
      strategy: dropdown
      select: { css: "select.pages" }
      max_pages: 0
"#;
    let err = parse_sites(yaml).unwrap_err();
    assert!(err.to_string().contains("max_pages"), "got: {err}");
}

#[test]
fn validate_rejects_non_http_url() {
    let yaml = minimal_site_yaml(
        "demo",
        "      strategy: reveal\n      button: { css: \"button.more\" }",
    )
    .replace("https://shop.example.co/fruver", "ftp://shop.example.co");
    let err = parse_sites(&yaml).unwrap_err();
    assert!(err.to_string().contains("must be http(s)"), "got: {err}");
}

#[test]
fn parse_rejects_unknown_strategy() {
    let yaml = minimal_site_yaml("demo", "      strategy: infinite_scroll");
    let err = parse_sites(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::SitesFileParse(_)), "got: {err:?}");
}

#[test]
fn locator_display_includes_kind() {
    assert_eq!(Locator::css("a.next").to_string(), "css=a.next");
    assert_eq!(Locator::xpath("//h3/a").expression(), "//h3/a");
}

#[test]
fn top_level_locators_parse_from_single_key_maps() {
    let yaml = minimal_site_yaml(
        "demo",
        "      strategy: reveal\n      button: { xpath: '//button[text()=\"Mostrar más\"]' }",
    )
    .replace(
        "    pagination:",
        "    overlay_close: { id: promo-close }\n    pagination:",
    );
    let sites = parse_sites(&yaml).expect("single-key locator maps must parse");
    let site = sites.get("demo").unwrap();
    assert_eq!(site.card, Some(Locator::css("article.product")));
    assert_eq!(site.fields.name, Locator::css(".name"));
    assert_eq!(site.overlay_close, Some(Locator::id("promo-close")));
    let PaginationConfig::Reveal(reveal) = &site.pagination else {
        panic!("expected reveal pagination");
    };
    assert_eq!(reveal.button, Locator::xpath("//button[text()=\"Mostrar más\"]"));
}

#[test]
fn locator_with_two_kinds_is_rejected() {
    let yaml = minimal_site_yaml("demo", "      strategy: reveal\n      button: { css: button }")
        .replace(
            "card: { css: \"article.product\" }",
            "card: { css: \"article.product\", id: product }",
        );
    let err = parse_sites(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::SitesFileParse(_)), "got: {err:?}");
}

#[test]
fn locator_serializes_back_to_a_single_key_map() {
    let yaml = serde_yaml::to_string(&Locator::xpath("//h3/a")).unwrap();
    assert_eq!(yaml.trim(), "xpath: //h3/a");
}
