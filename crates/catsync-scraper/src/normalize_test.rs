use super::*;

fn wire_variant(id: u64, sku: Option<&str>, price: Option<WireScalar>) -> WireVariant {
    WireVariant {
        id: WireScalar::Number(id.into()),
        title: Some("30 lbs / RH".to_owned()),
        sku: sku.map(|s| WireScalar::Text(s.to_owned())),
        price,
        option1: text("30 lbs"),
        option2: text("RH"),
        option3: None,
    }
}

fn wire_product(variants: Vec<WireVariant>) -> WireProduct {
    WireProduct {
        id: WireScalar::Number(10_204_066_152_785_u64.into()),
        title: Some("  Traditional Recurve  ".to_owned()),
        handle: Some("traditional-recurve".to_owned()),
        vendor: Some("Bearpaw".to_owned()),
        tags: Some(WireTags::List(vec![
            "Bows".to_owned(),
            " Recurve ".to_owned(),
            String::new(),
        ])),
        variants,
        options: vec![WireOption {
            name: "Draw Weight".to_owned(),
            values: vec![
                WireScalar::Text("30 lbs".to_owned()),
                WireScalar::Text("35 lbs".to_owned()),
            ],
        }],
    }
}

fn text(s: &str) -> Option<WireScalar> {
    Some(WireScalar::Text(s.to_owned()))
}

#[test]
fn normalize_product_keeps_identity_fields() {
    let product = normalize_product(wire_product(vec![wire_variant(1, Some("TR-30"), text("149.00"))]));
    assert_eq!(product.external_id, "10204066152785");
    assert_eq!(product.title, "Traditional Recurve");
    assert_eq!(product.handle.as_deref(), Some("traditional-recurve"));
    assert_eq!(product.vendor.as_deref(), Some("Bearpaw"));
}

#[test]
fn normalize_product_trims_and_dedups_tags() {
    let product = normalize_product(wire_product(vec![]));
    let tags: Vec<&str> = product.tags.iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["Bows", "Recurve"]);
}

#[test]
fn normalize_product_splits_comma_separated_tags() {
    let mut wire = wire_product(vec![]);
    wire.tags = Some(WireTags::Joined("Arrows, Carbon,,Q|internal".to_owned()));
    let product = normalize_product(wire);
    assert_eq!(product.tags.len(), 3);
    assert!(product.tags.contains("Carbon"));
    assert!(product.tags.contains("Q|internal"));
}

#[test]
fn normalize_variant_parses_string_price() {
    let product = normalize_product(wire_product(vec![wire_variant(1, Some("TR-30"), text("149.00"))]));
    assert_eq!(product.variants[0].price, "149.00".parse::<Decimal>().unwrap());
}

#[test]
fn normalize_variant_parses_numeric_price() {
    let number = serde_json::Number::from_f64(12.5).unwrap();
    let product = normalize_product(wire_product(vec![wire_variant(
        1,
        Some("TR-30"),
        Some(WireScalar::Number(number)),
    )]));
    assert_eq!(product.variants[0].price, "12.5".parse::<Decimal>().unwrap());
}

#[test]
fn normalize_variant_zeroes_garbage_and_negative_prices() {
    let product = normalize_product(wire_product(vec![
        wire_variant(1, Some("A"), text("call us")),
        wire_variant(2, Some("B"), text("-5.00")),
        wire_variant(3, Some("C"), None),
        wire_variant(4, Some("D"), text("")),
    ]));
    assert!(product.variants.iter().all(|v| v.price == Decimal::ZERO));
}

#[test]
fn normalize_variant_blank_sku_becomes_none() {
    let product = normalize_product(wire_product(vec![
        wire_variant(1, Some("   "), text("1.00")),
        wire_variant(2, None, text("1.00")),
        wire_variant(3, Some(" TR-35 "), text("1.00")),
    ]));
    assert!(product.variants[0].sku.is_none());
    assert!(product.variants[1].sku.is_none());
    assert_eq!(product.variants[2].sku.as_deref(), Some("TR-35"));
}

#[test]
fn normalize_variant_collects_option_values_in_order() {
    let product = normalize_product(wire_product(vec![wire_variant(1, Some("A"), text("1"))]));
    assert_eq!(product.variants[0].option_values, vec!["30 lbs", "RH"]);
    assert_eq!(product.variants[0].title.as_deref(), Some("30 lbs / RH"));
}

#[test]
fn normalize_product_copies_options() {
    let product = normalize_product(wire_product(vec![]));
    assert_eq!(product.options.len(), 1);
    assert_eq!(product.options[0].name, "Draw Weight");
    assert_eq!(product.options[0].values, vec!["30 lbs", "35 lbs"]);
}

#[test]
fn missing_title_becomes_empty_string() {
    let mut wire = wire_product(vec![]);
    wire.title = None;
    wire.handle = Some(String::new());
    let product = normalize_product(wire);
    assert_eq!(product.title, "");
    assert!(product.handle.is_none());
}

#[test]
fn numeric_sku_and_option_values_become_text() {
    let mut variant = wire_variant(1, None, text("4.50"));
    variant.sku = Some(WireScalar::Number(40512_u64.into()));
    variant.option1 = Some(WireScalar::Number(28_u64.into()));
    let mut wire = wire_product(vec![variant]);
    wire.options[0].values = vec![
        WireScalar::Number(28_u64.into()),
        WireScalar::Text(" 30 ".to_owned()),
    ];

    let product = normalize_product(wire);

    assert_eq!(product.variants[0].sku.as_deref(), Some("40512"));
    assert_eq!(product.variants[0].option_values, vec!["28", "RH"]);
    assert_eq!(product.options[0].values, vec!["28", "30"]);
}
