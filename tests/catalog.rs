use quiniela_terminal::catalog::{Catalog, MatchDescriptor};

#[test]
fn embedded_catalog_parses() {
    let catalog = Catalog::embedded().expect("embedded catalog should parse");
    assert!(!catalog.is_empty());
    let first = &catalog.matches()[0];
    assert!(!first.home_name.is_empty());
    assert!(catalog.contains(&first.id));
}

#[test]
fn parses_catalog_field_names_and_aliases() {
    let raw = r#"[
        {"id": "a", "localTeam": "Tijuana", "visitorTeam": "Puebla",
         "localLogoUrl": "tij.png", "visitorLogoUrl": "pue.png"},
        {"id": "b", "homeName": "Atlas", "awayName": "Toluca"}
    ]"#;
    let catalog = Catalog::from_json(raw).expect("catalog should parse");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(catalog.matches()[0].home_logo_ref, "tij.png");
    assert_eq!(catalog.get("b").map(|m| m.label()).as_deref(), Some("Atlas vs Toluca"));
}

#[test]
fn empty_catalog_is_allowed() {
    let catalog = Catalog::from_json("[]").expect("empty list parses");
    assert!(catalog.is_empty());
}

#[test]
fn duplicate_or_blank_ids_are_rejected() {
    let dup = Catalog::new(vec![
        MatchDescriptor::new("m1", "A", "B"),
        MatchDescriptor::new("m1", "C", "D"),
    ]);
    assert!(dup.is_err());
    assert!(Catalog::new(vec![MatchDescriptor::new(" ", "A", "B")]).is_err());
}

#[test]
fn short_badge_uses_two_uppercase_chars() {
    assert_eq!(MatchDescriptor::short("querétaro"), "QU");
    assert_eq!(MatchDescriptor::short("x"), "X");
}
