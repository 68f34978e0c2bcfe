use storyreel_core::{Character, CharacterSpec, ReferenceImage};
use storyreel_pipeline::CharacterRegistry;

fn character(name: &str, url: &str) -> Character {
    Character::new(
        CharacterSpec::new(name, "tall"),
        ReferenceImage::new(url, format!("/tmp/{name}.png")),
    )
}

#[test]
fn first_reference_wins() {
    let mut registry = CharacterRegistry::new();
    assert!(registry.store(character("Ava", "https://img/a1.png")));
    assert!(!registry.store(character("Ava", "https://img/a2.png")));

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("Ava").map(|c| c.reference_url()),
        Some("https://img/a1.png")
    );
}

#[test]
fn resolve_keeps_request_order_and_drops_unknowns() {
    let mut registry = CharacterRegistry::new();
    registry.store(character("Ava", "https://img/a.png"));
    registry.store(character("Milo", "https://img/m.png"));

    let names = ["Milo", "Ghost", "Ava", "Milo"].map(String::from);
    let resolved: Vec<&str> = registry
        .resolve(&names)
        .into_iter()
        .map(|c| c.name().as_str())
        .collect();

    assert_eq!(resolved, vec!["Milo", "Ava"]);
}

#[test]
fn clear_empties_the_registry() {
    let mut registry = CharacterRegistry::new();
    registry.store(character("Ava", "https://img/a.png"));
    registry.clear();

    assert!(registry.is_empty());
    assert!(registry.names().is_empty());
}
