//! Unit tests for webhook name generation.

use crate::webhook::domain::{MAX_WEBHOOK_NAME_LENGTH, make_webhook_name};
use rand::{SeedableRng, rngs::StdRng};
use rstest::{fixture, rstest};

#[fixture]
fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// Splits a generated name into its prefix and random part.
fn parts(name: &str) -> (&str, &str) {
    let body = name.strip_suffix("-wh").expect("marker suffix");
    body.rsplit_once('-').unwrap_or(("", body))
}

#[rstest]
fn name_is_kebab_cased_prefix_random_part_and_marker(mut rng: StdRng) {
    let name = make_webhook_name("Acme Corp", &mut rng);

    let (prefix, random) = parts(&name);
    assert_eq!(prefix, "acme-corp");
    assert_eq!(random.len(), 6);
    assert!(random.chars().all(|ch| ch.is_ascii_alphanumeric()));
}

#[rstest]
fn empty_workspace_name_yields_random_part_and_marker(mut rng: StdRng) {
    let name = make_webhook_name("", &mut rng);

    assert_eq!(name.chars().count(), 9);
    assert!(!name.starts_with('-'));
    assert!(name.ends_with("-wh"));
}

#[rstest]
fn control_characters_are_dropped(mut rng: StdRng) {
    let name = make_webhook_name("\u{7}Ops\tTeam\u{0}\u{1b}", &mut rng);

    assert_eq!(parts(&name).0, "ops-team");
}

#[rstest]
fn whitespace_runs_collapse_and_edges_are_trimmed(mut rng: StdRng) {
    let name = make_webhook_name("  Field   Ops  ", &mut rng);

    assert_eq!(parts(&name).0, "field-ops");
}

#[rstest]
fn prefix_keeps_only_twenty_characters(mut rng: StdRng) {
    let name = make_webhook_name("A very long workspace name indeed", &mut rng);

    assert_eq!(parts(&name).0, "a-very-long-workspac");
    assert_eq!(name.chars().count(), MAX_WEBHOOK_NAME_LENGTH);
}

#[rstest]
fn expanding_lowercase_shortens_prefix_and_keeps_suffix(mut rng: StdRng) {
    let workspace_name = "\u{130}".repeat(20);

    let first = make_webhook_name(&workspace_name, &mut rng);
    let second = make_webhook_name(&workspace_name, &mut rng);

    let (prefix, random) = parts(&first);
    assert_eq!(prefix, "i\u{307}".repeat(10));
    assert_eq!(random.len(), 6);
    assert!(random.chars().all(|ch| ch.is_ascii_alphanumeric()));
    assert_eq!(first.chars().count(), MAX_WEBHOOK_NAME_LENGTH);
    assert_ne!(first, second);
}

#[rstest]
fn truncated_prefix_does_not_end_with_hyphen(mut rng: StdRng) {
    let workspace_name = format!("{}a x", "\u{130}".repeat(9));

    let name = make_webhook_name(&workspace_name, &mut rng);

    let (prefix, _) = parts(&name);
    assert_eq!(prefix, format!("{}a", "i\u{307}".repeat(9)));
    assert!(name.chars().count() <= MAX_WEBHOOK_NAME_LENGTH);
}

#[rstest]
#[case("")]
#[case(" ")]
#[case("\u{0}\u{1}\u{2}")]
#[case("Ωmega Ünïcode Wörkspace Name")]
#[case("工作区名称非常非常非常非常非常非常非常长")]
#[case("👩‍💻👩‍💻👩‍💻👩‍💻👩‍💻👩‍💻👩‍💻👩‍💻")]
#[case("Workspace\r\nWith\r\nNewlines and a very long tail")]
fn names_never_exceed_the_limit(mut rng: StdRng, #[case] workspace_name: &str) {
    let name = make_webhook_name(workspace_name, &mut rng);

    assert!(
        name.chars().count() <= MAX_WEBHOOK_NAME_LENGTH,
        "{name:?} is too long"
    );
    assert!(!name.chars().any(char::is_control));
    assert_eq!(parts(&name).1.len(), 6);
}

#[test]
fn same_seed_gives_same_name() {
    let first = make_webhook_name("Acme", &mut StdRng::seed_from_u64(42));
    let second = make_webhook_name("Acme", &mut StdRng::seed_from_u64(42));

    assert_eq!(first, second);
}

#[rstest]
fn consecutive_names_differ(mut rng: StdRng) {
    let first = make_webhook_name("Acme", &mut rng);
    let second = make_webhook_name("Acme", &mut rng);

    assert_ne!(first, second);
}
