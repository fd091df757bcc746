//! Property tests for element name resolution

#![allow(clippy::expect_used, clippy::unwrap_used)]

use pagestep::screens::{APP_SHELL, CART_PAGE, INVENTORY_PAGE, LOGIN_PAGE};
use pagestep::{canonical_field_name, DispatchError, ElementResolver, ScreenType};
use proptest::prelude::*;

fn catalog_kinds() -> Vec<&'static ScreenType> {
    vec![&LOGIN_PAGE, &INVENTORY_PAGE, &CART_PAGE, &APP_SHELL]
}

/// Turn `SOME_FIELD_NAME` into `someFieldName`
fn camel_case(field: &str) -> String {
    let mut out = String::new();
    for (i, word) in field.split('_').enumerate() {
        let lower = word.to_ascii_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.extend(chars);
            }
        }
    }
    out
}

mod naming_properties {
    use super::*;

    proptest! {
        #[test]
        fn prop_canonical_is_uppercase(name in "[a-zA-Z0-9_]{0,24}") {
            let canonical = canonical_field_name(&name);
            prop_assert_eq!(canonical.clone(), canonical.to_uppercase());
        }

        #[test]
        fn prop_canonical_is_idempotent(name in "[a-zA-Z0-9_]{0,24}") {
            let once = canonical_field_name(&name);
            prop_assert_eq!(canonical_field_name(&once), once);
        }

        #[test]
        fn prop_lowercase_words_only_uppercase(name in "[a-z]{1,16}") {
            prop_assert_eq!(canonical_field_name(&name), name.to_uppercase());
        }

        #[test]
        fn prop_camel_words_split(words in prop::collection::vec("[a-z]{2,8}", 1..5)) {
            let field = words.join("_").to_uppercase();
            prop_assert_eq!(canonical_field_name(&camel_case(&field)), field);
        }
    }
}

mod resolution_properties {
    use super::*;

    #[test]
    fn test_every_declared_field_resolves_from_camel_case() {
        let resolver = ElementResolver::new();
        for kind in catalog_kinds() {
            for ancestor in kind.lineage() {
                for decl in ancestor.locators {
                    let requested = camel_case(decl.field);
                    let (_, expected) = kind.find_locator(decl.field).unwrap();
                    assert_eq!(
                        resolver.resolve_in(kind, &requested).unwrap(),
                        expected,
                        "{} on {}",
                        requested,
                        kind.name
                    );
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_memoized_result_matches_fresh_search(index in 0usize..64, repeats in 1usize..5) {
            let total = LOGIN_PAGE.locators.len() + INVENTORY_PAGE.locators.len();
            let slot = index % total;
            let (screen, decl) = if slot < LOGIN_PAGE.locators.len() {
                (&LOGIN_PAGE, LOGIN_PAGE.locators[slot])
            } else {
                (&INVENTORY_PAGE, INVENTORY_PAGE.locators[slot - LOGIN_PAGE.locators.len()])
            };
            let requested = camel_case(decl.field);

            let cached = ElementResolver::new();
            let first = cached.resolve_in(screen, &requested).unwrap();
            for _ in 0..repeats {
                prop_assert_eq!(cached.resolve_in(screen, &requested).unwrap(), first);
            }
            prop_assert_eq!(cached.search_count(), 1);

            let fresh = ElementResolver::new();
            prop_assert_eq!(fresh.resolve_in(screen, &requested).unwrap(), first);
        }

        #[test]
        fn prop_unknown_names_fail_and_stay_uncached(suffix in "[a-z]{1,8}") {
            let requested = format!("missing{suffix}Widget");
            let resolver = ElementResolver::new();
            let err = resolver.resolve_in(&CART_PAGE, &requested).unwrap_err();
            let is_resolution = matches!(err, DispatchError::Resolution { .. });
            prop_assert!(is_resolution);
            prop_assert_eq!(resolver.cached_len(), 0);
        }
    }
}
