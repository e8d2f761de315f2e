//! Property-based tests for reference resolution and remote URL
//! normalization.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{is_within_scope, normalize_remote_url, resolve_relative};
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => "[a-z][a-z0-9-]{0,8}",
            1 => Just("..".to_string()),
            1 => Just(".".to_string()),
            1 => Just(String::new()),
        ]
    }

    fn relative_path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 0..8).prop_map(|parts| parts.join("/"))
    }

    fn plain_path() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9-]{0,8}", 1..6).prop_map(|parts| parts.join("/"))
    }

    // ============================================================================
    // resolve_relative
    // ============================================================================

    proptest! {
        /// The result is either "." or a path of plain segments.
        #[test]
        fn resolved_paths_are_lexically_clean(base in relative_path(), reference in relative_path()) {
            let resolved = resolve_relative(&base, &reference);
            if resolved != "." {
                for part in resolved.split('/') {
                    prop_assert!(!part.is_empty(), "empty segment in {:?}", resolved);
                    prop_assert!(part != "." && part != "..", "dot segment in {:?}", resolved);
                }
            }
        }

        /// Resolving an already clean path against the root changes nothing.
        #[test]
        fn resolution_is_idempotent(base in relative_path(), reference in relative_path()) {
            let once = resolve_relative(&base, &reference);
            let twice = resolve_relative(".", &once);
            prop_assert_eq!(once, twice);
        }

        /// A reference without dot segments is appended to the base.
        #[test]
        fn plain_references_extend_the_base(base in plain_path(), reference in plain_path()) {
            let resolved = resolve_relative(&base, &reference);
            prop_assert_eq!(&resolved, &format!("{}/{}", base, reference));
            prop_assert!(is_within_scope(&resolved, &base));
        }

        /// `<dir>/..` cancels out.
        #[test]
        fn parent_of_child_is_the_base(base in plain_path(), child in "[a-z]{1,8}") {
            let reference = format!("{}/..", child);
            prop_assert_eq!(resolve_relative(&base, &reference), base);
        }
    }

    // ============================================================================
    // normalize_remote_url
    // ============================================================================

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            base in "https://[a-z]{1,8}\\.com/[a-z]{1,8}/[a-z]{1,8}",
            query in prop::collection::vec(("[a-z_]{1,8}", "[a-z0-9.]{0,6}"), 0..5),
        ) {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            let url = if pairs.is_empty() {
                base.clone()
            } else {
                format!("{}?{}", base, pairs.join("&"))
            };

            let once = normalize_remote_url(&url);
            prop_assert_eq!(normalize_remote_url(&once), once.clone());
            prop_assert!(once.starts_with(&base), "{:?} lost its base", once);
            let with_ref = format!("{}?ref=", base);
            prop_assert!(
                once == base || once.starts_with(&with_ref),
                "unexpected normalization {:?} of {:?}",
                once,
                url
            );
        }

        #[test]
        fn urls_without_query_are_unchanged(url in "https://[a-z]{1,8}\\.org(/[a-z0-9-]{1,8}){0,4}") {
            prop_assert_eq!(normalize_remote_url(&url), url);
        }

        /// Only the first non-empty `ref` survives, whatever surrounds it.
        #[test]
        fn ref_parameter_survives(
            git_ref in "[a-z0-9.]{1,8}",
            before in prop::collection::vec("[g-q]{1,4}=[a-z]{0,4}", 0..3),
            after in prop::collection::vec("[g-q]{1,4}=[a-z]{0,4}", 0..3),
        ) {
            let mut pairs = before.clone();
            pairs.push(format!("ref={}", git_ref));
            pairs.extend(after);
            let url = format!("https://host/p?{}", pairs.join("&"));
            prop_assert_eq!(normalize_remote_url(&url), format!("https://host/p?ref={}", git_ref));
        }
    }
}
