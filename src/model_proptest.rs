//! Property-based tests for managed-path rules and patch helpers.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::hash::hash_bytes;
    use crate::model::{has_managed_marker, is_pristine_path, patch_sibling_path};
    use crate::patch::{decode_snapshot, encode_snapshot, substitute};
    use proptest::prelude::*;
    use std::path::Path;

    proptest! {
        /// Property: hashing is deterministic and 64 hex chars long
        #[test]
        fn hash_is_deterministic_hex(content in proptest::collection::vec(any::<u8>(), 0..512)) {
            let a = hash_bytes(&content);
            let b = hash_bytes(&content);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.len(), 64);
            prop_assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        }

        /// Property: snapshot encode/decode recovers the exact bytes
        #[test]
        fn snapshot_round_trips(content in proptest::collection::vec(any::<u8>(), 0..512)) {
            let encoded = encode_snapshot(&content).unwrap();
            prop_assert_eq!(decode_snapshot(&encoded).unwrap(), content);
        }

        /// Property: a pristine path always yields a patch sibling that
        /// carries the patched marker and no longer the pristine one
        #[test]
        fn sibling_swaps_marker(stem in "[a-z]{1,8}", ext in "[a-z]{1,4}") {
            let path = format!("{}.copy.{}", stem, ext);
            let sibling = patch_sibling_path(Path::new(&path)).unwrap();
            let name = sibling.file_name().unwrap().to_str().unwrap().to_string();
            prop_assert!(name.contains(".patch."));
            prop_assert!(!name.contains(".copy."));
            prop_assert!(has_managed_marker(&sibling));
            prop_assert!(!is_pristine_path(&sibling));
        }

        /// Property: paths without the pristine marker never get a sibling
        #[test]
        fn sibling_requires_pristine_marker(name in "[a-z]{1,12}(\\.[a-z]{1,4})?") {
            prop_assume!(!name.contains(".copy."));
            prop_assert!(patch_sibling_path(Path::new(&name)).is_err());
        }

        /// Property: substitution with absent needle is the identity
        #[test]
        fn substitute_absent_needle_is_identity(
            content in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            // 0xFF never appears paired like this in the generated content
            let needle = [0xFFu8, 0x00, 0xFF, 0x00, 0xFF];
            prop_assume!(!content.windows(needle.len()).any(|w| w == needle));
            prop_assert_eq!(substitute(&content, &needle, b"x"), content);
        }

        /// Property: substituting from == to leaves content unchanged
        #[test]
        fn substitute_identity_replacement(
            content in "[a-z ]{0,64}",
            needle in "[a-z]{1,8}",
        ) {
            let out = substitute(content.as_bytes(), needle.as_bytes(), needle.as_bytes());
            prop_assert_eq!(out, content.as_bytes());
        }

        /// Property: after substitution the needle no longer appears when
        /// the replacement does not reintroduce it
        #[test]
        fn substitute_removes_needle(content in "[ab]{0,64}") {
            let out = substitute(content.as_bytes(), b"ab", b"c");
            prop_assert!(!out.windows(2).any(|w| w == b"ab"));
        }
    }
}
