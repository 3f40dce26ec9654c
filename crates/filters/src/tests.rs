use std::path::Path;

use proptest::prelude::*;

use crate::{FilterSetError, PathFilterSet};

#[test]
fn empty_set_excludes_nothing() {
    let set = PathFilterSet::default();
    assert!(set.is_empty());
    assert!(!set.excluded(Path::new("anything")));
    assert!(!set.excluded(Path::new("a/b/c")));
}

#[test]
fn directory_prefix_excludes_subtree_and_itself() {
    let set = PathFilterSet::from_prefixes(["tests/"]).unwrap();
    assert!(set.excluded(Path::new("tests")));
    assert!(set.excluded(Path::new("tests/unit.c")));
    assert!(set.excluded(Path::new("tests/deep/nested/file")));
}

#[test]
fn prefix_does_not_match_sibling_with_common_stem() {
    let set = PathFilterSet::from_prefixes(["tests/"]).unwrap();
    assert!(!set.excluded(Path::new("tests-extra")));
    assert!(!set.excluded(Path::new("tests-extra/unit.c")));
    assert!(!set.excluded(Path::new("test")));
}

#[test]
fn file_prefix_matches_exact_entry_only() {
    let set = PathFilterSet::from_prefixes(["code/win32/iamf.sdf"]).unwrap();
    assert!(set.excluded(Path::new("code/win32/iamf.sdf")));
    assert!(!set.excluded(Path::new("code/win32/iamf.sdf.bak")));
    assert!(!set.excluded(Path::new("code/win32")));
}

#[test]
fn trailing_slash_is_insignificant() {
    let with = PathFilterSet::from_prefixes(["vendor/"]).unwrap();
    let without = PathFilterSet::from_prefixes(["vendor"]).unwrap();
    assert_eq!(with, without);
}

#[test]
fn later_prefixes_also_apply() {
    let set = PathFilterSet::from_prefixes(["a/", "b/c"]).unwrap();
    assert!(set.excluded(Path::new("a/x")));
    assert!(set.excluded(Path::new("b/c/d")));
    assert!(!set.excluded(Path::new("b/d")));
}

#[test]
fn dot_segments_are_ignored_in_candidates() {
    let set = PathFilterSet::from_prefixes(["tests/"]).unwrap();
    assert!(set.excluded(Path::new("./tests/unit.c")));
}

#[test]
fn empty_prefix_is_rejected() {
    assert_eq!(
        PathFilterSet::from_prefixes([""]).unwrap_err(),
        FilterSetError::EmptyPrefix
    );
    assert_eq!(
        PathFilterSet::from_prefixes(["///"]).unwrap_err(),
        FilterSetError::EmptyPrefix
    );
}

#[test]
fn absolute_prefix_is_rejected() {
    assert!(matches!(
        PathFilterSet::from_prefixes(["/etc"]).unwrap_err(),
        FilterSetError::AbsolutePrefix(p) if p == "/etc"
    ));
}

proptest! {
    #[test]
    fn everything_under_a_prefix_is_excluded(
        prefix in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
        below in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
    ) {
        let set = PathFilterSet::from_prefixes([prefix.clone()]).unwrap();
        prop_assert!(set.excluded(Path::new(&prefix)));
        let nested = format!("{}/{}", prefix, below);
        prop_assert!(set.excluded(Path::new(&nested)));
    }

    #[test]
    fn stem_extension_never_matches(
        prefix in "[a-z]{1,8}",
        suffix in "[a-z0-9-]{1,8}",
    ) {
        let set = PathFilterSet::from_prefixes([format!("{prefix}/")]).unwrap();
        let stem = format!("{}-{}", prefix, suffix);
        prop_assert!(!set.excluded(Path::new(&stem)));
    }
}
