use super::{EntryContents, ResizePolicy};
use crate::error::VblockError;

const NODE: &str = "/binman/vblock";

fn contents(len: usize) -> EntryContents {
    let mut contents = EntryContents::default();
    contents.set_contents(vec![0x11; len]);
    contents
}

#[test]
fn same_size_update_is_ok() {
    let mut entry = contents(4);
    let ok = entry
        .update_contents_and_resize(NODE, vec![0x22; 4], ResizePolicy::default())
        .expect("update");
    assert!(ok);
    assert_eq!(entry.data(), Some(&[0x22; 4][..]));
}

#[test]
fn growth_with_expansion_requests_relayout() {
    let mut entry = contents(4);
    let ok = entry
        .update_contents_and_resize(NODE, vec![0x22; 8], ResizePolicy::default())
        .expect("update");
    assert!(!ok);
    assert_eq!(entry.contents_size(), 8);
}

#[test]
fn growth_without_expansion_fails() {
    let mut entry = contents(4);
    let policy = ResizePolicy {
        allow_expansion: false,
        allow_contraction: false,
    };
    let err = entry
        .update_contents_and_resize(NODE, vec![0x22; 8], policy)
        .expect_err("too big");
    assert!(matches!(err, VblockError::SizeChange { old: 4, new: 8, .. }));
    assert_eq!(entry.data(), Some(&[0x11; 4][..]));
}

#[test]
fn shrink_without_contraction_pads_with_zeros() {
    let mut entry = contents(4);
    let ok = entry
        .update_contents_and_resize(NODE, vec![0x22; 2], ResizePolicy::default())
        .expect("update");
    assert!(ok);
    assert_eq!(entry.data(), Some(&[0x22, 0x22, 0, 0][..]));
}

#[test]
fn shrink_with_contraction_requests_relayout() {
    let mut entry = contents(4);
    let policy = ResizePolicy {
        allow_expansion: true,
        allow_contraction: true,
    };
    let ok = entry
        .update_contents_and_resize(NODE, vec![0x22; 2], policy)
        .expect("update");
    assert!(!ok);
    assert_eq!(entry.contents_size(), 2);
}
