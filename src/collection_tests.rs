use super::{Collection, SectionContents};
use crate::error::VblockError;
use crate::node::{Node, PropValue};

fn collection(phandles: Vec<u32>) -> Collection {
    let node = Node::new("/binman/vblock").with_prop("content", PropValue::Cells(phandles));
    Collection::from_node(&node).expect("collection")
}

fn section() -> SectionContents {
    let mut section = SectionContents::new();
    section.add_entry(1, "u-boot", Some(b"uboot".to_vec()));
    section.add_entry(2, "dtb", Some(b"-dtb".to_vec()));
    section.add_entry(3, "pending", None);
    section
}

#[test]
fn joins_contents_in_declared_order() {
    let data = collection(vec![2, 1])
        .get_contents(&section(), true)
        .expect("contents");
    assert_eq!(data, Some(b"-dtbuboot".to_vec()));
}

#[test]
fn absent_entry_is_not_ready_when_optional() {
    let data = collection(vec![1, 3])
        .get_contents(&section(), false)
        .expect("contents");
    assert_eq!(data, None);
}

#[test]
fn absent_entry_is_fatal_when_required() {
    let err = collection(vec![1, 3])
        .get_contents(&section(), true)
        .expect_err("required");
    match err {
        VblockError::ContentNotReady { node, entry } => {
            assert_eq!(node, "/binman/vblock");
            assert_eq!(entry, "pending");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_phandle_is_a_configuration_error() {
    let err = collection(vec![9])
        .get_contents(&section(), false)
        .expect_err("unknown");
    assert!(err.is_configuration());
}

#[test]
fn missing_content_property_is_rejected() {
    let err = Collection::from_node(&Node::new("/binman/vblock")).expect_err("no content");
    assert!(matches!(err, VblockError::EmptyCollection { .. }));
}

#[test]
fn set_data_makes_entry_ready() {
    let mut section = section();
    assert!(section.set_data(3, vec![0xaa]));
    assert!(!section.set_data(42, vec![0xbb]));
    let data = collection(vec![3])
        .get_contents(&section, true)
        .expect("contents");
    assert_eq!(data, Some(vec![0xaa]));
}
