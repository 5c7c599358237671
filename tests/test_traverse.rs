use ahash::HashSet;
use proptest::prelude::*;

use xmlweave::{ContentFilter, DescendantCursor, ElementFilter, Error, Node, ValueType, XmlData};

#[test]
fn test_descendants_document_order() {
    let mut data = XmlData::new();
    let doc = data
        .parse("<!--before--><a><b>1<c/>2</b><d><e/></d></a>")
        .unwrap();
    let types = data
        .descendants(doc)
        .map(|node| data.value_type(node))
        .collect::<Vec<_>>();
    use ValueType::*;
    assert_eq!(
        types,
        vec![Comment, Element, Element, Text, Element, Text, Element, Element]
    );
}

#[test]
fn test_filtered_descendants() {
    let mut data = XmlData::new();
    let doc = data
        .parse("<a><b><a/></b>text<a>more</a></a>")
        .unwrap();
    assert_eq!(data.filtered_descendants(doc, ElementFilter::named("a")).count(), 3);
    assert_eq!(
        data.filtered_descendants(doc, ContentFilter::text_like()).count(),
        2
    );
    assert_eq!(data.text_content(doc), "textmore");
}

#[test]
fn test_cursor_exhausted() {
    let mut data = XmlData::new();
    let doc = data.parse("<a/>").unwrap();
    let mut cursor = DescendantCursor::new(doc);
    assert!(cursor.has_next(&data));
    cursor.next(&data).unwrap();
    assert!(!cursor.has_next(&data));
    assert!(matches!(cursor.next(&data), Err(Error::IteratorExhausted)));
}

#[test]
fn test_remove_during_traversal() {
    let mut data = XmlData::new();
    let doc = data
        .parse("<r><x><y/></x><k/><x/><k><x/></k></r>")
        .unwrap();
    let mut cursor = DescendantCursor::new(doc);
    let mut visited = Vec::new();
    while cursor.has_next(&data) {
        let node = cursor.next(&data).unwrap();
        let name = data.element(node).unwrap().name().to_string();
        if name == "x" {
            cursor.remove(&mut data).unwrap();
        }
        visited.push(name);
    }
    assert_eq!(visited, vec!["r", "x", "k", "x", "k", "x"]);
    assert_eq!(data.to_string(doc).unwrap(), "<r><k/><k/></r>");
}

#[test]
fn test_wide_and_deep() {
    let mut data = XmlData::new();
    let root = data.new_element("root");
    let mut expected = Vec::new();
    let mut current = root;
    for _ in 0..50_000 {
        current = data.append_element(current, "n").unwrap();
        expected.push(current);
        let leaf = data.append_text(current, "t").unwrap();
        expected.push(leaf);
    }
    // each element holds its text first, then the next element
    assert_eq!(data.descendants(root).collect::<Vec<_>>(), expected);
}

fn build(data: &mut XmlData, shape: &[usize]) -> Node {
    // each number is the child count of the next element in breadth order
    let root = data.new_element("r");
    let mut queue = std::collections::VecDeque::from([root]);
    for count in shape {
        let Some(parent) = queue.pop_front() else {
            break;
        };
        for _ in 0..*count {
            let child = data.append_element(parent, "e").unwrap();
            queue.push_back(child);
        }
    }
    root
}

proptest! {
    #[test]
    fn test_visits_every_node_once(shape in prop::collection::vec(0usize..4, 0..40)) {
        let mut data = XmlData::new();
        let root = build(&mut data, &shape);
        let visited = data.descendants(root).collect::<Vec<_>>();
        let unique = visited.iter().copied().collect::<HashSet<_>>();
        prop_assert_eq!(unique.len(), visited.len());
        for node in &visited {
            prop_assert!(data.is_ancestor(root, *node));
        }
        // each node comes after its owner
        for (i, node) in visited.iter().enumerate() {
            let owner = data.owner(*node).unwrap();
            if owner != root {
                prop_assert!(visited[..i].contains(&owner));
            }
        }
    }

    #[test]
    fn test_remove_skips_nothing(shape in prop::collection::vec(0usize..4, 0..40), every in 1usize..4) {
        let mut data = XmlData::new();
        let root = build(&mut data, &shape);
        let before = data.descendants(root).collect::<Vec<_>>();

        let mut cursor = DescendantCursor::new(root);
        let mut visited = Vec::new();
        let mut removed = HashSet::default();
        let mut i = 0;
        while cursor.has_next(&data) {
            let node = cursor.next(&data).unwrap();
            // nothing below a removed node is visited
            prop_assert!(!data.ancestors(node).any(|a| removed.contains(&a)));
            visited.push(node);
            if i % every == 0 {
                cursor.remove(&mut data).unwrap();
                removed.insert(node);
            }
            i += 1;
        }
        let expected = before
            .iter()
            .copied()
            .filter(|node| {
                !data.ancestors(*node).skip(1).any(|a| removed.contains(&a))
            })
            .collect::<Vec<_>>();
        prop_assert_eq!(visited, expected);
    }
}
