// ABOUTME: Tree distance between two elements: sibling index gaps plus ancestor climbs.
// ABOUTME: Returns None for disconnected nodes; recurses only to descend into a sibling subtree.

use tracing::trace;

use crate::dom::{Document, DocumentPosition, NodeId};

/// Number of structural steps between `origin` and `target`.
///
/// - the same element is `Some(0)`, parent and child are `Some(1)`;
/// - siblings are as far apart as their positions among the parent's
///   children (every node kind counts toward the index);
/// - otherwise the walk climbs from one node toward the other, adding one
///   per level and the index gap once it reaches the branch holding the
///   other node.
///
/// `None` when either id is not an element of `doc` or the two do not
/// share a root. The result is symmetric.
pub fn distance(doc: &Document, origin: NodeId, target: NodeId) -> Option<usize> {
    if !doc.is_element(origin) || !doc.is_element(target) {
        return None;
    }
    if origin == target {
        return Some(0);
    }

    let origin_parent = doc.parent(origin);
    let target_parent = doc.parent(target);
    if origin_parent == Some(target) || target_parent == Some(origin) {
        return Some(1);
    }
    if origin_parent.is_some() && origin_parent == target_parent {
        return index_gap(doc, origin, target);
    }

    let result = match doc.compare_position(origin, target) {
        DocumentPosition::Disconnected => None,
        // origin contains target: climb back up from the target
        DocumentPosition::Descendant => climb(doc, target, origin),
        _ => climb(doc, origin, target),
    };
    trace!(?origin, ?target, ?result, "distance");
    result
}

/// Walk the ancestors of `start` until one of them is, or holds, `dest`.
fn climb(doc: &Document, start: NodeId, dest: NodeId) -> Option<usize> {
    let mut acc = 0usize;
    let mut last = start;

    for ancestor in doc.ancestors(start) {
        if ancestor == dest {
            return Some(acc + 1);
        }

        let children = doc.children(ancestor);
        let last_index = children.iter().position(|c| *c == last)?;
        if let Some(dest_index) = children.iter().position(|c| *c == dest) {
            return Some(acc + last_index.abs_diff(dest_index));
        }

        let branch = children
            .iter()
            .enumerate()
            .find(|(_, child)| **child != last && doc.contains(**child, dest));
        if let Some((branch_index, &branch)) = branch {
            let rest = distance(doc, branch, dest)?;
            return Some(acc + last_index.abs_diff(branch_index) + rest);
        }

        acc += 1;
        last = ancestor;
    }
    None
}

fn index_gap(doc: &Document, a: NodeId, b: NodeId) -> Option<usize> {
    Some(doc.index_in_parent(a)?.abs_diff(doc.index_in_parent(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root
    /// └── div#top
    ///     ├── p#c0
    ///     ├── p#c1
    ///     │   └── em#deep
    ///     │       └── b#deeper
    ///     ├── p#c2
    ///     └── section#c3
    ///         └── span#s
    struct Sample {
        doc: Document,
        top: NodeId,
        c0: NodeId,
        c1: NodeId,
        c2: NodeId,
        c3: NodeId,
        deep: NodeId,
        deeper: NodeId,
        s: NodeId,
    }

    fn sample() -> Sample {
        let mut doc = Document::fragment();
        let root = doc.root();
        let top = doc.append_element(root, "div", &[]).unwrap();
        let c0 = doc.append_element(top, "p", &[]).unwrap();
        let c1 = doc.append_element(top, "p", &[]).unwrap();
        let deep = doc.append_element(c1, "em", &[]).unwrap();
        let deeper = doc.append_element(deep, "b", &[]).unwrap();
        let c2 = doc.append_element(top, "p", &[]).unwrap();
        let c3 = doc.append_element(top, "section", &[]).unwrap();
        let s = doc.append_element(c3, "span", &[]).unwrap();
        Sample {
            doc,
            top,
            c0,
            c1,
            c2,
            c3,
            deep,
            deeper,
            s,
        }
    }

    #[test]
    fn test_self_and_parent() {
        let t = sample();
        assert_eq!(distance(&t.doc, t.c1, t.c1), Some(0));
        assert_eq!(distance(&t.doc, t.top, t.c1), Some(1));
        assert_eq!(distance(&t.doc, t.c1, t.top), Some(1));
    }

    #[test]
    fn test_sibling_index_gap() {
        let t = sample();
        assert_eq!(distance(&t.doc, t.c0, t.c3), Some(3));
        assert_eq!(distance(&t.doc, t.c1, t.c2), Some(1));
    }

    #[test]
    fn test_ancestor_chain() {
        let t = sample();
        assert_eq!(distance(&t.doc, t.deeper, t.c1), Some(2));
        assert_eq!(distance(&t.doc, t.top, t.deeper), Some(3));
    }

    #[test]
    fn test_cousins() {
        let t = sample();
        // two climbs (deep, c1), gap c1..c3, then c3 -> s
        assert_eq!(distance(&t.doc, t.deeper, t.s), Some(2 + 2 + 1));
        assert_eq!(distance(&t.doc, t.c0, t.deep), Some(1 + 1));
        assert_eq!(distance(&t.doc, t.deep, t.c2), Some(1 + 1));
    }

    #[test]
    fn test_symmetry() {
        let t = sample();
        let all = [t.top, t.c0, t.c1, t.c2, t.c3, t.deep, t.deeper, t.s];
        for a in all {
            for b in all {
                assert_eq!(distance(&t.doc, a, b), distance(&t.doc, b, a));
            }
        }
    }

    #[test]
    fn test_text_nodes_count_toward_index() {
        let mut doc = Document::fragment();
        let root = doc.root();
        let parent = doc.append_element(root, "div", &[]).unwrap();
        let a = doc.append_element(parent, "i", &[]).unwrap();
        doc.append_text(parent, " ").unwrap();
        let b = doc.append_element(parent, "i", &[]).unwrap();
        assert_eq!(distance(&doc, a, b), Some(2));
    }

    #[test]
    fn test_disconnected() {
        let mut t = sample();
        t.doc.detach(t.c3);
        assert_eq!(distance(&t.doc, t.c0, t.s), None);
        assert_eq!(distance(&t.doc, t.s, t.c0), None);
        // Inside the detached subtree distances still work.
        assert_eq!(distance(&t.doc, t.c3, t.s), Some(1));
    }

    #[test]
    fn test_non_elements() {
        let mut t = sample();
        let text = t.doc.append_text(t.c0, "x").unwrap();
        assert_eq!(distance(&t.doc, text, t.c0), None);
        assert_eq!(distance(&t.doc, t.doc.root(), t.c0), None);
    }
}
