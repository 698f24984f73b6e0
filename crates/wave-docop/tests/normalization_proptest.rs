//! Property-based tests for normalization.

use proptest::prelude::*;
use wave_docop::{
    initial_document_length, normalize, resulting_document_length, AnnotationBoundaryMap,
    Attributes, AttributesUpdate, BufferedDocOp, DocOpComponent,
};

// =============================================================================
// Strategies
// =============================================================================

const KEYS: [&str; 3] = ["a", "b", "c"];

#[derive(Clone, Debug)]
enum KeyEvent {
    End,
    Change(Option<&'static str>, Option<&'static str>),
}

fn value() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), Just(Some("1")), Just(Some("2"))]
}

fn key_event() -> impl Strategy<Value = Option<KeyEvent>> {
    prop_oneof![
        2 => Just(None),
        1 => Just(Some(KeyEvent::End)),
        2 => (value(), value()).prop_map(|(old, new)| Some(KeyEvent::Change(old, new))),
    ]
}

fn boundary() -> impl Strategy<Value = AnnotationBoundaryMap> {
    prop::collection::vec(key_event(), KEYS.len()).prop_map(|events| {
        let mut builder = AnnotationBoundaryMap::builder();
        for (key, event) in KEYS.iter().zip(events) {
            builder = match event {
                None => builder,
                Some(KeyEvent::End) => builder.end(key),
                Some(KeyEvent::Change(old, new)) => builder.change(key, old, new),
            };
        }
        builder.build()
    })
}

fn attributes() -> impl Strategy<Value = Attributes> {
    prop_oneof![
        Just(Attributes::EMPTY),
        "[xyz]".prop_map(|v| Attributes::from_pairs([("a", v)])),
    ]
}

/// Any component kind, in any order: well-formedness is not needed for
/// normalization.
fn component() -> impl Strategy<Value = DocOpComponent> {
    prop_oneof![
        3 => (0usize..4).prop_map(DocOpComponent::Retain),
        3 => "[xyz]{0,3}".prop_map(DocOpComponent::Characters),
        3 => "[xyz]{0,3}".prop_map(DocOpComponent::DeleteCharacters),
        4 => boundary().prop_map(DocOpComponent::AnnotationBoundary),
        1 => attributes().prop_map(|attributes| DocOpComponent::ElementStart {
            tag: "p".into(),
            attributes,
        }),
        1 => Just(DocOpComponent::ElementEnd),
        1 => attributes().prop_map(|attributes| DocOpComponent::DeleteElementStart {
            tag: "q".into(),
            attributes,
        }),
        1 => Just(DocOpComponent::DeleteElementEnd),
        1 => (attributes(), attributes())
            .prop_map(|(old, new)| DocOpComponent::ReplaceAttributes { old, new }),
        1 => (value(), value()).prop_map(|(old, new)| {
            DocOpComponent::UpdateAttributes(AttributesUpdate::single("a", old, new))
        }),
    ]
}

fn op() -> impl Strategy<Value = BufferedDocOp> {
    prop::collection::vec(component(), 0..24).prop_map(BufferedDocOp::new)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn normalization_is_idempotent(op in op()) {
        let once = normalize(&op);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalization_preserves_lengths(op in op()) {
        let normalized = normalize(&op);
        prop_assert_eq!(initial_document_length(&normalized), initial_document_length(&op));
        prop_assert_eq!(resulting_document_length(&normalized), resulting_document_length(&op));
    }

    #[test]
    fn normalized_ops_have_no_empty_or_adjacent_ranges(op in op()) {
        let normalized = normalize(&op);
        for pair in normalized.components().windows(2) {
            let same_kind = matches!(
                (&pair[0], &pair[1]),
                (DocOpComponent::Retain(_), DocOpComponent::Retain(_))
                    | (DocOpComponent::Characters(_), DocOpComponent::Characters(_))
                    | (DocOpComponent::DeleteCharacters(_), DocOpComponent::DeleteCharacters(_))
                    | (DocOpComponent::AnnotationBoundary(_), DocOpComponent::AnnotationBoundary(_))
            );
            prop_assert!(!same_kind, "adjacent {:?} and {:?}", pair[0], pair[1]);
        }
        for component in normalized.components() {
            match component {
                DocOpComponent::Retain(n) => prop_assert!(*n > 0),
                DocOpComponent::Characters(s) | DocOpComponent::DeleteCharacters(s) => {
                    prop_assert!(!s.is_empty())
                }
                DocOpComponent::AnnotationBoundary(map) => prop_assert!(!map.is_empty()),
                _ => {}
            }
        }
    }
}
