use wave_docop::{
    to_xml_string, AnnotationBoundaryMap, Attributes, AttributesUpdate, DocInitialization,
    DocOpBuilder,
};
use wave_model::{AnnotationBuilder, DocumentMutation, IndexedDocument, ReadableAnnotationSet};

fn empty() -> IndexedDocument {
    IndexedDocument::new()
}

/// Renders `doc`, and checks a fresh copy built from its initialization
/// renders the same.
fn check(expected: &str, doc: &IndexedDocument) {
    let init = doc.to_initialization();
    assert_eq!(to_xml_string(&init).unwrap(), expected);
    let mut copy = empty();
    copy.consume(&init).unwrap();
    assert_eq!(copy.to_xml_string(), expected);
}

fn annotated_paragraph() -> DocInitialization {
    let link1 = AnnotationBoundaryMap::builder()
        .initialization_values(&[("link", "12?\"\\3")])
        .build();
    let link2 = AnnotationBoundaryMap::builder()
        .initialization_values(&[("link", "1")])
        .build();

    DocOpBuilder::new()
        .element_start("p", Attributes::EMPTY)
        .characters("hi ")
        .characters("therW")
        .element_start("q", Attributes::from_pairs([("a", "1")]))
        .characters("<some>markup&")
        .element_end()
        .element_start("r", Attributes::from_pairs([("a", "2"), ("b", "\\\"'")]))
        .element_end()
        .element_start("q", Attributes::EMPTY)
        .annotation_boundary(link1.clone())
        .element_end()
        .element_start("q", Attributes::EMPTY)
        .annotation_boundary(AnnotationBoundaryMap::empty())
        .element_end()
        .element_start("q", Attributes::EMPTY)
        .annotation_boundary(link1.clone())
        .element_end()
        .element_start("r", Attributes::EMPTY)
        .annotation_boundary(link1)
        .element_end()
        .element_start("r", Attributes::EMPTY)
        .annotation_boundary(link2)
        .element_end()
        .annotation_boundary(
            AnnotationBoundaryMap::builder()
                .initialization_values(&[("x", "3"), ("y", "3")])
                .build(),
        )
        .characters("abc")
        .annotation_boundary(AnnotationBoundaryMap::builder().initialization_end(&["link"]).build())
        .characters("def")
        .annotation_boundary(
            AnnotationBoundaryMap::builder()
                .initialization_values(&[("xb", "5"), ("xc", "6"), ("z", "4"), ("zz", "7")])
                .initialization_end(&["x"])
                .build(),
        )
        .characters("ghi")
        .annotation_boundary(
            AnnotationBoundaryMap::builder()
                .initialization_end(&["xb", "xc", "y", "z", "zz"])
                .build(),
        )
        .element_end()
        .build()
        .into_initialization()
}

#[test]
fn annotated_paragraph_round_trips_and_edits() {
    let mut doc = empty();
    doc.consume(&annotated_paragraph()).unwrap();
    check(
        concat!(
            "<p>hi therW",
            "<q a=\"1\">&lt;some&gt;markup&amp;</q>",
            "<r a=\"2\" b=\"\\&quot;'\"/>",
            "<q><?a \"link\"=\"12\\q\\\"\\\\3\"?></q>",
            "<q/>",
            "<q/>",
            "<r/>",
            "<r><?a \"link\"=\"1\"?></r>",
            "<?a \"x\"=\"3\" \"y\"=\"3\"?>abc",
            "<?a \"link\"?>def",
            "<?a \"x\" \"xb\"=\"5\" \"xc\"=\"6\" \"z\"=\"4\" \"zz\"=\"7\"?>ghi",
            "<?a \"xb\" \"xc\" \"y\" \"z\" \"zz\"?>",
            "</p>",
        ),
        &doc,
    );
    assert_eq!(doc.len(), 46);

    let edit = DocOpBuilder::new()
        .update_attributes(AttributesUpdate::single("a", None, Some("2")))
        .delete_characters("hi t")
        .characters("you ")
        .retain(4)
        .replace_attributes(
            Attributes::from_pairs([("a", "1")]),
            Attributes::from_pairs([("b", "2")]),
        )
        .retain("<some>markup&".chars().count() + 1)
        .update_attributes(AttributesUpdate::single("a", Some("2"), Some("3")))
        .retain(2)
        .annotation_boundary(
            AnnotationBoundaryMap::builder()
                .update_values(&[("link", Some("12?\"\\3"), Some("blah"))])
                .build(),
        )
        .retain(3)
        .annotation_boundary(AnnotationBoundaryMap::builder().initialization_end(&["link"]).build())
        .retain(16)
        .build();
    doc.consume(&edit).unwrap();
    check(
        concat!(
            "<p a=\"2\">you herW",
            "<q b=\"2\">&lt;some&gt;markup&amp;</q>",
            "<r a=\"3\" b=\"\\&quot;'\"/><q><?a \"link\"=\"blah\"?>",
            "</q><q/><?a \"link\"=\"12\\q\\\"\\\\3\"?>",
            "<q/>",
            "<r/>",
            "<r><?a \"link\"=\"1\"?></r>",
            "<?a \"x\"=\"3\" \"y\"=\"3\"?>abc",
            "<?a \"link\"?>def",
            "<?a \"x\" \"xb\"=\"5\" \"xc\"=\"6\" \"z\"=\"4\" \"zz\"=\"7\"?>ghi",
            "<?a \"xb\" \"xc\" \"y\" \"z\" \"zz\"?>",
            "</p>",
        ),
        &doc,
    );
}

#[test]
fn simple_paragraph_edit() {
    let init = DocOpBuilder::new()
        .element_start("p", Attributes::EMPTY)
        .characters("hi ")
        .characters("therW")
        .element_start("q", Attributes::from_pairs([("a", "1")]))
        .characters("<some>markup&")
        .element_end()
        .element_end()
        .build()
        .into_initialization();
    let mut doc = empty();
    doc.consume(&init).unwrap();
    check("<p>hi therW<q a=\"1\">&lt;some&gt;markup&amp;</q></p>", &doc);

    let edit = DocOpBuilder::new()
        .retain(1)
        .delete_characters("hi t")
        .characters("you ")
        .retain(4)
        .replace_attributes(
            Attributes::from_pairs([("a", "1")]),
            Attributes::from_pairs([("b", "2")]),
        )
        .retain("<some>markup&".chars().count() + 1)
        .build();
    doc.consume(&edit).unwrap();
    check("<p>you herW<q b=\"2\">&lt;some&gt;markup&amp;</q></p>", &doc);
}

#[test]
fn the_same_edit_as_a_mutation() {
    let mut doc = empty();
    doc.consume(
        &DocOpBuilder::new()
            .element_start("p", Attributes::EMPTY)
            .characters("hi therW")
            .element_start("q", Attributes::from_pairs([("a", "1")]))
            .characters("<some>markup&")
            .element_end()
            .element_end()
            .build(),
    )
    .unwrap();
    let mutation = DocumentMutation::builder()
        .skip(1)
        .delete_characters(4)
        .characters("you ")
        .skip(4)
        .replace_attributes(Attributes::from_pairs([("b", "2")]))
        .build();
    doc.consume_mutation(&mutation).unwrap();
    check("<p>you herW<q b=\"2\">&lt;some&gt;markup&amp;</q></p>", &doc);
}

#[test]
fn annotation_builder_output_applies() {
    let mut doc = empty();
    doc.consume(&annotated_paragraph()).unwrap();

    // Covers the stretch where "link" is 12?"\3, then 1, then unset.
    let (start, end) = (26, 40);
    let mut builder = AnnotationBuilder::new(&doc, start, end, "link");
    builder.set_up_to(Some("1"), end);
    assert!(builder.is_dirty());
    let mutation = builder.build();

    let brackets = mutation
        .components()
        .iter()
        .filter(|c| matches!(c, wave_model::MutationComponent::StartAnnotation { .. }))
        .count();
    assert_eq!(brackets, 2);

    doc.consume_mutation(&mutation).unwrap();
    for location in start..end {
        assert_eq!(doc.get_annotation(location, "link").map(String::as_str), Some("1"));
    }
    assert_eq!(doc.get_annotation(end, "link"), None);

    let mut again = AnnotationBuilder::new(&doc, start, end, "link");
    again.set_up_to(Some("1"), end);
    assert!(!again.is_dirty());
    assert!(again.build().is_empty());
}
