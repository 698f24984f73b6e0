use wave_docop::{
    normalize_initialization, to_concise_string, to_xml_string, AnnotationBoundaryMap, Attributes,
    DocInitialization, DocOpBuilder,
};

/// A paragraph exercising every escape, self-closing elements, repeated and
/// redundant annotation boundaries, and multi-key boundaries.
fn annotated_paragraph() -> DocInitialization {
    let link1 = AnnotationBoundaryMap::builder()
        .initialization_values(&[("link", "12?\"\\3")])
        .build();
    let link2 = AnnotationBoundaryMap::builder()
        .initialization_values(&[("link", "1")])
        .build();
    let ann = AnnotationBoundaryMap::builder()
        .initialization_values(&[("x", "3"), ("y", "3")])
        .build();
    let link_end = AnnotationBoundaryMap::builder()
        .initialization_end(&["link"])
        .build();
    let change = AnnotationBoundaryMap::builder()
        .initialization_values(&[("xb", "5"), ("xc", "6"), ("z", "4"), ("zz", "7")])
        .initialization_end(&["x"])
        .build();
    let finish = AnnotationBoundaryMap::builder()
        .initialization_end(&["xb", "xc", "y", "z", "zz"])
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
        .annotation_boundary(ann)
        .characters("abc")
        .annotation_boundary(link_end)
        .characters("def")
        .annotation_boundary(change)
        .characters("ghi")
        .annotation_boundary(finish)
        .element_end()
        .build()
        .into_initialization()
}

const ANNOTATED_PARAGRAPH_XML: &str = concat!(
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
);

#[test]
fn annotated_paragraph_renders_canonically() {
    assert_eq!(
        to_xml_string(&annotated_paragraph()).unwrap(),
        ANNOTATED_PARAGRAPH_XML
    );
}

#[test]
fn normalizing_does_not_change_the_rendering() {
    let normalized = normalize_initialization(&annotated_paragraph());
    assert_eq!(to_xml_string(&normalized).unwrap(), ANNOTATED_PARAGRAPH_XML);
    assert!(normalized.size() < annotated_paragraph().size());
}

#[test]
fn simple_document_renders() {
    let doc = DocOpBuilder::new()
        .element_start("p", Attributes::EMPTY)
        .characters("hi ")
        .characters("therW")
        .element_start("q", Attributes::from_pairs([("a", "1")]))
        .characters("<some>markup&")
        .element_end()
        .element_end()
        .build()
        .into_initialization();
    assert_eq!(
        to_xml_string(&doc).unwrap(),
        "<p>hi therW<q a=\"1\">&lt;some&gt;markup&amp;</q></p>"
    );
    assert_eq!(
        to_concise_string(&doc),
        "<< p {}; ++\"hi \"; ++\"therW\"; << q { a=\"1\" }; ++\"<some>markup&\"; >>; >>; "
    );
}

#[test]
fn change_to_null_renders_like_an_end() {
    let doc = DocOpBuilder::new()
        .annotation_boundary(
            AnnotationBoundaryMap::builder()
                .initialization_values(&[("k", "v")])
                .build(),
        )
        .characters("a")
        .annotation_boundary(AnnotationBoundaryMap::builder().change("k", Some("v"), None).build())
        .characters("b")
        .build_unchecked()
        .into_initialization();
    assert_eq!(to_xml_string(&doc).unwrap(), "<?a \"k\"=\"v\"?>a<?a \"k\"?>b");
}
