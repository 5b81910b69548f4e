//! Tests for building graphs through the public API.
//!
//! These tests verify:
//! - Element creation and both-sided relationship wiring
//! - Validation errors and that failed calls leave the graph untouched
//! - Property reads and writes, including the protected `"type"` tag
//! - Edge connector ordering


use test_utils::{DocumentBuilder, id, props, triangle};
use trellis_graph::{ElementId, ElementKind, Graph, GraphError, PropertyMap, PropertyValue};

fn base() -> Graph {
    DocumentBuilder::new()
        .model("M", "MODEL")
        .node("A", "NODE", "M")
        .connector("a1", "PORT", "A")
        .connector("a2", "PORT", "A")
        .graph()
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn add_node_wires_both_sides() {
    let graph = base();
    let model = graph.element(&id("M")).unwrap();
    let node = graph.element(&id("A")).unwrap();

    assert_eq!(model.children(ElementKind::Node), vec![id("A")]);
    assert_eq!(node.parents(ElementKind::Model), vec![id("M")]);
    assert_eq!(node.kind(), ElementKind::Node);
}

#[test]
fn add_connector_wires_both_sides() {
    let graph = base();
    let node = graph.element(&id("A")).unwrap();
    let mut connectors = node.children(ElementKind::Connector);
    connectors.sort();
    assert_eq!(connectors, vec![id("a1"), id("a2")]);

    let connector = graph.element(&id("a2")).unwrap();
    assert_eq!(connector.parents(ElementKind::Node), vec![id("A")]);
}

#[test]
fn add_edge_wires_connectors_and_model() {
    let graph = triangle().graph();
    let edge = graph.element(&id("bc")).unwrap();

    assert_eq!(edge.parents(ElementKind::Model), vec![id("M")]);
    assert_eq!(edge.connector_neighbours(), vec![id("b"), id("c")]);
    assert_eq!(edge.start_connector(), Some(id("b")));
    assert_eq!(edge.end_connector(), Some(id("c")));

    let b = graph.element(&id("b")).unwrap();
    let mut edges = b.children(ElementKind::Edge);
    edges.sort();
    assert_eq!(edges, vec![id("ab"), id("bc")]);

    let model = graph.element(&id("M")).unwrap();
    assert_eq!(model.children(ElementKind::Edge).len(), 3);
}

#[test]
fn edge_connector_order_follows_arguments_not_ids() {
    let mut graph = base();
    graph
        .add_edge(id("back"), "LINK", &id("M"), &id("a2"), &id("a1"), PropertyMap::new())
        .unwrap();
    let edge = graph.element(&id("back")).unwrap();
    assert_eq!(edge.connector_neighbours(), vec![id("a2"), id("a1")]);
    assert_eq!(edge.neighbours(ElementKind::Connector).len(), 2);
}

#[test]
fn sub_model_under_node_and_edge() {
    let graph = test_utils::edge_with_sub_model(true)
        .sub_model("inner", "SUB_MODEL", "A")
        .graph();

    let on_edge = graph.element(&id("S")).unwrap();
    assert_eq!(on_edge.parents(ElementKind::Edge), vec![id("E")]);
    assert!(on_edge.parents(ElementKind::Node).is_empty());

    let on_node = graph.element(&id("inner")).unwrap();
    assert_eq!(on_node.parents(ElementKind::Node), vec![id("A")]);
    assert_eq!(
        graph.element(&id("A")).unwrap().children(ElementKind::Model),
        vec![id("inner")]
    );
}

#[test]
fn all_neighbours_spans_every_kind() {
    let graph = test_utils::edge_with_sub_model(true).graph();
    let mut neighbours = graph.element(&id("E")).unwrap().all_neighbours();
    neighbours.sort();
    assert_eq!(neighbours, vec![id("M"), id("S"), id("a"), id("b")]);
}

#[test]
fn generated_ids_are_accepted() {
    let mut graph = Graph::new();
    let model = ElementId::new();
    graph
        .add_model(model.clone(), "MODEL", PropertyMap::new(), None)
        .unwrap();
    assert!(graph.has_model(&model));
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn duplicate_id_is_rejected_across_kinds() {
    let mut graph = base();
    let before = graph.serialize();

    let err = graph
        .add_node(id("a1"), "NODE", &id("M"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateId(dup) if dup == id("a1")));
    assert_eq!(graph.serialize(), before);
}

#[test]
fn missing_owner_is_not_found() {
    let mut graph = base();
    let err = graph
        .add_node(id("B"), "NODE", &id("nowhere"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(missing) if missing == id("nowhere")));
    assert!(!graph.has_element(&id("B")));
}

#[test]
fn owner_of_wrong_kind_is_rejected() {
    let mut graph = base();
    let err = graph
        .add_node(id("B"), "NODE", &id("A"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::WrongKind {
            expected: ElementKind::Model,
            found: ElementKind::Node,
            ..
        }
    ));

    let err = graph
        .add_connector(id("x"), "PORT", &id("M"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::WrongKind {
            expected: ElementKind::Node,
            found: ElementKind::Model,
            ..
        }
    ));
}

#[test]
fn edge_validates_every_reference_before_mutating() {
    let mut graph = base();
    let before = graph.serialize();

    let err = graph
        .add_edge(id("e"), "LINK", &id("M"), &id("a1"), &id("A"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::WrongKind {
            expected: ElementKind::Connector,
            ..
        }
    ));

    let err = graph
        .add_edge(id("e"), "LINK", &id("M"), &id("a1"), &id("ghost"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));

    let err = graph
        .add_edge(id("e"), "LINK", &id("a1"), &id("a1"), &id("a2"), PropertyMap::new())
        .unwrap_err();
    assert!(matches!(err, GraphError::WrongKind { .. }));

    assert_eq!(graph.serialize(), before);
}

#[test]
fn model_parent_must_be_node_or_edge() {
    let mut graph = base();

    let err = graph
        .add_model(id("S"), "SUB", PropertyMap::new(), Some(&id("M")))
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(parent) if parent == id("M")));

    let err = graph
        .add_model(id("S"), "SUB", PropertyMap::new(), Some(&id("a1")))
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));

    let err = graph
        .add_model(id("S"), "SUB", PropertyMap::new(), Some(&id("ghost")))
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
    assert!(!graph.has_element(&id("S")));
}

#[test]
fn element_lookup_of_missing_id_fails() {
    let graph = base();
    assert!(matches!(
        graph.element(&id("ghost")),
        Err(GraphError::NotFound(_))
    ));
}

#[test]
fn error_messages_name_the_element() {
    let mut graph = base();
    let err = graph
        .add_node(id("B"), "NODE", &id("A"), PropertyMap::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "element 'A' is a node, expected a model");
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn creation_properties_are_kept_and_type_is_set() {
    let mut graph = base();
    let properties = props(&[
        ("label", PropertyValue::from("Customer")),
        ("abstract", PropertyValue::from(true)),
        ("type", PropertyValue::from("IGNORED")),
    ]);
    graph
        .add_node(id("B"), "UML_CLASS", &id("M"), properties)
        .unwrap();

    let node = graph.element(&id("B")).unwrap();
    assert_eq!(node.type_tag().as_str(), Some("UML_CLASS"));
    assert_eq!(node.property("abstract").and_then(PropertyValue::as_bool), Some(true));
    assert_eq!(node.properties().len(), 3);
}

#[test]
fn set_property_upserts() {
    let mut graph = base();
    graph.set_property(&id("A"), "x", 10_i64).unwrap();
    graph.set_property(&id("A"), "x", 20_i64).unwrap();
    assert_eq!(
        graph.property(&id("A"), "x").unwrap().and_then(PropertyValue::as_i64),
        Some(20)
    );
}

#[test]
fn type_can_be_overwritten_but_not_deleted() {
    let mut graph = base();
    graph.set_property(&id("A"), "type", "UML_INTERFACE").unwrap();
    assert_eq!(
        graph.property(&id("A"), "type").unwrap(),
        Some(&PropertyValue::from("UML_INTERFACE"))
    );

    let err = graph.delete_property(&id("A"), "type").unwrap_err();
    assert!(matches!(err, GraphError::InvariantViolation(_)));
    assert!(graph.property(&id("A"), "type").unwrap().is_some());
}

#[test]
fn delete_property_returns_old_value_and_tolerates_absent_keys() {
    let mut graph = base();
    graph.set_property(&id("a1"), "side", "left").unwrap();

    let removed = graph.delete_property(&id("a1"), "side").unwrap();
    assert_eq!(removed, Some(PropertyValue::from("left")));
    assert_eq!(graph.delete_property(&id("a1"), "side").unwrap(), None);
}

#[test]
fn property_operations_on_missing_element_fail() {
    let mut graph = base();
    assert!(matches!(
        graph.set_property(&id("ghost"), "x", 1_i64),
        Err(GraphError::NotFound(_))
    ));
    assert!(matches!(
        graph.delete_property(&id("ghost"), "x"),
        Err(GraphError::NotFound(_))
    ));
}

#[test]
fn nested_property_values_are_stored_as_given() {
    let mut graph = base();
    let position = props(&[("x", 1.5_f64.into()), ("y", (-2_i64).into())]);
    let tags = PropertyValue::List(vec!["a".into(), "b".into()]);
    graph.set_property(&id("A"), "position", position.clone()).unwrap();
    graph.set_property(&id("A"), "tags", tags.clone()).unwrap();

    let node = graph.element(&id("A")).unwrap();
    assert_eq!(node.property("position"), Some(&PropertyValue::Document(position)));
    assert_eq!(node.property("tags"), Some(&tags));
}
