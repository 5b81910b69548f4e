//! Tests for sharing one graph between threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trellis_core::SharedGraph;
use trellis_graph::{ElementId, ElementKind, Graph, PropertyMap};

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

/// A model with `n` nodes, each with one connector, chained by edges.
fn chain(n: usize) -> Graph {
    let mut graph = Graph::new();
    graph.add_model(id("m"), "MODEL", PropertyMap::new(), None).unwrap();
    for i in 0..n {
        graph
            .add_node(id(&format!("n{i}")), "NODE", &id("m"), PropertyMap::new())
            .unwrap();
        graph
            .add_connector(id(&format!("c{i}")), "PORT", &id(&format!("n{i}")), PropertyMap::new())
            .unwrap();
        if i > 0 {
            graph
                .add_edge(
                    id(&format!("e{i}")),
                    "LINK",
                    &id("m"),
                    &id(&format!("c{}", i - 1)),
                    &id(&format!("c{i}")),
                    PropertyMap::new(),
                )
                .unwrap();
        }
    }
    graph
}

#[test]
fn readers_never_observe_a_half_applied_cascade() {
    let shared = SharedGraph::new(chain(32));
    let checks = Arc::new(AtomicUsize::new(0));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let checks = Arc::clone(&checks);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let graph = shared.read();
                    for edge in graph.ids_of(ElementKind::Edge) {
                        let element = graph.element(&edge).unwrap();
                        for connector in element.connector_neighbours() {
                            assert!(graph.has_connector(&connector), "{edge} dangles");
                        }
                    }
                    checks.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    let writer = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            for i in (0..32).step_by(2) {
                shared.write().delete_node(&id(&format!("n{i}"))).unwrap();
            }
        })
    };

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(checks.load(Ordering::Relaxed), 200);
    let graph = shared.read();
    assert_eq!(graph.ids_of(ElementKind::Node).len(), 16);
    assert!(graph.ids_of(ElementKind::Edge).is_empty());
}

#[test]
fn snapshot_and_restore_move_graphs_between_handles() {
    let source = SharedGraph::from(chain(4));
    let target = SharedGraph::default();

    target.restore(&source.snapshot()).unwrap();
    assert_eq!(target.snapshot(), source.snapshot());

    source.write().delete_model(&id("m")).unwrap();
    assert!(source.read().is_empty());
    assert_eq!(target.read().len(), 1 + 4 + 4 + 3);
}
