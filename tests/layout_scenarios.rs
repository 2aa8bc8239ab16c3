use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use brain_graph::graph::{EdgeKind, GraphData, GraphEdge, GraphNode, NodeKind, sample_graph};
use brain_graph::layout::{
    EngineHandle, LayoutBridge, LayoutCommand, LayoutConfig, LayoutResult, Simulation,
};

fn config(seed: u64) -> LayoutConfig {
    LayoutConfig {
        seed: Some(seed),
        tick_interval_ms: 0,
        ..LayoutConfig::default()
    }
}

fn node(id: &str) -> GraphNode {
    GraphNode::new(id, NodeKind::App, id)
}

fn link(id: &str, from: &str, to: &str) -> GraphEdge {
    GraphEdge::new(id, from, to, EdgeKind::DependsOn)
}

#[test]
fn important_nodes_settle_in_front() {
    let nodes = vec![
        node("front").with_importance(1.0),
        node("back").with_importance(0.0),
        node("middle"),
    ];
    let mut simulation = Simulation::new(nodes, &[], config(3));
    simulation.settle(10_000);
    assert!(simulation.is_settled());

    let snapshot = simulation.snapshot();
    let z = |id: &str| {
        snapshot
            .iter()
            .find(|positioned| positioned.id() == id)
            .map(|positioned| positioned.z)
            .expect("node present")
    };
    assert!(z("front") > z("middle"));
    assert!(z("middle") > z("back"));
    assert!(z("front") - z("back") > 50.0);
}

#[test]
fn unlinked_pair_settles_near_its_depth_targets() {
    for seed in 0..200 {
        let nodes = vec![
            node("a").with_importance(1.0),
            node("b").with_importance(0.0),
        ];
        let mut simulation = Simulation::new(nodes, &[], config(seed));
        simulation.settle(10_000);

        let snapshot = simulation.snapshot();
        let (a, b) = (snapshot[0].z, snapshot[1].z);
        assert!((a - 50.0).abs() <= 10.0, "seed {seed}: a.z = {a}");
        assert!((b + 50.0).abs() <= 10.0, "seed {seed}: b.z = {b}");
    }
}

#[test]
fn coincident_nodes_are_pushed_apart() {
    let config = LayoutConfig {
        initial_spread: 0.0,
        ..config(9)
    };
    let mut simulation = Simulation::new(vec![node("a"), node("b")], &[], config);
    let start = simulation.snapshot();
    assert_eq!(start[0].position(), start[1].position());

    simulation.settle(10_000);
    let end = simulation.snapshot();
    assert!(end[0].position().distance(end[1].position()) >= 29.0);
    assert!(end.iter().all(|positioned| positioned.position().is_finite()));
}

#[test]
fn lone_link_rests_at_link_distance() {
    let config = LayoutConfig {
        charge_strength: 0.0,
        ..config(21)
    };
    let mut simulation = Simulation::new(vec![node("a"), node("b")], &[link("e", "a", "b")], config);
    simulation.settle(10_000);

    let snapshot = simulation.snapshot();
    let distance = snapshot[0].position().distance(snapshot[1].position());
    assert!((distance - 60.0).abs() < 2.0, "rest length was {distance}");
}

#[test]
fn worker_survives_dangling_edges_and_reports_every_node() {
    let mut handle = EngineHandle::spawn(config(4)).expect("spawn engine");
    handle.send(LayoutCommand::Init {
        nodes: vec![node("a"), node("b"), node("c")],
        edges: vec![
            link("e1", "a", "b"),
            link("e2", "b", "ghost"),
            link("e3", "phantom", "c"),
        ],
    });

    let done = loop {
        match handle.recv_timeout(Duration::from_secs(10)) {
            Ok(LayoutResult::Done { nodes }) => break nodes,
            Ok(LayoutResult::Positions { nodes, alpha }) => {
                assert_eq!(nodes.len(), 3);
                assert!(alpha.is_finite());
            }
            Err(err) => panic!("engine went quiet: {err:?}"),
        }
    };

    let ids = done
        .iter()
        .map(|positioned| positioned.id())
        .collect::<BTreeSet<_>>();
    assert_eq!(ids, BTreeSet::from(["a", "b", "c"]));
    assert!(done.iter().all(|positioned| positioned.position().is_finite()));

    handle.send(LayoutCommand::Update);
    handle.stop();
    handle.stop();
    handle.send(LayoutCommand::Tick);
    let after_stop = handle.join();
    assert!(after_stop.iter().all(|result| !result.is_done()));
}

#[test]
fn bridge_lays_out_the_bundled_sample() {
    let data = Arc::new(sample_graph());
    let mut bridge = LayoutBridge::new(Arc::clone(&data), config(1));

    let deadline = Instant::now() + Duration::from_secs(30);
    while bridge.is_busy() {
        assert!(Instant::now() < deadline, "sample layout never settled");
        bridge.poll();
        std::thread::sleep(Duration::from_millis(1));
    }

    let expected = data
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<BTreeSet<_>>();
    let laid_out = bridge
        .positions()
        .keys()
        .map(String::as_str)
        .collect::<BTreeSet<_>>();
    assert_eq!(laid_out, expected);
    assert!(
        bridge
            .positions()
            .values()
            .all(|positioned| positioned.position().is_finite())
    );
    assert!(bridge.progress() > 0.99);
}

#[test]
fn bridge_restarts_for_a_new_dataset() {
    let first = Arc::new(GraphData {
        nodes: vec![node("a"), node("b")],
        edges: vec![link("e", "a", "b")],
    });
    let mut bridge = LayoutBridge::new(first, config(2));
    bridge.set_dataset(Arc::new(GraphData {
        nodes: vec![node("x")],
        edges: vec![link("dangling", "x", "y")],
    }));

    let deadline = Instant::now() + Duration::from_secs(20);
    while bridge.is_busy() {
        assert!(Instant::now() < deadline, "layout never settled");
        bridge.poll();
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(bridge.positions().len(), 1);
    assert!(bridge.position("x").is_some());
}
