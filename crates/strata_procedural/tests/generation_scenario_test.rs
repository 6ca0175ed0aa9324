//! End-to-end generation over the sample blueprint.
//!
//! Seed 42, five nodes, three bidirectional edges and one unidirectional
//! edge.

use strata_core::{NodeId, NodeLevel, WorldSeed};
use strata_procedural::{
    DropLightest, EdgeDeclaration, GenerationConfig, GenerationDriver, GenerationPhase,
    GenerationWorld, PolarityMask, WorldBlueprint,
};

const SAMPLE_WORLD: &str = include_str!("../data/sample_world.toml");

fn sample_world() -> GenerationWorld {
    WorldBlueprint::from_toml_str(SAMPLE_WORLD)
        .unwrap()
        .build(WorldSeed::new(42))
        .unwrap()
}

fn targets(world: &GenerationWorld, id: u32) -> Vec<u32> {
    world.graph().neighbors(NodeId::new(id)).map(NodeId::raw).collect()
}

#[test]
fn test_sample_world_converges() {
    let config = GenerationConfig::with_seed(WorldSeed::new(42));
    let driver = GenerationDriver::with_narrower(config, DropLightest);
    let mut world = driver.build(&WorldBlueprint::from_toml_str(SAMPLE_WORLD).unwrap()).unwrap();
    let readiness = world.graph().readiness();
    assert!(!readiness.is_ready());

    let report = driver.run(&mut world);

    assert!(report.is_healthy());
    assert_eq!(report.completed, 5);
    assert!(report.ticks <= 101, "took {} ticks", report.ticks);
    assert_eq!(report.graph.map(|m| m.connection_count), Some(7));
    assert_eq!(readiness.marker(), report.graph);

    for state in world.states() {
        assert_eq!(state.phase, GenerationPhase::Completed);
        assert!(state.collapsed);
        assert_ne!(state.assigned_id, 0);
    }

    let room = world.registry().find_by_address(NodeLevel::Room, (0, 0)).unwrap();
    let assigned = world.state(room).unwrap().assigned_id;
    assert!((100..=102).contains(&assigned));
}

#[test]
fn test_sample_world_adjacency() {
    let mut world = sample_world();
    let report = world.materialize_graph();

    assert_eq!(report.declarations, 4);
    assert_eq!(report.forward_added, 4);
    assert_eq!(report.mirrored_added, 3);
    assert_eq!(world.graph().total_connections(), 7);

    // District 1 has no edges.
    assert!(!world.graph().has_buffer(NodeId::new(1)));
    assert_eq!(targets(&world, 2), vec![3, 4]);
    assert_eq!(targets(&world, 3), vec![2]);
    assert_eq!(targets(&world, 4), vec![5, 2]);
    assert_eq!(targets(&world, 5), vec![4, 3]);
}

#[test]
fn test_sample_world_polarity_gating() {
    let mut world = sample_world();
    world.materialize_graph();
    let graph = world.graph();
    let ledge_room = NodeId::new(5);

    assert_eq!(graph.traversable_from(ledge_room, PolarityMask::empty()).count(), 0);
    let down: Vec<_> = graph
        .traversable_from(ledge_room, PolarityMask::NEGATIVE)
        .map(|c| c.to_id)
        .collect();
    assert_eq!(down, vec![NodeId::new(3)]);
    assert_eq!(graph.traversable_from(ledge_room, PolarityMask::all()).count(), 2);

    let corridor = graph.connections(NodeId::new(2));
    assert_eq!(corridor[1].traversal_cost, 2.5);
}

#[test]
fn test_materialization_runs_once() {
    let mut world = sample_world();
    world.materialize_graph();
    let marker = world.graph().marker();

    world.declare_edge(EdgeDeclaration::bidirectional(NodeId::new(1), NodeId::new(2)));
    let again = world.materialize_graph();

    assert!(again.no_op);
    assert_eq!(again.added(), 0);
    assert_eq!(world.graph().marker(), marker);
    assert_eq!(world.graph().total_connections(), 7);
}

#[test]
fn test_unresolved_edge_does_not_block_others() {
    let mut world = sample_world();
    world.declare_edge(EdgeDeclaration::bidirectional(NodeId::new(1), NodeId::new(77)));

    let report = world.materialize_graph();
    assert_eq!(report.unresolved_skipped, 1);
    assert_eq!(world.graph().total_connections(), 7);
    assert!(world.graph().is_built());
}
