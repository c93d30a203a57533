//! Benchmarks for assembly and explicit time stepping

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fea_dynamics::prelude::*;

struct Frame {
    nodes: Vec<Node>,
    elements: Vec<BeamElement>,
    bcs: Vec<BoundaryCondition>,
    forces: Vec<Force>,
}

fn create_multi_story_frame(stories: usize, bays: usize) -> Frame {
    let column = Props::rectangular(210e9, 81e9, 0.4, 0.4, 7850.0, [0.0, 0.0, 1.0]);
    let beam = Props::rectangular(210e9, 81e9, 0.3, 0.6, 7850.0, [0.0, 0.0, 1.0]);

    let story_height = 3.5;
    let bay_width = 6.0;
    let node_id = |story: usize, bay: usize| story * (bays + 1) + bay;

    let mut nodes = Vec::new();
    for story in 0..=stories {
        for bay in 0..=bays {
            nodes.push(Node::new(bay as f64 * bay_width, story as f64 * story_height, 0.0));
        }
    }

    let mut elements = Vec::new();
    // Columns
    for story in 0..stories {
        for bay in 0..=bays {
            elements.push(BeamElement::timoshenko(
                node_id(story, bay),
                node_id(story + 1, bay),
                column,
            ));
        }
    }
    // Beams
    for story in 1..=stories {
        for bay in 0..bays {
            elements.push(BeamElement::timoshenko(
                node_id(story, bay),
                node_id(story, bay + 1),
                beam,
            ));
        }
    }

    let bcs = (0..=bays).flat_map(BoundaryCondition::fixed).collect();

    let forces = (0..=bays)
        .map(|bay| Force::constant(node_id(stories, bay), Dof::DisplacementX, 5000.0))
        .collect();

    Frame {
        nodes,
        elements,
        bcs,
        forces,
    }
}

fn benchmark_assembly(c: &mut Criterion) {
    let frame = create_multi_story_frame(10, 5);
    c.bench_function("frame_10story_5bay_assembly", |b| {
        b.iter(|| {
            let mesh = Mesh::new(&frame.nodes, &frame.elements, frame.bcs.clone()).unwrap();
            black_box(&mesh);
        })
    });
}

fn run_steps(frame: &Frame, steps: usize) -> ExplicitSystem {
    let mesh = Mesh::new(&frame.nodes, &frame.elements, frame.bcs.clone()).unwrap();
    let n = mesh.num_dofs();
    let dt = estimate_stable_timestep(&frame.nodes, &frame.elements).unwrap();

    let mut system = ExplicitSystem::new(
        mesh,
        frame.forces.clone(),
        DVector::zeros(n),
        DVector::zeros(n),
        0.0,
        ExplicitOptions::default(),
    )
    .unwrap();

    for _ in 0..steps {
        system.update(dt).unwrap();
    }
    system
}

fn benchmark_small_frame(c: &mut Criterion) {
    let frame = create_multi_story_frame(3, 2);
    c.bench_function("frame_3story_2bay_100_steps", |b| {
        b.iter(|| black_box(run_steps(&frame, 100)))
    });
}

fn benchmark_medium_frame(c: &mut Criterion) {
    let frame = create_multi_story_frame(10, 5);
    c.bench_function("frame_10story_5bay_100_steps", |b| {
        b.iter(|| black_box(run_steps(&frame, 100)))
    });
}

criterion_group!(
    benches,
    benchmark_assembly,
    benchmark_small_frame,
    benchmark_medium_frame,
);

criterion_main!(benches);
