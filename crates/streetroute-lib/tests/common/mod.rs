#![allow(dead_code)]

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use streetroute_lib::{GraphBuilder, RoadGraph};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn overpass_fixture() -> PathBuf {
    fixtures_dir().join("puno_small.overpass.json")
}

/// Random directed graph around Puno with integer edge lengths.
///
/// Integer lengths keep sums exact so results can be compared against an
/// integer-cost reference search.
pub fn random_graph(seed: u64, nodes: i64, out_degree: usize) -> RoadGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new();
    for id in 0..nodes {
        let lat = -15.85 + rng.gen_range(0.0..0.02);
        let lon = -70.03 + rng.gen_range(0.0..0.02);
        builder = builder.node(id, lat, lon);
    }
    for from in 0..nodes {
        for _ in 0..out_degree {
            let to = rng.gen_range(0..nodes);
            let length = rng.gen_range(1..100) as f64;
            builder = builder.edge(from, to, length);
        }
    }
    builder.build().expect("generated graph is valid")
}
