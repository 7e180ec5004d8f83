//! Seeded random streams for vertex programs.
//!
//! Each `(run seed, superstep, vertex)` triple gets its own [`StdRng`],
//! keyed by a mixing function over the three inputs. A vertex therefore
//! draws the same numbers no matter which other vertices are active or in
//! what order the round is executed, and two runs with the same seed are
//! identical.

use contagion_types::VertexId;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Odd multiplicative constants used to separate the three inputs.
const SUPERSTEP_MIX: u64 = 0x517c_c1b7_2722_0a95;
const VERTEX_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derive a 64-bit stream key for one vertex in one superstep.
///
/// The same inputs always produce the same key.
pub const fn stream_key(seed: u64, superstep: u64, vertex: VertexId) -> u64 {
    let mut state = seed
        .wrapping_add(superstep.wrapping_mul(SUPERSTEP_MIX))
        .wrapping_add(vertex.0.wrapping_mul(VERTEX_MIX));

    // splitmix64 finalizer
    state ^= state >> 30;
    state = state.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    state ^= state >> 27;
    state = state.wrapping_mul(0x94d0_49bb_1331_11eb);
    state ^= state >> 31;
    state
}

/// The random stream handed to `vertex` during `superstep`.
pub fn vertex_rng(seed: u64, superstep: u64, vertex: VertexId) -> StdRng {
    StdRng::seed_from_u64(stream_key(seed, superstep, vertex))
}
