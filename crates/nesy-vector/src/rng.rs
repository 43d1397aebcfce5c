use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

/// Derives a deterministic 64-bit seed from any hashable key. Used so that
/// `createFromName`, position-vector sampling, and `createRandom(seed)` are
/// reproducible across calls (atom names are deterministic; the exact
/// strategy's session-local exception is handled by folding a session id
/// into the key before it reaches here).
pub fn seed_from_key<K: Hash>(key: K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

pub fn rng_from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fills `words` with pseudo-random bits from a seeded generator — the
/// dense-binary atom/position sampler.
pub fn fill_random_bits(seed: u64, word_count: usize) -> Vec<u32> {
    let mut rng = rng_from_seed(seed);
    (0..word_count).map(|_| rng.next_u32()).collect()
}

/// Fills `len` bytes from a seeded generator, used by the metric-affine
/// family (each byte is an element of Z_256, or Z_m for a smaller modulus
/// handled by the caller via `% modulus`).
pub fn fill_random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = rng_from_seed(seed);
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}

/// Samples `count` distinct exponents in `0..ring_size` for the
/// sparse-polynomial strategy.
pub fn sample_exponents(seed: u64, ring_size: u32, count: usize) -> Vec<u32> {
    let mut rng = rng_from_seed(seed);
    let mut set = std::collections::BTreeSet::new();
    let mut guard = 0;
    while set.len() < count.min(ring_size as usize) && guard < count * 50 + 100 {
        set.insert(rng.next_u32() % ring_size);
        guard += 1;
    }
    set.into_iter().collect()
}
