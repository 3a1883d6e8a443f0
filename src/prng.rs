//! Stateless seeded randomness.
//!
//! Every "random" choice in a card is a pure function of an integer seed, so two renders of the same
//! design are pixel-identical. Callers derive a fresh seed per choice by offsetting the base seed
//! (`seed + i * 11 + axis`), which keeps unrelated choices from correlating.

/// Stride between consecutive items drawn from one base seed (shapes, speckles, batch cards).
pub const STRIDE: i64 = 11;

/// `seed + n`, wrapping at the ends of the `i64` range so every seed is usable.
pub const fn offset(seed: i64, n: i64) -> i64 {
	seed.wrapping_add(n)
}

/// Seed of the `i`-th item drawn from `seed` on `axis`, i.e. `seed + i * STRIDE + axis` (wrapping).
pub const fn item(seed: i64, i: i64, axis: i64) -> i64 {
	seed.wrapping_add(i.wrapping_mul(STRIDE)).wrapping_add(axis)
}

/// Seeds are folded into `(-2^40, 2^40)` before the float conversion, where `f64` still tells
/// neighbouring integers apart.
const SEED_PERIOD: i64 = 1 << 40;

/// Maps `seed` to a float in `[0, 1)`. Same seed, same float.
pub fn next(seed: i64) -> f64 {
	let x = ((seed % SEED_PERIOD) as f64).sin() * 10_000.0;
	let r = x - x.floor();
	// `x - floor(x)` can round up to exactly 1.0 for tiny negative `x`
	if r >= 1.0 { 0.0 } else { r }
}

/// Uniform float in `[lo, hi)`.
pub fn range(seed: i64, lo: f64, hi: f64) -> f64 {
	lo + next(seed) * (hi - lo)
}

/// Index into a collection of `len` items, `floor(next(seed) * len)`.
///
/// `len` must be non-zero.
pub fn index(seed: i64, len: usize) -> usize {
	debug_assert!(len > 0, "cannot pick from an empty collection");
	((next(seed) * len as f64).floor() as usize).min(len.saturating_sub(1))
}

/// Picks one item of `items`; `None` only when `items` is empty.
pub fn pick<T>(items: &[T], seed: i64) -> Option<&T> {
	if items.is_empty() {
		return None;
	}
	items.get(index(seed, items.len()))
}

/// Seeded coin flip.
pub fn chance(seed: i64, p: f64) -> bool {
	next(seed) < p
}
