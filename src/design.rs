//! Seeded design selection.
//!
//! A [`Design`] fixes every visual choice of a card independent of its text. Palette, gradient and
//! fonts come from the whole catalog; background and layout only from the requested style pack.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
	catalog::{BackgroundKind, FontPack, GradientPair, LayoutKind, Palette, StyleCatalog, StylePack},
	prng,
};

/// Retries allowed per batch slot before a colliding design is accepted.
pub const MAX_BATCH_ATTEMPTS: usize = 60;
/// Seed offset applied on every retry of a colliding batch slot.
const RETRY_STRIDE: i64 = 1_013;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Design {
	pub palette: Palette,
	/// Position of `palette` in the catalog it was drawn from.
	pub palette_index: usize,
	pub gradient: GradientPair,
	pub fonts: FontPack,
	pub background: BackgroundKind,
	pub layout: LayoutKind,
	#[serde(default)]
	pub pack: StylePack,
	pub seed: i64,
}

/// What makes two designs in a batch look "the same".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DesignKey {
	pub background: BackgroundKind,
	pub layout: LayoutKind,
	pub palette_index: usize,
	pub quote_family: String,
}

impl Design {
	pub fn key(&self) -> DesignKey {
		DesignKey {
			background: self.background,
			layout: self.layout,
			palette_index: self.palette_index,
			quote_family: self.fonts.quote.family.clone(),
		}
	}
}

/// Deterministically builds a design from `seed`, advancing the seed by one per axis.
///
/// The catalog must be non-empty (see [`StyleCatalog::validate`]).
pub fn select(catalog: &StyleCatalog, seed: i64, pack: StylePack) -> Design {
	let kinds = catalog.kinds(pack);
	let mut s = seed;
	let mut advance = || {
		s = prng::offset(s, 1);
		s
	};

	let palette_index = prng::index(advance(), catalog.palettes.len());
	let gradient_index = prng::index(advance(), catalog.gradients.len());
	let font_index = prng::index(advance(), catalog.fonts.len());
	let background = prng::pick(kinds.backgrounds, advance()).copied().unwrap_or_default();
	let layout = prng::pick(kinds.layouts, advance()).copied().unwrap_or_default();

	let design = Design {
		palette: catalog.palettes[palette_index],
		palette_index,
		gradient: catalog.gradients[gradient_index],
		fonts: catalog.fonts[font_index].clone(),
		background,
		layout,
		pack,
		seed,
	};
	debug!(seed, %pack, %background, %layout, palette_index, "selected design");
	design
}

/// Seed of the `i`-th card of a batch.
pub fn batch_seed(base: i64, i: usize) -> i64 {
	prng::item(base, i as i64, 0)
}

/// Selects `count` designs, retrying a slot with a perturbed seed while its [`DesignKey`] collides
/// with an earlier one. After [`MAX_BATCH_ATTEMPTS`] the colliding design is kept.
pub fn select_batch(catalog: &StyleCatalog, base_seed: i64, pack: StylePack, count: usize) -> Vec<Design> {
	let mut seen = HashSet::with_capacity(count);
	let mut designs = Vec::with_capacity(count);

	for i in 0..count {
		let slot_seed = batch_seed(base_seed, i);
		let mut chosen = select(catalog, slot_seed, pack);
		let mut attempt = 0;
		while seen.contains(&chosen.key()) {
			attempt += 1;
			if attempt >= MAX_BATCH_ATTEMPTS {
				warn!(slot = i, "no unique design after {MAX_BATCH_ATTEMPTS} attempts, accepting duplicate");
				break;
			}
			chosen = select(catalog, prng::offset(slot_seed, (attempt as i64).wrapping_mul(RETRY_STRIDE)), pack);
		}
		if attempt > 0 {
			debug!(slot = i, attempt, "resolved design collision");
		}
		seen.insert(chosen.key());
		designs.push(chosen);
	}
	designs
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::catalog::PackKinds;

	#[test]
	fn selection_is_deterministic() {
		let catalog = StyleCatalog::builtin();
		for seed in [0, 1, 42, -17, 99_999] {
			assert_eq!(select(&catalog, seed, StylePack::Bold), select(&catalog, seed, StylePack::Bold));
		}
	}

	#[test]
	fn pack_filters_background_and_layout_only() {
		let catalog = StyleCatalog::builtin();
		let kinds = catalog.kinds(StylePack::Minimal);
		let mut palettes = HashSet::new();
		for seed in 0..400 {
			let d = select(&catalog, seed, StylePack::Minimal);
			assert!(kinds.backgrounds.contains(&d.background));
			assert!(kinds.layouts.contains(&d.layout));
			assert_eq!(d.palette, catalog.palettes[d.palette_index]);
			palettes.insert(d.palette_index);
		}
		assert_eq!(palettes.len(), catalog.palettes.len(), "palettes should span the whole catalog");
	}

	#[test]
	fn minimal_example_design() {
		let catalog = StyleCatalog::builtin();
		let d = select(&catalog, 42, StylePack::Minimal);
		assert!(matches!(d.background, BackgroundKind::Solid | BackgroundKind::Paper));
		assert!(matches!(
			d.layout,
			LayoutKind::Centered | LayoutKind::Left | LayoutKind::Underline | LayoutKind::Footer | LayoutKind::Bordered
		));
		assert_eq!(d.seed, 42);
	}

	#[test]
	fn batch_has_unique_keys() {
		let catalog = StyleCatalog::builtin();
		for pack in StylePack::ALL {
			for base in [1, 42, 1_000] {
				let designs = select_batch(&catalog, base, *pack, 12);
				assert_eq!(designs.len(), 12);
				let keys: HashSet<_> = designs.iter().map(Design::key).collect();
				assert_eq!(keys.len(), 12, "duplicate designs for pack {pack} base {base}");
			}
		}
	}

	#[test]
	fn extreme_seeds_select_and_batch() {
		let catalog = StyleCatalog::builtin();
		for seed in [i64::MAX, i64::MAX - 3, i64::MIN, i64::MIN + 1] {
			let d = select(&catalog, seed, StylePack::Moody);
			assert_eq!(d.seed, seed);
			assert_eq!(d, select(&catalog, seed, StylePack::Moody));
			let batch = select_batch(&catalog, seed, StylePack::Classic, 12);
			let keys: HashSet<_> = batch.iter().map(Design::key).collect();
			assert_eq!(keys.len(), 12);
		}
		assert_eq!(batch_seed(i64::MAX, 1), i64::MIN + prng::STRIDE - 1);
	}

	#[test]
	fn batch_is_reproducible() {
		let catalog = StyleCatalog::builtin();
		assert_eq!(select_batch(&catalog, 7, StylePack::Soft, 8), select_batch(&catalog, 7, StylePack::Soft, 8));
	}

	#[test]
	fn exhausted_retries_accept_duplicates() {
		let mut catalog = StyleCatalog::builtin();
		catalog.palettes.truncate(1);
		catalog.fonts.truncate(1);
		catalog.packs = BTreeMap::from([(StylePack::Classic, PackKinds {
			backgrounds: vec![BackgroundKind::Solid],
			layouts: vec![LayoutKind::Centered],
		})]);
		let designs = select_batch(&catalog, 3, StylePack::Classic, 4);
		assert_eq!(designs.len(), 4);
		assert!(designs.iter().all(|d| d.key() == designs[0].key()));
	}
}
