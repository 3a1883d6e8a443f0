//! Seeded heart/star doodles scattered around the card edges.

use tiny_skia::{FillRule, Mask, Pixmap, Stroke, Transform};

use crate::{background::solid_paint, catalog::Rgb, prng, shapes};

pub const DOODLE_COUNT: i64 = 10;
/// Doodles closer than this fraction of the short side to the card center are dropped.
pub const CLEAR_CENTER: f32 = 0.26;
const BASE_OPACITY: f32 = 0.12;
const DECORATION_AXIS: i64 = 503;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoodleShape {
	Heart,
	Star,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Doodle {
	pub shape: DoodleShape,
	pub x: f32,
	pub y: f32,
	pub size: f32,
	/// Degrees.
	pub rotation: f32,
	seed: i64,
}

/// Positions, sizes and shapes of the doodles that survive the center exclusion.
pub fn plan(width: u32, height: u32, seed: i64) -> Vec<Doodle> {
	let (w, h) = (width as f32, height as f32);
	let clear = CLEAR_CENTER * w.min(h);
	(0..DOODLE_COUNT)
		.filter_map(|i| {
			let s = prng::item(seed, i, DECORATION_AXIS);
			let x = prng::next(s) as f32 * w;
			let y = prng::next(prng::offset(s, 1)) as f32 * h;
			if (x - w / 2.0).hypot(y - h / 2.0) < clear {
				return None;
			}
			Some(Doodle {
				shape: if prng::chance(prng::offset(s, 2), 0.5) { DoodleShape::Heart } else { DoodleShape::Star },
				x,
				y,
				size: prng::range(prng::offset(s, 3), 7.0, 19.0) as f32,
				rotation: prng::range(prng::offset(s, 4), 0.0, 360.0) as f32,
				seed: s,
			})
		})
		.collect()
}

pub fn draw(surface: &mut Pixmap, clip: &Mask, doodles: &[Doodle], color: Rgb) {
	let fill = solid_paint(color.with_alpha(BASE_OPACITY));
	let outline = solid_paint(color.with_alpha(BASE_OPACITY * 1.6));
	let stroke = Stroke { width: 1.2, ..Stroke::default() };

	for doodle in doodles {
		let path = match doodle.shape {
			DoodleShape::Heart => shapes::heart(doodle.size),
			DoodleShape::Star => shapes::wobbly_star(doodle.size / 2.0, doodle.size / 4.4, prng::offset(doodle.seed, 5)),
		};
		let Some(path) = path else { continue };
		let ts = Transform::from_translate(doodle.x, doodle.y).pre_rotate(doodle.rotation);
		surface.fill_path(&path, &fill, FillRule::Winding, ts, Some(clip));
		surface.stroke_path(&path, &outline, &stroke, ts, Some(clip));
	}
}

/// Plans and draws the doodles for a `surface`-sized card, returning how many were drawn.
pub fn scatter(surface: &mut Pixmap, clip: &Mask, seed: i64, color: Rgb) -> usize {
	let doodles = plan(surface.width(), surface.height(), seed);
	draw(surface, clip, &doodles, color);
	doodles.len()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn center_stays_clear() {
		for seed in 0..200 {
			let (w, h) = (1080.0_f32, 1350.0_f32);
			for d in plan(w as u32, h as u32, seed) {
				let dist = (d.x - w / 2.0).hypot(d.y - h / 2.0);
				assert!(dist >= CLEAR_CENTER * w.min(h), "seed {seed}: doodle at ({}, {}) too central", d.x, d.y);
			}
		}
	}

	#[test]
	fn at_most_ten_with_bounded_sizes() {
		let mut total = 0;
		for seed in 0..100 {
			let doodles = plan(800, 800, seed);
			assert!(doodles.len() <= DOODLE_COUNT as usize);
			total += doodles.len();
			for d in &doodles {
				assert!((7.0..19.0).contains(&d.size));
				assert!((0.0..360.0).contains(&d.rotation));
			}
		}
		assert!(total > 500, "exclusion zone should only drop a minority ({total} kept)");
	}

	#[test]
	fn both_shapes_appear() {
		let all: Vec<_> = (0..20).flat_map(|s| plan(600, 600, s)).collect();
		assert!(all.iter().any(|d| d.shape == DoodleShape::Heart));
		assert!(all.iter().any(|d| d.shape == DoodleShape::Star));
	}

	#[test]
	fn drawing_is_deterministic() {
		let clip = shapes::card_clip(300, 300, 0.0).unwrap();
		let mut a = Pixmap::new(300, 300).unwrap();
		let mut b = Pixmap::new(300, 300).unwrap();
		let n = scatter(&mut a, &clip, 77, Rgb::hex(0x3e7c6b));
		scatter(&mut b, &clip, 77, Rgb::hex(0x3e7c6b));
		assert_eq!(a.data(), b.data());
		assert_eq!(n, plan(300, 300, 77).len());
	}
}
