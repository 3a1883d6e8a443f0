//! Path builders shared by the background, decoration and layout passes.

use tiny_skia::{FillRule, Mask, Path, PathBuilder, Rect, Transform};

use crate::prng;

/// Cubic control distance approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Rounded rectangle with the radius clamped to `[0, min(w, h) / 2]`.
pub fn rounded_rect(rect: Rect, radius: f32) -> Option<Path> {
	let r = radius.max(0.0).min(rect.width().min(rect.height()) / 2.0);
	if r <= 0.0 {
		return Some(PathBuilder::from_rect(rect));
	}
	let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
	let k = r * KAPPA;

	let mut pb = PathBuilder::new();
	pb.move_to(l + r, t);
	pb.line_to(rt - r, t);
	pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
	pb.line_to(rt, b - r);
	pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
	pb.line_to(l + r, b);
	pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
	pb.line_to(l, t + r);
	pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
	pb.close();
	pb.finish()
}

/// Anti-aliased clip mask of the card shape for a `width`×`height` surface.
pub fn card_clip(width: u32, height: u32, radius: f32) -> Option<Mask> {
	let rect = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)?;
	let path = rounded_rect(rect, radius)?;
	let mut mask = Mask::new(width, height)?;
	mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
	Some(mask)
}

/// Heart of roughly `size` across, centered on the origin.
pub fn heart(size: f32) -> Option<Path> {
	let s = size / 2.0;
	let mut pb = PathBuilder::new();
	pb.move_to(0.0, s * 0.35);
	pb.cubic_to(0.0, s * 0.05, -s * 0.15, -s * 0.6, -s * 0.55, -s * 0.6);
	pb.cubic_to(-s * 1.05, -s * 0.6, -s * 1.05, s * 0.05, -s * 1.05, s * 0.05);
	pb.cubic_to(-s * 1.05, s * 0.45, -s * 0.55, s * 0.8, 0.0, s * 1.05);
	pb.cubic_to(s * 0.55, s * 0.8, s * 1.05, s * 0.45, s * 1.05, s * 0.05);
	pb.cubic_to(s * 1.05, s * 0.05, s * 1.05, -s * 0.6, s * 0.55, -s * 0.6);
	pb.cubic_to(s * 0.15, -s * 0.6, 0.0, s * 0.05, 0.0, s * 0.35);
	pb.close();
	pb.finish()
}

/// Five-point star around the origin whose vertex radii wobble by up to ±10%, seeded per vertex.
pub fn wobbly_star(outer: f32, inner: f32, seed: i64) -> Option<Path> {
	let mut pb = PathBuilder::new();
	for i in 0..10 {
		let base = if i % 2 == 0 { outer } else { inner };
		let r = base * prng::range(prng::offset(seed, i), 0.9, 1.1) as f32;
		let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
		let (x, y) = (r * angle.cos(), r * angle.sin());
		if i == 0 { pb.move_to(x, y) } else { pb.line_to(x, y) }
	}
	pb.close();
	pb.finish()
}
