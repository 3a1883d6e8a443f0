//! Procedural card backgrounds.
//!
//! Every pattern is a pure function of the design (colors + seed) and the target rectangle, drawn
//! through the card clip mask.

use tiny_skia::{
	Color, ColorU8, GradientStop, LinearGradient, Mask, Paint, PathBuilder, Pixmap, Point, RadialGradient, Rect, SpreadMode, Stroke, Transform,
};

use crate::{
	catalog::{BackgroundKind, Rgb},
	design::Design,
	prng,
};

/// Offsets keeping background draws uncorrelated with other uses of the design seed.
const PAPER_AXIS: i64 = 101;
const NOISE_AXIS: i64 = 211;
const HALFTONE_AXIS: i64 = 307;
const BLOB_AXIS: i64 = 401;

const PAPER_SPECKLES: i64 = 90;
const STRIPE_SPACING: f32 = 36.0;
const HALFTONE_SPACING: f32 = 26.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundOptions {
	/// Grain strength of the `noise` pattern as a fraction of the full channel range.
	pub grain: f32,
}

impl Default for BackgroundOptions {
	fn default() -> Self {
		Self { grain: 0.06 }
	}
}

/// Paints `design.background` into `rect`; only pixels inside `clip` are touched.
pub fn paint(surface: &mut Pixmap, clip: &Mask, rect: Rect, design: &Design, options: &BackgroundOptions) {
	let palette = design.palette;
	let seed = design.seed;
	match design.background {
		BackgroundKind::Solid => fill(surface, clip, rect, palette.background.opaque()),
		BackgroundKind::Gradient => gradient(surface, clip, rect, design),
		BackgroundKind::Glass => {
			gradient(surface, clip, rect, design);
			fill(surface, clip, rect, Rgb::WHITE.with_alpha(0.18));
		}
		BackgroundKind::Dark => {
			fill(surface, clip, rect, palette.background.opaque());
			fill(surface, clip, rect, Rgb::WHITE.with_alpha(0.04));
		}
		BackgroundKind::Paper => paper(surface, clip, rect, palette.accent, seed),
		BackgroundKind::Noise => {
			fill(surface, clip, rect, palette.background.opaque());
			grain(surface, clip, rect, seed, options.grain);
		}
		BackgroundKind::Stripes => {
			fill(surface, clip, rect, palette.background.opaque());
			stripes(surface, clip, rect, palette.accent);
		}
		BackgroundKind::Halftone => {
			fill(surface, clip, rect, palette.background.opaque());
			halftone(surface, clip, rect, palette.accent, seed);
		}
		BackgroundKind::Blobs => {
			fill(surface, clip, rect, palette.background.opaque());
			blobs(surface, clip, rect, palette.accent, seed);
		}
	}
}

pub(crate) fn solid_paint(color: Color) -> Paint<'static> {
	let mut paint = Paint::default();
	paint.set_color(color);
	paint.anti_alias = true;
	paint
}

fn fill(surface: &mut Pixmap, clip: &Mask, rect: Rect, color: Color) {
	surface.fill_rect(rect, &solid_paint(color), Transform::identity(), Some(clip));
}

/// Corner-to-corner linear gradient between the design's gradient stops.
fn gradient(surface: &mut Pixmap, clip: &Mask, rect: Rect, design: &Design) {
	let stops = vec![
		GradientStop::new(0.0, design.gradient.from.opaque()),
		GradientStop::new(1.0, design.gradient.to.opaque()),
	];
	let shader = LinearGradient::new(
		Point::from_xy(rect.left(), rect.top()),
		Point::from_xy(rect.right(), rect.bottom()),
		stops,
		SpreadMode::Pad,
		Transform::identity(),
	);
	match shader {
		Some(shader) => {
			let paint = Paint { shader, anti_alias: true, ..Paint::default() };
			surface.fill_rect(rect, &paint, Transform::identity(), Some(clip));
		}
		// degenerate (zero-length) gradients collapse to the first stop
		None => fill(surface, clip, rect, design.gradient.from.opaque()),
	}
}

fn paper(surface: &mut Pixmap, clip: &Mask, rect: Rect, accent: Rgb, seed: i64) {
	fill(surface, clip, rect, Rgb::WHITE.opaque());
	let paint = solid_paint(accent.with_alpha(0.10));
	for i in 0..PAPER_SPECKLES {
		let s = prng::item(seed, i, PAPER_AXIS);
		let x = rect.left() + prng::next(s) as f32 * rect.width();
		let y = rect.top() + prng::next(prng::offset(s, 1)) as f32 * rect.height();
		if let Some(speck) = Rect::from_xywh(x, y, 2.0, 2.0) {
			surface.fill_rect(speck, &paint, Transform::identity(), Some(clip));
		}
	}
}

/// Per-pixel luminance jitter of `amount` (0..1 of the channel range), clamped to valid colors.
fn grain(surface: &mut Pixmap, clip: &Mask, rect: Rect, seed: i64, amount: f32) {
	if amount <= 0.0 {
		return;
	}
	let width = surface.width() as usize;
	let x0 = rect.left().max(0.0) as usize;
	let y0 = rect.top().max(0.0) as usize;
	let x1 = (rect.right().ceil() as usize).min(width);
	let y1 = (rect.bottom().ceil() as usize).min(surface.height() as usize);
	let coverage = clip.data();
	let pixels = surface.pixels_mut();

	for y in y0..y1 {
		for x in x0..x1 {
			let idx = y * width + x;
			if coverage[idx] == 0 {
				continue;
			}
			let jitter = ((prng::next(prng::item(seed, 0, NOISE_AXIS).wrapping_add(idx as i64)) - 0.5) * 2.0 * amount as f64 * 255.0) as f32;
			let c = pixels[idx].demultiply();
			let shift = |v: u8| (v as f32 + jitter).round().clamp(0.0, 255.0) as u8;
			pixels[idx] = ColorU8::from_rgba(shift(c.red()), shift(c.green()), shift(c.blue()), c.alpha()).premultiply();
		}
	}
}

/// 45° translucent stripes at a fixed spacing.
fn stripes(surface: &mut Pixmap, clip: &Mask, rect: Rect, accent: Rgb) {
	let paint = solid_paint(accent.with_alpha(0.10));
	let stroke = Stroke { width: STRIPE_SPACING * 0.35, ..Stroke::default() };
	let h = rect.height();
	let mut offset = -h;
	while offset < rect.width() + h {
		let mut pb = PathBuilder::new();
		pb.move_to(rect.left() + offset, rect.bottom());
		pb.line_to(rect.left() + offset + h, rect.top());
		if let Some(path) = pb.finish() {
			surface.stroke_path(&path, &paint, &stroke, Transform::identity(), Some(clip));
		}
		offset += STRIPE_SPACING;
	}
}

/// Dot grid with seeded per-dot radius jitter.
fn halftone(surface: &mut Pixmap, clip: &Mask, rect: Rect, accent: Rgb, seed: i64) {
	let paint = solid_paint(accent.with_alpha(0.14));
	let cols = (rect.width() / HALFTONE_SPACING).ceil() as i64 + 1;
	let rows = (rect.height() / HALFTONE_SPACING).ceil() as i64 + 1;
	for row in 0..rows {
		for col in 0..cols {
			let s = prng::offset(seed, HALFTONE_AXIS).wrapping_add((row * cols + col) * 7);
			let radius = 2.5 + prng::next(s) as f32 * 3.0;
			let cx = rect.left() + col as f32 * HALFTONE_SPACING;
			let cy = rect.top() + row as f32 * HALFTONE_SPACING;
			if let Some(dot) = PathBuilder::from_circle(cx, cy, radius) {
				surface.fill_path(&dot, &paint, tiny_skia::FillRule::Winding, Transform::identity(), Some(clip));
			}
		}
	}
}

/// Three large soft accent circles, each a radial fade to transparent.
fn blobs(surface: &mut Pixmap, clip: &Mask, rect: Rect, accent: Rgb, seed: i64) {
	let long = rect.width().max(rect.height());
	for i in 0..3 {
		let s = prng::item(seed, i, BLOB_AXIS);
		let cx = rect.left() + prng::next(s) as f32 * rect.width();
		let cy = rect.top() + prng::next(prng::offset(s, 1)) as f32 * rect.height();
		let radius = long * prng::range(prng::offset(s, 2), 0.22, 0.42) as f32;
		let center = Point::from_xy(cx, cy);
		let stops = vec![GradientStop::new(0.0, accent.with_alpha(0.28)), GradientStop::new(1.0, accent.with_alpha(0.0))];
		let Some(shader) = RadialGradient::new(center, center, radius, stops, SpreadMode::Pad, Transform::identity()) else {
			continue;
		};
		let Some(circle) = PathBuilder::from_circle(cx, cy, radius) else {
			continue;
		};
		let paint = Paint { shader, anti_alias: true, ..Paint::default() };
		surface.fill_path(&circle, &paint, tiny_skia::FillRule::Winding, Transform::identity(), Some(clip));
	}
}
