//! Layout kinds: accent shapes around the text and the frame the text block is placed in.

use tiny_skia::{FillRule, Mask, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::{background::solid_paint, catalog::LayoutKind, design::Design, text::Align};

/// Share of the long axis taken by the `split` band.
pub const SPLIT_BAND: f32 = 0.32;

/// Where the text block goes: `x` is the left edge or the center depending on `align`, `center_y`
/// is the vertical anchor the block is centered on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextFrame {
	pub x: f32,
	pub center_y: f32,
	pub align: Align,
	pub max_width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SplitSide {
	Top,
	Left,
}

fn split_side(w: f32, h: f32) -> SplitSide {
	if w > h { SplitSide::Left } else { SplitSide::Top }
}

/// Text frame for `layout` on a `width`×`height` card with `padding`; draws nothing.
pub fn frame(layout: LayoutKind, width: u32, height: u32, padding: f32) -> TextFrame {
	let (w, h) = (width as f32, height as f32);
	let centered = TextFrame {
		x: w / 2.0,
		center_y: h / 2.0,
		align: Align::Center,
		max_width: (w - 2.0 * padding).max(1.0),
	};

	match layout {
		LayoutKind::Centered | LayoutKind::Bordered | LayoutKind::Underline | LayoutKind::CornerFrame => centered,
		LayoutKind::Left => TextFrame { x: padding, align: Align::Left, ..centered },
		LayoutKind::IconTop => TextFrame { center_y: h * 0.56, ..centered },
		LayoutKind::Footer => TextFrame {
			center_y: (h - footer_height(h)) / 2.0,
			..centered
		},
		LayoutKind::Diagonal => TextFrame { center_y: h * 0.55, ..centered },
		LayoutKind::Split => {
			let band_h = h * SPLIT_BAND;
			match split_side(w, h) {
				SplitSide::Left => {
					let band_w = w * SPLIT_BAND;
					TextFrame {
						x: band_w + padding,
						center_y: h / 2.0,
						align: Align::Left,
						max_width: (w - band_w - 2.0 * padding).max(1.0),
					}
				}
				// square cards keep centered text under the band; portrait ones switch to a narrower left column
				SplitSide::Top if w == h => TextFrame {
					center_y: band_h + (h - band_h) / 2.0,
					..centered
				},
				SplitSide::Top => TextFrame {
					x: padding,
					center_y: band_h + (h - band_h) / 2.0,
					align: Align::Left,
					max_width: (centered.max_width * 0.85).max(1.0),
				},
			}
		}
	}
}

fn footer_height(h: f32) -> f32 {
	h * 0.08
}

/// Draws the accent shapes of `design.layout` in the palette accent color.
pub fn draw_accents(surface: &mut Pixmap, clip: &Mask, design: &Design, padding: f32) {
	let (w, h) = (surface.width() as f32, surface.height() as f32);
	let short = w.min(h);
	let accent = design.palette.accent;
	let id = Transform::identity();

	match design.layout {
		LayoutKind::Centered | LayoutKind::Left => {}
		LayoutKind::IconTop => {
			let r = short * 0.055;
			let cy = (h * 0.22).max(padding + r);
			if let Some(circle) = PathBuilder::from_circle(w / 2.0, cy, r) {
				surface.fill_path(&circle, &solid_paint(accent.with_alpha(0.25)), FillRule::Winding, id, Some(clip));
			}
		}
		LayoutKind::Split => {
			let band = match split_side(w, h) {
				SplitSide::Left => Rect::from_xywh(0.0, 0.0, w * SPLIT_BAND, h),
				SplitSide::Top => Rect::from_xywh(0.0, 0.0, w, h * SPLIT_BAND),
			};
			if let Some(band) = band {
				surface.fill_rect(band, &solid_paint(accent.with_alpha(0.85)), id, Some(clip));
			}
		}
		LayoutKind::Bordered => {
			let inset = padding * 0.5;
			let stroke = Stroke { width: (short * 0.004).max(2.0), ..Stroke::default() };
			if let Some(path) = Rect::from_xywh(inset, inset, w - 2.0 * inset, h - 2.0 * inset).map(PathBuilder::from_rect) {
				surface.stroke_path(&path, &solid_paint(accent.with_alpha(0.55)), &stroke, id, Some(clip));
			}
		}
		LayoutKind::Underline => {
			let bar_w = short * 0.16;
			let bar_h = (short * 0.006).max(3.0);
			if let Some(bar) = Rect::from_xywh((w - bar_w) / 2.0, h - padding * 1.4, bar_w, bar_h) {
				surface.fill_rect(bar, &solid_paint(accent.with_alpha(0.9)), id, Some(clip));
			}
		}
		LayoutKind::Footer => {
			let band_h = footer_height(h);
			if let Some(band) = Rect::from_xywh(0.0, h - band_h, w, band_h) {
				surface.fill_rect(band, &solid_paint(accent.with_alpha(0.9)), id, Some(clip));
			}
		}
		LayoutKind::CornerFrame => {
			let inset = padding * 0.5;
			let arm = short * 0.1;
			let stroke = Stroke { width: (short * 0.005).max(2.0), ..Stroke::default() };
			let paint = solid_paint(accent.with_alpha(0.7));
			// (corner x, corner y, horizontal arm direction, vertical arm direction)
			let corners = [
				(inset, inset, 1.0, 1.0),
				(w - inset, inset, -1.0, 1.0),
				(inset, h - inset, 1.0, -1.0),
				(w - inset, h - inset, -1.0, -1.0),
			];
			for (x, y, dx, dy) in corners {
				let mut pb = PathBuilder::new();
				pb.move_to(x + dx * arm, y);
				pb.line_to(x, y);
				pb.line_to(x, y + dy * arm);
				if let Some(path) = pb.finish() {
					surface.stroke_path(&path, &paint, &stroke, id, Some(clip));
				}
			}
		}
		LayoutKind::Diagonal => {
			let mut pb = PathBuilder::new();
			pb.move_to(0.0, 0.0);
			pb.line_to(w, 0.0);
			pb.line_to(0.0, h * 0.38);
			pb.close();
			if let Some(wedge) = pb.finish() {
				surface.fill_path(&wedge, &solid_paint(accent.with_alpha(0.16)), FillRule::Winding, id, Some(clip));
			}
		}
	}
}

/// Draws the accents and returns the text frame for the surface's size.
pub fn apply(surface: &mut Pixmap, clip: &Mask, design: &Design, padding: f32) -> TextFrame {
	draw_accents(surface, clip, design, padding);
	frame(design.layout, surface.width(), surface.height(), padding)
}

/// Top of a text block of `block_height` centered on `center_y`, kept inside `[safe_top, safe_bottom]`.
///
/// Clamps top, then bottom, then top again, so a block taller than the safe zone is pinned to
/// `safe_top` instead of overflowing upward.
pub fn clamp_block_top(center_y: f32, block_height: f32, safe_top: f32, safe_bottom: f32) -> f32 {
	let mut top = (center_y - block_height / 2.0).max(safe_top);
	if top + block_height > safe_bottom {
		top = safe_bottom - block_height;
	}
	top.max(safe_top)
}
