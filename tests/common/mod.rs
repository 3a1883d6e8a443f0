#![allow(dead_code)]

use std::cell::RefCell;

use quote_cards::text::{Align, FontSpec, TextColor, TextRun, Typesetter};
use tiny_skia::{Paint, Pixmap, Rect, Transform};

/// A drawn text run, as seen by [`BlockTypesetter`].
#[derive(Clone, Debug, PartialEq)]
pub struct Drawn {
	pub text: String,
	pub weight: u16,
	pub size: f32,
	pub x: f32,
	pub top: f32,
	pub align: Align,
	pub color: TextColor,
}

/// Fixed advance of `0.6 * size` per char; paints each run as a solid bar so text shows up in the
/// pixels, and records every run.
#[derive(Default)]
pub struct BlockTypesetter {
	pub drawn: RefCell<Vec<Drawn>>,
}

impl BlockTypesetter {
	pub fn drawn(&self) -> Vec<Drawn> {
		self.drawn.borrow().clone()
	}
}

impl Typesetter for BlockTypesetter {
	fn measure(&self, text: &str, font: &FontSpec) -> f32 {
		text.chars().count() as f32 * font.size * 0.6
	}

	fn fill_text(&self, surface: &mut Pixmap, run: &TextRun<'_>) {
		let width = self.measure(run.text, run.font);
		let left = match run.align {
			Align::Left => run.x,
			Align::Center => run.x - width / 2.0,
		};
		if let Some(bar) = Rect::from_xywh(left, run.top + run.font.size * 0.2, width.max(1.0), run.font.size * 0.7) {
			let mut paint = Paint::default();
			paint.set_color(run.color.rgb.with_alpha(run.color.alpha));
			surface.fill_rect(bar, &paint, Transform::identity(), None);
		}
		self.drawn.borrow_mut().push(Drawn {
			text: run.text.to_owned(),
			weight: run.font.weight,
			size: run.font.size,
			x: run.x,
			top: run.top,
			align: run.align,
			color: run.color,
		});
	}
}
