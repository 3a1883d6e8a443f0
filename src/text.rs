//! Text measurement and drawing.
//!
//! The compositor only needs two things from its host: how wide a string is in a given font, and
//! how to paint it. [`SvgTypesetter`] does both through `usvg`/`resvg` with a `fontdb` database.

use std::{path::Path, sync::Arc};

use tiny_skia::{Pixmap, Transform};
use tracing::{debug, warn};

use crate::catalog::{FontFace, Rgb};

/// A font face at a concrete pixel size.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
	pub family: String,
	pub weight: u16,
	pub italic: bool,
	pub size: f32,
}

impl FontSpec {
	pub fn new(face: &FontFace, size: f32) -> Self {
		Self {
			family: face.family.clone(),
			weight: face.weight,
			italic: face.italic,
			size,
		}
	}

	pub fn bold(mut self) -> Self {
		self.weight = self.weight.max(700);
		self
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	Left,
	Center,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextColor {
	pub rgb: Rgb,
	pub alpha: f32,
}

impl TextColor {
	pub const fn opaque(rgb: Rgb) -> Self {
		Self { rgb, alpha: 1.0 }
	}
}

/// One line of text to paint. `x` is the left edge or the center depending on `align`; `top` is the
/// top of the line box of height `line_height`.
#[derive(Clone, Debug)]
pub struct TextRun<'a> {
	pub text: &'a str,
	pub font: &'a FontSpec,
	pub x: f32,
	pub top: f32,
	pub line_height: f32,
	pub align: Align,
	pub color: TextColor,
}

impl TextRun<'_> {
	/// Alphabetic baseline placing the glyphs optically centered in the line box.
	pub fn baseline(&self) -> f32 {
		self.top + (self.line_height + self.font.size * 0.7) / 2.0
	}
}

pub trait Typesetter {
	fn measure(&self, text: &str, font: &FontSpec) -> f32;
	fn fill_text(&self, surface: &mut Pixmap, run: &TextRun<'_>);
}

pub struct SvgTypesetter {
	options: usvg::Options<'static>,
}

impl SvgTypesetter {
	/// System fonts plus any extra font files (missing or unreadable ones are skipped).
	pub fn new<P: AsRef<Path>>(extra_fonts: &[P]) -> Self {
		let mut fontdb = fontdb::Database::new();
		fontdb.load_system_fonts();
		for path in extra_fonts {
			let path = path.as_ref();
			if let Err(e) = fontdb.load_font_file(path) {
				warn!(path = %path.display(), "skipping font file: {e}");
			}
		}
		debug!(faces = fontdb.len(), "font database ready");

		let mut options = usvg::Options::default();
		options.fontdb = Arc::new(fontdb);
		Self { options }
	}

	fn parse(&self, svg: &str) -> Option<usvg::Tree> {
		match usvg::Tree::from_str(svg, &self.options) {
			Ok(tree) => Some(tree),
			Err(e) => {
				warn!("failed to lay out text: {e}");
				None
			}
		}
	}
}

impl Default for SvgTypesetter {
	fn default() -> Self {
		Self::new::<&Path>(&[])
	}
}

impl Typesetter for SvgTypesetter {
	fn measure(&self, text: &str, font: &FontSpec) -> f32 {
		if text.trim().is_empty() {
			return 0.0;
		}
		let svg = format!(
			r#"<svg width="1" height="1" xmlns="http://www.w3.org/2000/svg"><text x="0" y="{y}" {attrs}>{text}</text></svg>"#,
			y = font.size,
			attrs = font_attrs(font),
			text = escape_xml(text),
		);
		self.parse(&svg).map(|tree| tree.root().abs_bounding_box().width()).unwrap_or(0.0)
	}

	fn fill_text(&self, surface: &mut Pixmap, run: &TextRun<'_>) {
		let anchor = match run.align {
			Align::Left => "start",
			Align::Center => "middle",
		};
		let svg = format!(
			r#"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg"><text x="{x}" y="{y}" text-anchor="{anchor}" fill="{fill}" fill-opacity="{alpha}" {attrs}>{text}</text></svg>"#,
			w = surface.width(),
			h = surface.height(),
			x = run.x,
			y = run.baseline(),
			fill = run.color.rgb,
			alpha = run.color.alpha,
			attrs = font_attrs(run.font),
			text = escape_xml(run.text),
		);
		if let Some(tree) = self.parse(&svg) {
			resvg::render(&tree, Transform::identity(), &mut surface.as_mut());
		}
	}
}

fn font_attrs(font: &FontSpec) -> String {
	format!(
		r#"font-family="{}" font-size="{}" font-weight="{}" font-style="{}""#,
		escape_xml(&font.family),
		font.size,
		font.weight,
		if font.italic { "italic" } else { "normal" }
	)
}

fn escape_xml(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&apos;")
}
