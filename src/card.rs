//! Card compositor: clip, background, doodles, layout accents, then text.
//!
//! One render fully overwrites the surface it is given, so a pixmap can be reused across cards.
//! With [`SizePolicy::AutoGrow`] the text is measured first and the card grows taller (never wider)
//! until the quote fits.

use color_eyre::eyre::{Result, eyre};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tiny_skia::{Color, Pixmap, Rect};
use tracing::{debug, instrument};

use crate::{
	background::{self, BackgroundOptions},
	contrast::{self, TextColors},
	decoration,
	design::Design,
	layout::{self, TextFrame},
	text::{FontSpec, TextRun, Typesetter},
	wrap::wrap,
};

pub const DEFAULT_RADIUS: f32 = 36.0;
/// Text never comes closer to the top or bottom edge than this share of the padding.
const SAFE_MARGIN: f32 = 0.9;
const GROW_PASSES: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct CardRenderRequest {
	pub quote: String,
	pub author: String,
	pub width: u32,
	pub height: u32,
	pub design: Design,
	#[new(value = "DEFAULT_RADIUS")]
	pub radius: f32,
	#[new(value = "1.0")]
	pub quote_scale: f32,
	#[new(value = "1.0")]
	pub author_scale: f32,
}

impl CardRenderRequest {
	/// Author with surrounding whitespace removed; `None` when blank.
	pub fn author_line(&self) -> Option<String> {
		let author = self.author.trim();
		(!author.is_empty()).then(|| format!("— {author}"))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizePolicy {
	/// Render at exactly the requested size.
	Fixed,
	/// Grow the height so the text block plus padding fits.
	#[default]
	AutoGrow,
}

/// Type sizes and spacing, all derived from the card's short side at its requested size.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
	pub padding: f32,
	pub quote_font: FontSpec,
	pub author_font: FontSpec,
	pub quote_line_height: f32,
	pub author_line_height: f32,
	pub author_gap: f32,
}

impl Metrics {
	pub fn new(request: &CardRenderRequest) -> Self {
		let short = request.width.max(1).min(request.height.max(1)) as f32;
		let quote_size = (short * 0.058 * request.quote_scale).max(6.0);
		let author_size = (short * 0.032 * request.author_scale).max(6.0);
		Self {
			padding: short * 0.08,
			quote_font: FontSpec::new(&request.design.fonts.quote, quote_size),
			author_font: FontSpec::new(&request.design.fonts.author, author_size).bold(),
			quote_line_height: quote_size * 1.3,
			author_line_height: author_size * 1.4,
			author_gap: quote_size * 0.55,
		}
	}
}

/// Wrapped quote lines plus the optional author line, with the total block height.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
	pub lines: Vec<String>,
	pub author: Option<String>,
	pub height: f32,
}

impl TextBlock {
	pub fn layout(typesetter: &dyn Typesetter, request: &CardRenderRequest, metrics: &Metrics, max_width: f32) -> Self {
		let lines = wrap(&request.quote, max_width, |s| typesetter.measure(s, &metrics.quote_font));
		let author = request.author_line();
		let mut height = lines.len() as f32 * metrics.quote_line_height;
		if author.is_some() {
			height += metrics.author_gap + metrics.author_line_height;
		}
		Self { lines, author, height }
	}
}

/// What a render produced, for callers that report on or test the result.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
	pub width: u32,
	pub height: u32,
	pub lines: usize,
	pub doodles: usize,
	pub colors: TextColors,
	pub text_top: f32,
}

pub struct Compositor<'a> {
	typesetter: &'a dyn Typesetter,
	background: BackgroundOptions,
}

impl<'a> Compositor<'a> {
	pub fn new(typesetter: &'a dyn Typesetter, background: BackgroundOptions) -> Self {
		Self { typesetter, background }
	}

	/// Final pixel size of `request` under `policy`, measuring the text off-screen if needed.
	pub fn size_for(&self, request: &CardRenderRequest, policy: SizePolicy) -> (u32, u32) {
		let (width, height) = (request.width.max(1), request.height.max(1));
		match policy {
			SizePolicy::Fixed => (width, height),
			SizePolicy::AutoGrow => {
				let metrics = Metrics::new(request);
				let mut grown = height;
				// growing can reshape the frame (split turns portrait), so settle on a height whose own frame fits
				for _ in 0..GROW_PASSES {
					let frame = layout::frame(request.design.layout, width, grown, metrics.padding);
					let block = TextBlock::layout(self.typesetter, request, &metrics, frame.max_width);
					let needed = (block.height + 2.0 * metrics.padding).ceil() as u32;
					if needed <= grown {
						break;
					}
					grown = needed;
				}
				if grown > height {
					debug!(requested = height, grown, "growing card to fit text");
				}
				(width, grown)
			}
		}
	}

	/// Renders `request` into `surface`, reallocating it if its size differs from the final card size.
	///
	/// Fails only if the surface cannot be allocated; nothing is drawn in that case.
	#[instrument(skip_all, fields(seed = request.design.seed, layout = %request.design.layout, background = %request.design.background))]
	pub fn render(&self, surface: &mut Pixmap, request: &CardRenderRequest, policy: SizePolicy) -> Result<RenderReport> {
		let (width, height) = self.size_for(request, policy);
		if surface.width() != width || surface.height() != height {
			*surface = Pixmap::new(width, height).ok_or_else(|| eyre!("Failed to allocate a {width}x{height} surface"))?;
		} else {
			surface.fill(Color::TRANSPARENT);
		}
		debug!(width, height, "rendering card");

		let design = &request.design;
		let clip = crate::shapes::card_clip(width, height, request.radius).ok_or_else(|| eyre!("Failed to build card clip"))?;
		let rect = Rect::from_xywh(0.0, 0.0, width as f32, height as f32).ok_or_else(|| eyre!("Degenerate card rectangle"))?;

		background::paint(surface, &clip, rect, design, &self.background);

		let doodles = if design.pack.decorated() { decoration::scatter(surface, &clip, design.seed, design.palette.accent) } else { 0 };

		let metrics = Metrics::new(request);
		let frame = layout::apply(surface, &clip, design, metrics.padding);
		let colors = contrast::resolve_for(surface, design.palette.accent);
		let block = TextBlock::layout(self.typesetter, request, &metrics, frame.max_width);

		let safe_top = metrics.padding * SAFE_MARGIN;
		let safe_bottom = height as f32 - metrics.padding * SAFE_MARGIN;
		let text_top = layout::clamp_block_top(frame.center_y, block.height, safe_top, safe_bottom);
		self.draw_text(surface, &block, &metrics, &frame, &colors, text_top);

		Ok(RenderReport {
			width,
			height,
			lines: block.lines.len(),
			doodles,
			colors,
			text_top,
		})
	}

	fn draw_text(&self, surface: &mut Pixmap, block: &TextBlock, metrics: &Metrics, frame: &TextFrame, colors: &TextColors, top: f32) {
		let mut y = top;
		for line in &block.lines {
			self.typesetter.fill_text(surface, &TextRun {
				text: line,
				font: &metrics.quote_font,
				x: frame.x,
				top: y,
				line_height: metrics.quote_line_height,
				align: frame.align,
				color: colors.quote,
			});
			y += metrics.quote_line_height;
		}

		if let Some(author) = &block.author {
			self.typesetter.fill_text(surface, &TextRun {
				text: author,
				font: &metrics.author_font,
				x: frame.x,
				top: y + metrics.author_gap,
				line_height: metrics.author_line_height,
				align: frame.align,
				color: colors.author,
			});
		}
	}
}
