//! A batch of cards that share one quote, with commands for regenerating all of them or
//! re-rendering a single card after it was resized.

use color_eyre::eyre::{Result, bail, eyre};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;
use tracing::info;

use crate::{
	card::{CardRenderRequest, Compositor, DEFAULT_RADIUS, RenderReport, SizePolicy},
	catalog::{Format, StyleCatalog, StylePack},
	design::{self, Design},
};

/// Card shape and text scaling shared by every card of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardStyle {
	pub radius: f32,
	pub quote_scale: f32,
	pub author_scale: f32,
}

impl Default for CardStyle {
	fn default() -> Self {
		Self {
			radius: DEFAULT_RADIUS,
			quote_scale: 1.0,
			author_scale: 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// Throw away every card and select `count` fresh, mutually distinct designs.
	Generate { count: usize, seed: i64, pack: StylePack, format: Format },
	/// Widen one card (never below its format's width); only that card is re-rendered.
	Resize { index: usize, width: u32 },
	/// Change the text of every card, keeping their designs.
	SetText { quote: String, author: String },
}

pub struct Card {
	pub request: CardRenderRequest,
	pub format: Format,
	pub surface: Pixmap,
	pub report: RenderReport,
}

pub struct Generator<'a> {
	catalog: &'a StyleCatalog,
	compositor: Compositor<'a>,
	style: CardStyle,
	quote: String,
	author: String,
	cards: Vec<Card>,
}

impl<'a> Generator<'a> {
	pub fn new(catalog: &'a StyleCatalog, compositor: Compositor<'a>, style: CardStyle, quote: impl Into<String>, author: impl Into<String>) -> Self {
		Self {
			catalog,
			compositor,
			style,
			quote: quote.into(),
			author: author.into(),
			cards: Vec::new(),
		}
	}

	pub fn cards(&self) -> &[Card] {
		&self.cards
	}

	/// Applies `command` and returns the indices of the cards that were re-rendered.
	pub fn apply(&mut self, command: Command) -> Result<Vec<usize>> {
		match command {
			Command::Generate { count, seed, pack, format } => {
				let designs = design::select_batch(self.catalog, seed, pack, count);
				self.cards.clear();
				for design in designs {
					let card = self.build(design, format)?;
					self.cards.push(card);
				}
				info!(count, seed, %pack, %format, "generated batch");
				Ok((0..self.cards.len()).collect())
			}
			Command::Resize { index, width } => {
				let count = self.cards.len();
				let Some(card) = self.cards.get_mut(index) else {
					bail!("No card at index {index} (have {count})");
				};
				let mut request = card.request.clone();
				request.width = width.max(card.format.min_size().0);
				card.report = self.compositor.render(&mut card.surface, &request, SizePolicy::AutoGrow)?;
				card.request = request;
				Ok(vec![index])
			}
			Command::SetText { quote, author } => {
				self.quote = quote;
				self.author = author;
				for card in &mut self.cards {
					card.request.quote = self.quote.clone();
					card.request.author = self.author.clone();
					card.report = self.compositor.render(&mut card.surface, &card.request, SizePolicy::AutoGrow)?;
				}
				Ok((0..self.cards.len()).collect())
			}
		}
	}

	fn build(&self, design: Design, format: Format) -> Result<Card> {
		let (width, height) = format.min_size();
		let mut request = CardRenderRequest::new(self.quote.clone(), self.author.clone(), width, height, design);
		request.radius = self.style.radius;
		request.quote_scale = self.style.quote_scale;
		request.author_scale = self.style.author_scale;

		let mut surface = Pixmap::new(width, height).ok_or_else(|| eyre!("Failed to allocate a {width}x{height} surface"))?;
		let report = self.compositor.render(&mut surface, &request, SizePolicy::AutoGrow)?;
		Ok(Card { request, format, surface, report })
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::{
		background::BackgroundOptions,
		text::{FontSpec, TextRun, Typesetter},
	};

	#[derive(Default)]
	struct CountingMono {
		draws: Cell<usize>,
	}

	impl Typesetter for CountingMono {
		fn measure(&self, text: &str, font: &FontSpec) -> f32 {
			text.chars().count() as f32 * font.size * 0.6
		}

		fn fill_text(&self, _surface: &mut Pixmap, _run: &TextRun<'_>) {
			self.draws.set(self.draws.get() + 1);
		}
	}

	fn generate(typesetter: &CountingMono, catalog: &StyleCatalog) -> Vec<(u32, u32)> {
		let compositor = Compositor::new(typesetter, BackgroundOptions::default());
		let mut generator = Generator::new(catalog, compositor, CardStyle::default(), "Short and sweet", "Ada");
		let rendered = generator
			.apply(Command::Generate {
				count: 3,
				seed: 9,
				pack: StylePack::Bold,
				format: Format::Landscape,
			})
			.unwrap();
		assert_eq!(rendered, vec![0, 1, 2]);
		generator.cards().iter().map(|c| (c.surface.width(), c.surface.height())).collect()
	}

	#[test]
	fn generate_renders_every_card_at_format_size() {
		let catalog = StyleCatalog::builtin();
		let typesetter = CountingMono::default();
		assert_eq!(generate(&typesetter, &catalog), vec![(1200, 630); 3]);
		// one quote line + one author line per card
		assert_eq!(typesetter.draws.get(), 6);
	}

	#[test]
	fn resize_touches_only_one_card() {
		let catalog = StyleCatalog::builtin();
		let typesetter = CountingMono::default();
		let compositor = Compositor::new(&typesetter, BackgroundOptions::default());
		let mut generator = Generator::new(&catalog, compositor, CardStyle::default(), "Short and sweet", "Ada");
		generator
			.apply(Command::Generate {
				count: 3,
				seed: 9,
				pack: StylePack::Soft,
				format: Format::Square,
			})
			.unwrap();
		let before: Vec<Vec<u8>> = generator.cards().iter().map(|c| c.surface.data().to_vec()).collect();
		let draws = typesetter.draws.get();

		assert_eq!(generator.apply(Command::Resize { index: 1, width: 1400 }).unwrap(), vec![1]);
		assert_eq!(typesetter.draws.get(), draws + 2);
		assert_eq!(generator.cards()[1].surface.width(), 1400);
		assert_eq!(generator.cards()[0].surface.data(), before[0].as_slice());
		assert_eq!(generator.cards()[2].surface.data(), before[2].as_slice());

		// shrinking below the format width snaps back to it
		generator.apply(Command::Resize { index: 1, width: 10 }).unwrap();
		assert_eq!(generator.cards()[1].surface.width(), 1080);
		assert!(generator.apply(Command::Resize { index: 7, width: 10 }).is_err());
	}

	#[test]
	fn failed_resize_keeps_the_drawn_card() {
		let catalog = StyleCatalog::builtin();
		let typesetter = CountingMono::default();
		let compositor = Compositor::new(&typesetter, BackgroundOptions::default());
		let mut generator = Generator::new(&catalog, compositor, CardStyle::default(), "Short and sweet", "Ada");
		generator
			.apply(Command::Generate {
				count: 1,
				seed: 4,
				pack: StylePack::Minimal,
				format: Format::Square,
			})
			.unwrap();
		let before = generator.cards()[0].request.clone();
		let pixels = generator.cards()[0].surface.data().to_vec();

		// too wide for a pixmap row
		assert!(generator.apply(Command::Resize { index: 0, width: 600_000_000 }).is_err());
		assert_eq!(generator.cards()[0].request, before);
		assert_eq!(generator.cards()[0].surface.data(), pixels.as_slice());
	}

	#[test]
	fn set_text_keeps_designs() {
		let catalog = StyleCatalog::builtin();
		let typesetter = CountingMono::default();
		let compositor = Compositor::new(&typesetter, BackgroundOptions::default());
		let mut generator = Generator::new(&catalog, compositor, CardStyle::default(), "first", "");
		generator
			.apply(Command::Generate {
				count: 2,
				seed: 1,
				pack: StylePack::Classic,
				format: Format::Portrait,
			})
			.unwrap();
		let designs: Vec<Design> = generator.cards().iter().map(|c| c.request.design.clone()).collect();
		generator
			.apply(Command::SetText {
				quote: "second ".repeat(200),
				author: "Bo".into(),
			})
			.unwrap();
		for (card, design) in generator.cards().iter().zip(&designs) {
			assert_eq!(&card.request.design, design);
			assert!(card.surface.height() > 1350, "long text should grow the card");
		}
	}
}
