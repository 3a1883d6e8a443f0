//! The shared card feed: append-only records, read back newest first.

use std::{
	fs::{self, OpenOptions},
	io::Write as _,
	path::{Path, PathBuf},
	sync::{Arc, Mutex},
	time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::eyre::{Result, WrapErr as _, eyre};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
	background::BackgroundOptions,
	card::CardRenderRequest,
	catalog::{BackgroundKind, FontFace, FontPack, Format, GradientPair, LayoutKind, Palette, Rgb, StylePack},
	design::Design,
};

pub type FeedId = u64;

/// A published card: its text, geometry and the design flattened into plain fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
	pub quote: String,
	pub author: String,
	pub width: u32,
	pub height: u32,
	pub background_color: Rgb,
	pub text_color: Rgb,
	pub accent_color: Rgb,
	#[serde(default)]
	pub palette_index: usize,
	pub gradient_from: Rgb,
	pub gradient_to: Rgb,
	pub quote_font: FontFace,
	pub author_font: FontFace,
	pub background: BackgroundKind,
	pub layout: LayoutKind,
	#[serde(default)]
	pub pack: StylePack,
	pub seed: i64,
	#[serde(default)]
	pub format: Format,
	pub radius: f32,
	pub quote_scale: f32,
	pub author_scale: f32,
	/// Noise strength the card was rendered with.
	#[serde(default = "default_grain")]
	pub grain: f32,
	/// Unix milliseconds.
	pub created_at: u64,
}

impl CardRecord {
	pub fn new(request: &CardRenderRequest, format: Format, created_at: u64) -> Self {
		let d = &request.design;
		Self {
			quote: request.quote.clone(),
			author: request.author.clone(),
			width: request.width,
			height: request.height,
			background_color: d.palette.background,
			text_color: d.palette.text,
			accent_color: d.palette.accent,
			palette_index: d.palette_index,
			gradient_from: d.gradient.from,
			gradient_to: d.gradient.to,
			quote_font: d.fonts.quote.clone(),
			author_font: d.fonts.author.clone(),
			background: d.background,
			layout: d.layout,
			pack: d.pack,
			seed: d.seed,
			format,
			radius: request.radius,
			quote_scale: request.quote_scale,
			author_scale: request.author_scale,
			grain: default_grain(),
			created_at,
		}
	}

	pub fn with_background(mut self, options: &BackgroundOptions) -> Self {
		self.grain = options.grain;
		self
	}

	/// Background options that reproduce the published pixels.
	pub fn background_options(&self) -> BackgroundOptions {
		BackgroundOptions { grain: self.grain }
	}

	/// Rebuilds the render request this record was published from.
	pub fn to_request(&self) -> CardRenderRequest {
		let design = Design {
			palette: Palette {
				background: self.background_color,
				text: self.text_color,
				accent: self.accent_color,
			},
			palette_index: self.palette_index,
			gradient: GradientPair {
				from: self.gradient_from,
				to: self.gradient_to,
			},
			fonts: FontPack {
				quote: self.quote_font.clone(),
				author: self.author_font.clone(),
			},
			background: self.background,
			layout: self.layout,
			pack: self.pack,
			seed: self.seed,
		};
		CardRenderRequest {
			quote: self.quote.clone(),
			author: self.author.clone(),
			width: self.width,
			height: self.height,
			design,
			radius: self.radius,
			quote_scale: self.quote_scale,
			author_scale: self.author_scale,
		}
	}
}

fn default_grain() -> f32 {
	BackgroundOptions::default().grain
}

pub fn now_millis() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or_default()
}

pub trait Feed: Send + Sync {
	/// Stores `record` and returns the id the store assigned to it.
	fn append(&self, record: &CardRecord) -> Result<FeedId>;
	/// Up to `page_size` records, newest first, strictly older than `before` when given.
	fn read_page(&self, before: Option<FeedId>, page_size: usize) -> Result<Vec<(FeedId, CardRecord)>>;
}

fn page(mut entries: Vec<(FeedId, CardRecord)>, before: Option<FeedId>, page_size: usize) -> Vec<(FeedId, CardRecord)> {
	entries.retain(|(id, _)| before.is_none_or(|b| *id < b));
	entries.sort_by(|a, b| b.0.cmp(&a.0));
	entries.truncate(page_size);
	entries
}

#[derive(Default)]
pub struct MemoryFeed {
	records: Mutex<Vec<CardRecord>>,
}

impl Feed for MemoryFeed {
	fn append(&self, record: &CardRecord) -> Result<FeedId> {
		let mut records = self.records.lock().map_err(|_| eyre!("feed lock poisoned"))?;
		records.push(record.clone());
		Ok(records.len() as FeedId)
	}

	fn read_page(&self, before: Option<FeedId>, page_size: usize) -> Result<Vec<(FeedId, CardRecord)>> {
		let records = self.records.lock().map_err(|_| eyre!("feed lock poisoned"))?;
		let entries = records.iter().cloned().enumerate().map(|(i, r)| (i as FeedId + 1, r)).collect();
		Ok(page(entries, before, page_size))
	}
}

#[derive(Serialize, Deserialize)]
struct Entry {
	id: FeedId,
	record: CardRecord,
}

/// One JSON entry per line; ids count up from 1 in file order.
pub struct JsonlFeed {
	path: PathBuf,
	write_lock: Mutex<()>,
}

impl JsonlFeed {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn entries(&self) -> Result<Vec<(FeedId, CardRecord)>> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e).wrap_err_with(|| format!("Failed to read feed at {}", self.path.display())),
		};
		let mut entries = Vec::new();
		for (n, line) in content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
			match serde_json::from_str::<Entry>(line) {
				Ok(entry) => entries.push((entry.id, entry.record)),
				Err(e) => warn!(line = n + 1, "skipping malformed feed entry: {e}"),
			}
		}
		Ok(entries)
	}
}

impl Feed for JsonlFeed {
	fn append(&self, record: &CardRecord) -> Result<FeedId> {
		let _guard = self.write_lock.lock().map_err(|_| eyre!("feed lock poisoned"))?;
		let id = self.entries()?.iter().map(|(id, _)| *id).max().unwrap_or(0) + 1;

		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let mut line = serde_json::to_string(&Entry { id, record: record.clone() })?;
		line.push('\n');
		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)
			.wrap_err_with(|| format!("Failed to open feed at {}", self.path.display()))?;
		file.write_all(line.as_bytes())?;
		Ok(id)
	}

	fn read_page(&self, before: Option<FeedId>, page_size: usize) -> Result<Vec<(FeedId, CardRecord)>> {
		Ok(page(self.entries()?, before, page_size))
	}
}

/// Appends `record` off the async executor. Runs once; a failure is returned to the caller and not
/// retried.
pub async fn publish(feed: Arc<dyn Feed>, record: CardRecord) -> Result<FeedId> {
	let id = tokio::task::spawn_blocking(move || feed.append(&record)).await.wrap_err("Publish task was aborted")??;
	info!(id, "published card");
	Ok(id)
}
