use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use color_eyre::{
	Result,
	eyre::{WrapErr as _, eyre},
};
use quote_cards::{
	CardRenderRequest, Compositor, Format, SizePolicy, StyleCatalog, StylePack,
	config::AppConfig,
	design,
	export::{self, Clipboard, Exported},
	feed::{self, CardRecord, Feed as _, JsonlFeed},
	generator::{Command, Generator},
	text::SvgTypesetter,
};
use rand::seq::IndexedRandom as _;
use tiny_skia::Pixmap;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;
use v_utils::{io::ExpandedPath, utils::eyre::exit_on_error};

#[derive(Debug, Parser)]
#[command(name = "quote_cards")]
#[command(about = "Render seeded quote cards and share them to a feed")]
struct Args {
	/// Config file. If not provided, the XDG config locations are searched.
	#[arg(long, global = true)]
	config: Option<ExpandedPath>,
	#[command(subcommand)]
	command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
	/// Render a single card.
	Render {
		#[command(flatten)]
		card: CardArgs,
		/// Write the PNG here.
		#[arg(long)]
		out: Option<PathBuf>,
		/// Copy the PNG to the clipboard, saving it to the output dir if that fails.
		#[arg(long)]
		copy: bool,
		/// Append the card to the shared feed.
		#[arg(long)]
		publish: bool,
	},
	/// Render a batch of cards with distinct designs for the same quote.
	Batch {
		#[command(flatten)]
		card: CardArgs,
		#[arg(long, default_value_t = 6)]
		count: usize,
		/// Directory for the PNGs; defaults to the configured output dir.
		#[arg(long)]
		dir: Option<PathBuf>,
	},
	/// List published cards, newest first.
	Feed {
		#[arg(long, default_value_t = 10)]
		page_size: usize,
		/// Only show cards older than this id.
		#[arg(long)]
		before: Option<u64>,
		/// Re-render the listed cards into this directory.
		#[arg(long)]
		render: Option<PathBuf>,
	},
}

#[derive(Debug, clap::Args)]
struct CardArgs {
	/// Quote text. If not provided, a random quote from the config is used.
	quote: Option<String>,
	#[arg(long)]
	author: Option<String>,
	/// Design seed. If not provided, a random one is drawn.
	#[arg(long)]
	seed: Option<i64>,
	/// Style pack: classic, minimal, bold, soft or moody.
	#[arg(long)]
	pack: Option<String>,
	/// Format: square, portrait, story or landscape.
	#[arg(long)]
	format: Option<String>,
}

struct Resolved {
	quote: String,
	author: String,
	seed: i64,
	pack: StylePack,
	format: Format,
}

impl CardArgs {
	fn resolve(&self, config: &AppConfig) -> Result<Resolved> {
		let (quote, author) = match &self.quote {
			Some(text) => (text.clone(), self.author.clone().unwrap_or_default()),
			None => {
				let quote = config.quotes.choose(&mut rand::rng()).ok_or_else(|| eyre!("No quote given and no quotes configured"))?;
				(quote.text.clone(), self.author.clone().or_else(|| quote.author.clone()).unwrap_or_default())
			}
		};
		Ok(Resolved {
			quote,
			author,
			seed: self.seed.unwrap_or_else(|| rand::random::<u32>() as i64),
			pack: self.pack.as_deref().map(StylePack::from_tag).unwrap_or(config.defaults.pack),
			format: self.format.as_deref().map(Format::from_tag).unwrap_or(config.defaults.format),
		})
	}
}

fn main() {
	exit_on_error(run());
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run() -> Result<()> {
	color_eyre::install()?;
	init_tracing();
	let args = Args::parse();

	// Load config and the style catalog once; everything below borrows them
	let config = AppConfig::read(args.config)?;
	let catalog = config.catalog()?;
	let runtime = Runtime::new().wrap_err("Failed to start async runtime")?;

	match args.command {
		Cmd::Render { card, out, copy, publish } => render_one(&config, &catalog, &runtime, &card, out, copy, publish),
		Cmd::Batch { card, count, dir } => render_batch(&config, &catalog, &runtime, &card, count, dir),
		Cmd::Feed { page_size, before, render } => list_feed(&config, page_size, before, render),
	}
}

fn render_one(config: &AppConfig, catalog: &StyleCatalog, runtime: &Runtime, card: &CardArgs, out: Option<PathBuf>, copy: bool, publish: bool) -> Result<()> {
	let resolved = card.resolve(config)?;
	println!("Selected quote: {:?}", resolved.quote);
	println!("Author: {:?}", resolved.author);

	let design = design::select(catalog, resolved.seed, resolved.pack);
	let (width, height) = resolved.format.min_size();
	let style = config.defaults.card_style();
	let mut request = CardRenderRequest::new(resolved.quote, resolved.author, width, height, design);
	request.radius = style.radius;
	request.quote_scale = style.quote_scale;
	request.author_scale = style.author_scale;

	let typesetter = SvgTypesetter::new(&config.font_paths());
	let compositor = Compositor::new(&typesetter, config.defaults.background());
	let mut surface = Pixmap::new(width, height).ok_or_else(|| eyre!("Failed to create pixmap"))?;
	let report = compositor.render(&mut surface, &request, SizePolicy::AutoGrow)?;
	println!(
		"Rendered {}x{} card: seed={} pack={} background={} layout={} ({} lines)",
		report.width, report.height, request.design.seed, request.design.pack, request.design.background, request.design.layout, report.lines
	);

	let png = export::encode_png(&surface)?;
	let name = format!("card-{}", request.design.seed);
	if let Some(out) = &out {
		std::fs::write(out, &png).wrap_err_with(|| format!("Failed to write {}", out.display()))?;
		println!("Saved to {}", out.display());
	}
	if copy {
		match runtime.block_on(export::copy_or_download(&Clipboard::default(), &png, &config.output_dir()?, &name)) {
			Ok(Exported::Copied) => println!("Copied to clipboard"),
			Ok(Exported::Downloaded(path)) => println!("Clipboard unavailable, saved to {}", path.display()),
			Err(e) => eprintln!("Export failed: {e:#}"),
		}
	} else if out.is_none() {
		let path = runtime.block_on(export::download(&png, &config.output_dir()?, &name))?;
		println!("Saved to {}", path.display());
	}

	if publish {
		let feed: Arc<dyn feed::Feed> = Arc::new(JsonlFeed::new(config.feed_path()?));
		let record = CardRecord::new(&request, resolved.format, feed::now_millis()).with_background(&config.defaults.background());
		// the rendered card is already exported; a failed publish is reported, not retried
		match runtime.block_on(feed::publish(feed, record)) {
			Ok(id) => println!("Published as #{id}"),
			Err(e) => eprintln!("Publish failed: {e:#}"),
		}
	}

	Ok(())
}

fn render_batch(config: &AppConfig, catalog: &StyleCatalog, runtime: &Runtime, card: &CardArgs, count: usize, dir: Option<PathBuf>) -> Result<()> {
	let resolved = card.resolve(config)?;
	let dir = match dir {
		Some(dir) => dir,
		None => config.output_dir()?,
	};

	let typesetter = SvgTypesetter::new(&config.font_paths());
	let compositor = Compositor::new(&typesetter, config.defaults.background());
	let mut generator = Generator::new(catalog, compositor, config.defaults.card_style(), resolved.quote, resolved.author);
	generator.apply(Command::Generate {
		count,
		seed: resolved.seed,
		pack: resolved.pack,
		format: resolved.format,
	})?;

	for (i, card) in generator.cards().iter().enumerate() {
		let png = export::encode_png(&card.surface)?;
		let path = runtime.block_on(export::download(&png, &dir, &format!("card-{:02}", i + 1)))?;
		let d = &card.request.design;
		println!("{}  {}x{}  {} / {}", path.display(), card.report.width, card.report.height, d.background, d.layout);
	}
	info!(count = generator.cards().len(), dir = %dir.display(), "batch written");
	Ok(())
}

fn list_feed(config: &AppConfig, page_size: usize, before: Option<u64>, render: Option<PathBuf>) -> Result<()> {
	let feed = JsonlFeed::new(config.feed_path()?);
	let page = feed.read_page(before, page_size)?;
	if page.is_empty() {
		println!("No cards in {}", feed.path().display());
		return Ok(());
	}

	for (id, record) in &page {
		let author = if record.author.trim().is_empty() { String::new() } else { format!(" — {}", record.author.trim()) };
		println!("#{id:<4} {:<9} {:<9} {:<12} {:?}{author}", record.format, record.background, record.layout, record.quote);
	}

	if let Some(dir) = render {
		std::fs::create_dir_all(&dir)?;
		let typesetter = SvgTypesetter::new(&config.font_paths());
		let mut surface = Pixmap::new(1, 1).ok_or_else(|| eyre!("Failed to create pixmap"))?;
		for (id, record) in &page {
			// published grain, not the local default
			let compositor = Compositor::new(&typesetter, record.background_options());
			compositor.render(&mut surface, &record.to_request(), SizePolicy::AutoGrow)?;
			let path = dir.join(format!("feed-{id}.png"));
			std::fs::write(&path, export::encode_png(&surface)?)?;
			println!("Rendered #{id} to {}", path.display());
		}
	}
	Ok(())
}
