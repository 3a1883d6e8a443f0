mod common;

use std::{path::PathBuf, sync::Arc};

use common::BlockTypesetter;
use quote_cards::{
	CardRenderRequest, Compositor, Format, SizePolicy, StyleCatalog, StylePack,
	background::BackgroundOptions,
	catalog::BackgroundKind,
	design,
	feed::{self, CardRecord, Feed, JsonlFeed},
};
use tiny_skia::Pixmap;

fn scratch_feed(tag: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("quote_cards-feed-{tag}-{}", std::process::id()));
	std::fs::remove_dir_all(&dir).ok();
	dir.join("feed.jsonl")
}

fn request(quote: &str, seed: i64) -> CardRenderRequest {
	let design = design::select(&StyleCatalog::builtin(), seed, StylePack::Bold);
	let (w, h) = Format::Portrait.min_size();
	CardRenderRequest::new(quote.to_owned(), "Jane".to_owned(), w, h, design)
}

#[tokio::test]
async fn published_cards_read_back_newest_first() {
	let path = scratch_feed("order");
	let jsonl = Arc::new(JsonlFeed::new(&path));

	for (i, quote) in ["one", "two", "three"].into_iter().enumerate() {
		let record = CardRecord::new(&request(quote, i as i64), Format::Portrait, 1_000 + i as u64);
		let id = feed::publish(jsonl.clone(), record).await.unwrap();
		assert_eq!(id, i as u64 + 1);
	}

	let page = jsonl.read_page(None, 2).unwrap();
	assert_eq!(page.iter().map(|(_, r)| r.quote.as_str()).collect::<Vec<_>>(), vec!["three", "two"]);
	let rest = jsonl.read_page(Some(page[1].0), 10).unwrap();
	assert_eq!(rest.len(), 1);
	assert_eq!(rest[0].1.quote, "one");

	std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn malformed_lines_are_skipped() {
	let path = scratch_feed("malformed");
	let jsonl = JsonlFeed::new(&path);
	jsonl.append(&CardRecord::new(&request("kept", 1), Format::Portrait, 5)).unwrap();
	std::fs::write(&path, format!("{}not json\n", std::fs::read_to_string(&path).unwrap())).unwrap();
	jsonl.append(&CardRecord::new(&request("also kept", 2), Format::Portrait, 6)).unwrap();

	let page = jsonl.read_page(None, 10).unwrap();
	assert_eq!(page.len(), 2);
	assert_eq!(page[0], (2, page[0].1.clone()));
	assert_eq!(page[0].1.quote, "also kept");

	std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn missing_feed_reads_empty() {
	let jsonl = JsonlFeed::new(scratch_feed("missing"));
	assert!(jsonl.read_page(None, 10).unwrap().is_empty());
}

#[test]
fn stored_record_rerenders_the_same_card() {
	let path = scratch_feed("rerender");
	let jsonl = JsonlFeed::new(&path);
	let original = request("Wall cards match what was published", 12);
	jsonl.append(&CardRecord::new(&original, Format::Portrait, 7)).unwrap();
	let (_, stored) = jsonl.read_page(None, 1).unwrap().remove(0);

	let typesetter = BlockTypesetter::default();
	let compositor = Compositor::new(&typesetter, BackgroundOptions::default());
	let mut published = Pixmap::new(1, 1).unwrap();
	let mut from_feed = Pixmap::new(1, 1).unwrap();
	compositor.render(&mut published, &original, SizePolicy::AutoGrow).unwrap();
	compositor.render(&mut from_feed, &stored.to_request(), SizePolicy::AutoGrow).unwrap();
	assert_eq!(published.data(), from_feed.data());

	std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn stored_grain_reproduces_a_noise_card() {
	let path = scratch_feed("grain");
	let jsonl = JsonlFeed::new(&path);
	let mut original = request("Grain travels with the card", 21);
	original.width = 240;
	original.height = 240;
	original.design.background = BackgroundKind::Noise;
	let options = BackgroundOptions { grain: 0.25 };
	jsonl.append(&CardRecord::new(&original, Format::Portrait, 8).with_background(&options)).unwrap();
	let (_, stored) = jsonl.read_page(None, 1).unwrap().remove(0);
	assert_eq!(stored.background_options(), options);

	let typesetter = BlockTypesetter::default();
	let mut published = Pixmap::new(1, 1).unwrap();
	let mut from_feed = Pixmap::new(1, 1).unwrap();
	let mut local_default = Pixmap::new(1, 1).unwrap();
	Compositor::new(&typesetter, options).render(&mut published, &original, SizePolicy::Fixed).unwrap();
	Compositor::new(&typesetter, stored.background_options())
		.render(&mut from_feed, &stored.to_request(), SizePolicy::Fixed)
		.unwrap();
	Compositor::new(&typesetter, BackgroundOptions::default())
		.render(&mut local_default, &stored.to_request(), SizePolicy::Fixed)
		.unwrap();
	assert_eq!(published.data(), from_feed.data());
	assert_ne!(published.data(), local_default.data(), "grain must change a noise card");

	std::fs::remove_dir_all(path.parent().unwrap()).ok();
}
