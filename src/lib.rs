//! Seeded quote cards.
//!
//! A [`design::Design`] is picked deterministically from a seed and a style pack, then the
//! [`card::Compositor`] paints it (background pattern, doodles, layout accents, wrapped text in
//! contrast-checked colors) onto a `tiny_skia::Pixmap`. Rendering the same request twice gives the
//! same pixels.

pub mod background;
pub mod card;
pub mod catalog;
pub mod config;
pub mod contrast;
pub mod decoration;
pub mod design;
pub mod export;
pub mod feed;
pub mod generator;
pub mod layout;
pub mod prng;
pub mod shapes;
pub mod text;
pub mod wrap;

pub use card::{CardRenderRequest, Compositor, SizePolicy};
pub use catalog::{Format, StyleCatalog, StylePack};
pub use design::Design;
