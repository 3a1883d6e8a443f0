//! Style tables: palettes, gradients, font pairs and the background/layout kinds each style pack draws from.
//!
//! The builtin catalog is plain data; a replacement can be loaded from a config file (same shape,
//! colors as `#rrggbb`). Tags that a newer catalog or feed record may carry but this build does not
//! know deserialize to the documented defaults instead of failing.

use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use color_eyre::eyre::{Result, WrapErr as _, bail, eyre};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const BLACK: Self = Self::new(0, 0, 0);
	pub const WHITE: Self = Self::new(255, 255, 255);

	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub const fn hex(v: u32) -> Self {
		Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
	}

	/// Linear blend, `t = 0` is `self`, `t = 1` is `other`.
	pub fn mix(self, other: Self, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
		Self::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
	}

	pub fn with_alpha(self, alpha: f32) -> tiny_skia::Color {
		tiny_skia::Color::from_rgba8(self.r, self.g, self.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
	}

	pub fn opaque(self) -> tiny_skia::Color {
		self.with_alpha(1.0)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

impl FromStr for Rgb {
	type Err = color_eyre::Report;

	fn from_str(s: &str) -> Result<Self> {
		let digits = s.trim().trim_start_matches('#');
		if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			bail!("expected a #rrggbb color, got {s:?}");
		}
		let v = u32::from_str_radix(digits, 16).wrap_err_with(|| format!("invalid hex color {s:?}"))?;
		Ok(Self::hex(v))
	}
}

impl Serialize for Rgb {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Rgb {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>, {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
	pub background: Rgb,
	pub text: Rgb,
	pub accent: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradientPair {
	pub from: Rgb,
	pub to: Rgb,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFace {
	/// CSS-style family list, e.g. `"Playfair Display, Georgia, serif"`.
	pub family: String,
	#[serde(default = "FontFace::default_weight")]
	pub weight: u16,
	#[serde(default)]
	pub italic: bool,
}

impl FontFace {
	fn default_weight() -> u16 {
		400
	}

	pub fn new(family: &str, weight: u16, italic: bool) -> Self {
		Self {
			family: family.to_owned(),
			weight,
			italic,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontPack {
	pub quote: FontFace,
	pub author: FontFace,
}

/// Generates a closed tag enum whose serialized form is its kebab-case tag and whose unknown tags
/// fall back to the first listed variant.
macro_rules! tag_enum {
	($(#[$meta:meta])* $name:ident { $default:ident => $default_tag:literal, $($variant:ident => $tag:literal),* $(,)? }) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub enum $name {
			#[default]
			$default,
			$($variant),*
		}

		impl $name {
			pub const ALL: &'static [Self] = &[Self::$default, $(Self::$variant),*];

			pub const fn tag(self) -> &'static str {
				match self {
					Self::$default => $default_tag,
					$(Self::$variant => $tag),*
				}
			}

			/// Case-insensitive lookup; unknown tags give the default variant.
			pub fn from_tag(tag: &str) -> Self {
				let lower = tag.trim().to_ascii_lowercase();
				Self::ALL.iter().copied().find(|v| v.tag() == lower).unwrap_or_default()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.pad(self.tag())
			}
		}

		impl Serialize for $name {
			fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
				serializer.serialize_str(self.tag())
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
			where
				D: Deserializer<'de>, {
				let s = String::deserialize(deserializer)?;
				Ok(Self::from_tag(&s))
			}
		}
	};
}

tag_enum! {
	/// Procedural background pattern.
	BackgroundKind {
		Solid => "solid",
		Gradient => "gradient",
		Glass => "glass",
		Dark => "dark",
		Paper => "paper",
		Noise => "noise",
		Stripes => "stripes",
		Halftone => "halftone",
		Blobs => "blobs",
	}
}

tag_enum! {
	/// Where the text block sits and which accent shapes frame it.
	LayoutKind {
		Centered => "centered",
		Left => "left",
		IconTop => "icon-top",
		Split => "split",
		Bordered => "bordered",
		Underline => "underline",
		Footer => "footer",
		CornerFrame => "corner-frame",
		Diagonal => "diagonal",
	}
}

tag_enum! {
	/// Named aesthetic bias over background and layout kinds.
	StylePack {
		Classic => "classic",
		Minimal => "minimal",
		Bold => "bold",
		Soft => "soft",
		Moody => "moody",
	}
}

impl StylePack {
	/// Minimal cards skip the doodle scatter.
	pub const fn decorated(self) -> bool {
		!matches!(self, Self::Minimal)
	}
}

tag_enum! {
	/// Output size class; the dimensions are minimums since long quotes grow the height.
	Format {
		Square => "square",
		Portrait => "portrait",
		Story => "story",
		Landscape => "landscape",
	}
}

impl Format {
	pub const fn min_size(self) -> (u32, u32) {
		match self {
			Self::Square => (1080, 1080),
			Self::Portrait => (1080, 1350),
			Self::Story => (1080, 1920),
			Self::Landscape => (1200, 630),
		}
	}
}

/// Background and layout kinds one pack draws from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackKinds {
	pub backgrounds: Vec<BackgroundKind>,
	pub layouts: Vec<LayoutKind>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCatalog {
	pub palettes: Vec<Palette>,
	pub gradients: Vec<GradientPair>,
	pub fonts: Vec<FontPack>,
	pub packs: BTreeMap<StylePack, PackKinds>,
}

impl StyleCatalog {
	/// Kinds for `pack`; packs missing from a loaded catalog draw from the default pack, and failing
	/// that from every known kind.
	pub fn kinds(&self, pack: StylePack) -> PackKindsRef<'_> {
		let entry = self.packs.get(&pack).or_else(|| self.packs.get(&StylePack::default()));
		let backgrounds = entry.map(|e| e.backgrounds.as_slice()).filter(|b| !b.is_empty()).unwrap_or(BackgroundKind::ALL);
		let layouts = entry.map(|e| e.layouts.as_slice()).filter(|l| !l.is_empty()).unwrap_or(LayoutKind::ALL);
		PackKindsRef { backgrounds, layouts }
	}

	/// Reads a catalog from any format the `config` crate understands (toml, json, yaml, ...).
	pub fn load(path: &Path) -> Result<Self> {
		let path_str = path.to_string_lossy();
		let raw = config::Config::builder()
			.add_source(config::File::with_name(&path_str).required(true))
			.build()
			.wrap_err_with(|| format!("Failed to read style catalog at {path_str}"))?;
		let catalog: Self = raw.try_deserialize().wrap_err("Style catalog is malformed")?;
		catalog.validate()?;
		Ok(catalog)
	}

	pub fn validate(&self) -> Result<()> {
		if self.palettes.is_empty() {
			return Err(eyre!("style catalog has no palettes"));
		}
		if self.gradients.is_empty() {
			return Err(eyre!("style catalog has no gradients"));
		}
		if self.fonts.is_empty() {
			return Err(eyre!("style catalog has no font packs"));
		}
		Ok(())
	}

	pub fn builtin() -> Self {
		use BackgroundKind as B;
		use LayoutKind as L;

		let palettes = [
			(0xfdf6ec, 0x2b2118, 0xd9734e),
			(0xf4f1ea, 0x1f2933, 0x3e7c6b),
			(0x1b1f3b, 0xf5f3ff, 0xf2c14e),
			(0x0f172a, 0xe2e8f0, 0x38bdf8),
			(0xfde2e4, 0x4a1d2b, 0xe56b8a),
			(0xe8f3ee, 0x1c3a2e, 0x52b788),
			(0x2d1e2f, 0xfbeee0, 0xf28482),
			(0xfff8d6, 0x3b2f05, 0xe0a800),
			(0xdfe7fd, 0x1d2a4d, 0x5b6cf0),
			(0x262626, 0xfafafa, 0xa3e635),
			(0xf6e7d8, 0x3d2b1f, 0x9c6644),
			(0x3a0ca3, 0xf8f7ff, 0xf72585),
		]
		.into_iter()
		.map(|(background, text, accent)| Palette {
			background: Rgb::hex(background),
			text: Rgb::hex(text),
			accent: Rgb::hex(accent),
		})
		.collect();

		let gradients = [
			(0xff9a8b, 0xff6a88),
			(0xa1c4fd, 0xc2e9fb),
			(0x667eea, 0x764ba2),
			(0xf6d365, 0xfda085),
			(0x84fab0, 0x8fd3f4),
			(0x0f2027, 0x2c5364),
			(0xfbc2eb, 0xa6c1ee),
			(0x232526, 0x414345),
		]
		.into_iter()
		.map(|(from, to)| GradientPair { from: Rgb::hex(from), to: Rgb::hex(to) })
		.collect();

		let fonts = [
			(FontFace::new("Playfair Display, Georgia, serif", 600, true), FontFace::new("Inter, Helvetica, sans-serif", 500, false)),
			(FontFace::new("Inter, Helvetica, sans-serif", 700, false), FontFace::new("Inter, Helvetica, sans-serif", 400, false)),
			(FontFace::new("Lora, Georgia, serif", 400, false), FontFace::new("Lora, Georgia, serif", 400, true)),
			(FontFace::new("DejaVu Sans Mono, monospace", 400, false), FontFace::new("DejaVu Sans Mono, monospace", 400, false)),
			(FontFace::new("Caveat, Comic Sans MS, cursive", 600, false), FontFace::new("Inter, Helvetica, sans-serif", 500, false)),
			(FontFace::new("Merriweather, Georgia, serif", 700, false), FontFace::new("Merriweather Sans, Verdana, sans-serif", 400, false)),
			(FontFace::new("Montserrat, Arial, sans-serif", 800, false), FontFace::new("Montserrat, Arial, sans-serif", 500, false)),
			(FontFace::new("DejaVu Serif, serif", 400, true), FontFace::new("DejaVu Sans, sans-serif", 400, false)),
		]
		.into_iter()
		.map(|(quote, author)| FontPack { quote, author })
		.collect();

		let packs = BTreeMap::from([
			(StylePack::Classic, PackKinds {
				backgrounds: B::ALL.to_vec(),
				layouts: L::ALL.to_vec(),
			}),
			(StylePack::Minimal, PackKinds {
				backgrounds: vec![B::Solid, B::Paper],
				layouts: vec![L::Centered, L::Left, L::Underline, L::Footer, L::Bordered],
			}),
			(StylePack::Bold, PackKinds {
				backgrounds: vec![B::Gradient, B::Stripes, B::Halftone, B::Blobs, B::Dark],
				layouts: vec![L::Split, L::Footer, L::Diagonal, L::IconTop, L::Centered],
			}),
			(StylePack::Soft, PackKinds {
				backgrounds: vec![B::Glass, B::Gradient, B::Blobs, B::Paper, B::Noise],
				layouts: vec![L::Centered, L::IconTop, L::CornerFrame, L::Bordered],
			}),
			(StylePack::Moody, PackKinds {
				backgrounds: vec![B::Dark, B::Noise, B::Gradient, B::Halftone],
				layouts: vec![L::Left, L::CornerFrame, L::Underline, L::Diagonal, L::Centered],
			}),
		]);

		Self { palettes, gradients, fonts, packs }
	}
}

impl Default for StyleCatalog {
	fn default() -> Self {
		Self::builtin()
	}
}

#[derive(Clone, Copy, Debug)]
pub struct PackKindsRef<'a> {
	pub backgrounds: &'a [BackgroundKind],
	pub layouts: &'a [LayoutKind],
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_colors_parse_and_print() {
		let c: Rgb = "#D9734e".parse().unwrap();
		assert_eq!(c, Rgb::new(0xd9, 0x73, 0x4e));
		assert_eq!(c.to_string(), "#d9734e");
		assert!("#12345".parse::<Rgb>().is_err());
		assert!("zzzzzz".parse::<Rgb>().is_err());
		assert!("#+fffff".parse::<Rgb>().is_err());
		assert!("-12345".parse::<Rgb>().is_err());
		assert!(serde_json::from_str::<Rgb>("\"#+00000\"").is_err());
	}

	#[test]
	fn mix_endpoints() {
		let a = Rgb::new(10, 20, 30);
		let b = Rgb::new(210, 120, 30);
		assert_eq!(a.mix(b, 0.0), a);
		assert_eq!(a.mix(b, 1.0), b);
		assert_eq!(a.mix(b, 0.5), Rgb::new(110, 70, 30));
	}

	#[test]
	fn unknown_tags_fall_back() {
		assert_eq!(BackgroundKind::from_tag("aurora"), BackgroundKind::Solid);
		assert_eq!(LayoutKind::from_tag("spiral"), LayoutKind::Centered);
		assert_eq!(StylePack::from_tag("neon"), StylePack::Classic);
		assert_eq!(LayoutKind::from_tag("Corner-Frame"), LayoutKind::CornerFrame);
	}

	#[test]
	fn tags_roundtrip_through_json() {
		for kind in BackgroundKind::ALL {
			let json = serde_json::to_string(kind).unwrap();
			assert_eq!(&serde_json::from_str::<BackgroundKind>(&json).unwrap(), kind);
		}
		assert_eq!(serde_json::from_str::<LayoutKind>("\"hexagon\"").unwrap(), LayoutKind::Centered);
	}

	#[test]
	fn formats_have_sizes() {
		assert_eq!(Format::default().min_size(), (1080, 1080));
		assert_eq!(Format::from_tag("STORY").min_size(), (1080, 1920));
		let (w, h) = Format::Landscape.min_size();
		assert!(w > h);
	}

	#[test]
	fn minimal_pack_is_restrained() {
		let catalog = StyleCatalog::builtin();
		let kinds = catalog.kinds(StylePack::Minimal);
		assert_eq!(kinds.backgrounds, &[BackgroundKind::Solid, BackgroundKind::Paper]);
		assert!(!kinds.layouts.contains(&LayoutKind::Split));
		assert!(!StylePack::Minimal.decorated());
		assert!(StylePack::Bold.decorated());
	}

	#[test]
	fn missing_pack_uses_default_then_everything() {
		let mut catalog = StyleCatalog::builtin();
		catalog.packs.remove(&StylePack::Moody);
		assert_eq!(catalog.kinds(StylePack::Moody).layouts, LayoutKind::ALL);
		catalog.packs.clear();
		assert_eq!(catalog.kinds(StylePack::Bold).backgrounds, BackgroundKind::ALL);
	}

	#[test]
	fn builtin_catalog_survives_json() {
		let catalog = StyleCatalog::builtin();
		let json = serde_json::to_string(&catalog).unwrap();
		let back: StyleCatalog = serde_json::from_str(&json).unwrap();
		assert_eq!(back, catalog);
		back.validate().unwrap();
	}
}
