//! Text colors chosen from the rendered background.
//!
//! The resolver looks at real pixels (after background, doodles and layout accents are drawn), not
//! at the palette, so gradients and accent bands under the text are accounted for.

use tiny_skia::Pixmap;

use crate::{catalog::Rgb, text::TextColor};

/// Backgrounds brighter than this get dark text.
pub const LIGHT_THRESHOLD: f64 = 0.55;
/// Minimum accent-vs-quote contrast before the author color is pulled toward the quote color.
pub const AUTHOR_MIN_CONTRAST: f64 = 2.2;
const AUTHOR_BLEND: f64 = 0.55;
const SAMPLE_STEP: usize = 16;

pub const QUOTE_ON_LIGHT: Rgb = Rgb::hex(0x141414);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextColors {
	pub quote: TextColor,
	pub author: TextColor,
}

fn srgb_to_linear(channel: u8) -> f64 {
	let c = channel as f64 / 255.0;
	if c <= 0.040_45 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

/// WCAG relative luminance, 0 for black and 1 for white.
pub fn relative_luminance(color: Rgb) -> f64 {
	0.2126 * srgb_to_linear(color.r) + 0.7152 * srgb_to_linear(color.g) + 0.0722 * srgb_to_linear(color.b)
}

/// `(lighter + 0.05) / (darker + 0.05)`, always >= 1.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
	let (la, lb) = (relative_luminance(a), relative_luminance(b));
	(la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

/// Average color of the central band (22%-78% across, 30%-70% down), reading every 16th pixel.
///
/// Fully transparent pixels are ignored; `None` if nothing opaque was sampled.
pub fn sample_band(surface: &Pixmap) -> Option<Rgb> {
	let (w, h) = (surface.width() as usize, surface.height() as usize);
	let (x0, x1) = ((w as f64 * 0.22) as usize, ((w as f64 * 0.78).ceil() as usize).min(w));
	let (y0, y1) = ((h as f64 * 0.30) as usize, ((h as f64 * 0.70).ceil() as usize).min(h));
	let pixels = surface.pixels();

	let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
	let band = (y0..y1).flat_map(|y| (x0..x1).map(move |x| y * w + x));
	for idx in band.step_by(SAMPLE_STEP) {
		let c = pixels[idx].demultiply();
		if c.alpha() == 0 {
			continue;
		}
		r += c.red() as u64;
		g += c.green() as u64;
		b += c.blue() as u64;
		n += 1;
	}
	(n > 0).then(|| Rgb::new((r / n) as u8, (g / n) as u8, (b / n) as u8))
}

/// Quote and author colors for text over `background`.
pub fn resolve(background: Rgb, accent: Rgb) -> TextColors {
	if relative_luminance(background) > LIGHT_THRESHOLD {
		let quote = QUOTE_ON_LIGHT;
		let author = if contrast_ratio(accent, quote) < AUTHOR_MIN_CONTRAST { accent.mix(quote, AUTHOR_BLEND) } else { accent };
		TextColors {
			quote: TextColor::opaque(quote),
			author: TextColor::opaque(author),
		}
	} else {
		// accents are unreliable on dark grounds; stay on translucent white
		TextColors {
			quote: TextColor::opaque(Rgb::WHITE),
			author: TextColor { rgb: Rgb::WHITE, alpha: 0.85 },
		}
	}
}

/// Samples `surface` and resolves colors; an empty sample is treated as a white card.
pub fn resolve_for(surface: &Pixmap, accent: Rgb) -> TextColors {
	resolve(sample_band(surface).unwrap_or(Rgb::WHITE), accent)
}
