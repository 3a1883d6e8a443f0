use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr as _, eyre};
use serde::{Deserialize, Deserializer};
use v_utils::io::ExpandedPath;

use crate::{
	background::BackgroundOptions,
	catalog::{Format, StyleCatalog, StylePack},
	generator::CardStyle,
};

const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
	/// Picked from at random when no quote is given on the command line.
	#[serde(default)]
	pub quotes: Vec<Quote>,
	/// Replacement style catalog; the builtin one is used otherwise.
	pub catalog: Option<ExpandedPath>,
	/// JSONL feed file published cards are appended to.
	pub feed: Option<ExpandedPath>,
	/// Where exported cards land when they are not copied to the clipboard.
	pub output_dir: Option<ExpandedPath>,
	/// Extra font files on top of the system fonts.
	#[serde(default)]
	pub fonts: Vec<ExpandedPath>,
	#[serde(default)]
	pub defaults: Defaults,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Defaults {
	pub pack: StylePack,
	pub format: Format,
	pub radius: f32,
	pub quote_scale: f32,
	pub author_scale: f32,
	pub grain: f32,
}

impl Default for Defaults {
	fn default() -> Self {
		let style = CardStyle::default();
		Self {
			pack: StylePack::default(),
			format: Format::default(),
			radius: style.radius,
			quote_scale: style.quote_scale,
			author_scale: style.author_scale,
			grain: BackgroundOptions::default().grain,
		}
	}
}

impl Defaults {
	pub fn card_style(&self) -> CardStyle {
		CardStyle {
			radius: self.radius,
			quote_scale: self.quote_scale,
			author_scale: self.author_scale,
		}
	}

	pub fn background(&self) -> BackgroundOptions {
		BackgroundOptions { grain: self.grain }
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote {
	pub text: String,
	pub author: Option<String>,
}

impl<'de> Deserialize<'de> for Quote {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>, {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum QuoteHelper {
			String(String),
			Structured { text: String, author: Option<String> },
		}

		let helper = QuoteHelper::deserialize(deserializer)?;
		Ok(match helper {
			QuoteHelper::String(text) => Quote { text, author: None },
			QuoteHelper::Structured { text, author } => Quote { text, author },
		})
	}
}

impl AppConfig {
	pub fn read(path: Option<ExpandedPath>) -> Result<Self> {
		let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME);
		let builder = config::Config::builder().add_source(config::Environment::with_prefix("QUOTE_CARDS").separator("__"));

		match path {
			Some(path) => {
				let path_str = path.to_string();
				let builder = builder.add_source(config::File::with_name(&path_str).required(true));
				builder.build()?.try_deserialize().wrap_err_with(|| format!("Config at {path_str} is invalid"))
			}
			None => {
				let Some(xdg_conf_dir) = xdg_dirs.get_config_home().and_then(|p| p.parent().map(|p| p.display().to_string())) else {
					// no home to look in; run on defaults plus environment
					return Ok(builder.build()?.try_deserialize()?);
				};
				let locations = [
					format!("{xdg_conf_dir}/{APP_NAME}"),
					format!("{xdg_conf_dir}/{APP_NAME}/config"), //
				];

				let mut builder = builder;
				for location in locations.iter() {
					builder = builder.add_source(config::File::with_name(location).required(false));
				}
				let raw: config::Config = builder.build()?;

				raw.try_deserialize().wrap_err("Config file is invalid")
			}
		}
	}

	/// The configured catalog, or the builtin one.
	pub fn catalog(&self) -> Result<StyleCatalog> {
		match &self.catalog {
			Some(path) => StyleCatalog::load(&path.0),
			None => Ok(StyleCatalog::builtin()),
		}
	}

	pub fn feed_path(&self) -> Result<PathBuf> {
		match &self.feed {
			Some(path) => Ok(path.0.clone()),
			None => Ok(state_dir()?.join("feed.jsonl")),
		}
	}

	pub fn output_dir(&self) -> Result<PathBuf> {
		match &self.output_dir {
			Some(path) => Ok(path.0.clone()),
			None => state_dir(),
		}
	}

	pub fn font_paths(&self) -> Vec<PathBuf> {
		self.fonts.iter().map(|p| p.0.clone()).collect()
	}
}

fn state_dir() -> Result<PathBuf> {
	xdg::BaseDirectories::with_prefix(APP_NAME).get_state_home().ok_or_else(|| eyre!("Could not determine the XDG state directory"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quotes_accept_both_shapes() {
		let quotes: Vec<Quote> = serde_json::from_str(r#"["plain", {"text": "full", "author": "Someone"}, {"text": "anon"}]"#).unwrap();
		assert_eq!(quotes[0], Quote { text: "plain".into(), author: None });
		assert_eq!(quotes[1].author.as_deref(), Some("Someone"));
		assert_eq!(quotes[2].author, None);
	}

	#[test]
	fn explicit_file_is_read() {
		let path = std::env::temp_dir().join(format!("quote_cards-config-{}.toml", std::process::id()));
		std::fs::write(
			&path,
			r#"
quotes = ["Stay curious"]
feed = "/tmp/feed.jsonl"

[defaults]
pack = "moody"
format = "story"
grain = 0.1
"#,
		)
		.unwrap();
		let config = AppConfig::read(Some(path.to_str().unwrap().parse().unwrap())).unwrap();
		std::fs::remove_file(&path).ok();

		assert_eq!(config.quotes, vec![Quote { text: "Stay curious".into(), author: None }]);
		assert_eq!(config.feed_path().unwrap(), PathBuf::from("/tmp/feed.jsonl"));
		assert_eq!(config.defaults.pack, StylePack::Moody);
		assert_eq!(config.defaults.format, Format::Story);
		assert_eq!(config.defaults.background().grain, 0.1);
		assert_eq!(config.defaults.radius, CardStyle::default().radius);
	}

	#[test]
	fn missing_explicit_file_errors() {
		assert!(AppConfig::read(Some("/nonexistent/quote_cards/config.toml".parse().unwrap())).is_err());
	}

	#[test]
	fn tilde_paths_expand_to_home() {
		let home = PathBuf::from(std::env::var("HOME").unwrap());
		let path = std::env::temp_dir().join(format!("quote_cards-tilde-{}.toml", std::process::id()));
		std::fs::write(
			&path,
			r#"
feed = "~/cards/feed.jsonl"
output_dir = "~/cards"
fonts = ["~/.local/share/fonts/Inter.ttf"]
"#,
		)
		.unwrap();
		let config = AppConfig::read(Some(path.to_str().unwrap().parse().unwrap())).unwrap();
		std::fs::remove_file(&path).ok();

		assert_eq!(config.feed_path().unwrap(), home.join("cards/feed.jsonl"));
		assert_eq!(config.output_dir().unwrap(), home.join("cards"));
		assert_eq!(config.font_paths(), vec![home.join(".local/share/fonts/Inter.ttf")]);
	}
}
