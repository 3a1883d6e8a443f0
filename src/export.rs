//! Getting a finished card off the surface: PNG bytes, then the clipboard or a file.

use std::{
	io::Cursor,
	path::{Path, PathBuf},
	process::Stdio,
};

use color_eyre::eyre::{Result, WrapErr as _, bail, eyre};
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_skia::Pixmap;
use tokio::io::AsyncWriteExt as _;
use tracing::{info, warn};

/// Encodes the surface as a straight-alpha RGBA PNG.
pub fn encode_png(surface: &Pixmap) -> Result<Vec<u8>> {
	let mut img = RgbaImage::new(surface.width(), surface.height());
	for (dst, src) in img.pixels_mut().zip(surface.pixels()) {
		let c = src.demultiply();
		*dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
	}
	let mut buf = Cursor::new(Vec::new());
	img.write_to(&mut buf, ImageFormat::Png).wrap_err("Failed to encode card as PNG")?;
	Ok(buf.into_inner())
}

/// External clipboard program that takes PNG bytes on stdin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clipboard {
	pub program: String,
	pub args: Vec<String>,
}

impl Default for Clipboard {
	fn default() -> Self {
		Self {
			program: "wl-copy".into(),
			args: vec!["--type".into(), "image/png".into()],
		}
	}
}

impl Clipboard {
	pub async fn copy(&self, png: &[u8]) -> Result<()> {
		let mut child = tokio::process::Command::new(&self.program)
			.args(&self.args)
			.stdin(Stdio::piped())
			.stdout(Stdio::null())
			.stderr(Stdio::piped())
			.spawn()
			.wrap_err_with(|| format!("Failed to start {}", self.program))?;
		let mut stdin = child.stdin.take().ok_or_else(|| eyre!("{} has no stdin", self.program))?;
		stdin.write_all(png).await?;
		drop(stdin);

		let output = child.wait_with_output().await?;
		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr);
			bail!("{} failed: {}", self.program, stderr.trim());
		}
		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exported {
	Copied,
	Downloaded(PathBuf),
}

/// Writes `<dir>/<name>.png`, creating `dir` if needed.
pub async fn download(png: &[u8], dir: &Path, name: &str) -> Result<PathBuf> {
	tokio::fs::create_dir_all(dir).await.wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
	let path = dir.join(format!("{name}.png"));
	tokio::fs::write(&path, png).await.wrap_err_with(|| format!("Failed to write {}", path.display()))?;
	Ok(path)
}

/// Tries the clipboard first and falls back to a download when it is unavailable.
pub async fn copy_or_download(clipboard: &Clipboard, png: &[u8], dir: &Path, name: &str) -> Result<Exported> {
	match clipboard.copy(png).await {
		Ok(()) => {
			info!("copied card to clipboard");
			Ok(Exported::Copied)
		}
		Err(e) => {
			warn!("clipboard unavailable, downloading instead: {e:#}");
			let path = download(png, dir, name).await?;
			info!(path = %path.display(), "saved card");
			Ok(Exported::Downloaded(path))
		}
	}
}
