use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SfcError;
use crate::SfcResult;
use crate::SourceMapOptions;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["sfc.toml", ".sfc.toml", ".config/sfc.toml"];

/// Configuration for a [`MagicSfc`](crate::MagicSfc) document.
///
/// ```toml
/// filename = "src/App.vue"
/// silent = false
///
/// [sourcemap]
/// hires = true
/// include_content = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SfcConfig {
	/// Name of the file the document was read from. Used as the source name
	/// in generated source maps.
	#[serde(default)]
	pub filename: Option<String>,
	/// When true, parsing a document without a parser adapter does nothing
	/// instead of failing.
	#[serde(default)]
	pub silent: bool,
	/// Defaults for source map generation.
	#[serde(default)]
	pub sourcemap: SourceMapOptions,
}

impl SfcConfig {
	/// Find the first config file that exists under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> SfcResult<Option<SfcConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml_str(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded sfc config");

		Ok(Some(config))
	}

	/// Parse a config from TOML text.
	pub fn from_toml_str(content: &str) -> SfcResult<SfcConfig> {
		toml::from_str(content).map_err(|e| SfcError::ConfigParse(e.to_string()))
	}

	#[must_use]
	pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
		self.filename = Some(filename.into());
		self
	}

	#[must_use]
	pub fn with_silent(mut self, silent: bool) -> Self {
		self.silent = silent;
		self
	}
}
