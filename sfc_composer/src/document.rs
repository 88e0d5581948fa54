use std::fmt;
use std::ops::Range;

use sourcemap::SourceMap;

use crate::BlockDescriptor;
use crate::BlockRole;
use crate::MagicBlock;
use crate::MagicString;
use crate::SfcConfig;
use crate::SfcError;
use crate::SfcResult;
use crate::SharedSource;
use crate::SourceMapOptions;
use crate::TransformResult;

/// A block reported by a parser adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
	pub role: BlockRole,
	pub descriptor: BlockDescriptor,
	/// Explicit range in the parsed text. When absent the descriptor's `loc`
	/// is used.
	pub range: Option<Range<usize>>,
}

/// The normalized output of a parser adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSfc {
	pub blocks: Vec<ParsedBlock>,
}

impl ParsedSfc {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(
		&mut self,
		role: BlockRole,
		descriptor: BlockDescriptor,
		range: Option<Range<usize>>,
	) -> &mut Self {
		self.blocks.push(ParsedBlock {
			role,
			descriptor,
			range,
		});
		self
	}

	#[must_use]
	pub fn with_block(
		mut self,
		role: BlockRole,
		descriptor: BlockDescriptor,
		range: Option<Range<usize>>,
	) -> Self {
		self.push(role, descriptor, range);
		self
	}
}

/// Turns the text of a single-file component into blocks.
///
/// Returning `Ok(None)` means the parser produced nothing and the document
/// is left untouched.
pub trait SfcParser {
	fn parse(&self, source: &str) -> SfcResult<Option<ParsedSfc>>;
}

impl<F> SfcParser for F
where
	F: Fn(&str) -> SfcResult<Option<ParsedSfc>>,
{
	fn parse(&self, source: &str) -> SfcResult<Option<ParsedSfc>> {
		self(source)
	}
}

/// A single-file component whose blocks can be edited in place.
///
/// The document owns the buffer for the whole file. After [`MagicSfc::parse`]
/// every block in the role lists is a [`MagicBlock`] over that buffer, so
/// editing a block edits the document too.
///
/// ```rust
/// use sfc_composer::BlockDescriptor;
/// use sfc_composer::BlockRole;
/// use sfc_composer::MagicSfc;
/// use sfc_composer::ParsedSfc;
/// use sfc_composer::SfcConfig;
/// use sfc_composer::SfcResult;
///
/// let parser = |source: &str| -> SfcResult<Option<ParsedSfc>> {
/// 	let start = source.find('>').map_or(0, |index| index + 1);
/// 	let end = source.rfind("</").unwrap_or(source.len());
/// 	Ok(Some(ParsedSfc::new().with_block(
/// 		BlockRole::Script,
/// 		BlockDescriptor::default(),
/// 		Some(start..end),
/// 	)))
/// };
///
/// let mut sfc = MagicSfc::new("<script>let a = 1</script>", SfcConfig::default())
/// 	.with_parser(parser);
/// sfc.parse().unwrap();
/// sfc.scripts[0].append("\nlet b = 2").unwrap();
///
/// assert_eq!(sfc.to_string(), "<script>let a = 1\nlet b = 2</script>");
/// ```
pub struct MagicSfc {
	source: String,
	config: SfcConfig,
	ms: SharedSource,
	parser: Option<Box<dyn SfcParser>>,
	pub templates: Vec<MagicBlock>,
	pub scripts: Vec<MagicBlock>,
	pub styles: Vec<MagicBlock>,
	pub customs: Vec<MagicBlock>,
}

impl MagicSfc {
	pub fn new(source: impl Into<String>, config: SfcConfig) -> Self {
		let source = source.into();
		let mut ms = MagicString::new(source.clone());
		if let Some(filename) = &config.filename {
			ms = ms.with_filename(filename.clone());
		}

		Self::from_parts(source, ms, config)
	}

	/// Wrap a buffer that may already carry edits. Parsing sees its current
	/// rendered text and block ranges are mapped back to the original text,
	/// so blocks may sit between earlier insertions but not over them.
	pub fn from_magic_string(ms: MagicString, config: SfcConfig) -> Self {
		let source = ms.to_string();
		Self::from_parts(source, ms, config)
	}

	fn from_parts(source: String, ms: MagicString, config: SfcConfig) -> Self {
		Self {
			source,
			config,
			ms: SharedSource::new(ms),
			parser: None,
			templates: Vec::new(),
			scripts: Vec::new(),
			styles: Vec::new(),
			customs: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_parser(mut self, parser: impl SfcParser + 'static) -> Self {
		self.parser = Some(Box::new(parser));
		self
	}

	pub fn config(&self) -> &SfcConfig {
		&self.config
	}

	/// The text the document was created from.
	pub fn original(&self) -> &str {
		&self.source
	}

	/// The current text of the document. Fails with
	/// [`SfcError::SourceBorrowed`] while the buffer is mutably borrowed.
	pub fn text(&self) -> SfcResult<String> {
		self.ms.text()
	}

	/// The shared buffer of the whole document.
	pub fn source(&self) -> &SharedSource {
		&self.ms
	}

	/// Run the parser and proxy every block it reports.
	///
	/// Each call rebuilds the role lists from scratch. When any block fails
	/// to resolve the document is left as it was.
	pub fn parse(&mut self) -> SfcResult<&mut Self> {
		let Some(parser) = &self.parser else {
			if self.config.silent {
				tracing::debug!("no parser configured, skipping parse");
				return Ok(self);
			}

			return Err(SfcError::MissingParser);
		};

		let text = self.ms.text()?;
		let Some(parsed) = parser.parse(&text)? else {
			tracing::debug!("parser returned nothing, document unchanged");
			return Ok(self);
		};

		let mut templates = Vec::new();
		let mut scripts = Vec::new();
		let mut styles = Vec::new();
		let mut customs = Vec::new();

		for ParsedBlock {
			role,
			descriptor,
			range,
		} in parsed.blocks
		{
			let block = MagicBlock::new(&self.ms, Some(descriptor), range)?;
			match role {
				BlockRole::Template => templates.push(block),
				BlockRole::Script => scripts.push(block),
				BlockRole::Style => styles.push(block),
				BlockRole::Custom => customs.push(block),
			}
		}

		tracing::debug!(
			templates = templates.len(),
			scripts = scripts.len(),
			styles = styles.len(),
			customs = customs.len(),
			"parsed document"
		);

		self.templates = templates;
		self.scripts = scripts;
		self.styles = styles;
		self.customs = customs;

		Ok(self)
	}

	pub fn blocks(&self, role: BlockRole) -> &[MagicBlock] {
		match role {
			BlockRole::Template => &self.templates,
			BlockRole::Script => &self.scripts,
			BlockRole::Style => &self.styles,
			BlockRole::Custom => &self.customs,
		}
	}

	pub fn blocks_mut(&mut self, role: BlockRole) -> &mut Vec<MagicBlock> {
		match role {
			BlockRole::Template => &mut self.templates,
			BlockRole::Script => &mut self.scripts,
			BlockRole::Style => &mut self.styles,
			BlockRole::Custom => &mut self.customs,
		}
	}

	/// Generate a source map for the current text. Missing options fall back
	/// to the configured defaults. The source name is the configured filename,
	/// then the filename of the wrapped buffer.
	pub fn source_map(&self, options: Option<SourceMapOptions>) -> SfcResult<SourceMap> {
		let mut options = options.unwrap_or_else(|| self.config.sourcemap.clone());
		if options.source.is_none() {
			options.source.clone_from(&self.config.filename);
		}

		self.ms.with(|ms| ms.generate_map(&options))?
	}

	/// The current text together with its default source map.
	pub fn transform_result(&self) -> SfcResult<TransformResult> {
		Ok(TransformResult {
			code: self.ms.text()?,
			map: self.source_map(None)?,
		})
	}
}

/// Renders the current text, or the original text while the buffer is
/// mutably borrowed. Use [`MagicSfc::text`] to observe the borrow.
impl fmt::Display for MagicSfc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.ms.with(|ms| fmt::Display::fmt(ms, f)) {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!("source buffer is borrowed, rendering the original text");
				f.write_str(&self.source)
			}
		}
	}
}

impl fmt::Debug for MagicSfc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MagicSfc")
			.field("source", &self.source)
			.field("config", &self.config)
			.field("has_parser", &self.parser.is_some())
			.field("templates", &self.templates)
			.field("scripts", &self.scripts)
			.field("styles", &self.styles)
			.field("customs", &self.customs)
			.finish_non_exhaustive()
	}
}
