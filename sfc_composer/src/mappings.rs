use serde::Deserialize;
use serde::Serialize;
use sourcemap::SourceMap;
use sourcemap::SourceMapBuilder;

use crate::SfcResult;

/// Options for source map generation.
///
/// ```toml
/// [sourcemap]
/// hires = true
/// include_content = true
/// file = "component.vue.map"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapOptions {
	/// Name of the generated file recorded in the map.
	#[serde(default)]
	pub file: Option<String>,
	/// Name of the original source recorded in the map. Documents fall back to
	/// their configured filename.
	#[serde(default)]
	pub source: Option<String>,
	/// Embed the original text as `sourcesContent`.
	#[serde(default = "default_include_content")]
	pub include_content: bool,
	/// Map every character instead of only the first character of each line.
	#[serde(default)]
	pub hires: bool,
}

impl Default for SourceMapOptions {
	fn default() -> Self {
		Self {
			file: None,
			source: None,
			include_content: default_include_content(),
			hires: false,
		}
	}
}

fn default_include_content() -> bool {
	true
}

/// Generated code together with the source map pointing back at the
/// original text.
#[derive(Debug, Clone)]
pub struct TransformResult {
	pub code: String,
	pub map: SourceMap,
}

impl TransformResult {
	/// Serialize the map as a JSON string.
	pub fn map_json(&self) -> SfcResult<String> {
		source_map_to_json(&self.map)
	}
}

pub(crate) fn source_map_to_json(map: &SourceMap) -> SfcResult<String> {
	let mut buf = Vec::new();
	map.to_writer(&mut buf)?;
	Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Tracks the generated position while chunks are emitted and records the
/// segments of the map.
pub(crate) struct Mappings {
	builder: SourceMapBuilder,
	source_id: u32,
	hires: bool,
	line: u32,
	column: u32,
}

impl Mappings {
	pub(crate) fn new(options: &SourceMapOptions, source: Option<&str>, original: &str) -> Self {
		let mut builder = SourceMapBuilder::new(options.file.as_deref());
		let source_id = builder.add_source(source.unwrap_or_default());
		if options.include_content {
			builder.set_source_contents(source_id, Some(original));
		}

		Self {
			builder,
			source_id,
			hires: options.hires,
			line: 0,
			column: 0,
		}
	}

	/// Move the generated position over text that has no original
	/// counterpart.
	pub(crate) fn advance(&mut self, text: &str) {
		for ch in text.chars() {
			if ch == '\n' {
				self.line += 1;
				self.column = 0;
			} else {
				self.column += ch.len_utf16() as u32;
			}
		}
	}

	/// Map replacement content to the original location of the chunk it
	/// replaced. Every generated line of the replacement gets one segment,
	/// except an empty trailing line.
	pub(crate) fn add_edit(&mut self, content: &str, location: (usize, usize), name: Option<&str>) {
		let name_id = name.map(|name| self.builder.add_name(name));
		let mut segments = content.split('\n').peekable();
		let mut first = true;

		while let Some(segment) = segments.next() {
			let is_last = segments.peek().is_none();
			if !first {
				self.line += 1;
				self.column = 0;
			}

			if first || !is_last || !segment.is_empty() {
				self.add_segment(location.0 as u32, location.1 as u32, name_id);
			}

			self.advance(segment);
			first = false;
		}
	}

	/// Map text copied verbatim from the original.
	pub(crate) fn add_unedited(&mut self, text: &str, location: (usize, usize)) {
		let (mut line, mut column) = (location.0 as u32, location.1 as u32);
		let mut first = true;

		for ch in text.chars() {
			if ch == '\n' {
				line += 1;
				column = 0;
				self.line += 1;
				self.column = 0;
				first = true;
				continue;
			}

			if self.hires || first {
				self.add_segment(line, column, None);
			}

			let width = ch.len_utf16() as u32;
			column += width;
			self.column += width;
			first = false;
		}
	}

	pub(crate) fn into_source_map(self) -> SourceMap {
		self.builder.into_sourcemap()
	}

	fn add_segment(&mut self, src_line: u32, src_col: u32, name_id: Option<u32>) {
		self.builder.add_raw(
			self.line,
			self.column,
			src_line,
			src_col,
			Some(self.source_id),
			name_id,
			false,
		);
	}
}
