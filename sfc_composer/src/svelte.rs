//! Svelte components.
//!
//! Svelte's preprocessor reports the markup and each `<script>` and `<style>`
//! as raw text without positions. [`SvelteParser`] wraps a function driving
//! such a preprocessor and locates every reported chunk in the document.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::BlockDescriptor;
use crate::BlockRole;
use crate::MagicSfc;
use crate::ParsedSfc;
use crate::SfcConfig;
use crate::SfcParser;
use crate::SfcResult;
use crate::create::SfcBlocks;
use crate::create::join_sections;
use crate::create::render_section;
use crate::create::render_tag;
use crate::find_all_locations;

/// The preprocessor hook a chunk was reported through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvelteHook {
	Markup,
	Script,
	Style,
}

impl SvelteHook {
	pub fn role(self) -> BlockRole {
		match self {
			Self::Markup => BlockRole::Template,
			Self::Script => BlockRole::Script,
			Self::Style => BlockRole::Style,
		}
	}
}

/// A piece of a component reported by the preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvelteChunk {
	pub hook: SvelteHook,
	pub content: String,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub attributes: Map<String, Value>,
	/// The full markup the chunk was found in. Script and style chunks are
	/// located inside it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub markup: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filename: Option<String>,
}

impl SvelteChunk {
	pub fn new(hook: SvelteHook, content: impl Into<String>) -> Self {
		Self {
			hook,
			content: content.into(),
			attributes: Map::new(),
			markup: None,
			filename: None,
		}
	}

	#[must_use]
	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
		self.markup = Some(markup.into());
		self
	}
}

/// Parser adapter for Svelte components.
///
/// The wrapped function receives the document text and a sink for every
/// chunk the preprocessor reports. Each chunk becomes a block over the first
/// occurrence of its content: markup in the document, scripts and styles in
/// their reported markup.
#[derive(Debug, Clone)]
pub struct SvelteParser<F> {
	preprocess: F,
}

impl<F> SvelteParser<F>
where
	F: Fn(&str, &mut dyn FnMut(SvelteChunk)) -> SfcResult<()>,
{
	pub fn new(preprocess: F) -> Self {
		Self { preprocess }
	}
}

impl<F> SfcParser for SvelteParser<F>
where
	F: Fn(&str, &mut dyn FnMut(SvelteChunk)) -> SfcResult<()>,
{
	fn parse(&self, source: &str) -> SfcResult<Option<ParsedSfc>> {
		let mut chunks = Vec::new();
		(self.preprocess)(source, &mut |chunk| chunks.push(chunk))?;

		let mut parsed = ParsedSfc::new();
		for chunk in chunks {
			let haystack = match chunk.hook {
				SvelteHook::Markup => source,
				SvelteHook::Script | SvelteHook::Style => chunk.markup.as_deref().unwrap_or(source),
			};

			let Some(loc) = find_all_locations(haystack, &chunk.content).into_iter().next() else {
				tracing::warn!(hook = ?chunk.hook, "skipping svelte chunk not found in its markup");
				continue;
			};

			let mut descriptor = BlockDescriptor::new(chunk.content.clone()).with_loc(loc);
			if chunk.hook != SvelteHook::Markup {
				descriptor.attrs.clone_from(&chunk.attributes);
			}
			descriptor
				.extra
				.insert("parsed".to_string(), serde_json::to_value(&chunk)?);

			parsed.push(chunk.hook.role(), descriptor, None);
		}

		Ok(Some(parsed))
	}
}

/// Serialize a single block. Templates are the raw markup, other blocks are
/// wrapped in their tag. Returns an empty string without a block.
pub fn create_block(block: Option<&BlockDescriptor>, role: BlockRole) -> String {
	let Some(block) = block else {
		return String::new();
	};

	match role {
		BlockRole::Template => block.content.clone(),
		_ => render_tag(role.tag_name(), &[], &block.content),
	}
}

/// Serialize blocks into a Svelte component: templates, scripts, then
/// styles.
pub fn create_sfc(blocks: &SfcBlocks) -> MagicSfc {
	let text = join_sections(
		[BlockRole::Template, BlockRole::Script, BlockRole::Style]
			.map(|role| render_section(blocks, role, create_block)),
	);

	MagicSfc::new(text, SfcConfig::default())
}
