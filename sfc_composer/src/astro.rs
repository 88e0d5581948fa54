//! Astro components.
//!
//! The Astro compiler is not bundled. [`AstroParser`] wraps any function that
//! turns source text into an [`AstroNode`] tree, for example a binding to
//! `@astrojs/compiler` whose JSON AST deserializes straight into it.

use std::ops::Range;

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
use crate::create::render_attributes;
use crate::create::render_section;
use crate::create::render_tag;

const FRONTMATTER_FENCE: &str = "---";
const SCRIPT_CLOSE: &str = "</script>";
const STYLE_CLOSE: &str = "</style>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AstroNodeKind {
	Root,
	Frontmatter,
	Element,
	Component,
	Text,
	#[serde(other)]
	Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroPoint {
	pub offset: usize,
	#[serde(default)]
	pub line: usize,
	#[serde(default)]
	pub column: usize,
}

impl AstroPoint {
	pub const fn at(offset: usize) -> Self {
		Self {
			offset,
			line: 0,
			column: 0,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroPosition {
	pub start: AstroPoint,
	/// Missing for nodes the compiler could not close.
	#[serde(default)]
	pub end: Option<AstroPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroAttribute {
	pub name: String,
	#[serde(default)]
	pub value: String,
	/// `empty` marks an attribute without a value.
	#[serde(default)]
	pub kind: String,
}

/// A node of the Astro syntax tree. Only the parts needed to locate blocks
/// are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroNode {
	#[serde(rename = "type")]
	pub kind: AstroNodeKind,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub position: Option<AstroPosition>,
	#[serde(default)]
	pub attributes: Vec<AstroAttribute>,
	#[serde(default)]
	pub children: Vec<AstroNode>,
}

impl AstroNode {
	pub fn new(kind: AstroNodeKind, name: impl Into<String>) -> Self {
		Self {
			kind,
			name: name.into(),
			position: None,
			attributes: Vec::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_span(mut self, range: Range<usize>) -> Self {
		self.position = Some(AstroPosition {
			start: AstroPoint::at(range.start),
			end: Some(AstroPoint::at(range.end)),
		});
		self
	}

	#[must_use]
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push(AstroAttribute {
			name: name.into(),
			value: value.into(),
			kind: "quoted".to_string(),
		});
		self
	}

	#[must_use]
	pub fn with_child(mut self, child: AstroNode) -> Self {
		self.children.push(child);
		self
	}

	/// The byte range of the node, when the compiler reported both ends.
	pub fn span(&self) -> Option<Range<usize>> {
		let position = self.position.as_ref()?;
		let end = position.end.as_ref()?;
		Some(position.start.offset..end.offset)
	}

	fn attrs(&self) -> Map<String, Value> {
		self.attributes
			.iter()
			.map(|attribute| {
				let value = if attribute.kind == "empty" {
					Value::Bool(true)
				} else {
					Value::String(attribute.value.clone())
				};
				(attribute.name.clone(), value)
			})
			.collect()
	}
}

/// Parser adapter for Astro components.
///
/// The tree is walked depth first. Frontmatter becomes a script scoped
/// inside its `---` fences, `<script>` and `<style>` elements are scoped
/// inside their tags and any other element or component becomes a
/// template. The children of a node that became a block are not visited.
#[derive(Debug, Clone)]
pub struct AstroParser<F> {
	parse: F,
}

impl<F> AstroParser<F>
where
	F: Fn(&str) -> SfcResult<Option<AstroNode>>,
{
	pub fn new(parse: F) -> Self {
		Self { parse }
	}
}

impl<F> SfcParser for AstroParser<F>
where
	F: Fn(&str) -> SfcResult<Option<AstroNode>>,
{
	fn parse(&self, source: &str) -> SfcResult<Option<ParsedSfc>> {
		let Some(root) = (self.parse)(source)? else {
			return Ok(None);
		};

		let mut parsed = ParsedSfc::new();
		collect_blocks(&root, source, &mut parsed);

		Ok(Some(parsed))
	}
}

fn collect_blocks(node: &AstroNode, source: &str, parsed: &mut ParsedSfc) {
	if let Some(span) = node.span() {
		if let Some((role, range)) = block_range(node, span, source) {
			let mut descriptor = BlockDescriptor::new(source.get(range.clone()).unwrap_or_default());
			descriptor.attrs = node.attrs();
			if node.kind == AstroNodeKind::Frontmatter {
				descriptor.attrs.insert("frontmatter".to_string(), Value::Bool(true));
			}
			if !node.name.is_empty() {
				descriptor
					.extra
					.insert("name".to_string(), Value::String(node.name.clone()));
			}

			parsed.push(role, descriptor, Some(range));
			return;
		}
	}

	for child in &node.children {
		collect_blocks(child, source, parsed);
	}
}

/// The role and content range of `node`, or `None` when it is not a block.
fn block_range(node: &AstroNode, span: Range<usize>, source: &str) -> Option<(BlockRole, Range<usize>)> {
	let (role, range) = match (node.kind, node.name.as_str()) {
		(AstroNodeKind::Frontmatter, _) => {
			(
				BlockRole::Script,
				inner_range(&span, FRONTMATTER_FENCE.len(), FRONTMATTER_FENCE.len()),
			)
		}
		(AstroNodeKind::Element, "script") => {
			(
				BlockRole::Script,
				opening_tag_len(source, &span, "<script")
					.and_then(|open| inner_range(&span, open, SCRIPT_CLOSE.len())),
			)
		}
		(AstroNodeKind::Element, "style") => {
			(
				BlockRole::Style,
				opening_tag_len(source, &span, "<style")
					.and_then(|open| inner_range(&span, open, STYLE_CLOSE.len())),
			)
		}
		(AstroNodeKind::Element | AstroNodeKind::Component, _) => {
			return Some((BlockRole::Template, span));
		}
		_ => return None,
	};

	let Some(range) = range else {
		tracing::warn!(%role, start = span.start, end = span.end, "skipping malformed astro node");
		return None;
	};

	Some((role, range))
}

fn inner_range(span: &Range<usize>, open: usize, close: usize) -> Option<Range<usize>> {
	let start = span.start.checked_add(open)?;
	let end = span.end.checked_sub(close)?;
	(start <= end).then_some(start..end)
}

/// Length from the start of the node to the end of its opening tag.
fn opening_tag_len(source: &str, span: &Range<usize>, tag: &str) -> Option<usize> {
	let target = source.get(span.clone())?;
	let tag_start = target.find(tag)?;
	let tag_end = target[tag_start..].find('>')?;
	Some(tag_start + tag_end + 1)
}

/// Serialize a single block. Templates are raw markup, frontmatter scripts
/// are fenced with `---` and everything else is wrapped in its tag with its
/// attributes. Returns an empty string without a block.
pub fn create_block(block: Option<&BlockDescriptor>, role: BlockRole) -> String {
	let Some(block) = block else {
		return String::new();
	};

	match role {
		BlockRole::Template => block.content.clone(),
		BlockRole::Script if block.has_attr("frontmatter") => {
			format!("{FRONTMATTER_FENCE}\n{}\n{FRONTMATTER_FENCE}", block.content)
		}
		_ => {
			let attrs = render_attributes(&block.attrs, &["setup", "scoped"]);
			render_tag(role.tag_name(), &[&attrs], &block.content)
		}
	}
}

/// Serialize blocks into an Astro component: scripts, templates, then
/// styles.
pub fn create_sfc(blocks: &SfcBlocks) -> MagicSfc {
	let text = join_sections(
		[BlockRole::Script, BlockRole::Template, BlockRole::Style]
			.map(|role| render_section(blocks, role, create_block)),
	);

	MagicSfc::new(text, SfcConfig::default())
}
