use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::BlockDescriptor;
use crate::BlockRole;

/// Block descriptors grouped by role, the input of the `create_sfc`
/// serializers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SfcBlocks {
	#[serde(default)]
	pub templates: Vec<BlockDescriptor>,
	#[serde(default)]
	pub scripts: Vec<BlockDescriptor>,
	#[serde(default)]
	pub styles: Vec<BlockDescriptor>,
	#[serde(default)]
	pub customs: Vec<BlockDescriptor>,
}

impl SfcBlocks {
	pub fn get(&self, role: BlockRole) -> &[BlockDescriptor] {
		match role {
			BlockRole::Template => &self.templates,
			BlockRole::Script => &self.scripts,
			BlockRole::Style => &self.styles,
			BlockRole::Custom => &self.customs,
		}
	}
}

/// Render attributes as `key` for `true` and `key="value"` otherwise,
/// skipping the keys in `skip`.
pub(crate) fn render_attributes(attrs: &Map<String, Value>, skip: &[&str]) -> String {
	attrs
		.iter()
		.filter(|(key, _)| !skip.contains(&key.as_str()))
		.map(|(key, value)| {
			match value {
				Value::Bool(true) => key.clone(),
				Value::String(text) => format!("{key}=\"{text}\""),
				other => format!("{key}=\"{other}\""),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Render every block of `role` and join them with a blank line.
pub(crate) fn render_section(
	blocks: &SfcBlocks,
	role: BlockRole,
	create_block: impl Fn(Option<&BlockDescriptor>, BlockRole) -> String,
) -> String {
	blocks
		.get(role)
		.iter()
		.map(|block| create_block(Some(block), role))
		.collect::<Vec<_>>()
		.join("\n\n")
}

/// Join the non-empty sections with a blank line.
pub(crate) fn join_sections(sections: impl IntoIterator<Item = String>) -> String {
	sections
		.into_iter()
		.filter(|section| !section.is_empty())
		.collect::<Vec<_>>()
		.join("\n\n")
}

/// `<name parts...>\ncontent\n</name>`, leaving out empty parts.
pub(crate) fn render_tag(name: &str, parts: &[&str], content: &str) -> String {
	let opening = std::iter::once(name)
		.chain(parts.iter().copied())
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join(" ");

	format!("<{opening}>\n{content}\n</{name}>")
}
