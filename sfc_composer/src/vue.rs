//! Vue single-file components.
//!
//! The Vue compiler is not bundled. [`VueParser`] wraps any function that
//! turns source text into a [`VueDescriptor`], for example a binding to
//! `@vue/compiler-sfc` whose JSON output deserializes straight into it.

use serde::Deserialize;
use serde::Serialize;

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
use crate::descriptor::is_truthy;

/// The blocks of a Vue component as reported by the Vue compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VueDescriptor {
	#[serde(default)]
	pub template: Option<BlockDescriptor>,
	#[serde(default)]
	pub script: Option<BlockDescriptor>,
	#[serde(default)]
	pub script_setup: Option<BlockDescriptor>,
	#[serde(default)]
	pub styles: Vec<BlockDescriptor>,
	#[serde(default)]
	pub custom_blocks: Vec<BlockDescriptor>,
}

impl From<VueDescriptor> for ParsedSfc {
	fn from(descriptor: VueDescriptor) -> Self {
		let mut parsed = ParsedSfc::new();

		if let Some(template) = descriptor.template {
			parsed.push(BlockRole::Template, template, None);
		}

		for script in [descriptor.script, descriptor.script_setup]
			.into_iter()
			.flatten()
		{
			parsed.push(BlockRole::Script, script, None);
		}

		for style in descriptor.styles {
			parsed.push(BlockRole::Style, style, None);
		}

		for custom in descriptor.custom_blocks {
			parsed.push(BlockRole::Custom, custom, None);
		}

		parsed
	}
}

/// Parser adapter for Vue components. Blocks are located through the `loc`
/// the compiler reports for each of them.
#[derive(Debug, Clone)]
pub struct VueParser<F> {
	parse: F,
}

impl<F> VueParser<F>
where
	F: Fn(&str) -> SfcResult<Option<VueDescriptor>>,
{
	pub fn new(parse: F) -> Self {
		Self { parse }
	}
}

impl<F> SfcParser for VueParser<F>
where
	F: Fn(&str) -> SfcResult<Option<VueDescriptor>>,
{
	fn parse(&self, source: &str) -> SfcResult<Option<ParsedSfc>> {
		Ok((self.parse)(source)?.map(ParsedSfc::from))
	}
}

/// Serialize a single block.
///
/// Custom blocks are named after `type`, then `attrs.type`, falling back to
/// `custom`. `scoped` and `setup` are rendered as bare flags and `lang` and
/// `src` come from the typed fields. Returns an empty string without a
/// block.
pub fn create_block(block: Option<&BlockDescriptor>, role: BlockRole) -> String {
	let Some(block) = block else {
		return String::new();
	};

	let name = match role {
		BlockRole::Custom => {
			block
				.kind
				.clone()
				.or_else(|| {
					block
						.attrs
						.get("type")
						.filter(|value| is_truthy(value))
						.map(|value| {
							value
								.as_str()
								.map_or_else(|| value.to_string(), ToString::to_string)
						})
				})
				.unwrap_or_else(|| role.tag_name().to_string())
		}
		_ => role.tag_name().to_string(),
	};

	let attrs = render_attributes(&block.attrs, &["setup", "scoped"]);
	let lang = block
		.lang
		.as_ref()
		.map(|lang| format!("lang=\"{lang}\""))
		.unwrap_or_default();
	let src = block
		.src
		.as_ref()
		.map(|src| format!("src=\"{src}\""))
		.unwrap_or_default();
	let scoped = if block.scoped == Some(true) || block.has_attr("scoped") {
		"scoped"
	} else {
		""
	};
	let setup = if block.has_attr("setup") { "setup" } else { "" };

	render_tag(&name, &[scoped, &attrs, &lang, &src, setup], &block.content)
}

/// Serialize blocks into a Vue component: templates, scripts, styles, then
/// custom blocks.
pub fn create_sfc(blocks: &SfcBlocks) -> MagicSfc {
	let text = join_sections(
		[
			BlockRole::Template,
			BlockRole::Script,
			BlockRole::Style,
			BlockRole::Custom,
		]
		.map(|role| render_section(blocks, role, create_block)),
	);

	MagicSfc::new(text, SfcConfig::default())
}
