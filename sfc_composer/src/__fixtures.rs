use std::ops::Range;

use serde_json::Map;
use serde_json::Value;

use crate::BlockDescriptor;
use crate::MagicSfc;
use crate::MagicString;
use crate::SfcConfig;
use crate::SfcResult;
use crate::SharedSource;
use crate::astro::AstroAttribute;
use crate::astro::AstroNode;
use crate::astro::AstroNodeKind;
use crate::astro::AstroParser;
use crate::location_from_offsets;
use crate::svelte::SvelteChunk;
use crate::svelte::SvelteHook;
use crate::svelte::SvelteParser;
use crate::vue::VueDescriptor;
use crate::vue::VueParser;

pub const HELLO: &str = "Hello, World!";

pub const SCRIPT: &str = "<script>let baseScript: string</script>";
pub const SCRIPT_SETUP: &str = "<script setup>let scriptSetup: string</script>";
pub const TEMPLATE: &str = "<template><div>Hello World!</div></template>";
pub const STYLE: &str = "<style>div { color: blue; }</style>";
pub const STYLE_SCOPED: &str = "<style scoped>.scoped { color: blue; }</style>";
pub const STYLE_LANG_TS: &str = "<style lang=\"ts\">css({ '.lang-ts': { color: 'red' } })</style>";

pub fn complete_component() -> String {
	[
		SCRIPT,
		SCRIPT_SETUP,
		TEMPLATE,
		STYLE,
		STYLE_SCOPED,
		STYLE_LANG_TS,
	]
	.join("\n")
}

pub const SVELTE_SCRIPT: &str = "<script>let name = `world`;</script>";
pub const SVELTE_TEMPLATE: &str = "\n<h1>Hello {name}!</h1>\n";
pub const SVELTE_STYLE: &str = "<style>h1 { color: red; }</style>";

pub fn complete_svelte_component() -> String {
	[SVELTE_SCRIPT, SVELTE_TEMPLATE, SVELTE_STYLE].join("\n")
}

pub const ASTRO_FRONTMATTER: &str = "---\nconst name = \"Astro\";\n---";
pub const ASTRO_SCRIPT: &str = "<script>let name = `world`;</script>";
pub const ASTRO_TEMPLATE: &str = "<div>\n  <h1>Hello {name}!</h1>\n</div>";
pub const ASTRO_STYLE: &str = "<style>\nh1 { color: red; }\ndiv { background-color: red; }\n</style>";

pub fn complete_astro_component() -> String {
	[ASTRO_FRONTMATTER, ASTRO_SCRIPT, ASTRO_TEMPLATE, ASTRO_STYLE].join("\n")
}

pub const SCRIPT_BODY: &str = "\nexport default {\n  name: \"MyComponent\",\n};\n";

/// The shared buffer used by most block tests.
pub fn hello_source() -> SharedSource {
	SharedSource::new(MagicString::new(HELLO))
}

/// A top level `<tag>` found by [`scan_tags`].
#[derive(Debug, Clone)]
pub struct ScannedTag {
	pub name: String,
	pub attrs: Map<String, Value>,
	pub span: Range<usize>,
	pub content: Range<usize>,
}

/// Find the top level tags of a component. Good enough for the fixtures:
/// attribute values must not contain whitespace and a tag must not contain a
/// nested tag of the same name.
pub fn scan_tags(source: &str) -> Vec<ScannedTag> {
	let mut tags = Vec::new();
	let mut cursor = 0;

	while let Some(relative) = source[cursor..].find('<') {
		let start = cursor + relative;
		let Some(header_len) = source[start..].find('>') else {
			break;
		};
		let open_end = start + header_len + 1;
		let header = &source[start + 1..open_end - 1];
		let mut parts = header.split_whitespace();

		let Some(name) = parts.next().filter(|name| !name.starts_with('/')) else {
			cursor = open_end;
			continue;
		};

		let attrs = parts
			.map(|part| {
				match part.split_once('=') {
					Some((key, value)) => {
						(
							key.to_string(),
							Value::String(value.trim_matches('"').to_string()),
						)
					}
					None => (part.to_string(), Value::Bool(true)),
				}
			})
			.collect();

		let close = format!("</{name}>");
		let Some(close_start) = source[open_end..].find(&close) else {
			break;
		};
		let content = open_end..open_end + close_start;
		let end = content.end + close.len();

		tags.push(ScannedTag {
			name: name.to_string(),
			attrs,
			span: start..end,
			content,
		});
		cursor = end;
	}

	tags
}

/// Stands in for the Vue compiler: empty scripts and styles are dropped like
/// the real compiler does.
pub fn vue_parse(source: &str) -> SfcResult<Option<VueDescriptor>> {
	let mut descriptor = VueDescriptor::default();

	for tag in scan_tags(source) {
		let mut block = BlockDescriptor::new(&source[tag.content.clone()])
			.with_loc(location_from_offsets(source, tag.content.start, tag.content.end)?);
		block.lang = tag.attrs.get("lang").and_then(Value::as_str).map(ToString::to_string);
		block.src = tag.attrs.get("src").and_then(Value::as_str).map(ToString::to_string);
		block.scoped = tag.attrs.contains_key("scoped").then_some(true);
		block.attrs = tag.attrs.clone();

		let is_empty = block.content.is_empty();
		match tag.name.as_str() {
			"template" => descriptor.template = Some(block),
			"script" if is_empty => {}
			"script" if tag.attrs.contains_key("setup") => descriptor.script_setup = Some(block),
			"script" => descriptor.script = Some(block),
			"style" if is_empty => {}
			"style" => descriptor.styles.push(block),
			name => descriptor.custom_blocks.push(block.with_kind(name)),
		}
	}

	Ok(Some(descriptor))
}

pub fn vue_sfc(source: &str) -> MagicSfc {
	MagicSfc::new(source, SfcConfig::default()).with_parser(VueParser::new(vue_parse))
}

/// Stands in for the Svelte preprocessor: the markup hook sees the whole
/// document, script and style hooks see their tag content.
pub fn svelte_preprocess(source: &str, emit: &mut dyn FnMut(SvelteChunk)) -> SfcResult<()> {
	emit(SvelteChunk::new(SvelteHook::Markup, source));

	for tag in scan_tags(source) {
		let hook = match tag.name.as_str() {
			"script" => SvelteHook::Script,
			"style" => SvelteHook::Style,
			_ => continue,
		};

		let mut chunk = SvelteChunk::new(hook, &source[tag.content]).with_markup(source);
		chunk.attributes = tag.attrs;
		emit(chunk);
	}

	Ok(())
}

pub fn svelte_sfc(source: &str) -> MagicSfc {
	MagicSfc::new(source, SfcConfig::default()).with_parser(SvelteParser::new(svelte_preprocess))
}

/// Stands in for the Astro compiler: a root holding the frontmatter and one
/// node per top level tag.
pub fn astro_parse(source: &str) -> SfcResult<Option<AstroNode>> {
	let mut root = AstroNode::new(AstroNodeKind::Root, "");

	if source.starts_with("---\n") {
		if let Some(close) = source[3..].find("\n---") {
			let end = 3 + close + 4;
			root = root.with_child(AstroNode::new(AstroNodeKind::Frontmatter, "").with_span(0..end));
		}
	}

	for tag in scan_tags(source) {
		let kind = if tag.name.starts_with(|c: char| c.is_ascii_uppercase()) {
			AstroNodeKind::Component
		} else {
			AstroNodeKind::Element
		};

		let mut node = AstroNode::new(kind, tag.name.clone()).with_span(tag.span);
		node.attributes = tag
			.attrs
			.iter()
			.map(|(name, value)| {
				match value {
					Value::String(text) => {
						AstroAttribute {
							name: name.clone(),
							value: text.clone(),
							kind: "quoted".to_string(),
						}
					}
					_ => {
						AstroAttribute {
							name: name.clone(),
							value: String::new(),
							kind: "empty".to_string(),
						}
					}
				}
			})
			.collect();

		root = root.with_child(node);
	}

	Ok(Some(root))
}

pub fn astro_sfc(source: &str) -> MagicSfc {
	MagicSfc::new(source, SfcConfig::default()).with_parser(AstroParser::new(astro_parse))
}
