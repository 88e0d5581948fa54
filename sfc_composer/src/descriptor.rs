use std::fmt;
use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::SfcError;
use crate::SfcResult;
use crate::SourceLocation;

/// The role a block plays inside a single-file component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockRole {
	Template,
	Script,
	Style,
	Custom,
}

impl BlockRole {
	pub const ALL: [BlockRole; 4] = [Self::Template, Self::Script, Self::Style, Self::Custom];

	/// The tag name used when serializing a block of this role.
	pub fn tag_name(self) -> &'static str {
		match self {
			Self::Template => "template",
			Self::Script => "script",
			Self::Style => "style",
			Self::Custom => "custom",
		}
	}
}

impl fmt::Display for BlockRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.tag_name())
	}
}

/// Where a block sits in its parent document. Parsers report either a full
/// [`SourceLocation`] or a bare pair of byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockLoc {
	Location(SourceLocation),
	Offsets { start: usize, end: usize },
}

impl BlockLoc {
	/// The byte range described by this location.
	pub fn offsets(&self) -> Range<usize> {
		match self {
			Self::Location(location) => location.range(),
			Self::Offsets { start, end } => *start..*end,
		}
	}
}

impl From<SourceLocation> for BlockLoc {
	fn from(location: SourceLocation) -> Self {
		Self::Location(location)
	}
}

impl From<Range<usize>> for BlockLoc {
	fn from(range: Range<usize>) -> Self {
		Self::Offsets {
			start: range.start,
			end: range.end,
		}
	}
}

/// Metadata describing a block, usually produced by a framework parser.
///
/// Only the fields shared by every supported dialect are typed. Anything
/// else the parser reports is kept in `extra` and stays reachable through
/// [`BlockDescriptor::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
	/// Custom block name, e.g. `i18n` for `<i18n>`.
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Attributes in source order. `true` marks a valueless attribute.
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub attrs: Map<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lang: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scoped: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	#[serde(default)]
	pub content: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub loc: Option<BlockLoc>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl BlockDescriptor {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());
		self
	}

	#[must_use]
	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = Some(lang.into());
		self
	}

	#[must_use]
	pub fn with_scoped(mut self, scoped: bool) -> Self {
		self.scoped = Some(scoped);
		self
	}

	#[must_use]
	pub fn with_src(mut self, src: impl Into<String>) -> Self {
		self.src = Some(src.into());
		self
	}

	#[must_use]
	pub fn with_loc(mut self, loc: impl Into<BlockLoc>) -> Self {
		self.loc = Some(loc.into());
		self
	}

	/// Whether the attribute `key` is present and truthy.
	pub fn has_attr(&self, key: &str) -> bool {
		self.attrs.get(key).is_some_and(is_truthy)
	}

	/// Read a field by name as JSON. Unset optional fields read as `None`.
	pub fn get(&self, key: &str) -> Option<Value> {
		match key {
			"type" => self.kind.clone().map(Value::String),
			"attrs" => Some(Value::Object(self.attrs.clone())),
			"lang" => self.lang.clone().map(Value::String),
			"scoped" => self.scoped.map(Value::Bool),
			"src" => self.src.clone().map(Value::String),
			"content" => Some(Value::String(self.content.clone())),
			"loc" => self
				.loc
				.as_ref()
				.and_then(|loc| serde_json::to_value(loc).ok()),
			_ => self.extra.get(key).cloned(),
		}
	}

	/// Write a field by name. Typed fields must receive a value of the right
	/// shape, `null` clears optional fields, unknown keys land in `extra`.
	pub fn set(&mut self, key: &str, value: Value) -> SfcResult<()> {
		match key {
			"type" => self.kind = typed(key, value)?,
			"attrs" => self.attrs = typed(key, value)?,
			"lang" => self.lang = typed(key, value)?,
			"scoped" => self.scoped = typed(key, value)?,
			"src" => self.src = typed(key, value)?,
			"content" => self.content = typed(key, value)?,
			"loc" => self.loc = typed(key, value)?,
			_ => {
				self.extra.insert(key.to_string(), value);
			}
		}

		Ok(())
	}
}

fn typed<T: DeserializeOwned>(key: &str, value: Value) -> SfcResult<T> {
	serde_json::from_value(value).map_err(|e| {
		SfcError::InvalidProperty {
			key: key.to_string(),
			reason: e.to_string(),
		}
	})
}

/// JavaScript-style truthiness for attribute values.
pub(crate) fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
		Value::String(text) => !text.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}
