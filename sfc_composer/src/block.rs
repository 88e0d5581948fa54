use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use derive_more::Deref;
use serde_json::Value;

use crate::BlockDescriptor;
use crate::MagicString;
use crate::OverwriteOptions;
use crate::SfcError;
use crate::SfcResult;
use crate::SharedSource;
use crate::SourceHandle;
use crate::location_of_whole;

/// The buffer operations a block forwards to its parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	Append,
	Prepend,
	AppendLeft,
	AppendRight,
	PrependLeft,
	PrependRight,
	Overwrite,
	Remove,
}

impl Operation {
	pub const ALL: [Operation; 8] = [
		Self::Append,
		Self::Prepend,
		Self::AppendLeft,
		Self::AppendRight,
		Self::PrependLeft,
		Self::PrependRight,
		Self::Overwrite,
		Self::Remove,
	];

	/// The property name of this operation.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Append => "append",
			Self::Prepend => "prepend",
			Self::AppendLeft => "appendLeft",
			Self::AppendRight => "appendRight",
			Self::PrependLeft => "prependLeft",
			Self::PrependRight => "prependRight",
			Self::Overwrite => "overwrite",
			Self::Remove => "remove",
		}
	}

	/// Look up an operation by its property name.
	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|operation| operation.as_str() == key)
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single edit addressed in block-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
	Append {
		content: String,
	},
	Prepend {
		content: String,
	},
	AppendLeft {
		index: usize,
		content: String,
	},
	AppendRight {
		index: usize,
		content: String,
	},
	PrependLeft {
		index: usize,
		content: String,
	},
	PrependRight {
		index: usize,
		content: String,
	},
	Overwrite {
		start: usize,
		end: usize,
		content: String,
		options: OverwriteOptions,
	},
	Remove {
		start: usize,
		end: usize,
	},
}

impl Edit {
	pub fn operation(&self) -> Operation {
		match self {
			Self::Append { .. } => Operation::Append,
			Self::Prepend { .. } => Operation::Prepend,
			Self::AppendLeft { .. } => Operation::AppendLeft,
			Self::AppendRight { .. } => Operation::AppendRight,
			Self::PrependLeft { .. } => Operation::PrependLeft,
			Self::PrependRight { .. } => Operation::PrependRight,
			Self::Overwrite { .. } => Operation::Overwrite,
			Self::Remove { .. } => Operation::Remove,
		}
	}

	/// Apply the edit as is to a block's own snippet.
	pub fn apply_local(&self, ms: &mut MagicString) -> SfcResult<()> {
		match self {
			Self::Append { content } => {
				ms.append(content);
			}
			Self::Prepend { content } => {
				ms.prepend(content);
			}
			Self::AppendLeft { index, content } => {
				ms.append_left(*index, content)?;
			}
			Self::AppendRight { index, content } => {
				ms.append_right(*index, content)?;
			}
			Self::PrependLeft { index, content } => {
				ms.prepend_left(*index, content)?;
			}
			Self::PrependRight { index, content } => {
				ms.prepend_right(*index, content)?;
			}
			Self::Overwrite {
				start,
				end,
				content,
				options,
			} => {
				ms.overwrite(*start, *end, content, *options)?;
			}
			Self::Remove { start, end } => {
				ms.remove(*start, *end)?;
			}
		}

		Ok(())
	}

	/// Apply the edit to the parent buffer of a block spanning `range`.
	///
	/// Indices are shifted by the block start. Appending and prepending to
	/// the whole block attach to the block edges so the content stays inside
	/// the block rather than at the ends of the document.
	pub fn apply_to_parent(&self, ms: &mut MagicString, range: Range<usize>) -> SfcResult<()> {
		let offset = range.start;
		match self {
			Self::Append { content } => {
				ms.append_right(range.end, content)?;
			}
			Self::Prepend { content } => {
				ms.prepend_right(range.start, content)?;
			}
			Self::AppendLeft { index, content } => {
				ms.append_left(offset + index, content)?;
			}
			Self::AppendRight { index, content } => {
				ms.append_right(offset + index, content)?;
			}
			Self::PrependLeft { index, content } => {
				ms.prepend_left(offset + index, content)?;
			}
			Self::PrependRight { index, content } => {
				ms.prepend_right(offset + index, content)?;
			}
			Self::Overwrite {
				start,
				end,
				content,
				options,
			} => {
				ms.overwrite(offset + start, offset + end, content, *options)?;
			}
			Self::Remove { start, end } => {
				ms.remove(offset + start, offset + end)?;
			}
		}

		Ok(())
	}
}

/// Custom property traps for a [`MagicBlock`].
///
/// Operation names and the `source` key are resolved by the block itself and
/// never reach the handler.
pub trait BlockHandler {
	fn get(&self, descriptor: &BlockDescriptor, key: &str) -> Option<Value> {
		descriptor.get(key)
	}

	fn set(&mut self, descriptor: &mut BlockDescriptor, key: &str, value: Value) -> SfcResult<()> {
		descriptor.set(key, value)
	}
}

/// Reads and writes go straight to the descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughHandler;

impl BlockHandler for PassthroughHandler {}

/// The result of a dynamic property read on a block.
#[derive(Debug, Clone)]
pub enum BlockProperty {
	/// A forwarded buffer operation.
	Operation(Operation),
	/// The parent buffer.
	Source(SharedSource),
	/// A descriptor field or handler provided value.
	Value(Value),
}

type OperationOverride = Box<dyn FnMut(&Edit) -> SfcResult<()>>;

/// A block of a document that can be edited on its own.
///
/// Every edit goes to both the block's private snippet, addressed with
/// block-local indices, and the parent document, shifted by the block start.
/// Afterwards `block.to_string()` is the edited block and the document text
/// contains the same edit in place.
///
/// ```rust
/// use sfc_composer::MagicBlock;
/// use sfc_composer::MagicString;
/// use sfc_composer::SharedSource;
///
/// let source = SharedSource::new(MagicString::new("Hello, World!"));
/// let mut block = MagicBlock::new(&source, None, Some(7..12)).unwrap();
/// block.append("!").unwrap();
///
/// assert_eq!(block.to_string(), "World!");
/// assert_eq!(source.text().unwrap(), "Hello, World!!");
/// ```
#[derive(Deref)]
pub struct MagicBlock {
	#[deref]
	descriptor: BlockDescriptor,
	source: SourceHandle,
	start: usize,
	end: usize,
	snippet: MagicString,
	handler: Box<dyn BlockHandler>,
	overrides: HashMap<Operation, OperationOverride>,
}

impl MagicBlock {
	/// Proxy a region of `source`.
	///
	/// The region is `range` when given, else the descriptor's `loc`, else
	/// the whole current text of the source. Ranges address the current text
	/// and are mapped back to the original text of the buffer, so the region
	/// must not contain text that was already inserted or edited.
	pub fn new(
		source: &SharedSource,
		descriptor: Option<BlockDescriptor>,
		range: Option<Range<usize>>,
	) -> SfcResult<Self> {
		let descriptor = descriptor.unwrap_or_default();
		let text = source.text()?;
		let range = match (range, &descriptor.loc) {
			(Some(range), _) => range,
			(None, Some(loc)) => loc.offsets(),
			(None, None) => location_of_whole(&text).range(),
		};

		let content = text
			.get(range.clone())
			.ok_or_else(|| {
				SfcError::InvalidOffsets {
					start: range.start,
					end: range.end,
					len: text.len(),
				}
			})?;

		let parent = source
			.with(|ms| ms.original_range(range.clone()))?
			.ok_or(SfcError::EditedRange {
				start: range.start,
				end: range.end,
			})?;

		tracing::debug!(start = parent.start, end = parent.end, "created block");

		Ok(Self {
			snippet: MagicString::new(content),
			descriptor,
			source: source.downgrade(),
			start: parent.start,
			end: parent.end,
			handler: Box::new(PassthroughHandler),
			overrides: HashMap::new(),
		})
	}

	/// Install custom property traps.
	#[must_use]
	pub fn with_handler(mut self, handler: impl BlockHandler + 'static) -> Self {
		self.handler = Box::new(handler);
		self
	}

	pub fn descriptor(&self) -> &BlockDescriptor {
		&self.descriptor
	}

	pub fn descriptor_mut(&mut self) -> &mut BlockDescriptor {
		&mut self.descriptor
	}

	/// The range of the block in the original text of the parent buffer.
	pub fn range(&self) -> Range<usize> {
		self.start..self.end
	}

	/// The block's own buffer. Indices passed to block edits address this
	/// buffer's original text.
	pub fn snippet(&self) -> &MagicString {
		&self.snippet
	}

	/// The parent buffer.
	pub fn source(&self) -> SfcResult<SharedSource> {
		self.source.upgrade()
	}

	pub fn append(&mut self, content: &str) -> SfcResult<&mut Self> {
		self.apply(Edit::Append {
			content: content.to_string(),
		})
	}

	pub fn prepend(&mut self, content: &str) -> SfcResult<&mut Self> {
		self.apply(Edit::Prepend {
			content: content.to_string(),
		})
	}

	pub fn append_left(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.apply(Edit::AppendLeft {
			index,
			content: content.to_string(),
		})
	}

	pub fn append_right(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.apply(Edit::AppendRight {
			index,
			content: content.to_string(),
		})
	}

	pub fn prepend_left(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.apply(Edit::PrependLeft {
			index,
			content: content.to_string(),
		})
	}

	pub fn prepend_right(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.apply(Edit::PrependRight {
			index,
			content: content.to_string(),
		})
	}

	pub fn overwrite(
		&mut self,
		start: usize,
		end: usize,
		content: &str,
		options: OverwriteOptions,
	) -> SfcResult<&mut Self> {
		self.apply(Edit::Overwrite {
			start,
			end,
			content: content.to_string(),
			options,
		})
	}

	pub fn remove(&mut self, start: usize, end: usize) -> SfcResult<&mut Self> {
		self.apply(Edit::Remove { start, end })
	}

	/// Apply `edit` to the snippet and the parent.
	///
	/// Nothing changes when either side rejects the edit. If the operation
	/// was replaced with [`MagicBlock::replace_operation`] the replacement
	/// runs instead and neither buffer is touched.
	pub fn apply(&mut self, edit: Edit) -> SfcResult<&mut Self> {
		let operation = edit.operation();
		if let Some(replacement) = self.overrides.get_mut(&operation) {
			tracing::trace!(%operation, "running replaced block operation");
			replacement(&edit)?;
			return Ok(self);
		}

		let source = self.source.upgrade()?;
		let mut snippet = self.snippet.clone();
		edit.apply_local(&mut snippet)?;

		let range = self.range();
		source.with_mut(|parent| edit.apply_to_parent(parent, range))??;
		self.snippet = snippet;

		tracing::trace!(%operation, start = self.start, end = self.end, "forwarded block edit");

		Ok(self)
	}

	/// Read a property by name.
	///
	/// Operation names always resolve to the operation, even when the
	/// descriptor has a field of the same name. `source` resolves to the
	/// parent buffer. Everything else goes through the handler.
	pub fn get(&self, key: &str) -> SfcResult<Option<BlockProperty>> {
		if let Some(operation) = Operation::from_key(key) {
			return Ok(Some(BlockProperty::Operation(operation)));
		}

		if key == "source" {
			return self.source().map(|source| Some(BlockProperty::Source(source)));
		}

		Ok(self
			.handler
			.get(&self.descriptor, key)
			.map(BlockProperty::Value))
	}

	/// Write a property by name through the handler.
	///
	/// Operation names cannot be assigned a JSON value, use
	/// [`MagicBlock::replace_operation`] for those.
	pub fn set(&mut self, key: &str, value: Value) -> SfcResult<()> {
		if let Some(operation) = Operation::from_key(key) {
			return Err(SfcError::InvalidProperty {
				key: key.to_string(),
				reason: format!(
					"`{operation}` is a block operation, replace it with `replace_operation`"
				),
			});
		}

		self.handler.set(&mut self.descriptor, key, value)
	}

	/// Replace `operation` on this block only. The replacement receives the
	/// edit in block-local coordinates.
	pub fn replace_operation(
		&mut self,
		operation: Operation,
		replacement: impl FnMut(&Edit) -> SfcResult<()> + 'static,
	) -> &mut Self {
		self.overrides.insert(operation, Box::new(replacement));
		self
	}

	/// Undo [`MagicBlock::replace_operation`].
	pub fn restore_operation(&mut self, operation: Operation) -> &mut Self {
		self.overrides.remove(&operation);
		self
	}

	pub fn is_replaced(&self, operation: Operation) -> bool {
		self.overrides.contains_key(&operation)
	}
}

impl fmt::Debug for MagicBlock {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut replaced: Vec<_> = self.overrides.keys().map(|op| op.as_str()).collect();
		replaced.sort_unstable();

		f.debug_struct("MagicBlock")
			.field("descriptor", &self.descriptor)
			.field("range", &self.range())
			.field("snippet", &self.snippet.to_string())
			.field("replaced", &replaced)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for MagicBlock {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.snippet, f)
	}
}
