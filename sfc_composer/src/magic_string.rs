use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;
use sourcemap::SourceMap;

use crate::LineTable;
use crate::SfcError;
use crate::SfcResult;
use crate::mappings::Mappings;
use crate::mappings::SourceMapOptions;
use crate::mappings::source_map_to_json;

/// Options for [`MagicString::overwrite`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverwriteOptions {
	/// Record the replaced original text as a name in generated source maps.
	#[serde(default)]
	pub store_name: bool,
	/// Keep content that was previously appended or prepended around the
	/// replaced range.
	#[serde(default)]
	pub content_only: bool,
}

/// A slice of the original text together with the edits anchored to it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk {
	start: usize,
	end: usize,
	intro: String,
	outro: String,
	content: String,
	edited: bool,
	store_name: bool,
}

impl Chunk {
	fn new(start: usize, end: usize, content: &str) -> Self {
		Self {
			start,
			end,
			intro: String::new(),
			outro: String::new(),
			content: content.to_string(),
			edited: false,
			store_name: false,
		}
	}

	fn edit(&mut self, content: &str, store_name: bool, content_only: bool) {
		content.clone_into(&mut self.content);
		if !content_only {
			self.intro.clear();
			self.outro.clear();
		}
		self.store_name = store_name;
		self.edited = true;
	}

	/// Split this chunk at `index`, returning the chunk that now starts there.
	/// The outro moves to the new chunk. Only chunks that are unedited or
	/// edited down to nothing can be split.
	fn split(&mut self, index: usize, original: &str) -> Chunk {
		let mut next = Chunk::new(index, self.end, &original[index..self.end]);
		next.outro = std::mem::take(&mut self.outro);
		self.end = index;

		if self.edited {
			next.edit("", false, true);
			self.content.clear();
		} else {
			original[self.start..index].clone_into(&mut self.content);
		}

		next
	}
}

/// A mutable string that remembers the original text it was created from.
///
/// Every edit is anchored to offsets in the **original** text, so offsets
/// stay valid no matter how many edits have already been applied. The
/// rendered text and a source map back to the original can be produced at
/// any time.
///
/// Insertions come in two flavours. `*_left` content is attached to the chunk
/// that ends at the index, `*_right` content to the chunk that starts there.
/// When that chunk is later removed or overwritten, the attached content goes
/// with it.
///
/// ```rust
/// use sfc_composer::MagicString;
///
/// let mut ms = MagicString::new("Hello, World!");
/// ms.overwrite(7, 12, "Planet", Default::default()).unwrap();
/// ms.append_left(5, " there").unwrap();
///
/// assert_eq!(ms.to_string(), "Hello there, Planet!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicString {
	original: String,
	filename: Option<String>,
	intro: String,
	outro: String,
	/// Chunks keyed by their start offset. Together they always cover the
	/// original text in order.
	chunks: BTreeMap<usize, Chunk>,
}

impl MagicString {
	pub fn new(original: impl Into<String>) -> Self {
		let original = original.into();
		let mut chunks = BTreeMap::new();
		chunks.insert(0, Chunk::new(0, original.len(), &original));

		Self {
			original,
			filename: None,
			intro: String::new(),
			outro: String::new(),
			chunks,
		}
	}

	#[must_use]
	pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
		self.filename = Some(filename.into());
		self
	}

	pub fn filename(&self) -> Option<&str> {
		self.filename.as_deref()
	}

	/// The text this buffer was created from.
	pub fn original(&self) -> &str {
		&self.original
	}

	/// Length in bytes of the rendered text.
	pub fn len(&self) -> usize {
		self.intro.len()
			+ self
				.chunks
				.values()
				.map(|chunk| chunk.intro.len() + chunk.content.len() + chunk.outro.len())
				.sum::<usize>()
			+ self.outro.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn has_changed(&self) -> bool {
		self.to_string() != self.original
	}

	/// Add `content` to the end of the rendered text.
	pub fn append(&mut self, content: &str) -> &mut Self {
		self.outro.push_str(content);
		self
	}

	/// Add `content` to the start of the rendered text.
	pub fn prepend(&mut self, content: &str) -> &mut Self {
		self.intro.insert_str(0, content);
		self
	}

	/// Insert `content` at `index`, after anything previously appended to the
	/// left of it.
	pub fn append_left(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.split(index)?;
		if let Some(chunk) = self.chunk_ending_at(index) {
			chunk.outro.push_str(content);
		} else {
			self.intro.push_str(content);
		}

		Ok(self)
	}

	/// Insert `content` at `index`, before anything previously prepended to
	/// the left of it.
	pub fn prepend_left(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.split(index)?;
		if let Some(chunk) = self.chunk_ending_at(index) {
			chunk.outro.insert_str(0, content);
		} else {
			self.intro.insert_str(0, content);
		}

		Ok(self)
	}

	/// Insert `content` at `index`, after anything previously appended to the
	/// right of it.
	pub fn append_right(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.split(index)?;
		if let Some(chunk) = self.chunks.get_mut(&index) {
			chunk.intro.push_str(content);
		} else {
			self.outro.push_str(content);
		}

		Ok(self)
	}

	/// Insert `content` at `index`, before anything previously prepended to
	/// the right of it.
	pub fn prepend_right(&mut self, index: usize, content: &str) -> SfcResult<&mut Self> {
		self.split(index)?;
		if let Some(chunk) = self.chunks.get_mut(&index) {
			chunk.intro.insert_str(0, content);
		} else {
			self.outro.insert_str(0, content);
		}

		Ok(self)
	}

	/// Replace the original characters in `start..end` with `content`.
	///
	/// Unless `options.content_only` is set, content previously appended or
	/// prepended to the range is discarded as well.
	pub fn overwrite(
		&mut self,
		start: usize,
		end: usize,
		content: &str,
		options: OverwriteOptions,
	) -> SfcResult<&mut Self> {
		self.check_range(start, end)?;
		if start == end {
			return Err(SfcError::ZeroLengthOverwrite(start));
		}

		self.split(start)?;
		self.split(end)?;

		let mut chunks = self.chunks.range_mut(start..end).map(|(_, chunk)| chunk);
		if let Some(first) = chunks.next() {
			for chunk in chunks {
				chunk.edit("", false, false);
			}
			first.edit(content, options.store_name, options.content_only);
		}

		Ok(self)
	}

	/// Remove the original characters in `start..end` along with anything
	/// attached to them.
	pub fn remove(&mut self, start: usize, end: usize) -> SfcResult<&mut Self> {
		self.check_range(start, end)?;
		if start == end {
			return Ok(self);
		}

		self.split(start)?;
		self.split(end)?;

		for chunk in self.chunks.range_mut(start..end).map(|(_, chunk)| chunk) {
			chunk.edit("", false, false);
		}

		Ok(self)
	}

	/// Map a byte range of the rendered text back to the original text.
	///
	/// Returns `None` unless the whole range is untouched original text: any
	/// inserted, overwritten or removed text inside it breaks the mapping.
	/// Edges may touch inserted text.
	pub fn original_range(&self, range: Range<usize>) -> Option<Range<usize>> {
		let mut pieces = vec![(self.intro.as_str(), None)];
		for chunk in self.chunks.values() {
			pieces.push((chunk.intro.as_str(), None));
			pieces.push((chunk.content.as_str(), (!chunk.edited).then_some(chunk.start)));
			pieces.push((chunk.outro.as_str(), None));
		}
		pieces.push((self.outro.as_str(), None));

		let mut position = 0;
		let mut mapped: Option<Range<usize>> = None;

		for (text, origin) in pieces {
			let piece = position..position + text.len();
			position = piece.end;

			if range.is_empty() {
				if let Some(origin) = origin {
					if piece.contains(&range.start) || piece.end == range.start {
						let start = origin + (range.start - piece.start);
						return Some(start..start);
					}
				}
				continue;
			}

			let low = range.start.max(piece.start);
			let high = range.end.min(piece.end);
			if low >= high {
				continue;
			}

			let origin = origin?;
			let (start, end) = (origin + (low - piece.start), origin + (high - piece.start));
			mapped = match mapped {
				None => Some(start..end),
				Some(current) if current.end == start => Some(current.start..end),
				Some(_) => return None,
			};
		}

		mapped.filter(|mapped| mapped.len() == range.len())
	}

	/// Generate a source map from the rendered text back to the original.
	///
	/// The source name is `options.source`, falling back to the buffer's
	/// filename.
	pub fn generate_map(&self, options: &SourceMapOptions) -> SfcResult<SourceMap> {
		let table = LineTable::new(&self.original);
		let source = options.source.as_deref().or(self.filename.as_deref());
		let mut mappings = Mappings::new(options, source, &self.original);
		mappings.advance(&self.intro);

		for chunk in self.chunks.values() {
			let location = table.locate(chunk.start);
			mappings.advance(&chunk.intro);

			if chunk.edited {
				if !chunk.content.is_empty() {
					let name = chunk
						.store_name
						.then(|| &self.original[chunk.start..chunk.end]);
					mappings.add_edit(&chunk.content, location, name);
				}
			} else {
				mappings.add_unedited(&self.original[chunk.start..chunk.end], location);
			}

			mappings.advance(&chunk.outro);
		}

		Ok(mappings.into_source_map())
	}

	/// Generate a source map and serialize it as JSON.
	pub fn generate_map_json(&self, options: &SourceMapOptions) -> SfcResult<String> {
		source_map_to_json(&self.generate_map(options)?)
	}

	fn check_index(&self, index: usize) -> SfcResult<()> {
		if index > self.original.len() {
			return Err(SfcError::OutOfBounds {
				index,
				len: self.original.len(),
			});
		}

		if !self.original.is_char_boundary(index) {
			return Err(SfcError::NotCharBoundary(index));
		}

		Ok(())
	}

	fn check_range(&self, start: usize, end: usize) -> SfcResult<()> {
		if start > end {
			return Err(SfcError::InvertedRange { start, end });
		}

		self.check_index(start)?;
		self.check_index(end)
	}

	/// The chunk whose end is exactly `index`. Only the chunk starting at
	/// `index` and the one before it can qualify.
	fn chunk_ending_at(&mut self, index: usize) -> Option<&mut Chunk> {
		self.chunks
			.range_mut(..=index)
			.rev()
			.take(2)
			.map(|(_, chunk)| chunk)
			.find(|chunk| chunk.end == index)
	}

	/// Make sure a chunk boundary exists at `index`.
	fn split(&mut self, index: usize) -> SfcResult<()> {
		self.check_index(index)?;
		if self.chunks.contains_key(&index) {
			return Ok(());
		}

		let Some((_, chunk)) = self.chunks.range_mut(..index).next_back() else {
			return Ok(());
		};

		if chunk.end <= index {
			return Ok(());
		}

		if chunk.edited && !chunk.content.is_empty() {
			let (line, column) = LineTable::new(&self.original).locate(index);
			return Err(SfcError::SplitEditedChunk {
				line: line + 1,
				column,
				original: self.original[chunk.start..chunk.end].to_string(),
			});
		}

		let next = chunk.split(index, &self.original);
		self.chunks.insert(index, next);

		Ok(())
	}
}

impl fmt::Display for MagicString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.intro)?;
		for chunk in self.chunks.values() {
			f.write_str(&chunk.intro)?;
			f.write_str(&chunk.content)?;
			f.write_str(&chunk.outro)?;
		}
		f.write_str(&self.outro)
	}
}

impl From<&str> for MagicString {
	fn from(original: &str) -> Self {
		Self::new(original)
	}
}

impl From<String> for MagicString {
	fn from(original: String) -> Self {
		Self::new(original)
	}
}
