use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

use crate::SfcError;
use crate::SfcResult;

/// A caret position inside a text.
///
/// `column` follows the legacy arithmetic used by the location helpers: on the
/// first line it is the number of characters since the start of the text, on
/// every following line it is the number of characters since the last `\n`
/// **including** the newline itself. Use [`LineTable`] for conventional
/// zero-based columns.
///
/// `offset` counts UTF-8 bytes while `column` counts `char`s, so the two
/// differ on lines holding multi-byte characters: the end of `"éé"` is
/// offset 4, column 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
	/// UTF-8 byte offset from the start of the text.
	pub offset: usize,
	/// Zero-based line number.
	pub line: usize,
	/// Legacy column, see the type level docs.
	pub column: usize,
}

impl Position {
	pub const fn new(offset: usize, line: usize, column: usize) -> Self {
		Self {
			offset,
			line,
			column,
		}
	}

	/// The position directly after `prefix`.
	fn after(prefix: &str) -> Self {
		Self {
			offset: prefix.len(),
			line: count_lines(prefix),
			column: last_line_length(prefix),
		}
	}
}

/// The location of a substring inside a text. `source` is always the exact
/// text between `start.offset` and `end.offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
	pub start: Position,
	pub end: Position,
	pub source: String,
}

impl SourceLocation {
	/// The byte range covered by this location.
	pub fn range(&self) -> Range<usize> {
		self.start.offset..self.end.offset
	}

	pub fn len(&self) -> usize {
		self.end.offset - self.start.offset
	}

	pub fn is_empty(&self) -> bool {
		self.start.offset == self.end.offset
	}
}

/// Count the `\n` characters in `text`.
pub fn count_lines(text: &str) -> usize {
	text.bytes().filter(|byte| *byte == b'\n').count()
}

/// Number of characters from the last `\n` (inclusive) to the end of `text`,
/// or the character count of `text` when it holds no newline.
pub fn last_line_length(text: &str) -> usize {
	match text.rfind('\n') {
		Some(index) => text[index..].chars().count(),
		None => text.chars().count(),
	}
}

/// A location spanning the whole of `text`.
pub fn location_of_whole(text: &str) -> SourceLocation {
	SourceLocation {
		start: Position::default(),
		end: Position::after(text),
		source: text.to_string(),
	}
}

/// Create a location from two byte offsets into `text`.
pub fn location_from_offsets(text: &str, start: usize, end: usize) -> SfcResult<SourceLocation> {
	if start > end || end > text.len() {
		return Err(SfcError::InvalidOffsets {
			start,
			end,
			len: text.len(),
		});
	}

	for offset in [start, end] {
		if !text.is_char_boundary(offset) {
			return Err(SfcError::NotCharBoundary(offset));
		}
	}

	Ok(SourceLocation {
		start: Position::after(&text[..start]),
		end: Position::after(&text[..end]),
		source: text[start..end].to_string(),
	})
}

/// Find every non-overlapping occurrence of `needle` in `text`, scanning left
/// to right with each search resuming at the end of the previous match.
///
/// An empty `needle` never matches. Line and column are recomputed from the
/// full prefix for every match, which is fine for the single-file inputs this
/// is used with.
pub fn find_all_locations(text: &str, needle: &str) -> Vec<SourceLocation> {
	if needle.is_empty() {
		return Vec::new();
	}

	text.match_indices(needle)
		.map(|(index, matched)| {
			let end = index + matched.len();

			SourceLocation {
				start: Position::after(&text[..index]),
				end: Position::after(&text[..end]),
				source: matched.to_string(),
			}
		})
		.collect()
}

/// Pre-computed table of line-start byte offsets for efficient offset-to-point
/// conversion with binary search.
///
/// Unlike [`Position`], columns here are conventional: zero-based and counted
/// in UTF-16 code units, which is what source map consumers expect.
#[derive(Debug)]
pub struct LineTable<'a> {
	text: &'a str,
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl<'a> LineTable<'a> {
	pub fn new(text: &'a str) -> Self {
		let mut line_starts = vec![0];
		for (index, byte) in text.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(index + 1);
			}
		}

		Self { text, line_starts }
	}

	/// Convert a byte offset into a zero-based `(line, column)` pair. Offsets
	/// past the end of the text are clamped to the end.
	pub fn locate(&self, offset: usize) -> (usize, usize) {
		let offset = offset.min(self.text.len());
		let line = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};
		let line_start = self.line_starts[line];
		let column = self
			.text
			.get(line_start..offset)
			.map_or(offset - line_start, |segment| {
				segment.encode_utf16().count()
			});

		(line, column)
	}
}
