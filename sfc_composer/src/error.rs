use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SfcError {
	#[error(transparent)]
	#[diagnostic(code(sfc::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid start or end offsets: {start}..{end} (text length: {len})")]
	#[diagnostic(
		code(sfc::invalid_offsets),
		help("offsets must satisfy `start <= end <= text length`")
	)]
	InvalidOffsets { start: usize, end: usize, len: usize },

	#[error("offset {0} does not fall on a character boundary")]
	#[diagnostic(code(sfc::not_char_boundary))]
	NotCharBoundary(usize),

	#[error("character is out of bounds: {index} (original length: {len})")]
	#[diagnostic(code(sfc::out_of_bounds))]
	OutOfBounds { index: usize, len: usize },

	#[error("end must be greater than start: {start}..{end}")]
	#[diagnostic(code(sfc::inverted_range))]
	InvertedRange { start: usize, end: usize },

	#[error("cannot overwrite a zero-length range at {0}")]
	#[diagnostic(
		code(sfc::zero_length_overwrite),
		help("use `append_left` or `prepend_right` to insert content instead")
	)]
	ZeroLengthOverwrite(usize),

	#[error("cannot split a chunk that has already been edited ({line}:{column}, \"{original}\")")]
	#[diagnostic(
		code(sfc::split_edited_chunk),
		help("edit whole ranges that were already overwritten instead of parts of them")
	)]
	SplitEditedChunk {
		line: usize,
		column: usize,
		original: String,
	},

	#[error("block range {start}..{end} covers text that was already edited in the source buffer")]
	#[diagnostic(
		code(sfc::edited_range),
		help("create blocks before editing the text they cover")
	)]
	EditedRange { start: usize, end: usize },

	#[error("a parser adapter must be provided before a document can be parsed")]
	#[diagnostic(
		code(sfc::missing_parser),
		help(
			"attach one with `MagicSfc::with_parser`, or set `silent = true` to make parsing a \
			 no-op"
		)
	)]
	MissingParser,

	#[error("block is detached from its source buffer")]
	#[diagnostic(
		code(sfc::detached_block),
		help("the document owning this block has been dropped")
	)]
	DetachedBlock,

	#[error("source buffer is already borrowed")]
	#[diagnostic(code(sfc::source_borrowed))]
	SourceBorrowed,

	#[error("cannot assign property `{key}`: {reason}")]
	#[diagnostic(code(sfc::invalid_property))]
	InvalidProperty { key: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sfc::config_parse),
		help("check that sfc.toml is valid TOML with an optional [sourcemap] section")
	)]
	ConfigParse(String),

	#[error(transparent)]
	#[diagnostic(code(sfc::sourcemap))]
	SourceMap(#[from] sourcemap::Error),

	#[error(transparent)]
	#[diagnostic(code(sfc::json))]
	Json(#[from] serde_json::Error),
}

pub type SfcResult<T> = Result<T, SfcError>;
