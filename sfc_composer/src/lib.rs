//! `sfc_composer` edits the blocks of single-file components (Vue, Svelte,
//! Astro and anything else a parser adapter can describe) in place. Each
//! block is a [`MagicBlock`] over a region of the document: editing the block
//! with block-local offsets edits the document at the matching position, so
//! both stay consistent and a source map for the whole file can be generated
//! at any time.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Component text
//!   -> MagicSfc (owns the document buffer)
//!   -> SfcParser adapter (framework parser output -> ParsedSfc)
//!   -> MagicBlock per block (snippet + shared document buffer)
//!   -> edits through blocks land in both buffers
//!   -> to_string() / source_map() / transform_result()
//! ```
//!
//! ## Modules
//!
//! - [`config`]: configuration loading from `sfc.toml`.
//! - [`vue`], [`svelte`], [`astro`]: parser adapters over injected framework
//!   parsers, and serializers that turn block descriptors back into markup.
//!
//! ## Key Types
//!
//! - [`MagicString`]: an editable string whose edits are addressed by
//!   offsets into the original text.
//! - [`MagicBlock`]: a block that forwards every edit to its document.
//! - [`MagicSfc`]: a document together with its blocks grouped by role.
//! - [`SourceLocation`]: line, column and offset of a region of text.
//!
//! ## Quick Start
//!
//! ```rust
//! use sfc_composer::MagicSfc;
//! use sfc_composer::SfcConfig;
//! use sfc_composer::vue::VueDescriptor;
//! use sfc_composer::vue::VueParser;
//! use sfc_composer::BlockDescriptor;
//! use sfc_composer::location_from_offsets;
//!
//! let text = "<script>let a = 1</script>";
//! let parser = VueParser::new(|source: &str| {
//! 	let script = BlockDescriptor::new("let a = 1").with_loc(location_from_offsets(source, 8, 17)?);
//! 	Ok(Some(VueDescriptor {
//! 		script: Some(script),
//! 		..VueDescriptor::default()
//! 	}))
//! });
//!
//! let mut sfc = MagicSfc::new(text, SfcConfig::default()).with_parser(parser);
//! sfc.parse().unwrap();
//! sfc.scripts[0].overwrite(4, 5, "b", Default::default()).unwrap();
//!
//! assert_eq!(sfc.scripts[0].to_string(), "let b = 1");
//! assert_eq!(sfc.to_string(), "<script>let b = 1</script>");
//! ```

pub use block::*;
pub use config::*;
pub use descriptor::*;
pub use document::*;
pub use error::*;
pub use location::*;
pub use magic_string::*;
pub use mappings::SourceMapOptions;
pub use mappings::TransformResult;
pub use source::*;

pub mod astro;
mod block;
pub mod config;
pub(crate) mod create;
mod descriptor;
mod document;
mod error;
mod location;
mod magic_string;
pub(crate) mod mappings;
mod source;
pub mod svelte;
pub mod vue;

pub use create::SfcBlocks;

#[cfg(test)]
mod __fixtures;
