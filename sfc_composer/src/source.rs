use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;

use crate::MagicString;
use crate::SfcError;
use crate::SfcResult;

/// The shared parent buffer of a document.
///
/// The document owns the strong handle and every block holds a
/// [`SourceHandle`] to the same buffer, so an edit made through any block is
/// visible in the document right away. Borrow conflicts surface as
/// [`SfcError::SourceBorrowed`] rather than a panic.
#[derive(Debug, Clone)]
pub struct SharedSource(Rc<RefCell<MagicString>>);

impl SharedSource {
	pub fn new(ms: MagicString) -> Self {
		Self(Rc::new(RefCell::new(ms)))
	}

	/// Run `f` with shared access to the buffer.
	pub fn with<R>(&self, f: impl FnOnce(&MagicString) -> R) -> SfcResult<R> {
		let ms = self.0.try_borrow().map_err(|_| SfcError::SourceBorrowed)?;
		Ok(f(&ms))
	}

	/// Run `f` with exclusive access to the buffer.
	pub fn with_mut<R>(&self, f: impl FnOnce(&mut MagicString) -> R) -> SfcResult<R> {
		let mut ms = self
			.0
			.try_borrow_mut()
			.map_err(|_| SfcError::SourceBorrowed)?;
		Ok(f(&mut ms))
	}

	/// The current rendered text of the buffer.
	pub fn text(&self) -> SfcResult<String> {
		self.with(ToString::to_string)
	}

	/// A non-owning handle to this buffer.
	pub fn downgrade(&self) -> SourceHandle {
		SourceHandle(Rc::downgrade(&self.0))
	}

	/// Whether both handles point at the same buffer.
	pub fn ptr_eq(&self, other: &SharedSource) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl From<MagicString> for SharedSource {
	fn from(ms: MagicString) -> Self {
		Self::new(ms)
	}
}

/// A non-owning handle to a [`SharedSource`].
#[derive(Debug, Clone)]
pub struct SourceHandle(Weak<RefCell<MagicString>>);

impl SourceHandle {
	/// Recover the shared buffer. Fails with [`SfcError::DetachedBlock`] once
	/// the owning document has been dropped.
	pub fn upgrade(&self) -> SfcResult<SharedSource> {
		self.0.upgrade().map(SharedSource).ok_or(SfcError::DetachedBlock)
	}

	pub fn is_attached(&self) -> bool {
		self.0.strong_count() > 0
	}
}
