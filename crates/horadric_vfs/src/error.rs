//! Error type for archive and file lookups.

use thiserror::Error;

/// Errors raised while resolving files through archives.
#[derive(Debug, Error)]
pub enum VfsError {
	/// No archive holds the requested path
	#[error("file not found: {path}")]
	NotFound {
		/// Normalised path that was looked up
		path: String,
	},

	/// An archive could not be opened
	#[error("failed to open archive {path}: {source}")]
	ArchiveOpen {
		/// Archive location
		path: String,
		/// Underlying error
		#[source]
		source: std::io::Error,
	},

	/// IO error while reading an entry
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl VfsError {
	/// Creates a [`VfsError::NotFound`] error.
	pub fn not_found(path: impl Into<String>) -> Self {
		Self::NotFound {
			path: path.into(),
		}
	}

	/// Whether the error means the file is simply absent.
	pub fn is_not_found(&self) -> bool {
		match self {
			Self::NotFound {
				..
			} => true,
			Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
			Self::ArchiveOpen {
				..
			} => false,
		}
	}
}
