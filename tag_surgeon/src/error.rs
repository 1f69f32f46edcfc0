//! Contains the errors that can arise within tag_surgeon
//!
//! The primary error is [`SurgeonError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, SurgeonError>`
pub type Result<T> = std::result::Result<T, SurgeonError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// Marker related errors
	/// A marker was declared with a width/signedness pair that isn't a fixed-width integer
	UnsupportedMarkerWidth {
		/// The declared width in bits
		bits: u8,
		/// Whether the marker was declared as signed
		signed: bool,
	},
	/// Applying a delta to a marker produced a value that doesn't fit in the marker's width
	MarkerOverflow {
		/// The absolute position of the offending marker
		position: u64,
	},

	// Zone related errors
	/// A rewrite was requested for a zone that was never registered
	UnknownZone(String),

	// Stream related errors
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when an offset lies outside of the stream, or when content written in
	/// [`WriteMode::Overwrite`](crate::surgeon::WriteMode::Overwrite) doesn't fit in its zone.
	SizeMismatch,

	// Conversions for external errors
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
	/// This should **never** be encountered
	Infallible(std::convert::Infallible),
}

/// Errors that could occur within tag_surgeon
pub struct SurgeonError {
	pub(crate) kind: ErrorKind,
}

impl SurgeonError {
	/// Create a `SurgeonError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::error::{ErrorKind, SurgeonError};
	///
	/// let too_much_data = SurgeonError::new(ErrorKind::TooMuchData);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::error::{ErrorKind, SurgeonError};
	///
	/// let size_mismatch = SurgeonError::new(ErrorKind::SizeMismatch);
	/// if let ErrorKind::SizeMismatch = size_mismatch.kind() {
	/// 	println!("Where did those bytes go?");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl std::error::Error for SurgeonError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self.kind {
			ErrorKind::Io(ref err) => Some(err),
			ErrorKind::Alloc(ref err) => Some(err),
			_ => None,
		}
	}
}

impl Debug for SurgeonError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<std::io::Error> for SurgeonError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<TryReserveError> for SurgeonError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl From<std::convert::Infallible> for SurgeonError {
	fn from(input: std::convert::Infallible) -> Self {
		Self {
			kind: ErrorKind::Infallible(input),
		}
	}
}

impl Display for SurgeonError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::UnsupportedMarkerWidth { bits, signed } => write!(
				f,
				"Marker: unsupported value type ({} {bits}-bit integer)",
				if signed { "signed" } else { "unsigned" }
			),
			ErrorKind::MarkerOverflow { position } => write!(
				f,
				"Marker: updated value at offset {position} doesn't fit in its declared width"
			),
			ErrorKind::UnknownZone(ref name) => {
				write!(f, "Zone: \"{name}\" was never registered")
			},

			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid size or offset, either too big or too small to be valid"
			),

			ErrorKind::Infallible(_) => write!(f, "A expected condition was not upheld"),
		}
	}
}
