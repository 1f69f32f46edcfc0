use crate::error::Result;
use crate::macros::err;
use crate::structure::MarkerWidth;

use std::fmt::Debug;
use std::io::Write;
use std::sync::Arc;

/// A size field inside an [`EmbeddingHeader`]
///
/// Once the header is written, a [`MarkerKind::Size`](crate::structure::MarkerKind::Size) marker is
/// registered for it, so later rewrites of the zone keep it up to date.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedSizeField {
	/// The offset of the field from the start of the header
	pub offset: u64,
	/// The width of the field
	pub width: MarkerWidth,
	/// Whether the field is stored little endian
	pub little_endian: bool,
}

/// A header wrapping a zone's content in another format's framing
///
/// This is needed when a tag is nested in a container chunk, such as an ID3v2 tag in a RIFF
/// `"ID3 "` chunk. The header is only written when the zone is created, an existing wrapper is
/// expected to be tracked with markers.
///
/// # Examples
///
/// ```rust
/// use std::io::Write;
/// use tag_surgeon::error::Result;
/// use tag_surgeon::structure::MarkerWidth;
/// use tag_surgeon::surgeon::{EmbeddedSizeField, EmbeddingHeader};
///
/// #[derive(Debug)]
/// struct RiffId3Chunk;
///
/// impl EmbeddingHeader for RiffId3Chunk {
/// 	fn header_len(&self) -> u64 {
/// 		8
/// 	}
///
/// 	fn write_header(&self, writer: &mut dyn Write, payload_len: u64) -> Result<()> {
/// 		writer.write_all(b"ID3 ")?;
/// 		writer.write_all(&(payload_len as u32).to_le_bytes())?;
/// 		Ok(())
/// 	}
///
/// 	fn size_field(&self) -> Option<EmbeddedSizeField> {
/// 		Some(EmbeddedSizeField {
/// 			offset: 4,
/// 			width: MarkerWidth::U32,
/// 			little_endian: true,
/// 		})
/// 	}
/// }
/// ```
pub trait EmbeddingHeader: Debug + Send + Sync {
	/// The exact number of bytes [`EmbeddingHeader::write_header`] writes
	fn header_len(&self) -> u64;

	/// Write the header for a payload of `payload_len` bytes
	///
	/// # Errors
	///
	/// Any error the implementor decides to return, which aborts the rewrite.
	fn write_header(&self, writer: &mut dyn Write, payload_len: u64) -> Result<()>;

	/// The field of the header holding the payload's size, if any
	fn size_field(&self) -> Option<EmbeddedSizeField> {
		None
	}
}

/// The envelope written around a zone when it's created
#[derive(Clone, Debug, Default)]
pub enum Embedding {
	/// The zone's content is written as-is
	#[default]
	NoWrapper,
	/// The zone's content is prefixed with a header the first time it's written
	Wrapper(Arc<dyn EmbeddingHeader>),
}

impl Embedding {
	/// Wrap zones in `header`
	pub fn wrapper<H>(header: H) -> Self
	where
		H: EmbeddingHeader + 'static,
	{
		Self::Wrapper(Arc::new(header))
	}

	/// The header bytes to prefix to a new zone of `payload_len` bytes
	pub(crate) fn header_for(
		&self,
		payload_len: u64,
	) -> Result<Option<(Vec<u8>, Option<EmbeddedSizeField>)>> {
		let Self::Wrapper(header) = self else {
			return Ok(None);
		};

		let mut bytes = Vec::new();
		header.write_header(&mut bytes, payload_len)?;

		if bytes.len() as u64 != header.header_len() {
			log::error!(
				"Embedding header wrote {} bytes, expected {}",
				bytes.len(),
				header.header_len()
			);
			err!(SizeMismatch);
		}

		Ok(Some((bytes, header.size_field())))
	}
}
