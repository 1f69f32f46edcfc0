//! Primitive operations to insert or remove bytes in the middle of a stream
//!
//! These know nothing about zones or markers, they only move the tail of a stream around. Every
//! call is `O(tail length)`, so callers should keep the number of splices per write as low as
//! possible (see [`RewriteStrategy::Buffered`](crate::config::RewriteStrategy::Buffered)).

use crate::error::{Result, SurgeonError};
use crate::io::{FileLike, Length, Resize};
use crate::macros::{err, try_vec};
use crate::util::alloc::buffer_len;
use crate::util::io::{set_stream_len, stream_len};

use std::io::{Read, SeekFrom, Write};

/// Remove the `delta` bytes that end at `cut_offset`
///
/// Everything from `cut_offset` to the end of the stream is moved back by `delta` bytes, and the
/// stream is truncated by `delta` bytes.
///
/// # Errors
///
/// * `cut_offset` is past the end of the stream, or `delta > cut_offset` ([`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch))
/// * Any I/O error
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use tag_surgeon::splice::shorten;
///
/// # fn main() -> tag_surgeon::error::Result<()> {
/// let mut stream = Cursor::new(b"abcXXdef".to_vec());
///
/// // Drop the two bytes before "def"
/// shorten(&mut stream, 5, 2, 1024)?;
/// assert_eq!(stream.get_ref(), b"abcdef");
/// # Ok(()) }
/// ```
pub fn shorten<F>(stream: &mut F, cut_offset: u64, delta: u64, buffer_size: usize) -> Result<()>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	if delta == 0 {
		return Ok(());
	}

	let len = stream_len(stream)?;
	if cut_offset > len || delta > cut_offset {
		err!(SizeMismatch);
	}

	log::trace!("Shortening stream by {delta} bytes at offset {cut_offset}");

	// The destination trails the source, copying forward never reads a byte that was already overwritten
	move_forward(
		stream,
		cut_offset,
		cut_offset - delta,
		len - cut_offset,
		buffer_size,
	)?;

	set_stream_len(stream, len - delta)
}

/// Insert `delta` bytes at `insert_offset`
///
/// The stream is grown by `delta` bytes, and everything from `insert_offset` to the old end of the
/// stream is moved forward by `delta` bytes. The gap `[insert_offset, insert_offset + delta)` is
/// zeroed if `zero_fill` is set, otherwise its contents are unspecified.
///
/// # Errors
///
/// * `insert_offset` is past the end of the stream ([`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch))
/// * The new length doesn't fit in a `u64` ([`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData))
/// * Any I/O error
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use tag_surgeon::splice::lengthen;
///
/// # fn main() -> tag_surgeon::error::Result<()> {
/// let mut stream = Cursor::new(b"abcdef".to_vec());
///
/// lengthen(&mut stream, 3, 2, true, 1024)?;
/// assert_eq!(stream.get_ref(), b"abc\0\0def");
/// # Ok(()) }
/// ```
pub fn lengthen<F>(
	stream: &mut F,
	insert_offset: u64,
	delta: u64,
	zero_fill: bool,
	buffer_size: usize,
) -> Result<()>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	if delta == 0 {
		return Ok(());
	}

	let len = stream_len(stream)?;
	if insert_offset > len {
		err!(SizeMismatch);
	}

	let Some(new_len) = len.checked_add(delta) else {
		err!(TooMuchData);
	};

	log::trace!("Lengthening stream by {delta} bytes at offset {insert_offset}");

	set_stream_len(stream, new_len)?;

	// The destination leads the source, so the tail has to be moved starting from its end
	move_backward(
		stream,
		insert_offset,
		insert_offset + delta,
		len - insert_offset,
		buffer_size,
	)?;

	if zero_fill {
		let zeroes = try_vec![0u8; block_len(buffer_size, delta)?];

		stream.seek(SeekFrom::Start(insert_offset))?;

		let mut remaining = delta;
		while remaining > 0 {
			let chunk = block_len(zeroes.len(), remaining)?;
			stream.write_all(&zeroes[..chunk])?;
			remaining -= chunk as u64;
		}
	}

	Ok(())
}

/// Copy exactly `length` bytes from `reader` to `writer`, `buffer_size` bytes at a time
///
/// Both are used from their current positions.
///
/// # Errors
///
/// * `reader` doesn't contain `length` bytes
/// * Any I/O error
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use tag_surgeon::splice::copy;
///
/// # fn main() -> tag_surgeon::error::Result<()> {
/// let mut reader = &b"new content, ignored"[..];
/// let mut writer = Cursor::new(Vec::new());
///
/// copy(&mut reader, &mut writer, 11, 4)?;
/// assert_eq!(writer.get_ref(), b"new content");
/// # Ok(()) }
/// ```
pub fn copy<R, W>(reader: &mut R, writer: &mut W, length: u64, buffer_size: usize) -> Result<()>
where
	R: Read,
	W: Write,
{
	if length == 0 {
		return Ok(());
	}

	let mut buffer = try_vec![0u8; block_len(buffer_size, length)?];

	let mut remaining = length;
	while remaining > 0 {
		let chunk = block_len(buffer.len(), remaining)?;
		reader.read_exact(&mut buffer[..chunk])?;
		writer.write_all(&buffer[..chunk])?;
		remaining -= chunk as u64;
	}

	Ok(())
}

fn move_forward<F>(stream: &mut F, from: u64, to: u64, length: u64, buffer_size: usize) -> Result<()>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	if length == 0 {
		return Ok(());
	}

	let mut buffer = try_vec![0u8; block_len(buffer_size, length)?];

	let mut done = 0;
	while done < length {
		let chunk = block_len(buffer.len(), length - done)?;

		stream.seek(SeekFrom::Start(from + done))?;
		stream.read_exact(&mut buffer[..chunk])?;
		stream.seek(SeekFrom::Start(to + done))?;
		stream.write_all(&buffer[..chunk])?;

		done += chunk as u64;
	}

	Ok(())
}

fn move_backward<F>(
	stream: &mut F,
	from: u64,
	to: u64,
	length: u64,
	buffer_size: usize,
) -> Result<()>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	if length == 0 {
		return Ok(());
	}

	let mut buffer = try_vec![0u8; block_len(buffer_size, length)?];

	let mut remaining = length;
	while remaining > 0 {
		let chunk = block_len(buffer.len(), remaining)?;
		remaining -= chunk as u64;

		stream.seek(SeekFrom::Start(from + remaining))?;
		stream.read_exact(&mut buffer[..chunk])?;
		stream.seek(SeekFrom::Start(to + remaining))?;
		stream.write_all(&buffer[..chunk])?;
	}

	Ok(())
}

// The size of the next block to move, never 0 unless `remaining` is
fn block_len(buffer_size: usize, remaining: u64) -> Result<usize> {
	let block = remaining.min(buffer_size.max(1) as u64);
	buffer_len(block)
}
