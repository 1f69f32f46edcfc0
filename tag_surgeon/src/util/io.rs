//! Various traits for reading and writing to file-like objects

use crate::error::SurgeonError;

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};

/// Provides a method to resize an object to the specified length
///
/// This is one component of the [`FileLike`] trait, which is used to provide implementors access to
/// [`FileSurgeon::rewrite_zones`](crate::surgeon::FileSurgeon::rewrite_zones).
///
/// Growing the object must make the new bytes readable and writable. Their contents don't matter,
/// they are always overwritten.
///
/// Take great care in implementing this for downstream types, as tag_surgeon will assume that the
/// container has the new length specified. If this assumption were to be broken, files **will** become corrupted.
///
/// # Examples
///
/// ```rust
/// use tag_surgeon::io::Resize;
///
/// let mut data = vec![1, 2, 3, 4, 5];
/// Resize::resize(&mut data, 3).unwrap();
/// assert_eq!(data, vec![1, 2, 3]);
///
/// Resize::resize(&mut data, 4).unwrap();
/// assert_eq!(data, vec![1, 2, 3, 0]);
/// ```
pub trait Resize {
	/// The error type of the resize operation
	type Error: Into<SurgeonError>;

	/// Shrink or grow a storage object to the specified length
	///
	/// # Errors
	///
	/// Errors depend on the object being resized, which may not always be fallible.
	fn resize(&mut self, new_len: u64) -> std::result::Result<(), Self::Error>;
}

impl Resize for File {
	type Error = std::io::Error;

	fn resize(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.set_len(new_len)
	}
}

impl Resize for Vec<u8> {
	type Error = std::convert::Infallible;

	fn resize(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		Vec::resize(self, new_len as usize, 0);
		Ok(())
	}
}

impl<T> Resize for Cursor<T>
where
	T: Resize,
{
	type Error = <T as Resize>::Error;

	fn resize(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.get_mut().resize(new_len)
	}
}

impl<T> Resize for Box<T>
where
	T: Resize,
{
	type Error = <T as Resize>::Error;

	fn resize(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		self.as_mut().resize(new_len)
	}
}

impl<T> Resize for &mut T
where
	T: Resize,
{
	type Error = <T as Resize>::Error;

	fn resize(&mut self, new_len: u64) -> std::result::Result<(), Self::Error> {
		(**self).resize(new_len)
	}
}

/// Provides a method to get the length of a storage object
///
/// This is one component of the [`FileLike`] trait.
///
/// Take great care in implementing this for downstream types, as tag_surgeon will assume that the
/// container has the exact length specified. If this assumption were to be broken, files **may** become corrupted.
///
/// # Examples
///
/// ```rust
/// use tag_surgeon::io::Length;
///
/// let data = vec![1, 2, 3, 4, 5];
/// assert_eq!(Length::len(&data).unwrap(), 5);
/// ```
pub trait Length {
	/// The error type of the length operation
	type Error: Into<SurgeonError>;

	/// Get the length of a storage object
	///
	/// # Errors
	///
	/// Errors depend on the object being read, which may not always be fallible.
	fn len(&self) -> std::result::Result<u64, Self::Error>;
}

impl Length for File {
	type Error = std::io::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		self.metadata().map(|m| m.len())
	}
}

impl Length for Vec<u8> {
	type Error = std::convert::Infallible;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Ok(self.len() as u64)
	}
}

impl<T> Length for Cursor<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.get_ref())
	}
}

impl<T> Length for Box<T>
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(self.as_ref())
	}
}

impl<T> Length for &T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

impl<T> Length for &mut T
where
	T: Length,
{
	type Error = <T as Length>::Error;

	fn len(&self) -> std::result::Result<u64, Self::Error> {
		Length::len(*self)
	}
}

/// Provides a set of methods to read and write to a file-like object
///
/// This is a combination of the [`Read`], [`Write`], [`Seek`], [`Resize`], and [`Length`] traits.
/// It is what every splice and every rewrite pass operates on.
///
/// Take great care in implementing this for downstream types, as tag_surgeon will assume that the
/// trait implementations are correct. If this assumption were to be broken, files **may** become corrupted.
pub trait FileLike: Read + Write + Seek + Resize + Length
where
	<Self as Resize>::Error: Into<SurgeonError>,
	<Self as Length>::Error: Into<SurgeonError>,
{
}

impl<T> FileLike for T
where
	T: Read + Write + Seek + Resize + Length,
	<T as Resize>::Error: Into<SurgeonError>,
	<T as Length>::Error: Into<SurgeonError>,
{
}

/// Get the length of a [`FileLike`], converting the error
pub(crate) fn stream_len<F>(stream: &F) -> crate::error::Result<u64>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	Length::len(stream).map_err(Into::into)
}

/// Resize a [`FileLike`], converting the error
pub(crate) fn set_stream_len<F>(stream: &mut F, new_len: u64) -> crate::error::Result<()>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	Resize::resize(stream, new_len).map_err(Into::into)
}
