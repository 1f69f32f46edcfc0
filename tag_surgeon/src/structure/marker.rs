use crate::error::Result;
use crate::macros::err;

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

/// What a [`Marker`] keeps track of
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
	/// The size of a zone (or of a container holding it), moves with every size change
	Size,
	/// The number of items in a container, moves by one when a zone appears or disappears
	Counter,
	/// The absolute offset of a zone, `0` once the zone disappears
	Index,
}

/// The on-disk width and signedness of a marker
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MarkerWidth {
	U8,
	I8,
	U16,
	I16,
	U32,
	I32,
	U64,
	I64,
}

impl MarkerWidth {
	/// Get the `MarkerWidth` of a `bits`-wide integer
	///
	/// # Errors
	///
	/// `bits` isn't one of 8, 16, 32, or 64 ([`ErrorKind::UnsupportedMarkerWidth`](crate::error::ErrorKind::UnsupportedMarkerWidth))
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::MarkerWidth;
	///
	/// assert_eq!(MarkerWidth::from_bits(32, false).unwrap(), MarkerWidth::U32);
	/// assert!(MarkerWidth::from_bits(24, false).is_err());
	/// ```
	pub fn from_bits(bits: u8, signed: bool) -> Result<Self> {
		let width = match (bits, signed) {
			(8, false) => Self::U8,
			(8, true) => Self::I8,
			(16, false) => Self::U16,
			(16, true) => Self::I16,
			(32, false) => Self::U32,
			(32, true) => Self::I32,
			(64, false) => Self::U64,
			(64, true) => Self::I64,
			_ => err!(UnsupportedMarkerWidth { bits, signed }),
		};

		Ok(width)
	}

	/// The number of bytes a marker of this width occupies
	pub fn size(self) -> u64 {
		match self {
			Self::U8 | Self::I8 => 1,
			Self::U16 | Self::I16 => 2,
			Self::U32 | Self::I32 => 4,
			Self::U64 | Self::I64 => 8,
		}
	}

	/// Whether the marker is a signed integer
	pub fn is_signed(self) -> bool {
		matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
	}
}

/// The value of a marker, tagged with its on-disk width
///
/// A marker is always written back using exactly as many bytes as it was registered with, so the
/// width never changes across updates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MarkerValue {
	U8(u8),
	I8(i8),
	U16(u16),
	I16(i16),
	U32(u32),
	I32(i32),
	U64(u64),
	I64(i64),
}

macro_rules! impl_from_primitive {
	($($ty:ty => $variant:ident),+ $(,)?) => {
		$(
			impl From<$ty> for MarkerValue {
				fn from(input: $ty) -> Self {
					Self::$variant(input)
				}
			}
		)+
	};
}

impl_from_primitive!(
	u8 => U8,
	i8 => I8,
	u16 => U16,
	i16 => I16,
	u32 => U32,
	i32 => I32,
	u64 => U64,
	i64 => I64,
);

// Unsigned markers never go through a signed type, the magnitude of the delta is added or subtracted
macro_rules! add_unsigned {
	($value:expr, $delta:expr, $ty:ty) => {{
		let magnitude = <$ty>::try_from($delta.unsigned_abs()).ok()?;
		if $delta < 0 {
			$value.checked_sub(magnitude)
		} else {
			$value.checked_add(magnitude)
		}
	}};
}

macro_rules! add_signed {
	($value:expr, $delta:expr, $ty:ty) => {{ <$ty>::try_from($delta).ok().and_then(|delta| $value.checked_add(delta)) }};
}

impl MarkerValue {
	/// Create a `MarkerValue` from a width/signedness pair and a raw value
	///
	/// # Errors
	///
	/// * `bits` and `signed` don't describe a fixed-width integer ([`ErrorKind::UnsupportedMarkerWidth`](crate::error::ErrorKind::UnsupportedMarkerWidth))
	/// * `raw` doesn't fit in the described integer ([`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch))
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::MarkerValue;
	///
	/// assert_eq!(MarkerValue::from_raw(16, true, -2).unwrap(), MarkerValue::I16(-2));
	/// assert!(MarkerValue::from_raw(16, false, -2).is_err());
	/// assert!(MarkerValue::from_raw(12, false, 2).is_err());
	/// ```
	pub fn from_raw(bits: u8, signed: bool, raw: i128) -> Result<Self> {
		let width = MarkerWidth::from_bits(bits, signed)?;
		match Self::with_width(width, raw) {
			Some(value) => Ok(value),
			None => err!(SizeMismatch),
		}
	}

	/// Create a `MarkerValue` of the given width, if `raw` fits in it
	pub fn with_width(width: MarkerWidth, raw: i128) -> Option<Self> {
		let value = match width {
			MarkerWidth::U8 => Self::U8(u8::try_from(raw).ok()?),
			MarkerWidth::I8 => Self::I8(i8::try_from(raw).ok()?),
			MarkerWidth::U16 => Self::U16(u16::try_from(raw).ok()?),
			MarkerWidth::I16 => Self::I16(i16::try_from(raw).ok()?),
			MarkerWidth::U32 => Self::U32(u32::try_from(raw).ok()?),
			MarkerWidth::I32 => Self::I32(i32::try_from(raw).ok()?),
			MarkerWidth::U64 => Self::U64(u64::try_from(raw).ok()?),
			MarkerWidth::I64 => Self::I64(i64::try_from(raw).ok()?),
		};

		Some(value)
	}

	/// The width of the value
	pub fn width(self) -> MarkerWidth {
		match self {
			Self::U8(_) => MarkerWidth::U8,
			Self::I8(_) => MarkerWidth::I8,
			Self::U16(_) => MarkerWidth::U16,
			Self::I16(_) => MarkerWidth::I16,
			Self::U32(_) => MarkerWidth::U32,
			Self::I32(_) => MarkerWidth::I32,
			Self::U64(_) => MarkerWidth::U64,
			Self::I64(_) => MarkerWidth::I64,
		}
	}

	/// The value, widened to an `i128`
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::MarkerValue;
	///
	/// assert_eq!(MarkerValue::U64(u64::MAX).get(), i128::from(u64::MAX));
	/// assert_eq!(MarkerValue::I8(-1).get(), -1);
	/// ```
	pub fn get(self) -> i128 {
		match self {
			Self::U8(v) => i128::from(v),
			Self::I8(v) => i128::from(v),
			Self::U16(v) => i128::from(v),
			Self::I16(v) => i128::from(v),
			Self::U32(v) => i128::from(v),
			Self::I32(v) => i128::from(v),
			Self::U64(v) => i128::from(v),
			Self::I64(v) => i128::from(v),
		}
	}

	/// Add `delta` to the value, keeping its width
	///
	/// Returns `None` if the result doesn't fit.
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::MarkerValue;
	///
	/// assert_eq!(MarkerValue::U32(10).checked_add(-4), Some(MarkerValue::U32(6)));
	/// assert_eq!(MarkerValue::U8(250).checked_add(10), None);
	/// assert_eq!(MarkerValue::U64(u64::MAX).checked_add(-1), Some(MarkerValue::U64(u64::MAX - 1)));
	/// ```
	pub fn checked_add(self, delta: i64) -> Option<Self> {
		let value = match self {
			Self::U8(v) => Self::U8(add_unsigned!(v, delta, u8)?),
			Self::I8(v) => Self::I8(add_signed!(v, delta, i8)?),
			Self::U16(v) => Self::U16(add_unsigned!(v, delta, u16)?),
			Self::I16(v) => Self::I16(add_signed!(v, delta, i16)?),
			Self::U32(v) => Self::U32(add_unsigned!(v, delta, u32)?),
			Self::I32(v) => Self::I32(add_signed!(v, delta, i32)?),
			Self::U64(v) => Self::U64(add_unsigned!(v, delta, u64)?),
			Self::I64(v) => Self::I64(v.checked_add(delta)?),
		};

		Some(value)
	}

	/// Read a marker of the given width from `reader`
	///
	/// # Errors
	///
	/// Any I/O error
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::{MarkerValue, MarkerWidth};
	///
	/// # fn main() -> tag_surgeon::error::Result<()> {
	/// let mut reader = &[0x00, 0x00, 0x01, 0x00][..];
	/// let value = MarkerValue::read(&mut reader, MarkerWidth::U32, false)?;
	/// assert_eq!(value, MarkerValue::U32(256));
	/// # Ok(()) }
	/// ```
	pub fn read<R>(reader: &mut R, width: MarkerWidth, little_endian: bool) -> Result<Self>
	where
		R: Read,
	{
		if little_endian {
			Self::read_with::<R, LittleEndian>(reader, width)
		} else {
			Self::read_with::<R, BigEndian>(reader, width)
		}
	}

	fn read_with<R, B>(reader: &mut R, width: MarkerWidth) -> Result<Self>
	where
		R: Read,
		B: ByteOrder,
	{
		let value = match width {
			MarkerWidth::U8 => Self::U8(reader.read_u8()?),
			MarkerWidth::I8 => Self::I8(reader.read_i8()?),
			MarkerWidth::U16 => Self::U16(reader.read_u16::<B>()?),
			MarkerWidth::I16 => Self::I16(reader.read_i16::<B>()?),
			MarkerWidth::U32 => Self::U32(reader.read_u32::<B>()?),
			MarkerWidth::I32 => Self::I32(reader.read_i32::<B>()?),
			MarkerWidth::U64 => Self::U64(reader.read_u64::<B>()?),
			MarkerWidth::I64 => Self::I64(reader.read_i64::<B>()?),
		};

		Ok(value)
	}

	/// Write the value to `writer`, using exactly [`MarkerWidth::size`] bytes
	///
	/// # Errors
	///
	/// Any I/O error
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::MarkerValue;
	///
	/// # fn main() -> tag_surgeon::error::Result<()> {
	/// let mut writer = Vec::new();
	/// MarkerValue::U16(0x0102).write(&mut writer, true)?;
	/// MarkerValue::U16(0x0102).write(&mut writer, false)?;
	/// assert_eq!(writer, [0x02, 0x01, 0x01, 0x02]);
	/// # Ok(()) }
	/// ```
	pub fn write<W>(self, writer: &mut W, little_endian: bool) -> Result<()>
	where
		W: Write,
	{
		if little_endian {
			self.write_with::<W, LittleEndian>(writer)
		} else {
			self.write_with::<W, BigEndian>(writer)
		}
	}

	fn write_with<W, B>(self, writer: &mut W) -> Result<()>
	where
		W: Write,
		B: ByteOrder,
	{
		match self {
			Self::U8(v) => writer.write_u8(v)?,
			Self::I8(v) => writer.write_i8(v)?,
			Self::U16(v) => writer.write_u16::<B>(v)?,
			Self::I16(v) => writer.write_i16::<B>(v)?,
			Self::U32(v) => writer.write_u32::<B>(v)?,
			Self::I32(v) => writer.write_i32::<B>(v)?,
			Self::U64(v) => writer.write_u64::<B>(v)?,
			Self::I64(v) => writer.write_i64::<B>(v)?,
		}

		Ok(())
	}
}

/// A structural field stored at a fixed offset in the stream
///
/// Markers are created through [`ZoneRegistry`](crate::structure::ZoneRegistry), and updated whenever
/// the zone they were registered against is rewritten.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Marker {
	pub(crate) kind: MarkerKind,
	pub(crate) position: u64,
	pub(crate) value: MarkerValue,
	pub(crate) little_endian: bool,
}

impl Marker {
	/// What the marker keeps track of
	pub fn kind(&self) -> MarkerKind {
		self.kind
	}

	/// The absolute offset of the marker in the stream
	pub fn position(&self) -> u64 {
		self.position
	}

	/// The last known value of the marker
	pub fn value(&self) -> MarkerValue {
		self.value
	}

	/// Whether the marker is stored little endian
	pub fn is_little_endian(&self) -> bool {
		self.little_endian
	}

	/// The offset of the first byte after the marker
	pub(crate) fn end(&self) -> u64 {
		self.position.saturating_add(self.value.width().size())
	}
}
