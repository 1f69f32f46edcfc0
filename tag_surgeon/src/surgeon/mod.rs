//! Rewriting zones of a stream in place
//!
//! A [`FileSurgeon`] asks a codec for the new content of each zone, resizes the zone's slot in the
//! stream to fit it, and keeps every marker registered in the [`ZoneRegistry`] up to date.
//!
//! There are two ways of applying the edits, see [`RewriteStrategy`]:
//!
//! * **Direct**: every zone is spliced straight into the stream. Used by default for a single zone.
//! * **Buffered**: the smallest span of the stream covering every zone and marker involved is loaded
//!   into memory, edited there, and spliced back into the stream in one go. Used by default when
//!   several zones are rewritten, as it moves the tail of the stream only once.
//!
//! Both produce the exact same stream.

mod embedding;
mod report;

pub use embedding::{EmbeddedSizeField, Embedding, EmbeddingHeader};
pub use report::{Progress, RewriteReport, ZoneChange};

use crate::config::{RewriteStrategy, WriteOptions};
use crate::error::{Result, SurgeonError};
use crate::io::{FileLike, Length, Resize};
use crate::macros::{err, try_vec};
use crate::splice;
use crate::structure::{
	InsertionPolicy, Marker, MarkerKind, MarkerValue, Zone, ZoneAction, ZoneRegistry,
};
use crate::util::alloc::buffer_len;
use crate::util::io::stream_len;

use std::io::{Cursor, SeekFrom};

/// How the content produced for a zone is applied
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteMode {
	/// The content replaces the zone, which is resized to fit it
	Replace,
	/// The content is written over the start of the zone, which keeps its size
	///
	/// The content must not be larger than the zone.
	Overwrite,
}

/// What a codec wrote for a zone
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WriteResult {
	/// How the written content is to be applied
	pub required_mode: WriteMode,
	/// The number of fields written
	///
	/// When this is `0`, the zone is emptied down to its core signature, whatever was written.
	pub fields_written: usize,
}

impl WriteResult {
	/// A result for content replacing the zone
	pub fn replace(fields_written: usize) -> Self {
		Self {
			required_mode: WriteMode::Replace,
			fields_written,
		}
	}

	/// A result for content written over the zone
	pub fn overwrite(fields_written: usize) -> Self {
		Self {
			required_mode: WriteMode::Overwrite,
			fields_written,
		}
	}
}

/// Applies new zone content to a stream
///
/// # Examples
///
/// ```rust
/// use std::io::{Cursor, Write};
/// use tag_surgeon::config::WriteOptions;
/// use tag_surgeon::structure::{MarkerValue, ZoneRegistry};
/// use tag_surgeon::surgeon::{FileSurgeon, WriteResult};
///
/// # fn main() -> tag_surgeon::error::Result<()> {
/// // A 4 byte big endian size, followed by the tag
/// let mut stream = Cursor::new(b"\0\0\0\x05hello".to_vec());
///
/// let mut registry = ZoneRegistry::new();
/// registry.add_zone("tag", 4, 5, &[]);
/// registry.add_size_marker("tag", 0, MarkerValue::U32(5), false);
///
/// let new_tag = "hello, world";
/// FileSurgeon::new(&mut registry, WriteOptions::new()).rewrite_zones(
/// 	&mut stream,
/// 	|buffer, tag: &str, _zone| {
/// 		buffer.write_all(tag.as_bytes())?;
/// 		Ok(WriteResult::replace(1))
/// 	},
/// 	["tag"],
/// 	new_tag,
/// )?;
///
/// assert_eq!(stream.get_ref(), b"\0\0\0\x0chello, world");
/// assert_eq!(registry.zone("tag").unwrap().size(), 12);
/// # Ok(()) }
/// ```
pub struct FileSurgeon<'a> {
	registry: &'a mut ZoneRegistry,
	options: WriteOptions,
	progress: Option<Box<dyn FnMut(Progress) + 'a>>,
	steps_done: usize,
	total_steps: usize,
}

impl<'a> FileSurgeon<'a> {
	/// Create a new `FileSurgeon` operating on the zones of `registry`
	pub fn new(registry: &'a mut ZoneRegistry, options: WriteOptions) -> Self {
		Self {
			registry,
			options,
			progress: None,
			steps_done: 0,
			total_steps: 0,
		}
	}

	/// Set a callback to be notified of the rewrite's [`Progress`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::config::WriteOptions;
	/// use tag_surgeon::structure::ZoneRegistry;
	/// use tag_surgeon::surgeon::FileSurgeon;
	///
	/// let mut registry = ZoneRegistry::new();
	/// let surgeon = FileSurgeon::new(&mut registry, WriteOptions::new())
	/// 	.progress(|progress| println!("{:.0}%", progress.fraction() * 100.0));
	/// ```
	pub fn progress<P>(mut self, callback: P) -> Self
	where
		P: FnMut(Progress) + 'a,
	{
		self.progress = Some(Box::new(callback));
		self
	}

	/// Rewrite `zones` with the content produced by `write_fn`
	///
	/// `write_fn` is called once per zone, in the order the zones were registered in (whatever the
	/// order of `zones`), with an empty buffer to write the zone's new content to. The zone passed to
	/// it is located where its content will be written.
	///
	/// Zones that don't exist yet (size of 0) are first moved according to their [`InsertionPolicy`].
	///
	/// Once this returns, every zone and marker in the registry describes the new layout of the
	/// stream, so the registry can be used for further rewrites. Markers stored in bytes cut from a
	/// shrinking zone are dropped from the registry, and index markers of the zones pushed around by
	/// a resize are updated along with them.
	///
	/// NOTE: There is no rollback in [`RewriteStrategy::Direct`] mode. Zones are spliced into the
	/// stream one after the other, so an error in the middle of a rewrite (including one returned by
	/// `write_fn`) may leave the stream half-written. Callers in need of a guarantee should keep
	/// a backup of the stream. In [`RewriteStrategy::Buffered`] mode, any error before the staged
	/// span is spliced back leaves both the stream and the registry untouched.
	///
	/// # Errors
	///
	/// * A zone isn't registered ([`ErrorKind::UnknownZone`](crate::error::ErrorKind::UnknownZone))
	/// * [`WriteMode::Overwrite`] content doesn't fit its zone, or a zone/marker lies outside the stream ([`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch))
	/// * A marker doesn't fit its new value ([`ErrorKind::MarkerOverflow`](crate::error::ErrorKind::MarkerOverflow))
	/// * The buffered span is over the allocation limit ([`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData))
	/// * `write_fn` fails
	/// * Any I/O error
	pub fn rewrite_zones<F, W, T, I>(
		&mut self,
		stream: &mut F,
		mut write_fn: W,
		zones: I,
		tag_data: &T,
	) -> Result<RewriteReport>
	where
		F: FileLike,
		SurgeonError: From<<F as Resize>::Error>,
		SurgeonError: From<<F as Length>::Error>,
		W: FnMut(&mut Cursor<Vec<u8>>, &T, &Zone) -> Result<WriteResult>,
		T: ?Sized,
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let mut indices = Vec::new();
		for name in zones {
			let name = name.as_ref();
			match self.registry.zone_index(name) {
				Some(index) => indices.push(index),
				None => err!(UnknownZone(name.to_owned())),
			}
		}

		// Zones are always processed in registration order
		indices.sort_unstable();
		indices.dedup();

		let strategy = match self.options.strategy {
			RewriteStrategy::Auto if indices.len() > 1 => RewriteStrategy::Buffered,
			RewriteStrategy::Auto => RewriteStrategy::Direct,
			strategy => strategy,
		};

		let mut report = RewriteReport::new(strategy);
		if indices.is_empty() {
			return Ok(report);
		}

		log::debug!(
			"Rewriting {} zone(s), strategy: {strategy:?}",
			indices.len()
		);

		self.steps_done = 0;
		self.total_steps = indices.len();

		if strategy == RewriteStrategy::Buffered {
			self.total_steps += 3;
			self.rewrite_buffered(stream, &mut write_fn, &indices, tag_data, &mut report)?;
			return Ok(report);
		}

		self.resolve_insertions(stream, &indices)?;
		if let Err(e) =
			self.rewrite_each(stream, &mut write_fn, &indices, tag_data, 0, &mut report)
		{
			log::warn!("Direct rewrite failed, the stream may be left partially written");
			return Err(e);
		}

		stream.flush()?;
		Ok(report)
	}

	// Zones that don't exist yet are moved to where they'll be created
	fn resolve_insertions<F>(&mut self, stream: &F, indices: &[usize]) -> Result<()>
	where
		F: FileLike,
		SurgeonError: From<<F as Resize>::Error>,
		SurgeonError: From<<F as Length>::Error>,
	{
		let len = stream_len(stream)?;
		for &index in indices {
			let zone = self.registry.zone_at_mut(index);
			if zone.size != 0 {
				continue;
			}

			let offset = match zone.insertion {
				InsertionPolicy::BuiltIn => continue,
				InsertionPolicy::StartOfFile => 0,
				InsertionPolicy::EndOfFile => len,
			};

			log::debug!(
				"Creating zone `{}` at offset {offset} ({:?})",
				zone.name,
				zone.insertion
			);
			zone.offset = offset;
		}

		Ok(())
	}

	fn rewrite_buffered<F, W, T>(
		&mut self,
		stream: &mut F,
		write_fn: &mut W,
		indices: &[usize],
		tag_data: &T,
		report: &mut RewriteReport,
	) -> Result<()>
	where
		F: FileLike,
		SurgeonError: From<<F as Resize>::Error>,
		SurgeonError: From<<F as Length>::Error>,
		W: FnMut(&mut Cursor<Vec<u8>>, &T, &Zone) -> Result<WriteResult>,
		T: ?Sized,
	{
		let snapshot = self.registry.clone();

		let (start, end, window) = match self.stage(stream, write_fn, indices, tag_data, report) {
			Ok(staged) => staged,
			Err(e) => {
				log::debug!("Buffered rewrite failed, the stream was left untouched");
				*self.registry = snapshot;
				return Err(e);
			},
		};

		let buffer_size = self.options.copy_buffer_size;

		let old_len = end - start;
		let new_len = window.len() as u64;
		if new_len > old_len {
			splice::lengthen(stream, end, new_len - old_len, false, buffer_size)?;
		} else if new_len < old_len {
			splice::shorten(stream, end, old_len - new_len, buffer_size)?;
		}
		self.step();

		stream.seek(SeekFrom::Start(start))?;
		splice::copy(&mut &window[..], stream, new_len, buffer_size)?;
		stream.flush()?;
		self.step();

		Ok(())
	}

	// Loads the span of the stream covering every zone, and rewrites the zones in memory
	//
	// Returns the bounds of the span in the original stream, along with its new content.
	fn stage<F, W, T>(
		&mut self,
		stream: &mut F,
		write_fn: &mut W,
		indices: &[usize],
		tag_data: &T,
		report: &mut RewriteReport,
	) -> Result<(u64, u64, Vec<u8>)>
	where
		F: FileLike,
		SurgeonError: From<<F as Resize>::Error>,
		SurgeonError: From<<F as Length>::Error>,
		W: FnMut(&mut Cursor<Vec<u8>>, &T, &Zone) -> Result<WriteResult>,
		T: ?Sized,
	{
		self.resolve_insertions(stream, indices)?;

		let (start, end) = self.span(indices);
		if end > stream_len(stream)? {
			err!(SizeMismatch);
		}

		log::debug!("Staging bytes {start}..{end} of the stream");

		let mut window = try_vec![0u8; buffer_len(end - start)?];
		stream.seek(SeekFrom::Start(start))?;
		stream.read_exact(&mut window)?;
		self.step();

		let mut window = Cursor::new(window);
		self.rewrite_each(&mut window, write_fn, indices, tag_data, start, report)?;

		Ok((start, end, window.into_inner()))
	}

	// The smallest range of the stream holding every zone and marker involved
	//
	// This includes the index markers of the zones that may get moved.
	fn span(&self, indices: &[usize]) -> (u64, u64) {
		let mut start = u64::MAX;
		let mut end = 0;

		for &index in indices {
			let zone = self.registry.zone_at(index);
			start = start.min(zone.offset);
			end = end.max(zone.end());

			for marker in &zone.markers {
				start = start.min(marker.position);
				end = end.max(marker.end());
			}
		}

		let first_zone = indices
			.iter()
			.map(|&index| self.registry.zone_at(index).offset)
			.min()
			.unwrap_or(start);
		for marker in self.registry.index_markers_from(first_zone) {
			start = start.min(marker.position);
			end = end.max(marker.end());
		}

		(start, end)
	}

	fn rewrite_each<F, W, T>(
		&mut self,
		stream: &mut F,
		write_fn: &mut W,
		indices: &[usize],
		tag_data: &T,
		global_offset_correction: u64,
		report: &mut RewriteReport,
	) -> Result<()>
	where
		F: FileLike,
		SurgeonError: From<<F as Resize>::Error>,
		SurgeonError: From<<F as Length>::Error>,
		W: FnMut(&mut Cursor<Vec<u8>>, &T, &Zone) -> Result<WriteResult>,
		T: ?Sized,
	{
		for &index in indices {
			let change =
				self.rewrite_zone(stream, write_fn, index, tag_data, global_offset_correction)?;
			report.changes.push(change);
			self.step();
		}

		Ok(())
	}

	fn rewrite_zone<F, W, T>(
		&mut self,
		stream: &mut F,
		write_fn: &mut W,
		index: usize,
		tag_data: &T,
		global_offset_correction: u64,
	) -> Result<ZoneChange>
	where
		F: FileLike,
		SurgeonError: From<<F as Resize>::Error>,
		SurgeonError: From<<F as Length>::Error>,
		W: FnMut(&mut Cursor<Vec<u8>>, &T, &Zone) -> Result<WriteResult>,
		T: ?Sized,
	{
		let mut buffer = Cursor::new(Vec::new());
		let result = write_fn(&mut buffer, tag_data, self.registry.zone_at(index))?;
		let content = buffer.into_inner();

		let zone = self.registry.zone_at(index);
		let name = zone.name.clone();
		let offset = zone.offset;
		let old_size = zone.size;
		let was_present = zone.is_present();
		let buffer_size = self.options.copy_buffer_size;

		let Some(local_offset) = offset.checked_sub(global_offset_correction) else {
			err!(SizeMismatch);
		};

		// Nothing may be written past the end of the stream
		let len = stream_len(stream)? + global_offset_correction;
		let marker_end = zone
			.markers
			.iter()
			.chain(self.registry.index_markers_from(offset))
			.map(Marker::end)
			.max()
			.unwrap_or(0);
		if zone.end() > len || marker_end > len {
			err!(SizeMismatch);
		}

		if result.required_mode == WriteMode::Overwrite {
			if content.len() as u64 > old_size {
				err!(SizeMismatch);
			}

			log::debug!("Overwriting {} bytes of zone `{name}`", content.len());

			stream.seek(SeekFrom::Start(local_offset))?;
			splice::copy(&mut &content[..], stream, content.len() as u64, buffer_size)?;
			self.registry.rewrite_zone_markers(
				stream,
				0,
				ZoneAction::Edit,
				index,
				global_offset_correction,
			)?;

			return Ok(ZoneChange {
				name,
				old_size,
				new_size: old_size,
				action: ZoneAction::Edit,
			});
		}

		let now_present = result.fields_written > 0;

		let mut header = None;
		let payload = if now_present {
			if old_size == 0 {
				header = zone.embedding.header_for(content.len() as u64)?;
			}
			content
		} else if old_size == 0 {
			// Never existed, and still has nothing to hold
			Vec::new()
		} else {
			zone.core_signature.clone()
		};

		let header_len = header.as_ref().map_or(0, |(bytes, _)| bytes.len() as u64);
		let new_size = header_len + payload.len() as u64;

		log::debug!("Zone `{name}`: {old_size} -> {new_size} bytes");

		let old_end = local_offset + old_size;
		if new_size > old_size {
			splice::lengthen(
				stream,
				old_end,
				new_size - old_size,
				self.options.zero_fill,
				buffer_size,
			)?;
		} else if new_size < old_size {
			splice::shorten(stream, old_end, old_size - new_size, buffer_size)?;
		}

		stream.seek(SeekFrom::Start(local_offset))?;
		if let Some((bytes, _)) = &header {
			stream.write_all(bytes)?;
		}
		splice::copy(&mut &payload[..], stream, payload.len() as u64, buffer_size)?;

		let Ok(delta) = i64::try_from(i128::from(new_size) - i128::from(old_size)) else {
			err!(TooMuchData);
		};

		let action = match (was_present, now_present) {
			(false, true) => ZoneAction::Add,
			(true, false) => ZoneAction::Delete,
			_ => ZoneAction::Edit,
		};

		// Nothing is left to point at in the removed bytes
		if new_size < old_size {
			self.registry
				.drop_markers_within(offset + new_size, offset + old_size);
		}

		let moved_zones = self.registry.shift_after(offset + old_size, delta, index)?;

		let zone = self.registry.zone_at_mut(index);
		zone.size = new_size;

		// The header stays outside of the zone, only its size field is tracked from now on
		if header.is_some() {
			zone.offset = offset + header_len;
			zone.size = payload.len() as u64;
		}

		self.registry.rewrite_zone_markers(
			stream,
			delta,
			action,
			index,
			global_offset_correction,
		)?;

		// Index markers of the zones pushed around by this one
		for moved in moved_zones {
			self.registry.rewrite_zone_markers(
				stream,
				0,
				ZoneAction::Edit,
				moved,
				global_offset_correction,
			)?;
		}

		if let Some((_, Some(field))) = header {
			let position = offset + field.offset;
			let size = i128::from(payload.len() as u64);
			let Some(value) = MarkerValue::with_width(field.width, size) else {
				err!(MarkerOverflow { position });
			};

			self.registry.push_marker(
				index,
				Marker {
					kind: MarkerKind::Size,
					position,
					value,
					little_endian: field.little_endian,
				},
			);
		}

		Ok(ZoneChange {
			name,
			old_size,
			new_size,
			action,
		})
	}

	fn step(&mut self) {
		self.steps_done += 1;
		if let Some(callback) = self.progress.as_mut() {
			callback(Progress {
				steps_done: self.steps_done,
				total_steps: self.total_steps,
			});
		}
	}
}
