use super::marker::{Marker, MarkerKind, MarkerValue};
use super::zone::{InsertionPolicy, Zone, ZoneAction};
use crate::error::Result;
use crate::macros::err;
use crate::surgeon::Embedding;

use std::collections::{BTreeMap, HashMap};
use std::io::{Seek, SeekFrom, Write};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct MarkerRef {
	zone: usize,
	marker: usize,
}

/// The set of zones and markers making up a stream's structure
///
/// Codecs fill the registry while parsing a stream, and hand it to a
/// [`FileSurgeon`](crate::surgeon::FileSurgeon) when writing.
///
/// Markers registered under different zones may share a position. This happens when a container's
/// size field covers several zones. Such markers are kept in sync: updating one updates all of them.
///
/// # Examples
///
/// ```rust
/// use tag_surgeon::structure::{MarkerValue, ZoneRegistry};
///
/// // RIFF....WAVE followed by a single "LIST" chunk of 26 bytes
/// let mut registry = ZoneRegistry::new();
/// registry.add_zone("riff_info", 20, 26, &[]);
/// registry.add_size_marker("riff_info", 4, MarkerValue::U32(38), true);
/// registry.add_size_marker("riff_info", 16, MarkerValue::U32(26), true);
///
/// assert_eq!(registry.zone("riff_info").unwrap().markers().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneRegistry {
	zones: Vec<Zone>,
	names: HashMap<String, usize>,
	positions: BTreeMap<u64, Vec<MarkerRef>>,
}

impl ZoneRegistry {
	/// Create an empty `ZoneRegistry`
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a zone, or update the location of an existing one
	///
	/// Updating a zone keeps all of its markers.
	pub fn add_zone(
		&mut self,
		name: impl Into<String>,
		offset: u64,
		size: u64,
		core_signature: &[u8],
	) {
		let name = name.into();

		match self.names.get(&name) {
			Some(&index) => {
				let zone = &mut self.zones[index];
				zone.offset = offset;
				zone.size = size;
				zone.core_signature = core_signature.to_vec();
			},
			None => {
				log::trace!("Registering zone `{name}` (offset: {offset}, size: {size})");

				self.names.insert(name.clone(), self.zones.len());
				self.zones
					.push(Zone::new(name, offset, size, core_signature.to_vec()));
			},
		}
	}

	/// Register a marker holding the size of `zone`
	///
	/// If `zone` isn't registered yet, it is created at offset 0 with a size of 0.
	pub fn add_size_marker(
		&mut self,
		zone: &str,
		position: u64,
		initial_value: MarkerValue,
		little_endian: bool,
	) {
		self.add_marker(zone, MarkerKind::Size, position, initial_value, little_endian);
	}

	/// Register a marker counting the items of a container `zone` is one of
	///
	/// If `zone` isn't registered yet, it is created at offset 0 with a size of 0.
	pub fn add_counter_marker(
		&mut self,
		zone: &str,
		position: u64,
		initial_value: MarkerValue,
		little_endian: bool,
	) {
		self.add_marker(zone, MarkerKind::Counter, position, initial_value, little_endian);
	}

	/// Register a marker holding the absolute offset of `zone`
	///
	/// If `zone` isn't registered yet, it is created at offset 0 with a size of 0.
	pub fn add_index_marker(
		&mut self,
		zone: &str,
		position: u64,
		initial_value: MarkerValue,
		little_endian: bool,
	) {
		self.add_marker(zone, MarkerKind::Index, position, initial_value, little_endian);
	}

	fn add_marker(
		&mut self,
		zone: &str,
		kind: MarkerKind,
		position: u64,
		value: MarkerValue,
		little_endian: bool,
	) {
		let zone_index = match self.names.get(zone) {
			Some(&index) => index,
			None => {
				log::debug!("Marker registered before its zone, creating an empty `{zone}`");
				self.add_zone(zone, 0, 0, &[]);
				self.zones.len() - 1
			},
		};

		let markers = &mut self.zones[zone_index].markers;
		self.positions.entry(position).or_default().push(MarkerRef {
			zone: zone_index,
			marker: markers.len(),
		});

		markers.push(Marker {
			kind,
			position,
			value,
			little_endian,
		});
	}

	/// Set where `zone` gets created if it doesn't exist yet
	///
	/// Returns `false` if the zone isn't registered.
	pub fn set_insertion_policy(&mut self, zone: &str, policy: InsertionPolicy) -> bool {
		match self.zone_mut(zone) {
			Some(zone) => {
				zone.insertion = policy;
				true
			},
			None => false,
		}
	}

	/// Set the envelope written around `zone` when it's created
	///
	/// Returns `false` if the zone isn't registered.
	pub fn set_embedding(&mut self, zone: &str, embedding: Embedding) -> bool {
		match self.zone_mut(zone) {
			Some(zone) => {
				zone.embedding = embedding;
				true
			},
			None => false,
		}
	}

	/// Get a zone by name
	pub fn zone(&self, name: &str) -> Option<&Zone> {
		self.names.get(name).map(|&index| &self.zones[index])
	}

	fn zone_mut(&mut self, name: &str) -> Option<&mut Zone> {
		self.names.get(name).map(|&index| &mut self.zones[index])
	}

	/// Whether a zone named `name` is registered
	pub fn contains_zone(&self, name: &str) -> bool {
		self.names.contains_key(name)
	}

	/// All zones, in registration order
	pub fn zones(&self) -> impl Iterator<Item = &Zone> {
		self.zones.iter()
	}

	/// The names of all zones, in registration order
	pub fn zone_names(&self) -> impl Iterator<Item = &str> {
		self.zones.iter().map(Zone::name)
	}

	/// Every marker stored at `position`, whichever zone it was registered against
	pub fn markers_at(&self, position: u64) -> impl Iterator<Item = &Marker> {
		self.positions
			.get(&position)
			.into_iter()
			.flatten()
			.map(|r| &self.zones[r.zone].markers[r.marker])
	}

	/// The number of registered zones
	pub fn len(&self) -> usize {
		self.zones.len()
	}

	/// Whether no zone is registered
	pub fn is_empty(&self) -> bool {
		self.zones.is_empty()
	}

	/// Remove a zone and all of its markers
	///
	/// Markers of other zones sharing a position with the removed ones are kept.
	pub fn remove_zone(&mut self, name: &str) -> Option<Zone> {
		let index = self.names.remove(name)?;
		let zone = self.zones.remove(index);

		for i in self.names.values_mut() {
			if *i > index {
				*i -= 1;
			}
		}

		self.rebuild_positions();
		Some(zone)
	}

	/// Remove every zone and marker
	pub fn clear(&mut self) {
		self.zones.clear();
		self.names.clear();
		self.positions.clear();
	}

	fn rebuild_positions(&mut self) {
		self.positions.clear();
		for (zone_index, zone) in self.zones.iter().enumerate() {
			for (marker_index, marker) in zone.markers.iter().enumerate() {
				self.positions
					.entry(marker.position)
					.or_default()
					.push(MarkerRef {
						zone: zone_index,
						marker: marker_index,
					});
			}
		}
	}

	/// Update and write every marker of `zone_name` after its zone changed by `delta_size` bytes
	///
	/// * [`MarkerKind::Size`] markers move by `delta_size`
	/// * [`MarkerKind::Counter`] markers move by 1 on [`ZoneAction::Add`], and by -1 on [`ZoneAction::Delete`]
	/// * [`MarkerKind::Index`] markers are set to the zone's offset, or to 0 on [`ZoneAction::Delete`]
	///   (an [`ZoneAction::Edit`] of an absent zone leaves them alone)
	///
	/// Every marker sharing a position with an updated marker receives the same value.
	///
	/// `writer` is expected to start at `global_offset_correction` in the stream, markers are written
	/// at `position - global_offset_correction`.
	///
	/// # Errors
	///
	/// * `zone_name` isn't registered ([`ErrorKind::UnknownZone`](crate::error::ErrorKind::UnknownZone))
	/// * A marker doesn't fit its new value ([`ErrorKind::MarkerOverflow`](crate::error::ErrorKind::MarkerOverflow))
	/// * A marker lies before `global_offset_correction` ([`ErrorKind::SizeMismatch`](crate::error::ErrorKind::SizeMismatch))
	/// * Any I/O error
	///
	/// # Examples
	///
	/// ```rust
	/// use std::io::Cursor;
	/// use tag_surgeon::structure::{MarkerValue, ZoneAction, ZoneRegistry};
	///
	/// # fn main() -> tag_surgeon::error::Result<()> {
	/// let mut registry = ZoneRegistry::new();
	/// registry.add_zone("tag", 2, 10, &[]);
	/// registry.add_size_marker("tag", 0, MarkerValue::U16(10), false);
	///
	/// let mut stream = Cursor::new(vec![0u8; 12]);
	/// registry.rewrite_markers(&mut stream, -4, ZoneAction::Edit, "tag", 0)?;
	///
	/// assert_eq!(&stream.get_ref()[..2], &[0, 6]);
	/// # Ok(()) }
	/// ```
	pub fn rewrite_markers<W>(
		&mut self,
		writer: &mut W,
		delta_size: i64,
		action: ZoneAction,
		zone_name: &str,
		global_offset_correction: u64,
	) -> Result<()>
	where
		W: Write + Seek,
	{
		let Some(&zone_index) = self.names.get(zone_name) else {
			err!(UnknownZone(zone_name.to_owned()));
		};

		self.rewrite_zone_markers(
			writer,
			delta_size,
			action,
			zone_index,
			global_offset_correction,
		)
	}

	pub(crate) fn rewrite_zone_markers<W>(
		&mut self,
		writer: &mut W,
		delta_size: i64,
		action: ZoneAction,
		zone_index: usize,
		global_offset_correction: u64,
	) -> Result<()>
	where
		W: Write + Seek,
	{
		let zone_offset = self.zones[zone_index].offset;
		let zone_present = self.zones[zone_index].is_present();

		for marker_index in 0..self.zones[zone_index].markers.len() {
			let marker = self.zones[zone_index].markers[marker_index];

			let new_value = match marker.kind {
				MarkerKind::Counter => {
					let delta = match action {
						ZoneAction::Add => 1,
						ZoneAction::Delete => -1,
						ZoneAction::Edit => 0,
					};

					if delta == 0 {
						continue;
					}

					marker.value.checked_add(delta)
				},
				MarkerKind::Size => {
					if delta_size == 0 {
						continue;
					}

					marker.value.checked_add(delta_size)
				},
				MarkerKind::Index => {
					let target = match action {
						ZoneAction::Delete => 0,
						ZoneAction::Add => zone_offset,
						ZoneAction::Edit if zone_present => zone_offset,
						// Still nothing to point at
						ZoneAction::Edit => continue,
					};

					let value = MarkerValue::with_width(marker.value.width(), i128::from(target));
					if value == Some(marker.value) {
						continue;
					}

					value
				},
			};

			let Some(new_value) = new_value else {
				err!(MarkerOverflow {
					position: marker.position
				});
			};

			let Some(local_position) = marker.position.checked_sub(global_offset_correction) else {
				err!(SizeMismatch);
			};

			log::trace!(
				"Updating {:?} marker at offset {}: {:?} -> {:?}",
				marker.kind,
				marker.position,
				marker.value,
				new_value
			);

			writer.seek(SeekFrom::Start(local_position))?;
			new_value.write(writer, marker.little_endian)?;

			// Aliased markers, including this one
			if let Some(aliases) = self.positions.get(&marker.position) {
				for alias in aliases {
					self.zones[alias.zone].markers[alias.marker].value = new_value;
				}
			}
		}

		Ok(())
	}

	pub(crate) fn zone_index(&self, name: &str) -> Option<usize> {
		self.names.get(name).copied()
	}

	pub(crate) fn zone_at(&self, index: usize) -> &Zone {
		&self.zones[index]
	}

	pub(crate) fn zone_at_mut(&mut self, index: usize) -> &mut Zone {
		&mut self.zones[index]
	}

	/// Move everything located at or after `threshold` by `delta` bytes, after a zone was resized
	///
	/// The zone at `resized` is left where it is. Returns the indices of the zones that moved.
	pub(crate) fn shift_after(
		&mut self,
		threshold: u64,
		delta: i64,
		resized: usize,
	) -> Result<Vec<usize>> {
		let mut moved_zones = Vec::new();
		if delta == 0 {
			return Ok(moved_zones);
		}

		for (index, zone) in self.zones.iter_mut().enumerate() {
			if index == resized || zone.offset < threshold {
				continue;
			}

			let Some(offset) = zone.offset.checked_add_signed(delta) else {
				err!(SizeMismatch);
			};
			zone.offset = offset;
			moved_zones.push(index);
		}

		let moved = self.positions.split_off(&threshold);
		for (position, refs) in moved {
			let Some(new_position) = position.checked_add_signed(delta) else {
				err!(SizeMismatch);
			};

			for r in &refs {
				self.zones[r.zone].markers[r.marker].position = new_position;
			}

			self.positions.entry(new_position).or_default().extend(refs);
		}

		Ok(moved_zones)
	}

	/// Forget every marker overlapping `start..end`, after those bytes were cut from the stream
	pub(crate) fn drop_markers_within(&mut self, start: u64, end: u64) {
		let mut dropped = false;
		for zone in &mut self.zones {
			let before = zone.markers.len();
			let name = &zone.name;
			zone.markers.retain(|marker| {
				let overlaps = marker.position < end && marker.end() > start;
				if overlaps {
					log::debug!(
						"Dropping {:?} marker of `{}` at offset {}, its bytes were removed",
						marker.kind,
						name,
						marker.position
					);
				}

				!overlaps
			});

			dropped |= zone.markers.len() != before;
		}

		if dropped {
			self.rebuild_positions();
		}
	}

	/// The index markers of every zone located at or after `offset`
	pub(crate) fn index_markers_from(&self, offset: u64) -> impl Iterator<Item = &Marker> {
		self.zones
			.iter()
			.filter(move |zone| zone.offset >= offset)
			.flat_map(|zone| zone.markers.iter())
			.filter(|marker| marker.kind == MarkerKind::Index)
	}

	/// Register the markers of a freshly created zone, without touching the stream
	pub(crate) fn push_marker(&mut self, zone_index: usize, marker: Marker) {
		let markers = &mut self.zones[zone_index].markers;
		self.positions
			.entry(marker.position)
			.or_default()
			.push(MarkerRef {
				zone: zone_index,
				marker: markers.len(),
			});

		markers.push(marker);
	}
}
