/// How a [`FileSurgeon`](crate::surgeon::FileSurgeon) applies its edits to the stream
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum RewriteStrategy {
	/// Pick the strategy from the number of zones being rewritten
	///
	/// A single zone is rewritten [`Direct`](Self::Direct)ly, anything more is [`Buffered`](Self::Buffered).
	#[default]
	Auto,
	/// Every zone is spliced straight into the stream
	///
	/// This keeps memory usage at a minimum, but every resized zone moves the entire tail of
	/// the stream.
	Direct,
	/// The span covering all zones and markers is staged in memory, edited, and spliced back in one go
	Buffered,
}

/// Options to control how tag_surgeon writes to a stream
///
/// This is best used as an application global config that gets set once.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) strategy: RewriteStrategy,
	pub(crate) copy_buffer_size: usize,
	pub(crate) zero_fill: bool,
}

impl WriteOptions {
	/// Default size of the blocks moved around while splicing, in bytes
	pub const DEFAULT_COPY_BUFFER_SIZE: usize = 16 * 1024;

	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			strategy: RewriteStrategy::Auto,
			copy_buffer_size: Self::DEFAULT_COPY_BUFFER_SIZE,
			zero_fill: false,
		}
	}

	/// Force a specific [`RewriteStrategy`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::config::{RewriteStrategy, WriteOptions};
	///
	/// // My zones are megabytes apart, never stage them in memory
	/// let options = WriteOptions::new().strategy(RewriteStrategy::Direct);
	/// ```
	pub fn strategy(mut self, strategy: RewriteStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	/// Set the size of the blocks moved around while splicing, in bytes
	///
	/// A size of `0` is treated as `1`.
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::config::WriteOptions;
	///
	/// // Move the stream tail around in 1 MiB blocks
	/// let options = WriteOptions::new().copy_buffer_size(1024 * 1024);
	/// ```
	pub fn copy_buffer_size(mut self, copy_buffer_size: usize) -> Self {
		self.copy_buffer_size = copy_buffer_size.max(1);
		self
	}

	/// Whether to zero the gap opened when a zone grows
	///
	/// The gap is always overwritten by the zone's new content right after, so this is only
	/// useful when debugging.
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::config::WriteOptions;
	///
	/// let options = WriteOptions::new().zero_fill(true);
	/// ```
	pub fn zero_fill(mut self, zero_fill: bool) -> Self {
		self.zero_fill = zero_fill;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	///     strategy: RewriteStrategy::Auto,
	///     copy_buffer_size: 16384,
	///     zero_fill: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
