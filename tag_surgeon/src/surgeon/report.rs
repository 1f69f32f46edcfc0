use crate::config::RewriteStrategy;
use crate::structure::ZoneAction;

/// How far along a rewrite is
///
/// Reported after every zone, and in [`RewriteStrategy::Buffered`] mode, after the span is
/// loaded, spliced, and flushed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
	/// The number of steps completed so far
	pub steps_done: usize,
	/// The number of steps in the whole rewrite
	pub total_steps: usize,
}

impl Progress {
	/// The completed share of the rewrite, from `0.0` to `1.0`
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::surgeon::Progress;
	///
	/// let progress = Progress {
	/// 	steps_done: 1,
	/// 	total_steps: 4,
	/// };
	/// assert_eq!(progress.fraction(), 0.25);
	/// ```
	pub fn fraction(self) -> f32 {
		if self.total_steps == 0 {
			return 1.0;
		}

		self.steps_done as f32 / self.total_steps as f32
	}
}

/// What happened to a single zone during a rewrite
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneChange {
	/// The name of the zone
	pub name: String,
	/// The size of the zone before the rewrite
	pub old_size: u64,
	/// The size of the zone after the rewrite, including any newly written embedding header
	pub new_size: u64,
	/// The action applied to the zone's markers
	pub action: ZoneAction,
}

impl ZoneChange {
	/// The number of bytes the zone grew by (negative if it shrunk)
	pub fn delta(&self) -> i128 {
		i128::from(self.new_size) - i128::from(self.old_size)
	}
}

/// The outcome of a [`FileSurgeon::rewrite_zones`](crate::surgeon::FileSurgeon::rewrite_zones) call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteReport {
	pub(crate) strategy: RewriteStrategy,
	pub(crate) changes: Vec<ZoneChange>,
}

impl RewriteReport {
	pub(crate) fn new(strategy: RewriteStrategy) -> Self {
		Self {
			strategy,
			changes: Vec::new(),
		}
	}

	/// The strategy the rewrite was performed with
	///
	/// This is never [`RewriteStrategy::Auto`].
	pub fn strategy(&self) -> RewriteStrategy {
		self.strategy
	}

	/// Every rewritten zone, in the order they were processed
	pub fn changes(&self) -> &[ZoneChange] {
		&self.changes
	}

	/// The number of bytes the stream grew by (negative if it shrunk)
	pub fn size_delta(&self) -> i128 {
		self.changes.iter().map(ZoneChange::delta).sum()
	}
}
