//! # Partitioning
//!
//! The search space is sliced into [work units](WorkUnit), one per pair of
//! phrase length and root index. Units are disjoint and, taken together,
//! cover the unrestricted search exactly once.

use std::{
	collections::VecDeque,
	fmt::{self, Display, Formatter},
	ops::RangeInclusive
};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::enumerator::SearchBounds;

////////////////////////////////////////////////////////////////////////////////
//                                Work units.                                 //
////////////////////////////////////////////////////////////////////////////////

/// One restricted enumeration: Found Sets of exactly `length` words whose
/// first word is the dictionary word at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkUnit
{
	/// The number of words in every Found Set of this unit.
	pub length: usize,

	/// The dictionary index of the first word of every Found Set of this unit.
	pub start: usize
}

impl WorkUnit
{
	/// The enumeration bounds that realize this unit.
	#[inline]
	pub fn bounds(&self) -> SearchBounds
	{
		SearchBounds::rooted(self.length, self.start)
	}
}

impl Display for WorkUnit
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		write!(f, "{}@{}", self.length, self.start)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                               Partitioner.                                 //
////////////////////////////////////////////////////////////////////////////////

/// Emits every [`WorkUnit`] for a range of lengths over a dictionary of a
/// given size, in row-major order: all root indices of one length before the
/// next length. Units handed back via [`reissue`](Self::reissue) take
/// precedence over fresh ones.
#[derive(Clone, Debug)]
#[must_use]
pub struct Partitioner
{
	/// The first length to cover.
	min_length: usize,

	/// The last length to cover.
	max_length: usize,

	/// The number of words in the dictionary.
	dictionary_len: usize,

	/// The next fresh unit.
	next: WorkUnit,

	/// Units to hand out again, oldest first.
	reissued: VecDeque<WorkUnit>
}

impl Partitioner
{
	/// Construct a partitioner.
	///
	/// # Arguments
	///
	/// * `lengths` - The lengths to cover, inclusive.
	/// * `dictionary_len` - The number of words in the dictionary.
	///
	/// # Returns
	///
	/// A partitioner positioned at the first unit.
	pub fn new(lengths: RangeInclusive<usize>, dictionary_len: usize) -> Self
	{
		Self
		{
			min_length: *lengths.start(),
			max_length: *lengths.end(),
			dictionary_len,
			next: WorkUnit { length: *lengths.start(), start: 0 },
			reissued: VecDeque::new()
		}
	}

	/// The total number of fresh units, including any already issued.
	#[must_use]
	pub fn total(&self) -> usize
	{
		self.max_length
			.checked_sub(self.min_length)
			.map_or(0, |span| (span + 1) * self.dictionary_len)
	}

	/// Hand a unit out again, e.g., after its worker failed.
	pub fn reissue(&mut self, unit: WorkUnit)
	{
		trace!("reissuing unit: {}", unit);
		self.reissued.push_back(unit);
	}

	/// Check whether any unit remains to be issued.
	#[must_use]
	pub fn is_exhausted(&self) -> bool
	{
		self.reissued.is_empty() && !self.has_fresh()
	}

	/// Check whether a fresh unit remains.
	fn has_fresh(&self) -> bool
	{
		self.dictionary_len > 0 && self.next.length <= self.max_length
	}
}

impl Iterator for Partitioner
{
	type Item = WorkUnit;

	fn next(&mut self) -> Option<Self::Item>
	{
		if let Some(unit) = self.reissued.pop_front()
		{
			return Some(unit)
		}
		if !self.has_fresh()
		{
			return None
		}
		let unit = self.next;
		self.next.start += 1;
		if self.next.start >= self.dictionary_len
		{
			self.next = WorkUnit { length: unit.length + 1, start: 0 };
		}
		Some(unit)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
