//! # Letters
//!
//! Herein are the letter-multiset primitives that drive the whole search:
//! containment and difference over plain strings, plus [`LetterBag`], the
//! compact count vector that the enumerator uses on its hot path.

use std::ops::Index;

use smallvec::SmallVec;

////////////////////////////////////////////////////////////////////////////////
//                             String multisets.                              //
////////////////////////////////////////////////////////////////////////////////

/// Check whether every character of `child`, counted with multiplicity, can be
/// matched to a distinct occurrence in `master`.
///
/// # Arguments
///
/// * `master` - The available letters.
/// * `child` - The letters to match.
///
/// # Returns
///
/// `true` if `child` is a sub-multiset of `master`, `false` otherwise.
#[must_use]
pub fn is_subset(master: &str, child: &str) -> bool
{
	let mut available = master.chars().collect::<Vec<_>>();
	for c in child.chars()
	{
		match available.iter().position(|&a| a == c)
		{
			Some(index) => { available.remove(index); },
			None => return false
		}
	}
	true
}

/// Compute the letters that remain in `master` after removing, once each,
/// every character of `child`. Characters of `child` that do not occur in
/// `master` are ignored, so the difference is always defined. The surviving
/// letters keep their order from `master`.
///
/// # Arguments
///
/// * `master` - The available letters.
/// * `child` - The letters to remove.
///
/// # Returns
///
/// The remaining letters.
#[must_use]
pub fn difference(master: &str, child: &str) -> String
{
	let mut remaining = master.chars().collect::<Vec<_>>();
	for c in child.chars()
	{
		if let Some(index) = remaining.iter().position(|&r| r == c)
		{
			remaining.remove(index);
		}
	}
	remaining.into_iter().collect()
}

////////////////////////////////////////////////////////////////////////////////
//                                Letter bags.                                //
////////////////////////////////////////////////////////////////////////////////

/// A multiset of letters, stored as one count per slot of an
/// [`Alphabet`](crate::alphabet::Alphabet). Bags are only comparable when
/// they were encoded against the same alphabet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[must_use]
pub struct LetterBag(SmallVec<[u16; 32]>);

impl LetterBag
{
	/// Construct an empty bag with the given number of slots.
	#[inline]
	pub fn zeroed(slots: usize) -> Self
	{
		Self(SmallVec::from_elem(0, slots))
	}

	/// Construct a bag directly from per-slot counts.
	#[inline]
	pub fn from_counts(counts: &[u16]) -> Self
	{
		Self(SmallVec::from_slice(counts))
	}

	/// Increment the count of the given slot.
	#[inline]
	pub(crate) fn add_one(&mut self, slot: usize)
	{
		self.0[slot] += 1;
	}

	/// The number of slots.
	#[inline]
	#[must_use]
	pub fn slots(&self) -> usize
	{
		self.0.len()
	}

	/// The total number of letters in the bag.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize
	{
		self.0.iter().map(|&n| n as usize).sum()
	}

	/// Check whether the bag holds no letters at all.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool
	{
		self.0.iter().all(|&n| n == 0)
	}

	/// Check whether `other` fits inside this bag, i.e., whether every slot of
	/// `other` has a count no larger than the corresponding slot here.
	///
	/// # Arguments
	///
	/// * `other` - The candidate sub-multiset.
	///
	/// # Returns
	///
	/// `true` if `other` is a sub-multiset of this bag, `false` otherwise.
	#[inline]
	#[must_use]
	pub fn contains(&self, other: &LetterBag) -> bool
	{
		debug_assert_eq!(self.slots(), other.slots());
		self.0.iter().zip(other.0.iter()).all(|(&have, &need)| need <= have)
	}

	/// Remove the letters of `other`, saturating at zero per slot.
	///
	/// # Arguments
	///
	/// * `other` - The letters to remove.
	///
	/// # Returns
	///
	/// The remaining letters.
	pub fn difference(&self, other: &LetterBag) -> LetterBag
	{
		debug_assert_eq!(self.slots(), other.slots());
		LetterBag(
			self.0.iter()
				.zip(other.0.iter())
				.map(|(&have, &used)| have.saturating_sub(used))
				.collect()
		)
	}
}

impl Index<usize> for LetterBag
{
	type Output = u16;

	#[inline]
	fn index(&self, slot: usize) -> &Self::Output
	{
		&self.0[slot]
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
