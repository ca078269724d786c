//! # Alphabet
//!
//! The alphabet is the multiset of letters of the target phrase, sans
//! whitespace. Every candidate word and every partial phrase is measured
//! against it.

use log::trace;

use crate::letters::LetterBag;

/// The multiset of letters that every Found Set must consume exactly. Immutable
/// once built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Alphabet
{
	/// The letters of the target phrase, in phrase order, without whitespace.
	letters: String,

	/// The distinct letters, sorted. The position of a letter here is its slot
	/// in every [`LetterBag`] encoded against this alphabet.
	slots: Vec<char>,

	/// The letters, as a bag.
	bag: LetterBag
}

impl Alphabet
{
	/// Build the alphabet of the given phrase. All whitespace is discarded.
	///
	/// # Arguments
	///
	/// * `phrase` - The target phrase.
	///
	/// # Returns
	///
	/// The alphabet of the phrase.
	pub fn from_phrase(phrase: &str) -> Self
	{
		let letters = phrase.chars()
			.filter(|c| !c.is_whitespace())
			.collect::<String>();
		let mut slots = letters.chars().collect::<Vec<_>>();
		slots.sort_unstable();
		slots.dedup();
		let mut bag = LetterBag::zeroed(slots.len());
		for c in letters.chars()
		{
			// Every letter was just recorded as a slot.
			if let Ok(slot) = slots.binary_search(&c)
			{
				bag.add_one(slot);
			}
		}
		trace!("alphabet: {:?} ({} slots)", letters, slots.len());
		Self { letters, slots, bag }
	}

	/// The letters of the alphabet, in phrase order.
	#[inline]
	#[must_use]
	pub fn letters(&self) -> &str
	{
		&self.letters
	}

	/// The letters of the alphabet, as a bag.
	#[inline]
	pub fn bag(&self) -> &LetterBag
	{
		&self.bag
	}

	/// The total number of letters, counted with multiplicity.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize
	{
		self.bag.len()
	}

	/// Check whether the alphabet has no letters.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool
	{
		self.letters.is_empty()
	}

	/// Encode a string against this alphabet.
	///
	/// # Arguments
	///
	/// * `word` - The string to encode.
	///
	/// # Returns
	///
	/// The letters of `word` as a bag, or `None` if `word` uses a letter that
	/// the alphabet lacks entirely. Note that a successful encoding does not
	/// imply that the word [fits](Self::fits).
	pub fn encode(&self, word: &str) -> Option<LetterBag>
	{
		let mut bag = LetterBag::zeroed(self.slots.len());
		for c in word.chars()
		{
			let slot = self.slots.binary_search(&c).ok()?;
			bag.add_one(slot);
		}
		Some(bag)
	}

	/// Check whether the given word is a sub-multiset of the alphabet.
	#[inline]
	#[must_use]
	pub fn fits(&self, word: &str) -> bool
	{
		self.encode(word).is_some_and(|bag| self.bag.contains(&bag))
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
