//! # Enumerator
//!
//! Herein is the search for Found Sets: sequences of dictionary words whose
//! combined letters are exactly the alphabet. The search is a depth-first
//! traversal over a stack of dictionary indices. Children of a node start at
//! the node's own index, and siblings start just past the previous sibling,
//! so every combination of words is produced in exactly one order.

use std::{
	ops::RangeInclusive,
	sync::Arc,
	time::{Duration, Instant}
};

use log::{debug, trace};

use crate::{
	alphabet::Alphabet,
	dictionary::Dictionary,
	letters::{difference, LetterBag}
};

////////////////////////////////////////////////////////////////////////////////
//                          Next-candidate finding.                           //
////////////////////////////////////////////////////////////////////////////////

/// Find the lowest-indexed dictionary word, at or above `threshold`, whose
/// letters fit in what remains of the alphabet once `phrase` is spent.
///
/// # Arguments
///
/// * `dictionary` - The dictionary to scan.
/// * `alphabet` - The alphabet.
/// * `phrase` - The letters already consumed, e.g., the concatenated words of
///   a partial phrase. Letters absent from the alphabet are ignored.
/// * `threshold` - The first index to consider.
///
/// # Returns
///
/// The index of the first fitting word, or `None` if no word at or above
/// `threshold` fits.
#[must_use]
pub fn find_next_word(
	dictionary: &Dictionary,
	alphabet: &Alphabet,
	phrase: &str,
	threshold: usize
) -> Option<usize>
{
	let remainder = alphabet.encode(&difference(alphabet.letters(), phrase))?;
	next_candidate(dictionary, &remainder, threshold, usize::MAX)
}

/// Find the lowest index in `threshold..=limit` whose word fits in
/// `remainder`.
#[inline]
fn next_candidate(
	dictionary: &Dictionary,
	remainder: &LetterBag,
	threshold: usize,
	limit: usize
) -> Option<usize>
{
	let end = dictionary.len().min(limit.saturating_add(1));
	(threshold..end).find(|&index| remainder.contains(dictionary.bag(index)))
}

////////////////////////////////////////////////////////////////////////////////
//                                  Bounds.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The restrictions on a single enumeration: how many words a Found Set may
/// have, and which dictionary indices may occupy the first (root) position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct SearchBounds
{
	/// The fewest words in a Found Set.
	pub min_length: usize,

	/// The most words in a Found Set.
	pub max_length: usize,

	/// The lowest permissible root index. The search starts here.
	pub min_root: usize,

	/// The highest permissible root index.
	pub max_root: usize
}

impl SearchBounds
{
	/// Bound only the number of words; any root is permissible.
	///
	/// # Arguments
	///
	/// * `lengths` - The permissible numbers of words.
	///
	/// # Returns
	///
	/// The requested bounds.
	pub fn lengths(lengths: RangeInclusive<usize>) -> Self
	{
		Self
		{
			min_length: *lengths.start(),
			max_length: *lengths.end(),
			min_root: 0,
			max_root: usize::MAX
		}
	}

	/// Bound the number of words to exactly `length` and the root to exactly
	/// `root`.
	pub fn rooted(length: usize, root: usize) -> Self
	{
		Self
		{
			min_length: length,
			max_length: length,
			min_root: root,
			max_root: root
		}
	}

	/// Check whether a phrase of the given number of words may be emitted.
	#[inline]
	#[must_use]
	fn admits_length(&self, length: usize) -> bool
	{
		(self.min_length..=self.max_length).contains(&length)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                Enumerator.                                 //
////////////////////////////////////////////////////////////////////////////////

/// The complete context of one enumeration. The search is iterative rather
/// than recursive, so it can be suspended after any step and resumed later,
/// e.g., to answer a cancellation request between time slices.
#[derive(Clone, Debug)]
#[must_use]
pub struct Enumerator
{
	/// The dictionary to search.
	dictionary: Arc<Dictionary>,

	/// The restrictions on this enumeration.
	bounds: SearchBounds,

	/// The current phrase, as dictionary indices.
	stack: Vec<usize>,

	/// `remainders[d]` holds the letters left after spending the first `d`
	/// words of the stack, so there is always one more remainder than there
	/// are words.
	remainders: Vec<LetterBag>,

	/// Whether the next step must not descend from the top of the stack.
	/// Set once a level has run out of siblings, so that its parent moves on
	/// to its own next sibling instead of expanding its children again.
	ignore_children: bool,

	/// Whether the search space is exhausted.
	is_finished: bool
}

impl Enumerator
{
	/// Construct an enumerator over the given dictionary.
	///
	/// # Arguments
	///
	/// * `dictionary` - The dictionary, prepared for `alphabet`.
	/// * `alphabet` - The alphabet that Found Sets must consume exactly.
	/// * `bounds` - The restrictions on the enumeration.
	///
	/// # Returns
	///
	/// A new enumerator, positioned at the first permissible root.
	pub fn new(
		dictionary: Arc<Dictionary>,
		alphabet: &Alphabet,
		bounds: SearchBounds
	) -> Self
	{
		let mut enumerator = Self
		{
			dictionary,
			bounds,
			stack: Vec::new(),
			remainders: vec![alphabet.bag().clone()],
			ignore_children: false,
			is_finished: false
		};
		if bounds.max_length == 0
			|| bounds.min_root > bounds.max_root
			|| bounds.min_root >= enumerator.dictionary.len()
		{
			trace!("nothing to enumerate: {:?}", bounds);
			enumerator.is_finished = true;
		}
		else
		{
			enumerator.push(bounds.min_root);
		}
		enumerator
	}

	/// Check if the enumerator is finished, i.e., the search space is
	/// exhausted.
	#[inline]
	#[must_use]
	pub fn is_finished(&self) -> bool
	{
		self.is_finished
	}

	/// Run the enumerator until a single Found Set is produced or the
	/// specified quantum elapses. Always take at least one step, even if the
	/// quantum is zero, to ensure that the enumerator always makes progress.
	///
	/// # Arguments
	///
	/// * `quantum` - The maximum amount of time to run before answering a
	///   continuation context.
	///
	/// # Returns
	///
	/// A 2-tuple comprising the continuation context and any Found Set, as
	/// dictionary indices, respectively. The caller should call
	/// [`is_finished`](Self::is_finished) to determine if there is any
	/// additional work to perform.
	pub fn search(mut self, quantum: Duration) -> (Self, Option<Vec<usize>>)
	{
		if self.is_finished
		{
			trace!("enumerator is already finished");
			return (self, None)
		}
		let start_time = Instant::now();
		loop
		{
			let found = self.step();
			if found.is_some() || self.is_finished
			{
				return (self, found)
			}
			let elapsed = start_time.elapsed();
			if elapsed >= quantum
			{
				trace!("quantum elapsed: {:?}", elapsed);
				return (self, None)
			}
		}
	}

	/// Run the enumerator until the search space is exhausted.
	///
	/// # Returns
	///
	/// Every Found Set, as dictionary indices, in search order.
	#[must_use]
	pub fn search_fully(mut self) -> Vec<Vec<usize>>
	{
		let mut found_sets = Vec::new();
		while !self.is_finished
		{
			let (next, found) = self.search(Duration::MAX);
			self = next;
			found_sets.extend(found);
		}
		found_sets
	}

	/// Translate a Found Set from dictionary indices into words.
	#[inline]
	#[must_use]
	pub fn phrase(&self, indices: &[usize]) -> Vec<String>
	{
		self.dictionary.phrase(indices)
	}

	/// Perform one iteration of the search: emit the current phrase if it
	/// consumes the alphabet exactly, then either descend to the first child
	/// or backtrack to the next sibling.
	///
	/// # Returns
	///
	/// The current phrase, if it is a Found Set.
	fn step(&mut self) -> Option<Vec<usize>>
	{
		let depth = self.stack.len();
		let current = self.stack[depth - 1];
		let remainder = &self.remainders[depth];
		trace!("considering: {:?}", self.stack);

		let mut found = None;
		if remainder.is_empty() && self.bounds.admits_length(depth)
		{
			debug!("found set: {:?}", self.stack);
			found = Some(self.stack.clone());
		}
		else if !self.ignore_children && depth < self.bounds.max_length
		{
			// Children start at the parent's own index, so a word may repeat.
			let child = next_candidate(
				&self.dictionary,
				remainder,
				current,
				usize::MAX
			);
			if let Some(child) = child
			{
				self.push(child);
				self.ignore_children = false;
				return None
			}
		}

		// Abandon the deepest word and look for its next sibling. At the root,
		// siblings must also respect the root bounds.
		self.pop();
		let limit =
			if self.stack.is_empty() { self.bounds.max_root }
			else { usize::MAX };
		let sibling = next_candidate(
			&self.dictionary,
			self.remainder(),
			current + 1,
			limit
		);
		match sibling
		{
			Some(sibling) =>
			{
				self.push(sibling);
				self.ignore_children = false;
			}
			None =>
			{
				self.ignore_children = true;
				if self.stack.is_empty()
				{
					debug!("exhausted search space: {:?}", self.bounds);
					self.is_finished = true;
				}
			}
		}
		found
	}

	/// The letters left over by the current phrase.
	#[inline]
	fn remainder(&self) -> &LetterBag
	{
		// There is always one more remainder than there are words.
		&self.remainders[self.stack.len()]
	}

	/// Append a word to the current phrase.
	#[inline]
	fn push(&mut self, index: usize)
	{
		let remainder = self.remainder().difference(self.dictionary.bag(index));
		self.stack.push(index);
		self.remainders.push(remainder);
	}

	/// Remove the last word of the current phrase.
	#[inline]
	fn pop(&mut self)
	{
		self.stack.pop();
		self.remainders.pop();
	}
}

impl Iterator for Enumerator
{
	type Item = Vec<String>;

	fn next(&mut self) -> Option<Self::Item>
	{
		while !self.is_finished
		{
			if let Some(found) = self.step()
			{
				return Some(self.phrase(&found))
			}
		}
		None
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
pub(crate) mod test
{
	use std::{collections::HashSet, sync::Arc, time::Duration};

	use crate::{
		alphabet::Alphabet,
		dictionary::Dictionary,
		enumerator::{find_next_word, Enumerator, SearchBounds}
	};

	/// Enumerate, by brute force, every nondecreasing index sequence of
	/// `1..=max_length` words whose letters are exactly the alphabet.
	pub(crate) fn brute_force(
		dictionary: &Dictionary,
		alphabet: &Alphabet,
		max_length: usize
	) -> HashSet<Vec<usize>>
	{
		fn extend(
			dictionary: &Dictionary,
			target: &str,
			max_length: usize,
			prefix: &mut Vec<usize>,
			out: &mut HashSet<Vec<usize>>
		)
		{
			if !prefix.is_empty()
			{
				let mut letters = prefix.iter()
					.flat_map(|&i| dictionary.word(i).chars())
					.collect::<Vec<_>>();
				letters.sort_unstable();
				if letters.into_iter().collect::<String>() == target
				{
					out.insert(prefix.clone());
				}
			}
			if prefix.len() == max_length
			{
				return
			}
			let start = prefix.last().copied().unwrap_or(0);
			for index in start..dictionary.len()
			{
				prefix.push(index);
				extend(dictionary, target, max_length, prefix, out);
				prefix.pop();
			}
		}
		let mut target = alphabet.letters().chars().collect::<Vec<_>>();
		target.sort_unstable();
		let target = target.into_iter().collect::<String>();
		let mut out = HashSet::new();
		extend(dictionary, &target, max_length, &mut Vec::new(), &mut out);
		out
	}

	/// A small word list for `poultry outwits ants`, with a few misfits and
	/// repeated letters thrown in.
	pub(crate) fn sample_words() -> Vec<&'static str>
	{
		vec![
			"stout", "yawls", "printout", "outlaws", "ty", "tu", "wu",
			"lisp", "not", "statutory", "poultry", "outwits", "ants", "tan",
			"ant", "sit", "wits", "up", "lout", "try", "spout", "tint",
			"a", "i"
		]
	}

	/// The words at indices in the given set.
	fn words(dictionary: &Dictionary, found: &[Vec<usize>]) -> Vec<Vec<String>>
	{
		found.iter().map(|indices| dictionary.phrase(indices)).collect()
	}

	#[test]
	fn test_find_next_word()
	{
		let alphabet = Alphabet::from_phrase("aint");
		let dictionary = Dictionary::from_words(
			&alphabet,
			&["a", "i", "an", "tin", "ant"]
		);
		assert_eq!(find_next_word(&dictionary, &alphabet, "", 0), Some(0));
		assert_eq!(find_next_word(&dictionary, &alphabet, "a", 0), Some(1));
		assert_eq!(find_next_word(&dictionary, &alphabet, "a", 2), Some(3));
		assert_eq!(find_next_word(&dictionary, &alphabet, "i", 2), Some(2));
		assert_eq!(find_next_word(&dictionary, &alphabet, "i", 3), Some(4));
		assert_eq!(find_next_word(&dictionary, &alphabet, "aint", 0), None);
		assert_eq!(find_next_word(&dictionary, &alphabet, "", 5), None);
		assert_eq!(find_next_word(&dictionary, &alphabet, "", 99), None);
		// Letters that the alphabet lacks are ignored.
		assert_eq!(find_next_word(&dictionary, &alphabet, "zzi", 1), Some(2));
	}

	/// The enumerator finds exactly the combinations that brute force finds,
	/// each once, with nondecreasing indices.
	#[test]
	fn test_completeness()
	{
		let alphabet = Alphabet::from_phrase("aint");
		let dictionary = Arc::new(Dictionary::from_words(
			&alphabet,
			&["a", "i", "an", "tin", "ant"]
		));
		let found = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::lengths(1..=3)
		).search_fully();
		assert_eq!(found, vec![vec![0, 3], vec![1, 4]]);
		assert_eq!(
			words(&dictionary, &found),
			vec![vec!["a", "tin"], vec!["i", "ant"]]
		);
		let expected = brute_force(&dictionary, &alphabet, 3);
		assert_eq!(found.iter().cloned().collect::<HashSet<_>>(), expected);
	}

	/// Same as [`test_completeness`], but over a richer dictionary, where
	/// words repeat and sets run to three words.
	#[test]
	fn test_completeness_sample()
	{
		let alphabet = Alphabet::from_phrase("poultry outwits ants");
		let dictionary = Arc::new(
			Dictionary::from_words(&alphabet, &sample_words())
		);
		let found = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::lengths(1..=3)
		).search_fully();
		assert!(!found.is_empty());
		let unique = found.iter().cloned().collect::<HashSet<_>>();
		assert_eq!(unique.len(), found.len(), "duplicate found sets");
		for indices in &found
		{
			assert!(indices.windows(2).all(|w| w[0] <= w[1]), "{:?}", indices);
		}
		assert_eq!(unique, brute_force(&dictionary, &alphabet, 3));
		let phrases = words(&dictionary, &found);
		assert!(phrases.contains(&vec![
			"poultry".to_string(),
			"outwits".to_string(),
			"ants".to_string()
		]));
	}

	/// Distinct single words that are each an anagram of the alphabet are
	/// all found, and nothing longer is.
	#[test]
	fn test_single_word_anagrams()
	{
		let alphabet = Alphabet::from_phrase("cat");
		let dictionary = Arc::new(
			Dictionary::from_words(&alphabet, &["cat", "tac", "act"])
		);
		let found = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::lengths(1..=3)
		).collect::<Vec<_>>();
		assert_eq!(found, vec![vec!["cat"], vec!["tac"], vec!["act"]]);
		let longer = Enumerator::new(
			dictionary,
			&alphabet,
			SearchBounds::lengths(2..=3)
		).collect::<Vec<_>>();
		assert!(longer.is_empty());
	}

	/// Length bounds are honoured on both ends.
	#[test]
	fn test_length_bounds()
	{
		let alphabet = Alphabet::from_phrase("poultry outwits ants");
		let dictionary = Arc::new(
			Dictionary::from_words(&alphabet, &sample_words())
		);
		let all = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::lengths(1..=4)
		).search_fully();
		for length in 1..=4
		{
			let exact = Enumerator::new(
				Arc::clone(&dictionary),
				&alphabet,
				SearchBounds::lengths(length..=length)
			).search_fully();
			assert!(exact.iter().all(|set| set.len() == length));
			let expected = all.iter()
				.filter(|set| set.len() == length)
				.cloned()
				.collect::<Vec<_>>();
			assert_eq!(exact, expected);
		}
	}

	/// A rooted enumeration never wanders away from its root.
	#[test]
	fn test_rooted()
	{
		let alphabet = Alphabet::from_phrase("aint");
		let dictionary = Arc::new(Dictionary::from_words(
			&alphabet,
			&["a", "i", "an", "tin", "ant"]
		));
		let found = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::rooted(2, 1)
		).search_fully();
		assert_eq!(found, vec![vec![1, 4]]);
		let found = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::rooted(2, 2)
		).search_fully();
		assert!(found.is_empty());
		let found = Enumerator::new(
			dictionary,
			&alphabet,
			SearchBounds { min_root: 1, ..SearchBounds::lengths(1..=3) }
		).search_fully();
		assert_eq!(found, vec![vec![1, 4]]);
	}

	/// Degenerate inputs finish without searching.
	#[test]
	fn test_degenerate()
	{
		let alphabet = Alphabet::from_phrase("aint");
		let empty = Arc::new(Dictionary::default());
		let enumerator =
			Enumerator::new(empty, &alphabet, SearchBounds::lengths(1..=3));
		assert!(enumerator.is_finished());
		assert!(enumerator.search_fully().is_empty());

		let dictionary =
			Arc::new(Dictionary::from_words(&alphabet, &["a", "i"]));
		let enumerator = Enumerator::new(
			Arc::clone(&dictionary),
			&alphabet,
			SearchBounds::rooted(1, 2)
		);
		assert!(enumerator.is_finished());
		let enumerator = Enumerator::new(
			dictionary,
			&alphabet,
			SearchBounds::lengths(0..=0)
		);
		assert!(enumerator.is_finished());
	}

	/// A zero quantum still makes progress, and slicing does not change the
	/// outcome.
	#[test]
	fn test_quantum()
	{
		let alphabet = Alphabet::from_phrase("poultry outwits ants");
		let dictionary = Arc::new(
			Dictionary::from_words(&alphabet, &sample_words())
		);
		let bounds = SearchBounds::lengths(1..=3);
		let expected =
			Enumerator::new(Arc::clone(&dictionary), &alphabet, bounds)
				.search_fully();
		let mut enumerator = Enumerator::new(dictionary, &alphabet, bounds);
		let mut found_sets = Vec::new();
		let mut slices = 0;
		while !enumerator.is_finished()
		{
			let (next, found) = enumerator.search(Duration::ZERO);
			enumerator = next;
			found_sets.extend(found);
			slices += 1;
		}
		assert!(slices > found_sets.len());
		assert_eq!(found_sets, expected);
		let (enumerator, found) = enumerator.search(Duration::ZERO);
		assert!(enumerator.is_finished());
		assert!(found.is_none());
	}
}
