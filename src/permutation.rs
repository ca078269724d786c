//! # Permutations and digests
//!
//! A Found Set fixes which words make up a phrase, but not their order. Every
//! ordering is joined with single spaces, hashed with MD5, and compared
//! against the target digests.

use std::fmt::{self, Display, Formatter};

use log::{debug, info};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
//                               Permutations.                                //
////////////////////////////////////////////////////////////////////////////////

/// Produce every ordering of the given elements. Elements are distinguished
/// by position, not value, so repeated values yield repeated orderings; the
/// result always has `n!` entries.
///
/// # Arguments
///
/// * `items` - The elements to order.
///
/// # Returns
///
/// Every ordering of `items`.
#[must_use]
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>>
{
	if items.len() <= 1
	{
		return vec![items.to_vec()]
	}
	let mut result = Vec::new();
	for (index, first) in items.iter().enumerate()
	{
		let mut rest = items.to_vec();
		rest.remove(index);
		for mut tail in permutations(&rest)
		{
			tail.insert(0, first.clone());
			result.push(tail);
		}
	}
	result
}

/// Compute the MD5 digest of the UTF-8 bytes of `phrase`, rendered as
/// lowercase hexadecimal.
#[must_use]
pub fn digest(phrase: &str) -> String
{
	let mut hasher = Md5::new();
	hasher.update(phrase.as_bytes());
	hex::encode(hasher.finalize())
}

////////////////////////////////////////////////////////////////////////////////
//                                  Matches.                                  //
////////////////////////////////////////////////////////////////////////////////

/// A phrase whose digest equals one of the targets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match
{
	/// The position of the matched digest in the target list.
	pub digest_index: usize,

	/// The matching phrase, words joined by single spaces.
	pub phrase: String
}

impl Display for Match
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		write!(f, "digest {}: {}", self.digest_index + 1, self.phrase)
	}
}

/// Tests Found Sets against a fixed list of target digests.
#[derive(Clone, Debug)]
#[must_use]
pub struct Checker
{
	/// The target digests, lowercase hexadecimal.
	targets: Vec<String>
}

impl Checker
{
	/// Construct a checker for the given digests. Digests are compared in
	/// lowercase.
	pub fn new<T: AsRef<str>>(targets: &[T]) -> Self
	{
		Self
		{
			targets: targets.iter()
				.map(|t| t.as_ref().to_ascii_lowercase())
				.collect()
		}
	}

	/// The target digests.
	#[inline]
	#[must_use]
	pub fn targets(&self) -> &[String]
	{
		&self.targets
	}

	/// Test a single phrase.
	///
	/// # Returns
	///
	/// The position of the matching digest, if any.
	#[must_use]
	pub fn check_phrase(&self, phrase: &str) -> Option<usize>
	{
		let hash = digest(phrase);
		self.targets.iter().position(|target| *target == hash)
	}

	/// Test every ordering of a Found Set.
	///
	/// # Arguments
	///
	/// * `words` - The words of the Found Set.
	///
	/// # Returns
	///
	/// Every ordering that matches a target, in permutation order.
	#[must_use]
	pub fn check(&self, words: &[String]) -> Vec<Match>
	{
		debug!("checking {} orderings of {:?}", factorial(words.len()), words);
		let mut matches = Vec::new();
		for ordering in permutations(words)
		{
			let phrase = ordering.join(" ");
			if let Some(digest_index) = self.check_phrase(&phrase)
			{
				let found = Match { digest_index, phrase };
				info!("found {}", found);
				matches.push(found);
			}
		}
		matches
	}
}

/// `n!`, saturating.
fn factorial(n: usize) -> usize
{
	(1..=n).fold(1usize, |acc, k| acc.saturating_mul(k))
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::collections::HashSet;

	use crate::permutation::{digest, factorial, permutations, Checker, Match};

	/// `n` elements give `n!` distinct orderings.
	#[test]
	fn test_permutations()
	{
		for n in 1..=6
		{
			let items = (0..n).collect::<Vec<_>>();
			let all = permutations(&items);
			assert_eq!(all.len(), factorial(n));
			let unique = all.iter().cloned().collect::<HashSet<_>>();
			assert_eq!(unique.len(), all.len());
			for ordering in &all
			{
				let mut sorted = ordering.clone();
				sorted.sort_unstable();
				assert_eq!(sorted, items);
			}
		}
		assert_eq!(
			permutations(&["a", "b", "c"]),
			vec![
				vec!["a", "b", "c"],
				vec!["a", "c", "b"],
				vec!["b", "a", "c"],
				vec!["b", "c", "a"],
				vec!["c", "a", "b"],
				vec!["c", "b", "a"]
			]
		);
	}

	/// Repeated values are kept apart by position.
	#[test]
	fn test_permutations_repeated()
	{
		let all = permutations(&["ty", "ty"]);
		assert_eq!(all, vec![vec!["ty", "ty"], vec!["ty", "ty"]]);
		assert_eq!(permutations(&["solo"]), vec![vec!["solo"]]);
	}

	#[test]
	fn test_digest()
	{
		assert_eq!(
			digest("poultry outwits ants"),
			"8b35bbd7ff2f5dd7c94fffbb1a3512bc"
		);
		assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
	}

	#[test]
	fn test_check()
	{
		let checker = Checker::new(&[
			"D077F244DEF8A70E5EA758BD8352FCD8",
			"8b35bbd7ff2f5dd7c94fffbb1a3512bc"
		]);
		assert_eq!(checker.targets()[0], "d077f244def8a70e5ea758bd8352fcd8");
		assert_eq!(checker.check_phrase("cat"), Some(0));
		assert_eq!(checker.check_phrase("act"), None);
		let words = ["ants", "outwits", "poultry"]
			.map(String::from)
			.to_vec();
		assert_eq!(
			checker.check(&words),
			vec![Match {
				digest_index: 1,
				phrase: "poultry outwits ants".to_string()
			}]
		);
		assert!(checker.check(&["tac".to_string()]).is_empty());
	}
}
