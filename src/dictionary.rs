//! # Dictionary
//!
//! Herein is support for dictionary construction. A [`WordList`] is the raw
//! content of a word file, cached in binary form between runs. A
//! [`Dictionary`] is the ordered, deduplicated list of words that can
//! possibly take part in an anagram of a given [`Alphabet`]; all search
//! operations run against it.

use std::{
	collections::HashSet,
	fs::File,
	io::{self, BufRead, BufReader, ErrorKind, Read, Write},
	path::Path
};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{alphabet::Alphabet, letters::LetterBag};

/// The only single-letter words that survive [preparation](Dictionary::prepare).
const SINGLE_LETTER_WORDS: [&str; 2] = ["a", "i"];

////////////////////////////////////////////////////////////////////////////////
//                                Word lists.                                 //
////////////////////////////////////////////////////////////////////////////////

/// A word list is the unfiltered content of a word file, one word per line,
/// in file order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct WordList(Vec<String>);

impl WordList
{
	/// Construct an empty word list. Same as [`Default::default`].
	#[inline]
	pub fn new() -> Self { Self(Default::default()) }

	/// Check if the word list is empty.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	/// The number of lines in the word list.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.0.len() }

	/// The words, in file order.
	#[inline]
	#[must_use]
	pub fn words(&self) -> &[String] { &self.0 }

	/// Append the given words to the word list.
	///
	/// # Arguments
	///
	/// * `words` - The words to append, in order.
	pub fn populate<T: AsRef<str>>(&mut self, words: &[T])
	{
		self.0.extend(words.iter().map(|word| word.as_ref().to_string()));
	}

	/// Open a word list with the given name. Only the specified directory will
	/// be searched. `name` denotes the word file, sans the extension. If a
	/// binary word list (`<name>.dict`) exists _and_ is newer than the text
	/// file (`<name>.txt`), it will be read; otherwise, the text file will be
	/// read and a binary word list will be created (to optimize future reads).
	///
	/// # Arguments
	///
	/// * `dir` - The directory to search.
	/// * `name` - The name of the word file.
	///
	/// # Returns
	///
	/// A word list containing the lines of the file.
	///
	/// # Errors
	///
	/// * If the file cannot be opened or read, an error is returned.
	/// * If the file contains invalid data, an [`ErrorKind::InvalidData`] is
	///   returned.
	pub fn open<T: AsRef<Path>>(dir: T, name: &str) -> Result<Self, io::Error>
	{
		let dict_path = dir.as_ref().join(format!("{}.dict", name));
		let txt_path = dir.as_ref().join(format!("{}.txt", name));
		// Use the binary word list only if it's newer than the text file. Any
		// failure to read either modification time, including a missing
		// binary file, sends us back to the text file.
		if dict_path
			.metadata()
			.and_then(|m| m.modified())
			.and_then(|dict_time| {
				txt_path
					.metadata()
					.and_then(|n| n.modified())
					.map(|txt_time| dict_time > txt_time)
			})
			.unwrap_or(false)
		{
			let words = Self::deserialize_from_file(&dict_path)?;
			trace!("Read binary word list: {}", dict_path.display());
			Ok(words)
		}
		else
		{
			let words = Self::read_from_file(&txt_path)?;
			trace!("Read text word list: {}", txt_path.display());
			match words.serialize_to_file(&dict_path)
			{
				Ok(_) =>
				{
					trace!("Wrote binary word list: {}", dict_path.display())
				},
				Err(e) => warn!(
					"Failed to write binary word list: {}: {}",
					dict_path.display(),
					e
				)
			}
			Ok(words)
		}
	}

	/// Construct a word list from the contents of the given file. Each line
	/// in the file is considered a single word. Line terminators, including
	/// a carriage return before the newline, are not part of the word.
	///
	/// # Arguments
	///
	/// * `path` - The target file.
	///
	/// # Returns
	///
	/// A word list containing the lines of the file.
	///
	/// # Errors
	///
	/// If the file cannot be opened or read, an error is returned.
	pub fn read_from_file<T: AsRef<Path>>(path: T) -> Result<Self, io::Error>
	{
		let file = File::open(path)?;
		let reader = BufReader::new(file);
		let words = reader.lines().collect::<Result<Vec<_>, _>>()?;
		Ok(Self(words))
	}

	/// Deserialize a word list from the given file. The file must contain a
	/// serialized word list in [`bincode`](bincode) format.
	///
	/// # Errors
	///
	/// * If the file cannot be opened or read, an error is returned.
	/// * If the file contains invalid data, an [`ErrorKind::InvalidData`] is
	///   returned.
	pub fn deserialize_from_file<T: AsRef<Path>>(
		path: T
	) -> Result<Self, io::Error>
	{
		let file = File::open(path)?;
		let mut reader = BufReader::new(file);
		let mut content = Vec::new();
		reader.read_to_end(&mut content)?;
		let words = bincode::deserialize(&content)
			.map_err(|_e| ErrorKind::InvalidData)?;
		Ok(words)
	}

	/// Serialize the word list to the given file, in [`bincode`](bincode)
	/// format.
	///
	/// # Errors
	///
	/// * If the file cannot be opened or written, an error is returned.
	/// * If the word list cannot be encoded, an [`ErrorKind::InvalidData`] is
	///   returned.
	pub fn serialize_to_file<T: AsRef<Path>>(
		&self,
		path: T
	) -> Result<(), io::Error>
	{
		let mut file = File::create(path)?;
		let content =
			bincode::serialize(self).map_err(|_e| ErrorKind::InvalidData)?;
		file.write_all(&content)?;
		Ok(())
	}
}

////////////////////////////////////////////////////////////////////////////////
//                               Dictionaries.                                //
////////////////////////////////////////////////////////////////////////////////

/// The ordered list of candidate words for one alphabet. Every word is a
/// sub-multiset of the alphabet and occurs exactly once. The order of the
/// words is the total order that the enumerator relies upon to avoid
/// producing the same combination twice. Immutable after construction, and
/// shared read-only by all workers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Dictionary
{
	/// The words, in dictionary order.
	words: Vec<String>,

	/// The letters of each word, encoded against the alphabet. Parallel to
	/// `words`.
	bags: Vec<LetterBag>
}

impl Dictionary
{
	/// Prepare a dictionary from a raw word list:
	///
	/// * Drop every word of one letter or fewer, which also removes blank
	///   lines.
	/// * Append `a` and `i`, the only single-letter English words.
	/// * Drop every word that is not a sub-multiset of the alphabet.
	/// * Drop repeated words, keeping the first occurrence.
	///
	/// The surviving words keep their relative order from the word list.
	///
	/// # Arguments
	///
	/// * `list` - The raw word list.
	/// * `alphabet` - The target alphabet.
	///
	/// # Returns
	///
	/// The prepared dictionary.
	pub fn prepare(list: &WordList, alphabet: &Alphabet) -> Self
	{
		let candidates = list.words().iter()
			.map(String::as_str)
			.filter(|word| word.chars().count() > 1)
			.chain(SINGLE_LETTER_WORDS)
			.collect::<Vec<_>>();
		let dictionary = Self::from_words(alphabet, &candidates);
		debug!(
			"prepared dictionary: {} of {} words fit {:?}",
			dictionary.len(),
			list.len(),
			alphabet.letters()
		);
		dictionary
	}

	/// Construct a dictionary from an explicit ordered word list. Empty words,
	/// words that do not fit the alphabet, and repeats are dropped; no other
	/// length rule is applied.
	///
	/// # Arguments
	///
	/// * `alphabet` - The target alphabet.
	/// * `words` - The candidate words, in dictionary order.
	///
	/// # Returns
	///
	/// The dictionary.
	pub fn from_words<T: AsRef<str>>(alphabet: &Alphabet, words: &[T]) -> Self
	{
		let mut seen = HashSet::new();
		let mut dictionary = Self::default();
		for word in words.iter().map(AsRef::as_ref)
		{
			if word.is_empty()
			{
				continue
			}
			let Some(bag) = alphabet.encode(word) else { continue };
			if !alphabet.bag().contains(&bag) || !seen.insert(word)
			{
				continue
			}
			dictionary.words.push(word.to_string());
			dictionary.bags.push(bag);
		}
		dictionary
	}

	/// Check if the dictionary is empty.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.words.is_empty() }

	/// The number of words in the dictionary.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.words.len() }

	/// The words, in dictionary order.
	#[inline]
	#[must_use]
	pub fn words(&self) -> &[String] { &self.words }

	/// Get the word at the given index.
	///
	/// # Panics
	///
	/// If `index` is out of bounds.
	#[inline]
	#[must_use]
	pub fn word(&self, index: usize) -> &str { &self.words[index] }

	/// Get the encoded letters of the word at the given index.
	///
	/// # Panics
	///
	/// If `index` is out of bounds.
	#[inline]
	pub fn bag(&self, index: usize) -> &LetterBag { &self.bags[index] }

	/// Translate a sequence of dictionary indices into the corresponding
	/// words.
	///
	/// # Panics
	///
	/// If any index is out of bounds.
	#[must_use]
	pub fn phrase(&self, indices: &[usize]) -> Vec<String>
	{
		indices.iter().map(|&index| self.words[index].clone()).collect()
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::{io::Write, sync::Arc};

	use tempfile::{tempdir, NamedTempFile};

	use crate::{
		alphabet::Alphabet,
		dictionary::{Dictionary, WordList},
		enumerator::{Enumerator, SearchBounds}
	};

	/// Write the given lines to a fresh temporary file.
	fn word_file(content: &str) -> NamedTempFile
	{
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	/// Test reading a word list from a file:
	///
	/// * [`WordList::read_from_file`]
	#[test]
	fn test_read_from_file()
	{
		let file = word_file("stout\r\nyawls\n\nprintout\n");
		let words = WordList::read_from_file(file.path()).unwrap();
		assert_eq!(words.words(), &["stout", "yawls", "", "printout"]);
		assert!(WordList::read_from_file("no/such/file.txt").is_err());
	}

	/// Test serializing and deserializing a word list:
	///
	/// * [`WordList::serialize_to_file`]
	/// * [`WordList::deserialize_from_file`]
	#[test]
	fn test_serialize_to_file()
	{
		let mut words = WordList::new();
		assert!(words.is_empty());
		words.populate(&["poultry", "outwits", "ants"]);
		let file = NamedTempFile::new().unwrap();
		words.serialize_to_file(file.path()).unwrap();
		let deserialized =
			WordList::deserialize_from_file(file.path()).unwrap();
		assert_eq!(words, deserialized);
	}

	/// Opening a word list writes the binary cache, and a second open reads
	/// the same content back.
	#[test]
	fn test_open()
	{
		let dir = tempdir().unwrap();
		std::fs::write(dir.path().join("words.txt"), "lap\npal\nlap\n").unwrap();
		let first = WordList::open(dir.path(), "words").unwrap();
		assert!(dir.path().join("words.dict").exists());
		let second = WordList::open(dir.path(), "words").unwrap();
		assert_eq!(first, second);
		assert_eq!(second.len(), 3);
		assert!(WordList::open(dir.path(), "missing").is_err());
	}

	/// Preparation applies the length rule, appends `a` and `i`, filters by
	/// the alphabet and removes repeats, all in order.
	#[test]
	fn test_prepare()
	{
		let alphabet = Alphabet::from_phrase("poultry outwits ants");
		let mut list = WordList::new();
		list.populate(&[
			"stout", "", "a", "o", "zebra", "outwits", "stout", "tttt",
			"ttttt", "i", "ants", "printout"
		]);
		let dictionary = Dictionary::prepare(&list, &alphabet);
		assert_eq!(
			dictionary.words(),
			&["stout", "outwits", "tttt", "ants", "printout", "a", "i"]
		);
		for (index, word) in dictionary.words().iter().enumerate()
		{
			assert_eq!(dictionary.bag(index), &alphabet.encode(word).unwrap());
		}
		assert_eq!(dictionary.phrase(&[3, 0]), vec!["ants", "stout"]);
	}

	/// `a` and `i` are dropped when the alphabet cannot supply them.
	#[test]
	fn test_prepare_single_letters()
	{
		let alphabet = Alphabet::from_phrase("cat");
		let mut list = WordList::new();
		list.populate(&["cat", "tac", "act", "at"]);
		let dictionary = Dictionary::prepare(&list, &alphabet);
		assert_eq!(dictionary.words(), &["cat", "tac", "act", "at", "a"]);
	}

	#[test]
	fn test_from_words()
	{
		let alphabet = Alphabet::from_phrase("aint");
		let dictionary = Dictionary::from_words(
			&alphabet,
			&["a", "i", "an", "tin", "ant", "an", "zz", "aa"]
		);
		assert_eq!(dictionary.words(), &["a", "i", "an", "tin", "ant"]);
		assert_eq!(dictionary.len(), 5);
		assert_eq!(dictionary.word(3), "tin");
	}

	/// Empty words never enter a dictionary, so they cannot pad a Found Set.
	#[test]
	fn test_from_words_empty()
	{
		let alphabet = Alphabet::from_phrase("a");
		let dictionary = Dictionary::from_words(&alphabet, &["", "a", ""]);
		assert_eq!(dictionary.words(), &["a"]);
		let enumerator = Enumerator::new(
			Arc::new(dictionary),
			&alphabet,
			SearchBounds::lengths(1..=3)
		);
		assert_eq!(enumerator.collect::<Vec<_>>(), vec![vec!["a".to_string()]]);
	}
}
