//! # Configuration
//!
//! Everything that varies between instances of the puzzle: the target
//! phrase, the digests to find, the phrase lengths to search, and the shape
//! of the worker pool. A [`SearchConfig`] is built once, validated, and then
//! shared read-only.

use std::{
	fs::File,
	io::BufReader,
	path::Path,
	thread,
	time::Duration
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// The published phrase of the puzzle.
pub const DEFAULT_PHRASE: &str = "poultry outwits ants";

/// The published digests of the puzzle: easy, medium and hard.
pub const DEFAULT_DIGESTS: [&str; 3] = [
	"e4820b45d2277f3844eac66c903e84be",
	"23170acc097c24edb98fc5488ab033fe",
	"665e5bcb0c20062fe8abaaf4628bb154"
];

/// The complete configuration of a search run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig
{
	/// The phrase whose anagrams are sought.
	pub target_phrase: String,

	/// The MD5 digests to find, lowercase hexadecimal.
	pub target_digests: Vec<String>,

	/// The fewest words in a candidate phrase.
	pub min_words: usize,

	/// The most words in a candidate phrase.
	pub max_words: usize,

	/// The number of worker threads.
	pub worker_count: usize,

	/// How long a worker may go without reporting on its unit before the
	/// unit is reissued and the worker retired. Workers report after every
	/// search quantum, so this must exceed `quantum`. `None` waits forever.
	#[serde(with = "optional_millis")]
	pub unit_timeout: Option<Duration>,

	/// How many times a unit may be issued before the run is abandoned.
	pub max_attempts: u32,

	/// How long a worker searches between checks for cancellation.
	#[serde(with = "millis")]
	pub quantum: Duration
}

impl Default for SearchConfig
{
	fn default() -> Self
	{
		Self
		{
			target_phrase: DEFAULT_PHRASE.to_string(),
			target_digests: DEFAULT_DIGESTS.map(String::from).to_vec(),
			min_words: 1,
			max_words: 4,
			worker_count: default_worker_count(),
			unit_timeout: None,
			max_attempts: 3,
			quantum: Duration::from_millis(50)
		}
	}
}

impl SearchConfig
{
	/// Read a configuration from a JSON file. Absent fields take their
	/// [default](Default::default) values. The result is not validated.
	///
	/// # Errors
	///
	/// * [`SearchError::Io`] if the file cannot be read.
	/// * [`SearchError::InvalidConfig`] if the file is not a valid
	///   configuration.
	pub fn read_from_file<T: AsRef<Path>>(path: T) -> Result<Self, SearchError>
	{
		let file = File::open(path.as_ref())?;
		let config = serde_json::from_reader(BufReader::new(file))
			.map_err(|e| SearchError::InvalidConfig(e.to_string()))?;
		debug!("read configuration: {}", path.as_ref().display());
		Ok(config)
	}

	/// Check that the configuration describes a searchable problem.
	///
	/// # Errors
	///
	/// [`SearchError::InvalidConfig`] naming the first problem found.
	pub fn validate(&self) -> Result<(), SearchError>
	{
		let invalid = |reason: String| -> Result<(), SearchError> {
			Err(SearchError::InvalidConfig(reason))
		};
		if self.target_phrase.trim().is_empty()
		{
			return invalid("target phrase is empty".to_string())
		}
		if self.target_digests.is_empty()
		{
			return invalid("no target digests".to_string())
		}
		if let Some(bad) = self.target_digests.iter().find(|d| !is_md5_hex(d))
		{
			return invalid(format!("not an MD5 hex digest: {:?}", bad))
		}
		if self.min_words == 0
		{
			return invalid("minimum word count must be positive".to_string())
		}
		if self.min_words > self.max_words
		{
			return invalid(format!(
				"minimum word count {} exceeds maximum {}",
				self.min_words,
				self.max_words
			))
		}
		if self.worker_count == 0
		{
			return invalid("worker count must be positive".to_string())
		}
		if self.max_attempts == 0
		{
			return invalid("attempts per unit must be positive".to_string())
		}
		if let Some(timeout) = self.unit_timeout.filter(|t| *t <= self.quantum)
		{
			return invalid(format!(
				"unit timeout {:?} does not exceed the quantum {:?}",
				timeout,
				self.quantum
			))
		}
		if self.max_words > 8
		{
			// Every Found Set costs `max_words!` digests.
			warn!("{} words per phrase will be slow to check", self.max_words);
		}
		Ok(())
	}
}

/// One worker per available core, or one if that cannot be determined.
fn default_worker_count() -> usize
{
	thread::available_parallelism().map_or(1, |n| n.get())
}

/// Check whether `digest` is 32 lowercase hexadecimal digits.
fn is_md5_hex(digest: &str) -> bool
{
	digest.len() == 32
		&& digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Durations as whole milliseconds.
mod millis
{
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
	{
		s.serialize_u64(d.as_millis() as u64)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error>
	{
		u64::deserialize(d).map(Duration::from_millis)
	}
}

/// Optional durations as whole milliseconds, `null` for none.
mod optional_millis
{
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(
		d: &Option<Duration>,
		s: S
	) -> Result<S::Ok, S::Error>
	{
		match d
		{
			Some(d) => s.serialize_some(&(d.as_millis() as u64)),
			None => s.serialize_none()
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		d: D
	) -> Result<Option<Duration>, D::Error>
	{
		Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
