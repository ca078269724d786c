//! # Errors
//!
//! Failures that end a search run. Running out of candidates or siblings is
//! ordinary control flow inside the enumerator and never surfaces here.

use std::{
	error::Error,
	fmt::{self, Display, Formatter},
	io
};

use crate::partition::WorkUnit;

/// The complete enumeration of search failures.
#[derive(Debug)]
pub enum SearchError
{
	/// The word file or the configuration file could not be read.
	Io(io::Error),

	/// The configuration is unusable.
	InvalidConfig(String),

	/// A message could not be delivered between the coordinator and a
	/// worker.
	Transport(String),

	/// Every worker was retired while work remained.
	NoLiveWorkers,

	/// A unit failed on every permitted attempt.
	RetriesExhausted(WorkUnit)
}

impl Display for SearchError
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		match self
		{
			Self::Io(e) => write!(f, "I/O error: {}", e),
			Self::InvalidConfig(reason) =>
				write!(f, "invalid configuration: {}", reason),
			Self::Transport(reason) => write!(f, "transport failure: {}", reason),
			Self::NoLiveWorkers =>
				write!(f, "no live workers remain, but work does"),
			Self::RetriesExhausted(unit) =>
				write!(f, "work unit {} failed on every attempt", unit)
		}
	}
}

impl Error for SearchError
{
	fn source(&self) -> Option<&(dyn Error + 'static)>
	{
		match self
		{
			Self::Io(e) => Some(e),
			_ => None
		}
	}
}

impl From<io::Error> for SearchError
{
	fn from(e: io::Error) -> Self
	{
		Self::Io(e)
	}
}
