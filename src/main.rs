//! # Anagram Hash Solver
//!
//! The puzzle: a phrase is given, along with the MD5 digests of a few secret
//! phrases that are anagrams of it. Recover the secret phrases.
//!
//! This program reads a word file, keeps the words that could take part in an
//! anagram of the phrase, and searches every combination of those words that
//! uses each letter of the phrase exactly once. Every ordering of every such
//! combination is hashed and compared against the digests. Via command line
//! options, the user can specify the word file, the phrase, the digests and
//! the shape of the search.

use std::{path::PathBuf, process, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use log::{debug, error, info, trace};

use anagram_hash_solver::{
	alphabet::Alphabet,
	config::SearchConfig,
	coordinator::Coordinator,
	dictionary::{Dictionary, WordList},
	enumerator::{Enumerator, SearchBounds},
	error::SearchError
};

////////////////////////////////////////////////////////////////////////////////
//                           Command line options.                            //
////////////////////////////////////////////////////////////////////////////////

/// CLI for recovering anagram phrases from their digests.
#[derive(Clone, Debug, Parser)]
#[command(version = "1.0")]
struct Opts
{
	/// The path to the directory containing the word files.
	#[arg(short = 'd', long, default_value = "dict")]
	directory: String,

	/// The name of the word file. This is the name shared by the text and
	/// binary files, sans the extension.
	#[arg(short = 'n', long, default_value = "wordlist")]
	dictionary: String,

	/// A JSON configuration file. When given, the search options below are
	/// ignored.
	#[arg(short = 'c', long)]
	config: Option<PathBuf>,

	/// The phrase whose anagrams are sought.
	#[arg(short = 'p', long)]
	phrase: Option<String>,

	/// A target MD5 digest, as lowercase hexadecimal. May be repeated.
	#[arg(short = 'x', long = "digest")]
	digests: Vec<String>,

	/// The fewest words in a candidate phrase.
	#[arg(long, default_value = "1")]
	min_words: usize,

	/// The most words in a candidate phrase.
	#[arg(long, default_value = "4")]
	max_words: usize,

	/// The number of worker threads. Defaults to one per core.
	#[arg(short = 'j', long)]
	workers: Option<usize>,

	/// How long (in ms) a worker may go silent about its unit before the unit
	/// is handed to another worker.
	#[arg(long)]
	unit_timeout_ms: Option<u64>,

	#[command(subcommand)]
	command: Command
}

impl Opts
{
	/// Assemble the search configuration, either from the configuration file
	/// or from the command line.
	fn search_config(&self) -> Result<SearchConfig, SearchError>
	{
		let config = match &self.config
		{
			Some(path) => SearchConfig::read_from_file(path)?,
			None =>
			{
				let defaults = SearchConfig::default();
				SearchConfig {
					target_phrase: self.phrase.clone()
						.unwrap_or(defaults.target_phrase),
					target_digests:
						if self.digests.is_empty() { defaults.target_digests }
						else { self.digests.clone() },
					min_words: self.min_words,
					max_words: self.max_words,
					worker_count: self.workers.unwrap_or(defaults.worker_count),
					unit_timeout: self.unit_timeout_ms.map(Duration::from_millis),
					..defaults
				}
			}
		};
		config.validate()?;
		Ok(config)
	}
}

/// The subcommands of the CLI.
#[derive(Copy, Clone, Debug, Subcommand)]
enum Command
{
	/// Just generate the binary word list and exit.
	Generate,

	/// Enumerate the Found Sets on the calling thread and print each one,
	/// without checking digests.
	Sets,

	/// Search for the target digests on a pool of workers and print every
	/// matching phrase.
	Search
}

////////////////////////////////////////////////////////////////////////////////
//                               Main program.                                //
////////////////////////////////////////////////////////////////////////////////

/// Parse the command line options and execute the appropriate subcommand.
fn main()
{
	env_logger::init();
	let opts = Opts::parse();
	debug!("Command line options: {:?}", opts);
	if let Err(e) = execute(&opts)
	{
		error!("{}", e);
		eprintln!("{}", e);
		process::exit(1);
	}
}

/// Execute the subcommand.
///
/// # Errors
///
/// Any error that ends the run: an unreadable word file, an unusable
/// configuration, or a failed search.
fn execute(opts: &Opts) -> Result<(), SearchError>
{
	// Open the word list, creating the binary word list if necessary.
	let words = WordList::open(&opts.directory, &opts.dictionary)?;
	match opts.command
	{
		Command::Generate =>
		{
			trace!("Exiting after generating binary word list");
		},
		Command::Sets =>
		{
			let config = opts.search_config()?;
			let alphabet = Alphabet::from_phrase(&config.target_phrase);
			let dictionary = Arc::new(Dictionary::prepare(&words, &alphabet));
			let enumerator = Enumerator::new(
				dictionary,
				&alphabet,
				SearchBounds::lengths(config.min_words..=config.max_words)
			);
			let mut count = 0;
			for found in enumerator
			{
				println!("{}", found.join(" "));
				count += 1;
			}
			info!("{} found sets", count);
		},
		Command::Search =>
		{
			let config = opts.search_config()?;
			let coordinator = Coordinator::new(config, &words)?;
			let report = coordinator.run()?;
			for found in &report.matches
			{
				println!("{}", found);
			}
			if !report.satisfied
			{
				info!(
					"{} of {} digests matched",
					report.matches.len(),
					coordinator.config().target_digests.len()
				);
			}
		}
	}
	Ok(())
}
