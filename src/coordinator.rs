//! # Coordinator
//!
//! The coordinator owns a pool of [workers](crate::worker::Worker) and a
//! digest checker. It hands out [work units](WorkUnit) on demand, forwards
//! every reported Found Set to the checker, and stops as soon as every target
//! digest has been matched or every unit has been processed.
//!
//! The Found Sets of a unit are held back until the unit completes, so a unit
//! that fails part way contributes nothing. Units whose worker fails or falls
//! silent for longer than the configured timeout are handed out again, up to
//! a configured number of attempts.

use std::{
	collections::{BTreeSet, HashMap},
	io,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc
	},
	thread::{self, JoinHandle},
	time::{Duration, Instant}
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, trace, warn};

use crate::{
	alphabet::Alphabet,
	config::SearchConfig,
	dictionary::{Dictionary, WordList},
	error::SearchError,
	partition::{Partitioner, WorkUnit},
	permutation::{Checker, Match},
	worker::{Request, Response, Worker, WorkerLink}
};

/// How often the coordinator wakes to look for overdue units when no message
/// arrives.
const TICK: Duration = Duration::from_millis(25);

////////////////////////////////////////////////////////////////////////////////
//                                  Reports.                                  //
////////////////////////////////////////////////////////////////////////////////

/// The outcome of a search run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchReport
{
	/// Every matched digest, at most once each, in order of discovery.
	pub matches: Vec<Match>,

	/// The number of Found Sets reported by workers.
	pub found_sets: usize,

	/// The number of units processed to exhaustion.
	pub units_completed: usize,

	/// The number of times a unit was handed out again.
	pub units_reissued: usize,

	/// Whether every target digest was matched.
	pub satisfied: bool,

	/// The wall time of the run.
	pub elapsed: Duration
}

////////////////////////////////////////////////////////////////////////////////
//                                Coordinator.                                //
////////////////////////////////////////////////////////////////////////////////

/// A configured search, ready to run.
#[derive(Clone, Debug)]
#[must_use]
pub struct Coordinator
{
	/// The validated configuration.
	config: SearchConfig,

	/// The alphabet of the target phrase.
	alphabet: Arc<Alphabet>,

	/// The dictionary, prepared for the alphabet.
	dictionary: Arc<Dictionary>,

	/// The target digests.
	checker: Checker
}

impl Coordinator
{
	/// Prepare a search from a configuration and a raw word list.
	///
	/// # Errors
	///
	/// [`SearchError::InvalidConfig`] if the configuration is unusable.
	pub fn new(config: SearchConfig, words: &WordList) -> Result<Self, SearchError>
	{
		let alphabet = Alphabet::from_phrase(&config.target_phrase);
		let dictionary = Dictionary::prepare(words, &alphabet);
		Self::with_dictionary(config, alphabet, dictionary)
	}

	/// Prepare a search over an already prepared dictionary.
	///
	/// # Errors
	///
	/// [`SearchError::InvalidConfig`] if the configuration is unusable.
	pub fn with_dictionary(
		config: SearchConfig,
		alphabet: Alphabet,
		dictionary: Dictionary
	) -> Result<Self, SearchError>
	{
		config.validate()?;
		let checker = Checker::new(&config.target_digests);
		Ok(Self
		{
			config,
			alphabet: Arc::new(alphabet),
			dictionary: Arc::new(dictionary),
			checker
		})
	}

	/// The configuration.
	#[inline]
	#[must_use]
	pub fn config(&self) -> &SearchConfig { &self.config }

	/// The prepared dictionary.
	#[inline]
	pub fn dictionary(&self) -> &Arc<Dictionary> { &self.dictionary }

	/// Run the search on a pool of [`Worker`] threads.
	///
	/// # Errors
	///
	/// * [`SearchError::Io`] if a thread cannot be spawned.
	/// * [`SearchError::Transport`] if a message cannot be delivered.
	/// * [`SearchError::NoLiveWorkers`] if every worker is retired.
	/// * [`SearchError::RetriesExhausted`] if a unit fails too often.
	pub fn run(&self) -> Result<SearchReport, SearchError>
	{
		let quantum = self.config.quantum;
		self.run_with(|link| Worker::new(link, quantum).spawn())
	}

	/// Run the search on workers started by `spawn`, which receives the
	/// endpoints of each worker in turn and must return the handle of a
	/// thread that honours the [`Request`]/[`Response`] contract.
	///
	/// # Errors
	///
	/// As for [`run`](Self::run).
	pub fn run_with<F>(&self, mut spawn: F) -> Result<SearchReport, SearchError>
		where F: FnMut(WorkerLink) -> io::Result<JoinHandle<()>>
	{
		let start_time = Instant::now();
		info!(
			"searching {} words for {}..={}-word anagrams of {:?} with {} workers",
			self.dictionary.len(),
			self.config.min_words,
			self.config.max_words,
			self.config.target_phrase,
			self.config.worker_count
		);
		let partitioner = Partitioner::new(
			self.config.min_words..=self.config.max_words,
			self.dictionary.len()
		);
		debug!("{} units to process", partitioner.total());
		let cancel = Arc::new(AtomicBool::new(false));
		let (response_tx, response_rx) = unbounded();
		let (check_tx, check_rx) = unbounded();
		let checker = spawn_checker(
			self.checker.clone(),
			check_rx,
			response_tx.clone(),
			Arc::clone(&cancel)
		)?;
		let mut run = Run {
			config: &self.config,
			slots: Vec::new(),
			partitioner,
			attempts: HashMap::new(),
			outstanding: (0..self.checker.targets().len()).collect(),
			report: SearchReport::default(),
			response_rx,
			check_tx: Some(check_tx),
			cancel,
			checker: Some(checker)
		};
		let result = self.start_workers(&mut run, &mut spawn, response_tx)
			.and_then(|_| run.drive());
		let mut report = run.shutdown(result.is_err());
		result?;
		report.elapsed = start_time.elapsed();
		info!(
			"search finished in {:?}: {} units, {} found sets, {} matches",
			report.elapsed,
			report.units_completed,
			report.found_sets,
			report.matches.len()
		);
		Ok(report)
	}

	/// Spawn and register every worker.
	fn start_workers<F>(
		&self,
		run: &mut Run<'_>,
		spawn: &mut F,
		response_tx: Sender<Response>
	) -> Result<(), SearchError>
		where F: FnMut(WorkerLink) -> io::Result<JoinHandle<()>>
	{
		for id in 0..self.config.worker_count
		{
			let (request_tx, request_rx) = unbounded();
			let handle = spawn(WorkerLink {
				id,
				requests: request_rx,
				responses: response_tx.clone(),
				cancel: Arc::clone(&run.cancel)
			})?;
			request_tx
				.send(Request::Register {
					alphabet: Arc::clone(&self.alphabet),
					dictionary: Arc::clone(&self.dictionary)
				})
				.map_err(|_| SearchError::Transport(
					format!("worker {} hung up before registration", id)
				))?;
			run.slots.push(Slot {
				requests: Some(request_tx),
				handle: Some(handle),
				unit: None
			});
		}
		Ok(())
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Runs.                                    //
////////////////////////////////////////////////////////////////////////////////

/// A unit handed to a worker and not yet settled.
#[derive(Debug)]
struct InFlight
{
	unit: WorkUnit,

	/// When the unit was handed out.
	since: Instant,

	/// When the worker last reported on the unit.
	heard: Instant,

	/// The Found Sets reported so far, held until the unit completes.
	found: Vec<Vec<String>>
}

impl InFlight
{
	fn new(unit: WorkUnit) -> Self
	{
		let now = Instant::now();
		Self { unit, since: now, heard: now, found: Vec::new() }
	}
}

/// The coordinator's view of one worker.
#[derive(Debug)]
struct Slot
{
	/// The request channel, or `None` once the worker is retired.
	requests: Option<Sender<Request>>,

	/// The worker's thread, until joined or abandoned.
	handle: Option<JoinHandle<()>>,

	/// The unit in flight.
	unit: Option<InFlight>
}

impl Slot
{
	#[inline]
	fn is_retired(&self) -> bool
	{
		self.requests.is_none()
	}

	#[inline]
	fn is_idle(&self) -> bool
	{
		!self.is_retired() && self.unit.is_none()
	}

	/// The unit in flight, unless the worker is retired. Messages from
	/// retired workers are stale and must be ignored.
	#[inline]
	fn in_flight(&mut self) -> Option<&mut InFlight>
	{
		if self.is_retired() { None } else { self.unit.as_mut() }
	}

	/// Settle the unit in flight, unless the worker is retired.
	#[inline]
	fn settle(&mut self) -> Option<InFlight>
	{
		if self.is_retired() { None } else { self.unit.take() }
	}
}

/// The mutable state of one run. Only the coordinator's thread touches it.
struct Run<'a>
{
	config: &'a SearchConfig,
	slots: Vec<Slot>,
	partitioner: Partitioner,

	/// How many times each unit has been handed out.
	attempts: HashMap<WorkUnit, u32>,

	/// The indices of the target digests not yet matched.
	outstanding: BTreeSet<usize>,

	report: SearchReport,
	response_rx: Receiver<Response>,
	check_tx: Option<Sender<Vec<String>>>,
	cancel: Arc<AtomicBool>,
	checker: Option<JoinHandle<()>>
}

impl Run<'_>
{
	/// Dispatch, listen, and redispatch until every digest is matched or no
	/// work remains.
	fn drive(&mut self) -> Result<(), SearchError>
	{
		loop
		{
			self.dispatch_idle()?;
			if self.outstanding.is_empty()
			{
				debug!("every digest matched");
				return Ok(())
			}
			if self.partitioner.is_exhausted()
				&& self.slots.iter().all(|slot| slot.unit.is_none())
			{
				debug!("every unit processed");
				return Ok(())
			}
			if self.slots.iter().all(Slot::is_retired)
			{
				return Err(SearchError::NoLiveWorkers)
			}
			match self.response_rx.recv_timeout(TICK)
			{
				Ok(response) => self.handle(response)?,
				Err(RecvTimeoutError::Timeout) => {},
				Err(RecvTimeoutError::Disconnected) =>
				{
					return Err(SearchError::Transport(
						"every sender hung up".to_string()
					))
				}
			}
			self.expire_units();
		}
	}

	/// Act upon a single response.
	fn handle(&mut self, response: Response) -> Result<(), SearchError>
	{
		match response
		{
			Response::Match { worker, words } =>
			{
				let Some(flight) = self.slot(worker)?.in_flight() else {
					trace!("ignoring stray match from worker {}", worker);
					return Ok(())
				};
				trace!("worker {} found {:?}", worker, words);
				flight.heard = Instant::now();
				flight.found.push(words);
			}
			Response::Progress { worker } =>
			{
				if let Some(flight) = self.slot(worker)?.in_flight()
				{
					flight.heard = Instant::now();
				}
			}
			Response::Complete { worker, found } =>
			{
				let Some(flight) = self.slot(worker)?.settle() else {
					return Ok(())
				};
				debug!(
					"worker {} completed unit {} in {:?}: {} found sets",
					worker,
					flight.unit,
					flight.since.elapsed(),
					found
				);
				self.report.units_completed += 1;
				for words in flight.found
				{
					self.forward(words)?;
				}
			}
			Response::Failed { worker, unit, reason } =>
			{
				warn!("worker {} failed unit {}: {}", worker, unit, reason);
				if let Some(flight) = self.slot(worker)?.settle()
				{
					if !flight.found.is_empty()
					{
						debug!("discarding {} found sets", flight.found.len());
					}
					self.reissue(flight.unit);
				}
			}
			Response::Hit(found) =>
			{
				self.record(found);
			}
		}
		Ok(())
	}

	/// The slot of the given worker.
	///
	/// # Errors
	///
	/// [`SearchError::Transport`] if no such worker was started.
	fn slot(&mut self, worker: usize) -> Result<&mut Slot, SearchError>
	{
		self.slots.get_mut(worker).ok_or_else(|| {
			SearchError::Transport(format!("message from unknown worker {}", worker))
		})
	}

	/// Count a Found Set and pass it to the checker.
	fn forward(&mut self, words: Vec<String>) -> Result<(), SearchError>
	{
		self.report.found_sets += 1;
		let check_tx = self.check_tx.as_ref().ok_or_else(|| {
			SearchError::Transport("checker is closed".to_string())
		})?;
		check_tx.send(words).map_err(|_| {
			SearchError::Transport("checker hung up".to_string())
		})
	}

	/// Record a match, unless its digest is already matched.
	fn record(&mut self, found: Match)
	{
		if self.outstanding.remove(&found.digest_index)
		{
			info!("matched {}", found);
			self.report.matches.push(found);
		}
	}

	/// Hand a unit to every idle worker, while units remain.
	fn dispatch_idle(&mut self) -> Result<(), SearchError>
	{
		for id in 0..self.slots.len()
		{
			if !self.slots[id].is_idle()
			{
				continue
			}
			let Some(unit) = self.partitioner.next() else { break };
			let attempts = self.attempts.entry(unit).or_insert(0);
			*attempts += 1;
			if *attempts > self.config.max_attempts
			{
				return Err(SearchError::RetriesExhausted(unit))
			}
			let slot = &mut self.slots[id];
			let delivered = slot.requests.as_ref()
				.is_some_and(|tx| tx.send(Request::Find(unit)).is_ok());
			if delivered
			{
				trace!("dispatched unit {} to worker {}", unit, id);
				slot.unit = Some(InFlight::new(unit));
			}
			else
			{
				warn!("worker {} hung up; retiring it", id);
				slot.requests = None;
				self.attempts.entry(unit).and_modify(|n| *n -= 1);
				self.partitioner.reissue(unit);
			}
		}
		Ok(())
	}

	/// Retire every worker whose thread has died or that has been silent
	/// about its unit for too long, and hand its unit out again. Whatever the
	/// worker found is discarded.
	fn expire_units(&mut self)
	{
		let timeout = self.config.unit_timeout;
		let mut expired = Vec::new();
		for (id, slot) in self.slots.iter_mut().enumerate()
		{
			let Some(flight) = &slot.unit else { continue };
			let dead = slot.handle.as_ref().is_some_and(JoinHandle::is_finished);
			let overdue = timeout.is_some_and(|t| flight.heard.elapsed() > t);
			if dead || overdue
			{
				warn!(
					"retiring worker {} ({}) with unit {}",
					id,
					if dead { "dead" } else { "overdue" },
					flight.unit
				);
				slot.requests = None;
				expired.extend(slot.unit.take().map(|flight| flight.unit));
			}
		}
		for unit in expired
		{
			self.reissue(unit);
		}
	}

	/// Queue a unit to be handed out again.
	fn reissue(&mut self, unit: WorkUnit)
	{
		self.report.units_reissued += 1;
		self.partitioner.reissue(unit);
	}

	/// Stop every worker and the checker, collect the last matches, and
	/// produce the report. Retired workers are abandoned rather than joined,
	/// since they may never return.
	fn shutdown(&mut self, abort: bool) -> SearchReport
	{
		if abort || self.outstanding.is_empty()
		{
			self.cancel.store(true, Ordering::Relaxed);
		}
		let mut live = Vec::new();
		for slot in self.slots.iter_mut()
		{
			if slot.requests.take().is_some()
			{
				live.extend(slot.handle.take());
			}
		}
		self.check_tx = None;
		if let Some(checker) = self.checker.take()
		{
			if checker.join().is_err()
			{
				error!("checker panicked");
			}
		}
		while let Ok(response) = self.response_rx.try_recv()
		{
			if let Response::Hit(found) = response
			{
				self.record(found);
			}
		}
		for handle in live
		{
			if handle.join().is_err()
			{
				error!("worker panicked outside of a unit");
			}
		}
		self.report.satisfied = self.outstanding.is_empty();
		std::mem::take(&mut self.report)
	}
}

/// Start the checker thread, which tests every ordering of every Found Set
/// it receives and reports each hit.
fn spawn_checker(
	checker: Checker,
	found_sets: Receiver<Vec<String>>,
	responses: Sender<Response>,
	cancel: Arc<AtomicBool>
) -> Result<JoinHandle<()>, SearchError>
{
	let handle = thread::Builder::new()
		.name("checker".to_string())
		.spawn(move || {
			for words in found_sets.iter()
			{
				if cancel.load(Ordering::Relaxed)
				{
					break
				}
				for found in checker.check(&words)
				{
					if responses.send(Response::Hit(found)).is_err()
					{
						return
					}
				}
			}
			trace!("checker stopped");
		})?;
	Ok(handle)
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
