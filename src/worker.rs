//! # Workers
//!
//! Herein is the message contract between the coordinator and its workers,
//! and the worker that honours it. A worker is registered once with the
//! alphabet and dictionary, then handles one [`WorkUnit`] at a time: it
//! reports every Found Set as it is discovered, signals progress after every
//! fruitless search quantum, then reports completion and waits for the next
//! unit.

use std::{
	any::Any,
	io,
	panic::{self, AssertUnwindSafe},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc
	},
	thread::{self, JoinHandle},
	time::Duration
};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace, warn};

use crate::{
	alphabet::Alphabet,
	dictionary::Dictionary,
	enumerator::Enumerator,
	partition::WorkUnit,
	permutation::Match
};

////////////////////////////////////////////////////////////////////////////////
//                                 Messages.                                  //
////////////////////////////////////////////////////////////////////////////////

/// A message from the coordinator to a worker.
#[derive(Clone, Debug)]
pub enum Request
{
	/// Supply the immutable search context. Sent once, before any work.
	Register
	{
		alphabet: Arc<Alphabet>,
		dictionary: Arc<Dictionary>
	},

	/// Assign a unit of work.
	Find(WorkUnit)
}

/// A message to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response
{
	/// A worker discovered a Found Set while processing its current unit.
	Match
	{
		worker: usize,
		words: Vec<String>
	},

	/// A worker is still busy with its current unit.
	Progress
	{
		worker: usize
	},

	/// A worker exhausted its current unit and is ready for the next.
	Complete
	{
		worker: usize,
		found: usize
	},

	/// A worker could not process its current unit. The worker remains
	/// ready for the next.
	Failed
	{
		worker: usize,
		unit: WorkUnit,
		reason: String
	},

	/// The checker found a phrase whose digest is a target.
	Hit(Match)
}

/// The endpoints that connect one worker to its coordinator.
#[derive(Debug)]
pub struct WorkerLink
{
	/// The worker's identifier, unique within one run.
	pub id: usize,

	/// Inbound requests. The worker stops once this is disconnected.
	pub requests: Receiver<Request>,

	/// Outbound responses.
	pub responses: Sender<Response>,

	/// Raised by the coordinator to abandon all work.
	pub cancel: Arc<AtomicBool>
}

////////////////////////////////////////////////////////////////////////////////
//                                  Worker.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The shared, immutable search context, as registered.
#[derive(Debug)]
struct Registration
{
	alphabet: Arc<Alphabet>,
	dictionary: Arc<Dictionary>
}

/// How the processing of one unit ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome
{
	/// The unit was exhausted; this many Found Sets were reported.
	Complete(usize),

	/// The coordinator raised the cancellation flag.
	Cancelled,

	/// The coordinator stopped listening.
	Disconnected
}

/// A worker that enumerates work units on behalf of a coordinator.
#[derive(Debug)]
#[must_use]
pub struct Worker
{
	/// The connection to the coordinator.
	link: WorkerLink,

	/// How long to search between checks for cancellation.
	quantum: Duration,

	/// The search context, once registered.
	registration: Option<Registration>
}

impl Worker
{
	/// Construct an unregistered worker.
	///
	/// # Arguments
	///
	/// * `link` - The connection to the coordinator.
	/// * `quantum` - How long to search between checks for cancellation.
	pub fn new(link: WorkerLink, quantum: Duration) -> Self
	{
		Self { link, quantum, registration: None }
	}

	/// Run the worker on a thread of its own.
	///
	/// # Errors
	///
	/// If the thread cannot be spawned.
	pub fn spawn(self) -> io::Result<JoinHandle<()>>
	{
		thread::Builder::new()
			.name(format!("worker-{}", self.link.id))
			.spawn(move || self.run())
	}

	/// Serve requests until the coordinator disconnects or cancels.
	pub fn run(mut self)
	{
		debug!("worker {} started", self.link.id);
		while let Ok(request) = self.link.requests.recv()
		{
			if self.is_cancelled()
			{
				break
			}
			match request
			{
				Request::Register { alphabet, dictionary } =>
				{
					if self.registration.is_some()
					{
						warn!(
							"worker {} ignored a second registration",
							self.link.id
						);
						continue
					}
					trace!(
						"worker {} registered: {} words",
						self.link.id,
						dictionary.len()
					);
					self.registration = Some(Registration { alphabet, dictionary });
				}
				Request::Find(unit) =>
				{
					if !self.find(unit)
					{
						break
					}
				}
			}
		}
		debug!("worker {} stopped", self.link.id);
	}

	/// Process a single unit and report the outcome.
	///
	/// # Returns
	///
	/// `true` if the worker should continue serving requests.
	fn find(&self, unit: WorkUnit) -> bool
	{
		let id = self.link.id;
		let Some(registration) = &self.registration else {
			return self.send(Response::Failed {
				worker: id,
				unit,
				reason: "worker is not registered".to_string()
			})
		};
		trace!("worker {} processing unit {}", id, unit);
		let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
			self.enumerate(registration, unit)
		}));
		match outcome
		{
			Ok(Outcome::Complete(found)) =>
				self.send(Response::Complete { worker: id, found }),
			Ok(Outcome::Cancelled) | Ok(Outcome::Disconnected) => false,
			Err(payload) => self.send(Response::Failed {
				worker: id,
				unit,
				reason: panic_reason(payload.as_ref())
			})
		}
	}

	/// Enumerate a unit to exhaustion, reporting each Found Set.
	fn enumerate(&self, registration: &Registration, unit: WorkUnit) -> Outcome
	{
		let mut enumerator = Enumerator::new(
			Arc::clone(&registration.dictionary),
			&registration.alphabet,
			unit.bounds()
		);
		let mut found = 0;
		while !enumerator.is_finished()
		{
			if self.is_cancelled()
			{
				return Outcome::Cancelled
			}
			let (next, indices) = enumerator.search(self.quantum);
			enumerator = next;
			let response = match indices
			{
				Some(indices) =>
				{
					found += 1;
					let words = enumerator.phrase(&indices);
					Response::Match { worker: self.link.id, words }
				},
				None if enumerator.is_finished() => continue,
				None => Response::Progress { worker: self.link.id }
			};
			if !self.send(response)
			{
				return Outcome::Disconnected
			}
		}
		Outcome::Complete(found)
	}

	/// Send a response.
	///
	/// # Returns
	///
	/// `true` if the coordinator is still listening.
	fn send(&self, response: Response) -> bool
	{
		self.link.responses.send(response).is_ok()
	}

	#[inline]
	fn is_cancelled(&self) -> bool
	{
		self.link.cancel.load(Ordering::Relaxed)
	}
}

/// Render a panic payload for a [`Response::Failed`].
fn panic_reason(payload: &(dyn Any + Send)) -> String
{
	if let Some(s) = payload.downcast_ref::<&str>()
	{
		s.to_string()
	}
	else if let Some(s) = payload.downcast_ref::<String>()
	{
		s.clone()
	}
	else
	{
		"worker panicked".to_string()
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::{
		sync::{atomic::{AtomicBool, Ordering}, Arc},
		time::Duration
	};

	use crossbeam_channel::unbounded;

	use crate::{
		alphabet::Alphabet,
		dictionary::Dictionary,
		partition::WorkUnit,
		worker::{Request, Response, Worker, WorkerLink}
	};

	/// Start a worker over the `aint` dictionary.
	fn start() -> (
		crossbeam_channel::Sender<Request>,
		crossbeam_channel::Receiver<Response>,
		Arc<AtomicBool>,
		std::thread::JoinHandle<()>
	)
	{
		let (request_tx, request_rx) = unbounded();
		let (response_tx, response_rx) = unbounded();
		let cancel = Arc::new(AtomicBool::new(false));
		let link = WorkerLink {
			id: 7,
			requests: request_rx,
			responses: response_tx,
			cancel: Arc::clone(&cancel)
		};
		let handle = Worker::new(link, Duration::from_millis(5))
			.spawn()
			.unwrap();
		(request_tx, response_rx, cancel, handle)
	}

	/// Register the `aint` dictionary.
	fn register(requests: &crossbeam_channel::Sender<Request>)
	{
		let alphabet = Alphabet::from_phrase("aint");
		let dictionary = Dictionary::from_words(
			&alphabet,
			&["a", "i", "an", "tin", "ant"]
		);
		requests.send(Request::Register {
			alphabet: Arc::new(alphabet),
			dictionary: Arc::new(dictionary)
		}).unwrap();
	}

	/// Matches precede the completion of their unit.
	#[test]
	fn test_find()
	{
		let (requests, responses, _cancel, handle) = start();
		register(&requests);
		requests.send(Request::Find(WorkUnit { length: 2, start: 0 })).unwrap();
		requests.send(Request::Find(WorkUnit { length: 2, start: 2 })).unwrap();
		requests.send(Request::Find(WorkUnit { length: 2, start: 1 })).unwrap();
		drop(requests);
		handle.join().unwrap();
		let all = responses.iter()
			.filter(|r| !matches!(r, Response::Progress { .. }))
			.collect::<Vec<_>>();
		assert_eq!(
			all,
			vec![
				Response::Match { worker: 7, words: vec!["a".into(), "tin".into()] },
				Response::Complete { worker: 7, found: 1 },
				Response::Complete { worker: 7, found: 0 },
				Response::Match { worker: 7, words: vec!["i".into(), "ant".into()] },
				Response::Complete { worker: 7, found: 1 }
			]
		);
	}

	/// Work before registration fails without killing the worker.
	#[test]
	fn test_unregistered()
	{
		let (requests, responses, _cancel, handle) = start();
		let unit = WorkUnit { length: 2, start: 0 };
		requests.send(Request::Find(unit)).unwrap();
		register(&requests);
		register(&requests);
		requests.send(Request::Find(unit)).unwrap();
		drop(requests);
		handle.join().unwrap();
		let all = responses.iter()
			.filter(|r| !matches!(r, Response::Progress { .. }))
			.collect::<Vec<_>>();
		assert!(matches!(
			&all[0],
			Response::Failed { worker: 7, unit: u, .. } if *u == unit
		));
		assert_eq!(all.len(), 3);
		assert_eq!(all[2], Response::Complete { worker: 7, found: 1 });
	}

	/// A raised cancellation flag stops the worker at the next request.
	#[test]
	fn test_cancel()
	{
		let (requests, responses, cancel, handle) = start();
		register(&requests);
		cancel.store(true, Ordering::Relaxed);
		requests.send(Request::Find(WorkUnit { length: 2, start: 0 })).unwrap();
		handle.join().unwrap();
		assert!(responses.try_recv().is_err());
	}
}
