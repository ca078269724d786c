//! # Anagram Hash Solver
//!
//! Given a target phrase and a handful of MD5 digests, find the anagram
//! phrases of the target, built from a dictionary of words, whose digests
//! appear in the list.
//!
//! The search proceeds in two stages. First, the
//! [enumerator](enumerator::Enumerator) finds every Found Set: a combination
//! of dictionary words whose letters are exactly the letters of the target
//! phrase. Then every ordering of each Found Set is hashed and compared
//! against the targets by the [checker](permutation::Checker). The search
//! space is [partitioned](partition::Partitioner) into independent units that
//! a [coordinator](coordinator::Coordinator) hands out to a pool of
//! [workers](worker::Worker).

pub mod alphabet;
pub mod config;
pub mod coordinator;
pub mod dictionary;
pub mod enumerator;
pub mod error;
pub mod letters;
pub mod partition;
pub mod permutation;
pub mod worker;
