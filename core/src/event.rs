use std::thread::JoinHandle;

use crossbeam_channel::Receiver;

use crate::{
    attack::AttackReport,
    error::{BrutyfError, BrutyfResult},
};

/// The successive phases of an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackPhase {
    Idle,
    /// The attack strategy is derived from the configuration.
    SelectStrategy,
    /// The targets already cracked in previous runs are put aside.
    FilterCache,
    /// A single worker runs in the calling thread.
    SingleThreaded,
    /// The work is split among several workers.
    Partitioned,
    /// The results of the workers are collected.
    Aggregate,
    /// The results are written to the potfile and the session.
    Persist,
    Report,
    Done,
}

/// An event to track the progress of an attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The attack moved to a new phase.
    Phase(AttackPhase),
    /// A worker started to search the password of a target.
    TargetStarted { hash: String },
    /// The number of candidates tried so far, out of `total` when it is known.
    Progress { current: u64, total: Option<u64> },
    /// A password was found.
    Found { hash: String, password: String },
    /// The search space of a target was exhausted without a match.
    Exhausted { hash: String },
}

pub struct AttackHandle {
    pub(crate) thread_handle: JoinHandle<BrutyfResult<AttackReport>>,
    pub(crate) receiver: Receiver<Event>,
}

impl AttackHandle {
    /// Returns the report of the attack.
    /// Blocks until the attack is finished.
    pub fn join(self) -> BrutyfResult<AttackReport> {
        self.thread_handle
            .join()
            .map_err(|_| BrutyfError::WorkerPanicked)?
    }

    /// Blocks until an event is received.
    /// Returns `None` if the attack is finished.
    pub fn recv(&self) -> Option<Event> {
        self.receiver.recv().ok()
    }
}
