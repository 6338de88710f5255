use std::sync::atomic::{AtomicU64, Ordering};
use crossbeam_channel::Sender;

/// Sink problems the writer thread could not hide from operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    RotationFailed { error: String, retry_in_ms: u64 },
    WriteFailed { error: String, attempts: u32 },
    RecordsDiscarded { count: u64 },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self,
           f: &mut std::fmt::Formatter<'_>
    ) -> std::fmt::Result {
        match self {
            Diagnostic::RotationFailed { error, retry_in_ms } => {
                write!(f, "log rotation failed, retrying in {}ms: {}", retry_in_ms, error)
            }
            Diagnostic::WriteFailed { error, attempts } => {
                write!(f, "log record lost after {} write attempts: {}", attempts, error)
            }
            Diagnostic::RecordsDiscarded { count } => {
                write!(f, "{} queued log records discarded at shutdown", count)
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) enqueued: AtomicU64,
    pub(crate) written: AtomicU64,
    pub(crate) failed_writes: AtomicU64,
    pub(crate) discarded: AtomicU64,
    pub(crate) rotations: AtomicU64,
    pub(crate) rotation_failures: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64,
                       by: u64
    ) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self,
                           dropped: u64
    ) -> LoggerStats {
        LoggerStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped,
            written: self.written.load(Ordering::Relaxed),
            failed_writes: self.failed_writes.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_failures: self.rotation_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters.
///
/// Every accepted record ends up in exactly one of `written`,
/// `failed_writes` or `discarded` once the logger has been closed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoggerStats {
    /// Accepted into the queue.
    pub enqueued: u64,
    /// Rejected because the queue was full.
    pub dropped: u64,
    pub written: u64,
    /// Lost after exhausting write retries.
    pub failed_writes: u64,
    /// Still queued at shutdown while the sink was unusable.
    pub discarded: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
}

impl LoggerStats {
    pub fn lost(&self) -> u64 {
        self.dropped + self.failed_writes + self.discarded
    }
}

pub type ShutdownReport = LoggerStats;

/// Sends without blocking and mirrors the message on stderr.
pub(crate) fn report(diagnostics: &Sender<Diagnostic>,
                     diagnostic: Diagnostic
) {
    eprintln!("file_logger: {}", diagnostic);
    let _ = diagnostics.try_send(diagnostic);
}
