use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crossbeam_channel::{select, Receiver, RecvTimeoutError, Sender};

use crate::stats::{report, Counters};
use crate::{Diagnostic, LogRecord, LogSink, LoggerConfig, LoggerError, RecordQueue, UnknownLabel};

pub(crate) enum Control {
    Shutdown,
}

/// The single consumer: rotates, dequeues, renders, writes.
///
/// Shutdown is only honoured once the queue is empty, so everything that
/// was accepted before `Control::Shutdown` is either written or counted.
pub(crate) struct DrainWorker<S> {
    sink: S,
    queue: Arc<RecordQueue>,
    counters: Arc<Counters>,
    doorbell: Receiver<()>,
    control: Receiver<Control>,
    diagnostics: Sender<Diagnostic>,
    idle_interval: Duration,
    write_retries: u32,
    retry_backoff: Duration,
    max_retry_backoff: Duration,
    unknown_label: UnknownLabel,
    stopping: bool,
}

impl<S: LogSink> DrainWorker<S> {
    pub(crate) fn new(sink: S,
                      config: &LoggerConfig,
                      queue: Arc<RecordQueue>,
                      counters: Arc<Counters>,
                      doorbell: Receiver<()>,
                      control: Receiver<Control>,
                      diagnostics: Sender<Diagnostic>
    ) -> Self {
        DrainWorker {
            sink,
            queue,
            counters,
            doorbell,
            control,
            diagnostics,
            idle_interval: config.idle_interval,
            write_retries: config.write_retries,
            retry_backoff: config.retry_backoff,
            max_retry_backoff: config.max_retry_backoff,
            unknown_label: config.unknown_label,
            stopping: false,
        }
    }

    pub(crate) fn spawn(self) -> Result<JoinHandle<Result<(), LoggerError>>, LoggerError>
    where
        S: 'static,
    {
        thread::Builder::new()
            .name("file-logger-writer".to_string())
            .spawn(move || self.run())
            .map_err(LoggerError::Spawn)
    }

    pub(crate) fn run(mut self) -> Result<(), LoggerError> {
        let mut backoff = self.retry_backoff;
        loop {
            match self.sink.check_and_rotate() {
                Ok(rotated) => {
                    if rotated {
                        Counters::bump(&self.counters.rotations, 1);
                    }
                    backoff = self.retry_backoff;
                }
                Err(err) => {
                    Counters::bump(&self.counters.rotation_failures, 1);
                    if self.stopping {
                        report(&self.diagnostics, Diagnostic::RotationFailed {
                            error: err.to_string(),
                            retry_in_ms: 0,
                        });
                        self.discard_remaining();
                        break;
                    }
                    report(&self.diagnostics, Diagnostic::RotationFailed {
                        error: err.to_string(),
                        retry_in_ms: u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    });
                    self.wait_for_shutdown(backoff);
                    backoff = next_backoff(backoff, self.max_retry_backoff);
                    continue;
                }
            }

            match self.queue.try_dequeue() {
                Some(record) => self.write(&record),
                None if self.stopping => break,
                None => self.wait_for_work(),
            }
        }
        self.sink.close()
    }

    fn write(&mut self,
             record: &LogRecord
    ) {
        let line = record.render(self.unknown_label);
        let mut delay = self.retry_backoff;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.sink.write_line(&line) {
                Ok(()) => {
                    Counters::bump(&self.counters.written, 1);
                    return;
                }
                Err(err) if attempts > self.write_retries => {
                    Counters::bump(&self.counters.failed_writes, 1);
                    report(&self.diagnostics, Diagnostic::WriteFailed {
                        error: err.to_string(),
                        attempts,
                    });
                    return;
                }
                Err(_) => {
                    thread::sleep(delay);
                    delay = next_backoff(delay, self.max_retry_backoff);
                }
            }
        }
    }

    fn discard_remaining(&mut self) {
        let mut count = 0;
        while self.queue.try_dequeue().is_some() {
            count += 1;
        }
        if count > 0 {
            Counters::bump(&self.counters.discarded, count);
            report(&self.diagnostics, Diagnostic::RecordsDiscarded { count });
        }
    }

    /// Idle: woken by a producer, by shutdown, or after `idle_interval`.
    fn wait_for_work(&mut self) {
        select! {
            recv(self.control) -> _ => self.stopping = true,
            recv(self.doorbell) -> msg => {
                if msg.is_err() {
                    self.stopping = true;
                }
            }
            default(self.idle_interval) => {}
        }
    }

    /// Backoff after a rotation failure. Producer wake-ups are ignored here.
    fn wait_for_shutdown(&mut self,
                         timeout: Duration
    ) {
        match self.control.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => self.stopping = true,
        }
    }
}

/// Doubles `current`, saturating instead of overflowing, and caps it at `max`.
fn next_backoff(current: Duration,
                max: Duration
) -> Duration {
    current.saturating_mul(2).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallSite, Severity};
    use crossbeam_channel::{bounded, unbounded};

    struct VecSink {
        lines: Sender<String>,
        fail_writes: u32,
        fail_rotations: u32,
    }

    impl LogSink for VecSink {
        fn check_and_rotate(&mut self) -> Result<bool, LoggerError> {
            if self.fail_rotations > 0 {
                self.fail_rotations -= 1;
                return Err(LoggerError::SinkOpen {
                    path: "mock-next".into(),
                    source: std::io::Error::other("directory gone"),
                });
            }
            Ok(false)
        }

        fn write_line(&mut self,
                      line: &str
        ) -> Result<(), LoggerError> {
            if self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(LoggerError::Write {
                    path: "mock".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            let _ = self.lines.send(line.to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<(), LoggerError> {
            Ok(())
        }
    }

    fn test_config() -> LoggerConfig {
        LoggerConfig::new("debug", "unused", 1024)
            .unwrap()
            .with_write_retries(2)
            .with_retry_backoff(Duration::from_millis(1), Duration::from_millis(4))
    }

    fn worker(fail_writes: u32,
              messages: &[&str]
    ) -> (DrainWorker<VecSink>, Receiver<String>, Arc<Counters>, Receiver<Diagnostic>) {
        worker_with(test_config(), fail_writes, 0, messages)
    }

    // The shutdown request is queued up front, so `run` returns as soon as
    // the queue is empty.
    fn worker_with(config: LoggerConfig,
                   fail_writes: u32,
                   fail_rotations: u32,
                   messages: &[&str]
    ) -> (DrainWorker<VecSink>, Receiver<String>, Arc<Counters>, Receiver<Diagnostic>) {
        let queue = Arc::new(RecordQueue::new(16));
        for message in messages {
            queue.try_enqueue(LogRecord::new(Severity::Info, message.to_string(), CallSite::default()));
        }
        let counters = Arc::new(Counters::default());
        let (lines_tx, lines_rx) = unbounded();
        let (_doorbell_tx, doorbell_rx) = bounded(1);
        let (control_tx, control_rx) = bounded(1);
        let (diag_tx, diag_rx) = unbounded();
        control_tx.send(Control::Shutdown).unwrap();

        let sink = VecSink { lines: lines_tx, fail_writes, fail_rotations };
        let worker = DrainWorker::new(
            sink, &config, queue, counters.clone(), doorbell_rx, control_rx, diag_tx,
        );
        (worker, lines_rx, counters, diag_rx)
    }

    #[test]
    fn drains_in_order_before_stopping() {
        let (worker, lines, counters, _) = worker(0, &["one", "two", "three"]);
        worker.run().unwrap();

        let written: Vec<String> = lines.try_iter().collect();
        assert_eq!(written.len(), 3);
        assert!(written[0].ends_with("] one"));
        assert!(written[1].ends_with("] two"));
        assert!(written[2].ends_with("] three"));
        assert_eq!(counters.snapshot(0).written, 3);
    }

    #[test]
    fn retries_failed_writes() {
        let (worker, lines, counters, diagnostics) = worker(2, &["kept"]);
        worker.run().unwrap();

        assert_eq!(lines.try_iter().count(), 1);
        assert_eq!(counters.snapshot(0).failed_writes, 0);
        assert!(diagnostics.try_recv().is_err());
    }

    #[test]
    fn gives_up_after_bounded_retries() {
        let (worker, lines, counters, diagnostics) = worker(3, &["lost", "kept"]);
        worker.run().unwrap();

        let written: Vec<String> = lines.try_iter().collect();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("] kept"));
        let stats = counters.snapshot(0);
        assert_eq!(stats.failed_writes, 1);
        assert_eq!(stats.written, 1);
        assert!(matches!(
            diagnostics.try_recv(),
            Ok(Diagnostic::WriteFailed { attempts: 3, .. })
        ));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let max = Duration::MAX;
        assert_eq!(next_backoff(Duration::MAX / 2 + Duration::from_secs(1), max), Duration::MAX);
        assert_eq!(next_backoff(Duration::MAX, max), Duration::MAX);
        assert_eq!(
            next_backoff(Duration::from_millis(3), Duration::from_millis(4)),
            Duration::from_millis(4)
        );
        assert_eq!(
            next_backoff(Duration::from_millis(1), Duration::from_millis(4)),
            Duration::from_millis(2)
        );
    }

    #[test]
    fn huge_rotation_backoff_does_not_panic() {
        let config = test_config()
            .with_retry_backoff(Duration::MAX / 2 + Duration::from_secs(1), Duration::MAX);
        let (worker, lines, counters, diagnostics) =
            worker_with(config, 0, u32::MAX, &["stuck", "also stuck"]);
        worker.run().unwrap();

        assert_eq!(lines.try_iter().count(), 0);
        let stats = counters.snapshot(0);
        assert_eq!(stats.rotation_failures, 2);
        assert_eq!(stats.discarded, 2);

        let reported: Vec<Diagnostic> = diagnostics.try_iter().collect();
        assert!(matches!(
            &reported[0],
            Diagnostic::RotationFailed { retry_in_ms: u64::MAX, .. }
        ));
        assert_eq!(reported.last(), Some(&Diagnostic::RecordsDiscarded { count: 2 }));
    }

    #[test]
    fn recovers_once_rotation_succeeds() {
        let (worker, lines, counters, diagnostics) =
            worker_with(test_config(), 0, 1, &["late"]);
        worker.run().unwrap();

        let stats = counters.snapshot(0);
        assert_eq!(stats.rotation_failures, 1);
        assert_eq!(stats.written, 1);
        assert_eq!(stats.discarded, 0);
        assert_eq!(lines.try_iter().count(), 1);
        assert_eq!(diagnostics.try_iter().count(), 1);
    }
}
