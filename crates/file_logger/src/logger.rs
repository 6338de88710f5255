use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::stats::{report, Counters};
use crate::writer::{Control, DrainWorker};
use crate::{
    CallSite, Diagnostic, LogRecord, LogSink, LoggerConfig, LoggerError, LoggerStats, RecordQueue,
    RotatingSink, Severity, ShutdownReport,
};

const DIAGNOSTIC_CAPACITY: usize = 64;

/// Asynchronous logger writing through one background thread.
///
/// Logging calls never block and never fail: records that do not fit in the
/// queue are dropped and counted in [`LoggerStats::dropped`]. Share it by
/// reference or inside an `Arc`; there is no global instance.
///
/// The methods record the caller's file and line but leave the function
/// name empty. Use [`info!`](crate::info) and the other macros to get the
/// full `[file: function: line]` call site.
pub struct Logger {
    min_severity: Severity,
    queue: Arc<RecordQueue>,
    counters: Arc<Counters>,
    doorbell: Sender<()>,
    control: Sender<Control>,
    diagnostics_tx: Sender<Diagnostic>,
    diagnostics: Receiver<Diagnostic>,
    worker: Option<JoinHandle<Result<(), LoggerError>>>,
}

impl Logger {
    /// Opens the first log file in `config.directory` and starts the writer.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;
        let sink = RotatingSink::open(&config.directory, config.max_file_size)?;
        Logger::start(config, sink)
    }

    /// Like [`Logger::new`] but writes to `sink`. `config.directory` and
    /// `config.max_file_size` are not used.
    pub fn with_sink<S>(config: LoggerConfig,
                        sink: S
    ) -> Result<Self, LoggerError>
    where
        S: LogSink + 'static,
    {
        config.validate()?;
        Logger::start(config, sink)
    }

    /// Expects a validated `config`.
    fn start<S>(config: LoggerConfig,
                sink: S
    ) -> Result<Self, LoggerError>
    where
        S: LogSink + 'static,
    {
        let queue = Arc::new(RecordQueue::new(config.queue_capacity));
        let counters = Arc::new(Counters::default());
        let (doorbell_tx, doorbell_rx) = bounded(1);
        let (control_tx, control_rx) = bounded(1);
        let (diagnostics_tx, diagnostics_rx) = bounded(DIAGNOSTIC_CAPACITY);

        let worker = DrainWorker::new(
            sink,
            &config,
            queue.clone(),
            counters.clone(),
            doorbell_rx,
            control_rx,
            diagnostics_tx.clone(),
        )
        .spawn()?;

        Ok(Logger {
            min_severity: config.min_severity,
            queue,
            counters,
            doorbell: doorbell_tx,
            control: control_tx,
            diagnostics_tx,
            diagnostics: diagnostics_rx,
            worker: Some(worker),
        })
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn is_enabled(&self,
                      severity: Severity
    ) -> bool {
        severity >= self.min_severity
    }

    #[track_caller]
    pub fn debug(&self,
                 args: fmt::Arguments<'_>
    ) {
        self.log(Severity::Debug, args);
    }

    #[track_caller]
    pub fn trace(&self,
                 args: fmt::Arguments<'_>
    ) {
        self.log(Severity::Trace, args);
    }

    #[track_caller]
    pub fn info(&self,
                args: fmt::Arguments<'_>
    ) {
        self.log(Severity::Info, args);
    }

    #[track_caller]
    pub fn warning(&self,
                   args: fmt::Arguments<'_>
    ) {
        self.log(Severity::Warning, args);
    }

    #[track_caller]
    pub fn error(&self,
                 args: fmt::Arguments<'_>
    ) {
        self.log(Severity::Error, args);
    }

    #[track_caller]
    pub fn fatal(&self,
                 args: fmt::Arguments<'_>
    ) {
        self.log(Severity::Fatal, args);
    }

    /// File and line come from the caller; the function name is left empty.
    /// The macros in this crate fill it in.
    #[track_caller]
    pub fn log(&self,
               severity: Severity,
               args: fmt::Arguments<'_>
    ) {
        if self.is_enabled(severity) {
            self.submit(severity, CallSite::resolve(), args);
        }
    }

    pub fn log_at(&self,
                  severity: Severity,
                  site: CallSite,
                  args: fmt::Arguments<'_>
    ) {
        if self.is_enabled(severity) {
            self.submit(severity, site, args);
        }
    }

    fn submit(&self,
              severity: Severity,
              site: CallSite,
              args: fmt::Arguments<'_>
    ) {
        let record = LogRecord::new(severity, fmt::format(args), site);
        if self.queue.try_enqueue(record) {
            Counters::bump(&self.counters.enqueued, 1);
            let _ = self.doorbell.try_send(());
        }
    }

    pub fn stats(&self) -> LoggerStats {
        self.counters.snapshot(self.queue.dropped())
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Rotation failures, lost writes and shutdown discards, in order.
    pub fn diagnostics(&self) -> Receiver<Diagnostic> {
        self.diagnostics.clone()
    }

    /// Stops the writer after it has drained the queue, closes the sink and
    /// returns the final counters. On failure the counters travel inside
    /// [`LoggerError::Shutdown`].
    pub fn close(mut self) -> Result<ShutdownReport, LoggerError> {
        match self.shutdown() {
            Ok(()) => Ok(self.stats()),
            Err(err) => Err(LoggerError::Shutdown {
                report: self.stats(),
                source: Box::new(err),
            }),
        }
    }

    fn shutdown(&mut self) -> Result<(), LoggerError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        // The writer only exits once the queue is empty, so joining it is
        // the acknowledgement that nothing is left to write.
        let _ = self.control.send(Control::Shutdown);
        let result = worker.join().map_err(|_| LoggerError::WorkerPanicked);

        let mut leftover = 0;
        while self.queue.try_dequeue().is_some() {
            leftover += 1;
        }
        // A panicking writer may have taken a record with it.
        if result.is_err() {
            let stats = self.stats();
            let settled = stats.written + stats.failed_writes + stats.discarded + leftover;
            leftover += stats.enqueued.saturating_sub(settled);
        }
        if leftover > 0 {
            Counters::bump(&self.counters.discarded, leftover);
            report(&self.diagnostics_tx, Diagnostic::RecordsDiscarded { count: leftover });
        }

        result?
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            eprintln!("file_logger: shutdown failed: {}", err);
        }
    }
}
