//! Single-consumer serial executor.
//!
//! # Responsibility
//! - Run submitted work items one at a time on a dedicated thread.
//! - Apply backpressure through a bounded FIFO mailbox.
//! - Provide a synchronous shutdown handshake.
//!
//! # Invariants
//! - Work items run in submission order and never overlap.
//! - A pending shutdown request is observed before the next queued item runs.
//! - Items still queued when shutdown is observed are discarded, not run.
//! - State moves from running to stopped exactly once.

use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// One unit of work bound to its execution context.
pub type WorkItem = Box<dyn FnOnce() + Send + 'static>;

/// Serial executor handle.
///
/// Dropping the handle performs a best-effort shutdown.
pub struct SerialExecutor {
    name: String,
    work_tx: Sender<WorkItem>,
    shutdown_tx: Sender<Sender<()>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SerialExecutor {
    /// Spawns the consumer thread with a mailbox holding `capacity` items.
    pub fn spawn(name: &str, capacity: usize) -> Result<Self, ExecutorError> {
        let (work_tx, work_rx) = crossbeam_channel::bounded::<WorkItem>(capacity);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<Sender<()>>(1);

        let loop_name = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_loop(&loop_name, &work_rx, &shutdown_rx))
            .map_err(ExecutorError::Spawn)?;

        Ok(Self {
            name: name.to_string(),
            work_tx,
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues one work item, blocking while the mailbox is full.
    pub fn submit(&self, item: WorkItem) -> Result<(), ExecutorError> {
        self.work_tx.send(item).map_err(|_| ExecutorError::Stopped)
    }

    /// Boxes and enqueues `task`.
    pub fn execute<F>(&self, task: F) -> Result<(), ExecutorError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(task))
    }

    /// Number of queued items not yet picked up by the consumer.
    pub fn pending(&self) -> usize {
        self.work_tx.len()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the consumer and waits for its acknowledgement.
    ///
    /// The item currently running (if any) completes; queued items are dropped.
    pub fn shutdown(&self) -> Result<(), ExecutorError> {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded::<()>(1);
        self.shutdown_tx
            .send(ack_tx)
            .map_err(|_| ExecutorError::Stopped)?;
        ack_rx.recv().map_err(|_| ExecutorError::Stopped)?;

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.join().map_err(|_| ExecutorError::Panicked)?;
        }
        Ok(())
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(err) = self.shutdown() {
                warn!(
                    "event=executor_drop module=executor status=error name={} error={}",
                    self.name, err
                );
            }
        }
    }
}

fn run_loop(name: &str, work_rx: &Receiver<WorkItem>, shutdown_rx: &Receiver<Sender<()>>) {
    info!("event=executor_start module=executor status=ok name={name}");
    loop {
        if let Ok(ack) = shutdown_rx.try_recv() {
            acknowledge_shutdown(name, work_rx, &ack);
            return;
        }

        select! {
            recv(shutdown_rx) -> message => {
                if let Ok(ack) = message {
                    acknowledge_shutdown(name, work_rx, &ack);
                }
                return;
            },
            recv(work_rx) -> message => match message {
                Ok(item) => item(),
                Err(_) => {
                    debug!("event=executor_stop module=executor status=disconnected name={name}");
                    return;
                }
            },
        }
    }
}

fn acknowledge_shutdown(name: &str, work_rx: &Receiver<WorkItem>, ack: &Sender<()>) {
    info!(
        "event=executor_stop module=executor status=ok name={} discarded={}",
        name,
        work_rx.len()
    );
    // Caller may have given up waiting; nothing else to notify.
    let _ = ack.send(());
}

/// Serial executor errors.
#[derive(Debug)]
pub enum ExecutorError {
    /// Consumer thread could not be started.
    Spawn(std::io::Error),
    /// Consumer already stopped.
    Stopped,
    /// Consumer thread panicked while running a work item.
    Panicked,
}

impl Display for ExecutorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn executor thread: {err}"),
            Self::Stopped => write!(f, "executor is stopped"),
            Self::Panicked => write!(f, "executor thread panicked"),
        }
    }
}

impl Error for ExecutorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Stopped | Self::Panicked => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutorError, SerialExecutor};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn runs_items_in_submission_order_without_overlap() {
        let executor = SerialExecutor::spawn("test-order", 8).expect("spawn executor");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let busy = Arc::new(AtomicBool::new(false));
        let overlapped = Arc::new(AtomicBool::new(false));

        for index in 0..64 {
            let seen = Arc::clone(&seen);
            let busy = Arc::clone(&busy);
            let overlapped = Arc::clone(&overlapped);
            executor
                .execute(move || {
                    if busy.swap(true, Ordering::SeqCst) {
                        overlapped.store(true, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_micros(50));
                    seen.lock().expect("seen lock").push(index);
                    busy.store(false, Ordering::SeqCst);
                })
                .expect("submit");
        }

        wait_until(|| seen.lock().expect("seen lock").len() == 64);
        executor.shutdown().expect("shutdown");

        let seen = seen.lock().expect("seen lock");
        assert_eq!(*seen, (0..64).collect::<Vec<_>>());
        assert!(!overlapped.load(Ordering::SeqCst));
    }

    #[test]
    fn shutdown_discards_queued_items() {
        let executor = Arc::new(SerialExecutor::spawn("test-discard", 16).expect("spawn"));
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        let ran = Arc::new(Mutex::new(Vec::new()));

        executor
            .execute(move || {
                let _ = started_tx.send(());
                let _ = gate_rx.recv();
            })
            .expect("submit gate");
        started_rx.recv().expect("gate item started");

        for index in 0..5 {
            let ran = Arc::clone(&ran);
            executor
                .execute(move || ran.lock().expect("ran lock").push(index))
                .expect("submit queued");
        }
        assert_eq!(executor.pending(), 5);

        let stopper = {
            let executor = Arc::clone(&executor);
            thread::spawn(move || executor.shutdown())
        };
        wait_until(|| executor.shutdown_tx.len() == 1);
        gate_tx.send(()).expect("open gate");

        stopper
            .join()
            .expect("stopper thread")
            .expect("shutdown acknowledged");
        assert!(ran.lock().expect("ran lock").is_empty());
        assert!(!executor.is_running());
    }

    #[test]
    fn full_mailbox_blocks_submitter_until_space_frees() {
        let executor = Arc::new(SerialExecutor::spawn("test-backpressure", 1).expect("spawn"));
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);

        executor
            .execute(move || {
                let _ = started_tx.send(());
                let _ = gate_rx.recv();
            })
            .expect("submit gate");
        started_rx.recv().expect("gate item started");
        executor.execute(|| {}).expect("fill mailbox");

        let accepted = Arc::new(AtomicBool::new(false));
        let submitter = {
            let executor = Arc::clone(&executor);
            let accepted = Arc::clone(&accepted);
            thread::spawn(move || {
                executor.execute(|| {}).expect("blocked submit");
                accepted.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!accepted.load(Ordering::SeqCst));

        gate_tx.send(()).expect("open gate");
        submitter.join().expect("submitter thread");
        assert!(accepted.load(Ordering::SeqCst));
        executor.shutdown().expect("shutdown");
    }

    #[test]
    fn second_shutdown_and_late_submit_report_stopped() {
        let executor = SerialExecutor::spawn("test-stopped", 4).expect("spawn");
        assert!(executor.is_running());
        executor.shutdown().expect("first shutdown");

        assert!(matches!(executor.shutdown(), Err(ExecutorError::Stopped)));
        assert!(matches!(
            executor.execute(|| {}),
            Err(ExecutorError::Stopped)
        ));
        assert!(!executor.is_running());
    }
}
