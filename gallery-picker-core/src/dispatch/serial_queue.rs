use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{bounded, unbounded, Sender};

use crate::models::error::GalleryError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A named worker thread that runs submitted jobs one at a time, in
/// submission order.
///
/// Backs the capture manager's session and write contexts. Dropping the queue
/// drains already-submitted jobs and joins the thread.
pub struct SerialQueue {
    label: String,
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl SerialQueue {
    pub fn new(label: &str) -> Result<Self, GalleryError> {
        let (sender, receiver) = unbounded::<Job>();
        let thread_label = label.to_string();

        let handle = thread::Builder::new()
            .name(label.into())
            .spawn(move || {
                for job in receiver.iter() {
                    // A panicking job must not take the queue down with it.
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        log::error!("job panicked on {} queue", thread_label);
                    }
                }
            })
            .map_err(|e| {
                let message = format!("failed to spawn {} thread: {}", label, e);
                GalleryError::ConfigurationFailed(message)
            })?;

        let thread_id = handle.thread().id();
        Ok(Self {
            label: label.to_string(),
            sender: Some(sender),
            handle: Some(handle),
            thread_id,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Queue `job` to run after everything submitted before it.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(Box::new(job)).is_err() {
            log::warn!("{} queue is shut down, dropping job", self.label);
        }
    }

    /// Whether the calling thread is this queue's worker.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Block until every job submitted before this call has run.
    ///
    /// Returns immediately when called from the queue's own thread.
    pub fn sync(&self) {
        if self.is_current() {
            return;
        }
        let (done_tx, done_rx) = bounded::<()>(1);
        self.dispatch(move || {
            let _ = done_tx.send(());
        });
        // Err means the job was dropped with the queue; nothing left to wait for.
        let _ = done_rx.recv();
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if !self.is_current() {
                let _ = handle.join();
            }
        }
    }
}
