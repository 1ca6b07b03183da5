//! # Worker Pool
//!
//! A fork-join pool for the per-chunk pixel math. Callers hand a batch of
//! jobs to [`WorkerPool::run_batch`] and block until every job has come
//! back; from the caller's perspective the whole batch is one synchronous
//! call that happens to be parallel internally.
//!
//! ## Architecture
//!
//! Each worker is an OS thread owning a pair of `mpsc` channels: jobs go
//! in, type-erased outputs come out. Batches are distributed round-robin
//! across the workers and the join simply drains each channel for exactly
//! the number of jobs it was sent. There is deliberately no cancellation
//! path: jobs are pure, bounded pixel loops, and nothing upstream can
//! cancel them either.

use std::any::Any;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

/// A unit of parallel work.
///
/// Jobs own all the data they need (cloned kernel, shared palette handle,
/// output buffers), so a job never borrows from the dispatching thread and
/// its transient buffers die with its output once the caller has consumed
/// the join.
pub trait Job: Send {
    /// Runs the job to completion and returns its type-erased output.
    ///
    /// The caller that dispatched the batch downcasts the output back to
    /// the concrete type it expects.
    fn run(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// One worker thread plus its communication channels.
struct WorkerChannel {
    job_sender: Sender<Box<dyn Job>>,
    output_receiver: Receiver<Box<dyn Any + Send>>,
    jobs_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// A fixed pool of worker threads with round-robin job distribution.
///
/// The pool is created once (the world owns it) and reused for every
/// populate and recolor batch, so thread start-up cost is paid once per
/// session rather than once per chunk.
pub struct WorkerPool {
    channels: Vec<WorkerChannel>,
    next_channel: usize,
}

impl WorkerPool {
    /// Creates a pool with one worker per unit of available parallelism.
    pub fn with_available_parallelism() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        info!("Available parallelism: {workers}");
        Self::new(workers)
    }

    /// Creates a pool with the given number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Worker thread count; 0 is accepted and yields a
    ///   pool that runs every job inline on the calling thread
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (job_tx, job_rx) = channel::<Box<dyn Job>>();
            let (output_tx, output_rx) = channel::<Box<dyn Any + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let output = job.run();
                    let _ = output_tx.send(output);
                }
            });

            channels.push(WorkerChannel {
                job_sender: job_tx,
                output_receiver: output_rx,
                jobs_in_flight: 0,
                _worker: worker,
            });
        }

        WorkerPool {
            channels,
            next_channel: 0,
        }
    }

    /// Number of worker threads, which is also the natural batch width.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Runs a batch of jobs and blocks until all of them have completed.
    ///
    /// Jobs are distributed round-robin across the workers; a job whose
    /// worker has died is run inline so the batch still completes. The
    /// outputs come back in no particular order, so jobs should carry
    /// whatever indexing their caller needs to reassemble results.
    ///
    /// # Arguments
    /// * `jobs` - The batch to run; ownership moves to the workers
    ///
    /// # Returns
    /// One output per completed job.
    pub fn run_batch(&mut self, jobs: Vec<Box<dyn Job>>) -> Vec<Box<dyn Any + Send>> {
        let mut outputs = Vec::with_capacity(jobs.len());

        if self.channels.is_empty() {
            for job in jobs {
                outputs.push(job.run());
            }
            return outputs;
        }

        // Scatter round-robin, continuing from where the last batch ended.
        for job in jobs {
            let idx = self.next_channel;
            self.next_channel = (self.next_channel + 1) % self.channels.len();
            match self.channels[idx].job_sender.send(job) {
                Ok(()) => self.channels[idx].jobs_in_flight += 1,
                Err(send_error) => {
                    warn!("worker {idx} is gone, running its job inline");
                    outputs.push(send_error.0.run());
                }
            }
        }

        // Join: drain each channel for exactly the jobs it was sent.
        for (idx, chan) in self.channels.iter_mut().enumerate() {
            while chan.jobs_in_flight > 0 {
                chan.jobs_in_flight -= 1;
                match chan.output_receiver.recv() {
                    Ok(output) => outputs.push(output),
                    Err(_) => {
                        error!("worker {idx} died mid-batch, its output is lost");
                        break;
                    }
                }
            }
            chan.jobs_in_flight = 0;
        }

        outputs
    }
}
