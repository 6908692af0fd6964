//! Compile service
//!
//! Front door for rapid edits. Every submission supersedes the ones before
//! it: the in-flight compile is cancelled, queued jobs are dropped in favor of
//! the newest, and only the newest generation's result is published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use alchemy_core::CompileOutput;
use alchemy_dsl::Compiler;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, ServiceError};
use crate::jobs::CompileJob;

/// Tracing target for the compile service.
const TRACING_TARGET: &str = "alchemy_runtime::engine";

/// Published result of one compile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileReport {
    /// Generation of the job that produced this output
    pub generation: u64,
    /// Hash of the compiled source
    pub hash: String,
    /// The compile output
    pub output: CompileOutput,
}

/// Counters of what the worker did with the jobs it received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceStats {
    /// Reports published
    pub published: u64,
    /// Jobs dropped because a newer one was queued or arrived mid-compile
    pub superseded: u64,
    /// Jobs skipped because the source matched the last published one
    pub unchanged: u64,
}

#[derive(Default)]
struct Counters {
    published: AtomicU64,
    superseded: AtomicU64,
    unchanged: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            published: self.published.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
        }
    }
}

struct Pending {
    job: CompileJob,
    cancel: CancellationToken,
}

type Latest = Option<Arc<CompileReport>>;

/// Handle to a background compile worker
pub struct CompileService {
    queue: mpsc::UnboundedSender<Pending>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<CancellationToken>,
    reports: watch::Receiver<Latest>,
    counters: Arc<Counters>,
    shutdown: CancellationToken,
    worker: JoinHandle<Result<Compiler>>,
}

impl CompileService {
    /// Spawn the worker on the current tokio runtime. The compiler moves into
    /// it and comes back from [`CompileService::shutdown`].
    pub fn spawn(compiler: Compiler) -> Self {
        let (queue, jobs) = mpsc::unbounded_channel();
        let (publisher, reports) = watch::channel(None);
        let generation = Arc::new(AtomicU64::new(0));
        let counters = Arc::new(Counters::default());
        let shutdown = CancellationToken::new();

        let worker = Worker {
            compiler: Arc::new(Mutex::new(compiler)),
            jobs,
            publisher,
            generation: Arc::clone(&generation),
            counters: Arc::clone(&counters),
            shutdown: shutdown.clone(),
            last_hash: None,
        };

        Self {
            queue,
            generation,
            in_flight: Mutex::new(CancellationToken::new()),
            reports,
            counters,
            shutdown,
            worker: tokio::spawn(worker.run()),
        }
    }

    /// Queue a source for compiling, returning its generation
    pub fn submit(&self, source: impl Into<String>) -> u64 {
        self.enqueue(|generation| CompileJob::new(generation, source))
    }

    /// Queue a source with its origin (a file path, an editor buffer id)
    pub fn submit_from(&self, source: impl Into<String>, origin: impl Into<String>) -> u64 {
        self.enqueue(|generation| CompileJob::new(generation, source).with_origin(origin))
    }

    fn enqueue(&self, make_job: impl FnOnce(u64) -> CompileJob) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            in_flight.cancel();
            *in_flight = cancel.clone();
        }

        let job = make_job(generation).with_submitted_at(now_millis());
        tracing::debug!(
            target: TRACING_TARGET,
            generation,
            hash = %job.hash,
            "Queued compile"
        );
        if self.queue.send(Pending { job, cancel }).is_err() {
            tracing::warn!(
                target: TRACING_TARGET,
                generation,
                "Compile worker has stopped; submission dropped"
            );
        }
        generation
    }

    /// Watch published reports
    pub fn subscribe(&self) -> watch::Receiver<Latest> {
        self.reports.clone()
    }

    /// The most recently published report
    pub fn latest(&self) -> Latest {
        self.reports.borrow().clone()
    }

    /// What the worker has done so far
    pub fn stats(&self) -> ServiceStats {
        self.counters.snapshot()
    }

    /// Stop the worker, cancelling any in-flight compile, and take the
    /// compiler back
    pub async fn shutdown(self) -> Result<Compiler> {
        tracing::info!(target: TRACING_TARGET, "Shutting down compile service");
        self.shutdown.cancel();
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .cancel();

        let compiler = self.worker.await.map_err(ServiceError::WorkerLost)??;
        tracing::info!(target: TRACING_TARGET, "Compile service stopped");
        Ok(compiler)
    }
}

struct Worker {
    compiler: Arc<Mutex<Compiler>>,
    jobs: mpsc::UnboundedReceiver<Pending>,
    publisher: watch::Sender<Latest>,
    generation: Arc<AtomicU64>,
    counters: Arc<Counters>,
    shutdown: CancellationToken,
    /// Hash of the source the registry currently reflects, if a compile of
    /// it was published and nothing has compiled since
    last_hash: Option<String>,
}

impl Worker {
    async fn run(mut self) -> Result<Compiler> {
        tracing::info!(target: TRACING_TARGET, "Starting compile worker");

        loop {
            let mut pending = tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                next = self.jobs.recv() => match next {
                    Some(pending) => pending,
                    None => break,
                },
            };

            while let Ok(newer) = self.jobs.try_recv() {
                self.counters.superseded.fetch_add(1, Ordering::Relaxed);
                pending = newer;
            }

            self.handle(pending).await;
        }

        tracing::info!(target: TRACING_TARGET, "Compile worker stopped");
        let compiler = Arc::try_unwrap(self.compiler).map_err(|_| ServiceError::CompilerInUse)?;
        Ok(compiler.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    async fn handle(&mut self, pending: Pending) {
        let Pending { job, cancel } = pending;

        if self.last_hash.as_deref() == Some(job.hash.as_str()) {
            tracing::debug!(
                target: TRACING_TARGET,
                generation = job.generation,
                "Source unchanged, skipping compile"
            );
            self.counters.unchanged.fetch_add(1, Ordering::Relaxed);
            return;
        }

        // Every compile clears the dynamic types, published or not
        self.last_hash = None;
        let output = match self.compile(&job, &cancel).await {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    generation = job.generation,
                    error = %err,
                    "Compile task failed, job dropped"
                );
                return;
            }
        };

        if cancel.is_cancelled() || self.generation.load(Ordering::SeqCst) != job.generation {
            tracing::debug!(
                target: TRACING_TARGET,
                generation = job.generation,
                "Compile superseded, result dropped"
            );
            self.counters.superseded.fetch_add(1, Ordering::Relaxed);
            return;
        }

        tracing::info!(
            target: TRACING_TARGET,
            generation = job.generation,
            nodes = output.nodes.len(),
            errors = output.errors.len(),
            "Publishing compile report"
        );
        self.last_hash = Some(job.hash.clone());
        self.counters.published.fetch_add(1, Ordering::Relaxed);
        self.publisher.send_replace(Some(Arc::new(CompileReport {
            generation: job.generation,
            hash: job.hash,
            output,
        })));
    }

    async fn compile(
        &self,
        job: &CompileJob,
        cancel: &CancellationToken,
    ) -> std::result::Result<CompileOutput, ServiceError> {
        let source = job.source.clone();
        let cancel = cancel.clone();
        self.with_compiler(job.generation, move |compiler| {
            compiler.compile_cancellable(&source, &cancel)
        })
        .await
    }

    /// Run `work` against the compiler on the blocking pool. The compiler
    /// stays with the worker even if the task fails.
    async fn with_compiler<T: Send + 'static>(
        &self,
        generation: u64,
        work: impl FnOnce(&mut Compiler) -> T + Send + 'static,
    ) -> std::result::Result<T, ServiceError> {
        let compiler = Arc::clone(&self.compiler);
        tokio::task::spawn_blocking(move || {
            let mut compiler = lock(&compiler);
            work(&mut *compiler)
        })
        .await
        .map_err(|source| ServiceError::CompileTask { generation, source })
    }
}

fn lock(compiler: &Mutex<Compiler>) -> MutexGuard<'_, Compiler> {
    compiler.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
