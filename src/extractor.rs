//! The extraction session.
//!
//! An [`Extractor`] owns the configuration and the latest completed
//! extraction. Each [`Extractor::set_project`] call replaces the project
//! wholesale and rebuilds the graph from scratch. Only one run may be in
//! flight at a time; a second call made meanwhile is rejected rather than
//! queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::graph::{build_graph, Extraction};
use crate::project::{Project, SourceFile};

pub struct Extractor {
    config: ExtractorConfig,
    running: AtomicBool,
    latest: RwLock<Option<Arc<Extraction>>>,
}

/// Clears the in-flight flag when a run ends, including by panic.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExtractError::RunInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
            latest: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Ingest `files` and run a full extraction.
    ///
    /// Fails with [`ExtractError::RunInProgress`] if another run on this
    /// extractor has not finished. Per-file problems never fail the call;
    /// they are reported on the returned extraction.
    pub fn set_project(&self, files: Vec<SourceFile>) -> Result<Arc<Extraction>> {
        let _guard = RunGuard::acquire(&self.running)?;

        let project = Project::new(files);
        debug!(files = project.len(), "starting extraction run");
        let extraction = Arc::new(build_graph(&project, &self.config));

        // a poisoned lock only means an earlier reader panicked
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = Some(Arc::clone(&extraction));
        info!(
            components = extraction.graph.len(),
            diagnostics = extraction.diagnostics.len(),
            "project set"
        );
        Ok(extraction)
    }

    /// The most recent completed extraction, if any.
    pub fn latest(&self) -> Option<Arc<Extraction>> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_set_project_replaces_latest() {
        let extractor = Extractor::default();
        assert!(extractor.latest().is_none());

        let first = extractor
            .set_project(vec![SourceFile::new("A.jsx", "function A() { return <div/>; }")])
            .unwrap();
        assert_eq!(first.graph.len(), 1);

        let second = extractor.set_project(Vec::new()).unwrap();
        assert!(second.graph.is_empty());
        assert!(extractor.latest().unwrap().graph.is_empty());
        assert!(!extractor.is_running());
    }

    #[test]
    fn test_concurrent_run_rejected() {
        let extractor = Arc::new(Extractor::default());
        let guard = RunGuard::acquire(&extractor.running).unwrap();

        let (tx, rx) = mpsc::channel();
        let worker = Arc::clone(&extractor);
        thread::spawn(move || {
            let _ = tx.send(worker.set_project(Vec::new()).map(|_| ()));
        });
        let result = rx.recv().unwrap();
        assert!(matches!(result, Err(ExtractError::RunInProgress)));

        drop(guard);
        assert!(extractor.set_project(Vec::new()).is_ok());
    }

    #[test]
    fn test_guard_released_after_run() {
        let flag = AtomicBool::new(false);
        {
            let _guard = RunGuard::acquire(&flag).unwrap();
            assert!(RunGuard::acquire(&flag).is_err());
        }
        assert!(RunGuard::acquire(&flag).is_ok());
    }
}
