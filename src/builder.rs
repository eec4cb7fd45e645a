use crate::error::Result;
use crate::utils::default_workers;
use crate::{Backend, LcsEngine};

pub struct LcsEngineBuilder {
    workers: Option<usize>,
    backend: Backend,
}

impl Default for LcsEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LcsEngineBuilder {
    pub fn new() -> Self {
        Self {
            workers: None,
            backend: Backend::default(),
        }
    }
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
    pub fn build(self) -> Result<LcsEngine> {
        match self.workers {
            Some(w) => LcsEngine::with_backend(w, self.backend),
            None => LcsEngine::with_backend(default_workers(), self.backend),
        }
    }
}
