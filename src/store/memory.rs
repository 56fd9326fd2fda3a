use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::store::ProgressBackend;
use crate::store::schema::ProgressData;

#[derive(Debug, Default)]
struct MemoryState {
    saved: Option<ProgressData>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-process backend. Clones share the same slot, so a caller can keep a
/// handle after giving one to a `ProgressStore`.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: ProgressData) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().saved = Some(data);
        backend
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn saved(&self) -> Option<ProgressData> {
        self.state.borrow().saved.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }
}

impl ProgressBackend for MemoryBackend {
    fn read(&self) -> Result<Option<ProgressData>> {
        let state = self.state.borrow();
        if state.fail_reads {
            bail!("memory backend read refused");
        }
        Ok(state.saved.clone())
    }

    fn write(&self, data: &ProgressData) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            bail!("memory backend write refused");
        }
        state.saved = Some(data.clone());
        state.writes += 1;
        Ok(())
    }
}
