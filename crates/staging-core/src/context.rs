//! Execution context shared by every step of a run.

use crate::sink::RecordSink;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Project the run belongs to.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project name, used in logs
    pub name: String,
    /// Directory relative option paths are resolved against
    pub root: PathBuf,
}

impl ProjectConfig {
    /// Create a project config rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// The external system (org) records are loaded into.
#[derive(Clone)]
pub struct OrgConfig {
    /// Org name, used in logs
    pub name: String,
    sink: Arc<dyn RecordSink>,
}

impl OrgConfig {
    /// Create an org backed by `sink`.
    pub fn new(name: impl Into<String>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }

    /// Client for the org.
    pub fn sink(&self) -> &Arc<dyn RecordSink> {
        &self.sink
    }
}

impl fmt::Debug for OrgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Context every generation and loading step is constructed with.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub project: ProjectConfig,
    pub org: OrgConfig,
    /// Flow the orchestrator runs in, if any
    pub flow: Option<String>,
    /// Step name within the flow
    pub name: String,
    /// Step number within the flow
    pub stepnum: Option<u32>,
}

impl TaskContext {
    /// Create a context for a standalone task named `name`.
    pub fn new(project: ProjectConfig, org: OrgConfig, name: impl Into<String>) -> Self {
        Self {
            project,
            org,
            flow: None,
            name: name.into(),
            stepnum: None,
        }
    }

    /// Attach flow metadata.
    pub fn with_flow(mut self, flow: impl Into<String>, stepnum: u32) -> Self {
        self.flow = Some(flow.into());
        self.stepnum = Some(stepnum);
        self
    }

    /// Resolve a possibly relative path against the project root.
    pub fn resolve_path(&self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        if path.is_absolute() {
            path
        } else {
            self.project.root.join(path)
        }
    }
}
