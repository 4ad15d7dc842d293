//! In-memory module loader for development and testing.
//!
//! Simulates shared team libraries without touching the platform loader.
//! Modules are keyed by file name, so the same loader works with any
//! discovery directory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tccl_core::types::CapabilitySet;

use crate::descriptor::{Finalizer, TeamLibDescriptor};
use crate::error::{TeamLibError, TeamLibResult};
use crate::loader::{ModuleLoader, TEAM_LIB_PREFIX, TeamLibModule};

/// Lifecycle events observed by a [`MockLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// A module was opened (file name).
    Opened(String),
    /// A team library's teardown entry point ran (display name).
    Finalized(String),
    /// A module was closed (file name).
    Closed(String),
}

#[derive(Debug, Clone)]
enum MockModule {
    Exports {
        symbol: String,
        name: String,
        capabilities: CapabilitySet,
    },
    MissingSymbol,
    Unopenable(String),
}

type EventLog = Arc<Mutex<Vec<MockEvent>>>;

fn record(events: &EventLog, event: MockEvent) {
    events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
}

/// A [`ModuleLoader`] serving modules from memory.
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    modules: HashMap<String, MockModule>,
    events: EventLog,
}

impl MockLoader {
    /// Creates a loader with no modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// File name a team library called `name` is discovered under.
    pub fn file_name(name: &str) -> String {
        format!(
            "{TEAM_LIB_PREFIX}{name}.{}",
            std::env::consts::DLL_EXTENSION
        )
    }

    /// Adds a well-formed team library.
    pub fn with_team_lib(mut self, name: &str, capabilities: CapabilitySet) -> Self {
        self.modules.insert(
            Self::file_name(name),
            MockModule::Exports {
                symbol: format!("{TEAM_LIB_PREFIX}{name}"),
                name: name.to_string(),
                capabilities,
            },
        );
        self
    }

    /// Adds a module that opens but does not export its descriptor.
    pub fn with_missing_symbol(mut self, name: &str) -> Self {
        self.modules
            .insert(Self::file_name(name), MockModule::MissingSymbol);
        self
    }

    /// Adds a module that fails to open.
    pub fn with_broken_module(mut self, name: &str, reason: &str) -> Self {
        self.modules.insert(
            Self::file_name(name),
            MockModule::Unopenable(reason.to_string()),
        );
        self
    }

    /// Creates an empty placeholder file in `dir` for every module.
    pub fn write_files(&self, dir: &Path) -> std::io::Result<()> {
        for file_name in self.modules.keys() {
            std::fs::write(dir.join(file_name), b"")?;
        }
        Ok(())
    }

    /// Events recorded so far, in order.
    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ModuleLoader for MockLoader {
    fn open(&self, path: &Path) -> TeamLibResult<Box<dyn TeamLibModule>> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let module = match self.modules.get(&file_name) {
            Some(MockModule::Unopenable(reason)) => {
                return Err(TeamLibError::ModuleOpen {
                    path: path.to_path_buf(),
                    reason: reason.clone(),
                });
            }
            Some(module) => module.clone(),
            None => {
                return Err(TeamLibError::ModuleOpen {
                    path: path.to_path_buf(),
                    reason: "no such mock module".to_string(),
                });
            }
        };

        record(&self.events, MockEvent::Opened(file_name.clone()));
        Ok(Box::new(MockHandle {
            file_name,
            module,
            events: self.events.clone(),
        }))
    }
}

#[derive(Debug)]
struct MockHandle {
    file_name: String,
    module: MockModule,
    events: EventLog,
}

impl TeamLibModule for MockHandle {
    fn resolve(&self, symbol: &str) -> TeamLibResult<TeamLibDescriptor> {
        match &self.module {
            MockModule::Exports {
                symbol: exported,
                name,
                capabilities,
            } if exported == symbol => {
                let events = self.events.clone();
                let finalized = name.clone();
                Ok(TeamLibDescriptor::new(name.clone(), *capabilities).with_finalizer(
                    Finalizer::new(move || record(&events, MockEvent::Finalized(finalized))),
                ))
            }
            _ => Err(TeamLibError::SymbolResolution {
                path: self.file_name.clone().into(),
                symbol: symbol.to_string(),
                reason: "undefined symbol".to_string(),
            }),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        record(&self.events, MockEvent::Closed(self.file_name.clone()));
    }
}
