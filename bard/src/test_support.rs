//! Test-only helpers: scripted providers and throwaway workspaces.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Result, anyhow};

use crate::core::provider::{ProviderKind, ProviderRoute};
use crate::error::ProviderError;
use crate::io::completion::{Completer, CompletionRequest, ProviderFactory};
use crate::io::init::{Workspace, init_workspace};

/// Template written into every [`TestWorkspace`].
pub const DEFAULT_TEMPLATE: &str = "<!DOCTYPE html>\n\
    <html><head><style>body { width: 100%%; }</style></head>\n\
    <body>\n%s\n</body></html>\n";

/// One scripted completion outcome.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Fail(String),
}

impl Scripted {
    pub fn text(text: &str) -> Self {
        Scripted::Text(text.to_string())
    }

    pub fn fail(message: &str) -> Self {
        Scripted::Fail(message.to_string())
    }
}

/// Deterministic story sections `# Part 1` .. `# Part n`.
pub fn numbered_sections(n: u32) -> Vec<Scripted> {
    (1..=n)
        .map(|k| Scripted::Text(format!("# Part {k}\n\nThe story continues ({k}).")))
        .collect()
}

/// A completion request as seen by a scripted completer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: ProviderKind,
    pub model: String,
    pub prompt: String,
    pub seed: i64,
    pub max_tokens: u32,
    pub min_length: u32,
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Scripted>,
    calls: Vec<RecordedCall>,
    routes: Vec<ProviderRoute>,
}

/// Factory handing out completers that replay a fixed script.
///
/// Every completer built by one factory shares the same queue and call log.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    script: Rc<RefCell<Script>>,
    connect_error: Option<String>,
}

impl ScriptedFactory {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            script: Rc::new(RefCell::new(Script {
                responses: responses.into(),
                ..Script::default()
            })),
            connect_error: None,
        }
    }

    /// A factory whose `connect` always fails.
    pub fn failing_connect(reason: &str) -> Self {
        Self {
            connect_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.borrow().calls.clone()
    }

    pub fn routes(&self) -> Vec<ProviderRoute> {
        self.script.borrow().routes.clone()
    }
}

impl ProviderFactory for ScriptedFactory {
    fn connect(&self, route: &ProviderRoute) -> Result<Box<dyn Completer>> {
        self.script.borrow_mut().routes.push(route.clone());
        if let Some(reason) = &self.connect_error {
            return Err(ProviderError::Client {
                kind: route.kind,
                reason: reason.clone(),
            }
            .into());
        }
        Ok(Box::new(ScriptedCompleter {
            kind: route.kind,
            model: route.model.clone(),
            script: Rc::clone(&self.script),
        }))
    }
}

struct ScriptedCompleter {
    kind: ProviderKind,
    model: String,
    script: Rc<RefCell<Script>>,
}

impl Completer for ScriptedCompleter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut script = self.script.borrow_mut();
        script.calls.push(RecordedCall {
            kind: self.kind,
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            seed: request.seed.get(),
            max_tokens: request.max_tokens,
            min_length: request.min_length,
        });
        match script.responses.pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(ProviderError::Request {
                kind: self.kind,
                status: Some(500),
                message,
            }
            .into()),
            None => Err(anyhow!("scripted completer exhausted")),
        }
    }
}

/// Temporary workspace with `.env` and `output.template` already in place.
pub struct TestWorkspace {
    temp: tempfile::TempDir,
    workspace: Workspace,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join(".env"), "")?;
        fs::write(temp.path().join("output.template"), DEFAULT_TEMPLATE)?;
        let workspace = init_workspace(temp.path())?;
        Ok(Self { temp, workspace })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.temp.path().join(relative))?)
    }
}
