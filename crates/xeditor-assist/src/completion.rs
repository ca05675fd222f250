//! Python completion through `jedi`.
//!
//! A request is a snapshot of one document (text, path, cursor) plus the id
//! and revision it was taken at. The answer carries the same pair back so
//! the UI can drop it if the document changed in the meantime.

use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xeditor_core::config::CompletionConfig;
use xeditor_core::process::{self, ProcessSpec};
use xeditor_core::{Document, DocumentId, Language};

use crate::AssistError;

/// Reads a JSON request on stdin and prints a JSON list of names as the
/// last line of stdout.
const JEDI_HELPER: &str = r#"
import json, sys
try:
    import jedi
except ImportError:
    sys.stderr.write("jedi is not installed\n")
    sys.exit(2)
req = json.load(sys.stdin)
script = jedi.Script(req["source"], path=req["path"])
names = [c.name for c in script.complete(req["line"], req["column"])]
sys.stdout.write("\n" + json.dumps(names) + "\n")
"#;

/// A completion query for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub doc: DocumentId,
    pub revision: u64,
    pub language: Language,
    pub source: String,
    pub path: PathBuf,

    /// 1-based line
    pub line: usize,

    /// 0-based column
    pub column: usize,
}

impl CompletionRequest {
    /// Snapshots `doc` at its current cursor.
    pub fn from_document(doc: &Document) -> Self {
        let cursor = doc.cursor();
        Self {
            doc: doc.id(),
            revision: doc.revision(),
            language: doc.language(),
            source: doc.text().into_owned(),
            path: doc.path().to_path_buf(),
            line: cursor.one_based_line(),
            column: cursor.column,
        }
    }
}

/// Candidates computed for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completions {
    pub doc: DocumentId,
    pub revision: u64,
    pub items: Vec<String>,
}

impl Completions {
    /// Whether these were computed for the document as it is now.
    pub fn is_current(&self, doc: &Document) -> bool {
        self.doc == doc.id() && self.revision == doc.revision()
    }
}

/// Something that can name completions at a cursor.
pub trait Completer {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Vec<String>, AssistError>> + Send;
}

/// Completion for Python buffers, or nothing.
///
/// Names come back in the order the completer reports them. Any failure is
/// logged and yields an empty list.
pub async fn suggest<C: Completer>(completer: &C, request: &CompletionRequest) -> Vec<String> {
    if !request.language.is_python() {
        return Vec::new();
    }

    match completer.complete(request).await {
        Ok(names) => {
            tracing::debug!("{} completions at {}:{}", names.len(), request.line, request.column);
            names
        }
        Err(e) => {
            tracing::warn!("Completion failed: {}", e);
            Vec::new()
        }
    }
}

/// Owned variant of [`suggest`] for spawning as a task.
pub async fn complete_owned<C: Completer>(completer: C, request: CompletionRequest) -> Completions {
    let items = suggest(&completer, &request).await;
    Completions {
        doc: request.doc,
        revision: request.revision,
        items,
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    source: &'a str,
    path: &'a Path,
    line: usize,
    column: usize,
}

/// Runs the `jedi` helper with a Python interpreter.
#[derive(Debug, Clone)]
pub struct JediCompleter {
    python: String,
    timeout: Duration,
}

impl JediCompleter {
    pub fn new(python: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
        }
    }

    pub fn from_config(config: &CompletionConfig) -> Self {
        Self::new(config.python.clone(), config.timeout())
    }

    fn spec(&self, request: &CompletionRequest) -> Result<ProcessSpec, AssistError> {
        let input = serde_json::to_string(&WireRequest {
            source: &request.source,
            path: &request.path,
            line: request.line,
            column: request.column,
        })?;

        Ok(ProcessSpec::new(&self.python)
            .arg("-c")
            .arg(JEDI_HELPER)
            .stdin(input)
            .timeout(Some(self.timeout)))
    }
}

impl Completer for JediCompleter {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Vec<String>, AssistError>> + Send {
        let spec = self.spec(request);
        let timeout = self.timeout;
        async move {
            let spec = spec?;
            let output = process::capture(&spec)
                .await
                .map_err(|source| AssistError::Spawn {
                    program: spec.program.clone(),
                    source,
                })?;

            if output.timed_out {
                return Err(AssistError::Timeout(timeout));
            }
            if !output.success() {
                return Err(AssistError::Failed {
                    status: output.status,
                    output: output.text.trim().to_string(),
                });
            }
            parse_names(&output.text)
        }
    }
}

/// Reads the JSON list from the helper's last non-empty line; anything the
/// analysis printed before it is ignored.
fn parse_names(output: &str) -> Result<Vec<String>, AssistError> {
    let last = output
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");
    Ok(serde_json::from_str(last)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeCompleter {
        result: Result<Vec<String>, ()>,
        calls: AtomicUsize,
    }

    impl FakeCompleter {
        fn answering(names: &[&str]) -> Self {
            Self {
                result: Ok(names.iter().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Completer for FakeCompleter {
        fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> impl Future<Output = Result<Vec<String>, AssistError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone().map_err(|_| AssistError::Failed {
                status: Some(1),
                output: "boom".to_string(),
            });
            async move { result }
        }
    }

    fn request(language: Language) -> CompletionRequest {
        CompletionRequest {
            doc: DocumentId::new(),
            revision: 3,
            language,
            source: "import os\nos.pa".to_string(),
            path: PathBuf::from("/tmp/a.py"),
            line: 2,
            column: 5,
        }
    }

    #[tokio::test]
    async fn test_non_python_is_empty_without_calling() {
        let completer = FakeCompleter::answering(&["path"]);
        let names = suggest(&completer, &request(Language::JavaScript)).await;
        assert!(names.is_empty());
        assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_python_keeps_order_and_duplicates() {
        let completer = FakeCompleter::answering(&["pathsep", "path", "path"]);
        let names = suggest(&completer, &request(Language::Python)).await;
        assert_eq!(names, ["pathsep", "path", "path"]);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let completer = FakeCompleter::failing();
        assert!(suggest(&completer, &request(Language::Python)).await.is_empty());
        assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_owned_result_carries_revision() {
        let req = request(Language::Python);
        let doc = req.doc;
        let result = complete_owned(FakeCompleter::answering(&["x"]), req).await;
        assert_eq!(result.doc, doc);
        assert_eq!(result.revision, 3);
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_error() {
        let completer = JediCompleter::new("xeditor-no-such-python", Duration::from_secs(1));
        let err = completer.complete(&request(Language::Python)).await.unwrap_err();
        assert!(matches!(err, AssistError::Spawn { .. }));
        assert!(suggest(&completer, &request(Language::Python)).await.is_empty());
    }

    #[test]
    fn test_parse_names_uses_last_line() {
        let names = parse_names("some warning\n\n[\"a\", \"b\"]\n").unwrap();
        assert_eq!(names, ["a", "b"]);
        assert!(parse_names("not json").is_err());
    }

    #[test]
    fn test_wire_request_shape() {
        let req = request(Language::Python);
        let spec = JediCompleter::new("python3", Duration::from_secs(5))
            .spec(&req)
            .unwrap();
        let sent: serde_json::Value = serde_json::from_str(spec.stdin.as_deref().unwrap()).unwrap();
        assert_eq!(sent["line"], 2);
        assert_eq!(sent["column"], 5);
        assert_eq!(sent["path"], "/tmp/a.py");
        assert_eq!(spec.args[0], "-c");
    }
}
