//! Language tags derived from file extensions.
//!
//! The tag decides which features apply to a buffer: only `python` can be
//! completed and run. Nothing else in the editor looks at it.

use std::fmt;
use std::path::Path;

/// Language tag of an open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    Python,
    Cpp,
    C,
    Java,
    Html,
    JavaScript,
    Css,
    CSharp,
    #[default]
    PlainText,
}

impl Language {
    /// Maps an extension (without the leading dot) to a tag.
    ///
    /// Matching is case-sensitive: `main.PY` is plain text.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" => Language::Python,
            "cpp" | "h" => Language::Cpp,
            "c" => Language::C,
            "java" => Language::Java,
            "html" => Language::Html,
            "js" => Language::JavaScript,
            "css" => Language::Css,
            "cs" => Language::CSharp,
            _ => Language::PlainText,
        }
    }

    /// Tags a path by its extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// The short label shown to users and written to logs.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Java => "java",
            Language::Html => "html",
            Language::JavaScript => "js",
            Language::Css => "css",
            Language::CSharp => "csharp",
            Language::PlainText => "plaintext",
        }
    }

    /// Completion and run are only offered for Python.
    pub fn is_python(self) -> bool {
        self == Language::Python
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
