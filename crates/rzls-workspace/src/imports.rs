//! Import files that implicitly apply to documents beneath them.

use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::project::FileKind;

pub const LEGACY_IMPORTS_FILE_NAME: &str = "_ViewImports.cshtml";
pub const COMPONENT_IMPORTS_FILE_NAME: &str = "_Imports.razor";

#[must_use]
pub fn imports_file_name(file_kind: FileKind) -> &'static str {
    if file_kind.is_component() {
        COMPONENT_IMPORTS_FILE_NAME
    } else {
        LEGACY_IMPORTS_FILE_NAME
    }
}

/// Paths of every import file that could apply to `document`, outermost first.
///
/// Candidates come from each directory between `project_dir` and the document's
/// own directory, both included. A document never imports itself.
#[must_use]
pub fn import_candidates(project_dir: &Utf8Path, document: &Utf8Path, file_kind: FileKind) -> Vec<Utf8PathBuf> {
    let name = imports_file_name(file_kind);
    let mut candidates = Vec::new();

    let mut directory = document.parent();
    while let Some(dir) = directory {
        if !dir.starts_with(project_dir) {
            break;
        }
        let candidate = dir.join(name);
        if candidate.as_path() != document {
            candidates.push(candidate);
        }
        if dir == project_dir {
            break;
        }
        directory = dir.parent();
    }

    candidates.reverse();
    candidates
}
