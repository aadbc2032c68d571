use std::fmt;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use rzls_source::FilePathKey;

/// Identity of a project, derived from its project file path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProjectKey(FilePathKey);

impl ProjectKey {
    #[must_use]
    pub fn new(project_file: impl AsRef<str>) -> Self {
        Self(FilePathKey::new(project_file))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectKey({})", self.0)
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Compiler settings that apply to every document in a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfiguration {
    pub name: String,
    pub language_version: String,
    /// Names of compiler extensions enabled for the project.
    pub extensions: Vec<String>,
}

impl Default for ProjectConfiguration {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            language_version: "latest".to_string(),
            extensions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProject {
    key: ProjectKey,
    file_path: Utf8PathBuf,
    configuration: ProjectConfiguration,
    root_namespace: Option<String>,
}

impl HostProject {
    #[must_use]
    pub fn new(
        file_path: impl Into<Utf8PathBuf>,
        configuration: ProjectConfiguration,
        root_namespace: Option<String>,
    ) -> Self {
        let file_path = file_path.into();
        Self {
            key: ProjectKey::new(&file_path),
            file_path,
            configuration,
            root_namespace,
        }
    }

    #[must_use]
    pub fn key(&self) -> &ProjectKey {
        &self.key
    }

    #[must_use]
    pub fn file_path(&self) -> &Utf8Path {
        &self.file_path
    }

    /// The directory holding the project file; imports are not searched above it.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        self.file_path.parent().unwrap_or(Utf8Path::new(""))
    }

    #[must_use]
    pub fn configuration(&self) -> &ProjectConfiguration {
        &self.configuration
    }

    #[must_use]
    pub fn root_namespace(&self) -> Option<&str> {
        self.root_namespace.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.cshtml` views and pages.
    Legacy,
    /// `.razor` components.
    Component,
    /// `_Imports.razor`.
    ComponentImport,
}

impl FileKind {
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        if path
            .file_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(crate::imports::COMPONENT_IMPORTS_FILE_NAME))
        {
            return Some(FileKind::ComponentImport);
        }
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("razor") => Some(FileKind::Component),
            Some(ext) if ext.eq_ignore_ascii_case("cshtml") => Some(FileKind::Legacy),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_component(self) -> bool {
        matches!(self, FileKind::Component | FileKind::ComponentImport)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDocument {
    file_path: Utf8PathBuf,
    target_path: Utf8PathBuf,
    file_kind: FileKind,
}

impl HostDocument {
    /// A document whose kind comes from its file name; unknown extensions are
    /// treated as legacy views.
    #[must_use]
    pub fn new(file_path: impl Into<Utf8PathBuf>, target_path: impl Into<Utf8PathBuf>) -> Self {
        let file_path = file_path.into();
        let file_kind = FileKind::from_path(&file_path).unwrap_or(FileKind::Legacy);
        Self::with_file_kind(file_path, target_path, file_kind)
    }

    #[must_use]
    pub fn with_file_kind(
        file_path: impl Into<Utf8PathBuf>,
        target_path: impl Into<Utf8PathBuf>,
        file_kind: FileKind,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            target_path: target_path.into(),
            file_kind,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &Utf8Path {
        &self.file_path
    }

    /// Path relative to the project, as the compiler sees it.
    #[must_use]
    pub fn target_path(&self) -> &Utf8Path {
        &self.target_path
    }

    #[must_use]
    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }

    #[must_use]
    pub fn key(&self) -> FilePathKey {
        FilePathKey::new(&self.file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(FileKind::from_path(Utf8Path::new("/app/Pages/Index.cshtml")), Some(FileKind::Legacy));
        assert_eq!(FileKind::from_path(Utf8Path::new("/app/Counter.razor")), Some(FileKind::Component));
        assert_eq!(FileKind::from_path(Utf8Path::new("/app/_Imports.razor")), Some(FileKind::ComponentImport));
        assert_eq!(FileKind::from_path(Utf8Path::new("/app/site.css")), None);
        assert!(FileKind::ComponentImport.is_component());
    }

    #[test]
    fn test_project_directory() {
        let project = HostProject::new("/app/App.csproj", ProjectConfiguration::default(), None);
        assert_eq!(project.directory(), "/app");
        assert_eq!(project.key(), &ProjectKey::new("/app/./App.csproj"));
    }
}
