//! Component manifests.
//!
//! A manifest is an INI document shipped next to a component:
//!
//! ```ini
//! [Component]
//! Name = factory.scriptEditor
//! Title = Script Editor
//! Module = scriptEditor
//! Object = ScriptEditor
//! Category = QWidget
//! Version = 1.0
//! Require = factory.preferencesManager
//! Deactivatable = False
//!
//! [Informations]
//! Author = Thomas Mansencal
//! Email = thomas.mansencal@gmail.com
//! Url = https://github.com/KelSolaar/Umbra
//! Description = Script editor.
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;

use crate::error::{ComponentError, ComponentResult};
use crate::file::ResourceResolver;

/// Extension of component manifests.
pub const MANIFEST_EXTENSION: &str = "rc";

/// How a component plugs into the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Plain component, initialized on activation.
    #[default]
    Default,
    /// Object component, initialized on activation.
    Object,
    /// Widget component: its UI is initialized and added to the host.
    Widget,
}

impl Category {
    /// The manifest spelling of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Default => "Default",
            Category::Object => "QObject",
            Category::Widget => "QWidget",
        }
    }

    /// Whether activation goes through the UI hooks.
    pub fn is_widget(&self) -> bool {
        *self == Category::Widget
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "Default" => Ok(Category::Default),
            "QObject" | "Object" => Ok(Category::Object),
            "QWidget" | "Widget" => Ok(Category::Widget),
            other => Err(ComponentError::manifest(format!("unknown category '{other}'"))),
        }
    }
}

/// Parsed component metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentManifest {
    pub name: String,
    pub title: String,
    pub module: String,
    pub object: String,
    pub category: Category,
    pub version: String,
    pub require: Vec<String>,
    pub deactivatable: bool,
    pub author: String,
    pub email: String,
    pub url: String,
    pub description: String,
    /// Directory holding the component, when loaded from disk.
    pub directory: Option<PathBuf>,
}

fn parse_bool(value: &str) -> ComponentResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ComponentError::manifest(format!("invalid boolean '{other}'"))),
    }
}

impl ComponentManifest {
    /// A deactivatable default component without dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            module: String::new(),
            object: String::new(),
            category: Category::Default,
            version: String::new(),
            require: Vec::new(),
            deactivatable: true,
            author: String::new(),
            email: String::new(),
            url: String::new(),
            description: String::new(),
            directory: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the names of the required components.
    pub fn with_require<I, S>(mut self, require: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require = require.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deactivatable(mut self, deactivatable: bool) -> Self {
        self.deactivatable = deactivatable;
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Parses a manifest document.
    pub fn parse(content: &str) -> ComponentResult<Self> {
        let ini = Ini::load_from_str(content).map_err(|e| ComponentError::manifest(e.to_string()))?;
        let component = |key: &str| {
            ini.get_from(Some("Component"), key)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };
        let informations = |key: &str| {
            ini.get_from(Some("Informations"), key)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        let name = component("Name");
        if name.is_empty() {
            return Err(ComponentError::manifest("missing [Component] Name"));
        }
        let title = match component("Title") {
            title if title.is_empty() => name.clone(),
            title => title,
        };
        let require = component("Require")
            .split(['|', ','])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        let deactivatable = match component("Deactivatable") {
            value if value.is_empty() => true,
            value => parse_bool(&value)?,
        };

        Ok(Self {
            name,
            title,
            module: component("Module"),
            object: component("Object"),
            category: component("Category").parse()?,
            version: component("Version"),
            require,
            deactivatable,
            author: informations("Author"),
            email: informations("Email"),
            url: informations("Url"),
            description: informations("Description"),
            directory: None,
        })
    }

    /// Reads the manifest at `path`, recording its directory.
    pub fn load(path: impl AsRef<Path>) -> ComponentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ComponentError::manifest(format!("{}: {e}", path.display())))?;
        let mut manifest = Self::parse(&content)?;
        manifest.directory = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Reads every manifest found by `resolver`.
    pub fn discover(resolver: &ResourceResolver) -> Vec<ComponentResult<Self>> {
        resolver
            .list(MANIFEST_EXTENSION)
            .into_iter()
            .map(Self::load)
            .collect()
    }

    /// Name of the group the component is listed under.
    ///
    /// Components loaded from disk are grouped by the title-cased name of
    /// the directory above their own; others by category.
    pub fn group(&self) -> String {
        let parent = self
            .directory
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        match parent {
            Some(name) => {
                let mut chars = name.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect())
                    .unwrap_or_default()
            }
            None => self.category.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const SCRIPT_EDITOR: &str = "
[Component]
Name = factory.scriptEditor
Title = Script Editor
Module = scriptEditor
Object = ScriptEditor
Category = QWidget
Version = 4.0.0
Require = factory.preferencesManager|factory.componentsManagerUi
Deactivatable = False

[Informations]
Author = Thomas Mansencal
Email = thomas.mansencal@gmail.com
Url = https://github.com/KelSolaar/Umbra
Description = Script editor.
";

    #[test]
    fn test_parse_full_manifest() {
        let manifest = ComponentManifest::parse(SCRIPT_EDITOR).unwrap();
        assert_eq!(manifest.name, "factory.scriptEditor");
        assert_eq!(manifest.title, "Script Editor");
        assert_eq!(manifest.category, Category::Widget);
        assert_eq!(
            manifest.require,
            ["factory.preferencesManager", "factory.componentsManagerUi"]
        );
        assert!(!manifest.deactivatable);
        assert_eq!(manifest.author, "Thomas Mansencal");
        assert_eq!(manifest.group(), "QWidget");
    }

    #[test]
    fn test_defaults() {
        let manifest = ComponentManifest::parse("[Component]\nName = addons.tcpServerUi\n").unwrap();
        assert_eq!(manifest.title, "addons.tcpServerUi");
        assert_eq!(manifest.category, Category::Default);
        assert!(manifest.deactivatable);
        assert!(manifest.require.is_empty());
    }

    #[test]
    fn test_invalid_manifests() {
        assert!(ComponentManifest::parse("[Component]\nTitle = Nameless\n").is_err());
        assert!(ComponentManifest::parse("[Component]\nName = a\nCategory = Gizmo\n").is_err());
        assert!(ComponentManifest::parse("[Component]\nName = a\nDeactivatable = maybe\n").is_err());
    }

    #[test]
    fn test_discover_groups_by_directory() {
        let root = TempDir::new().unwrap();
        let directory = root.path().join("addons").join("tcpServerUi");
        fs::create_dir_all(&directory).unwrap();
        fs::write(directory.join("tcpServerUi.rc"), "[Component]\nName = addons.tcpServerUi\n").unwrap();

        let resolver = ResourceResolver::with_directories([directory.clone()]);
        let manifests = ComponentManifest::discover(&resolver);
        assert_eq!(manifests.len(), 1);
        let manifest = manifests.into_iter().next().unwrap().unwrap();
        assert_eq!(manifest.directory.as_deref(), Some(directory.as_path()));
        assert_eq!(manifest.group(), "Addons");
    }
}
