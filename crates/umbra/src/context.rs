//! Collaborators shared by the core subsystems.

use std::sync::Arc;

use crate::components::{ComponentHost, ComponentsManager};
use crate::error::HighlightResult;
use crate::file::{LayoutsManager, Preferences, ResourceResolver, SettingsStore};
use crate::highlight::Language;
use crate::model::{ModelRegistry, ProjectsModel};

/// Settings, resources and the model registry, passed explicitly to the
/// constructors that need them.
///
/// # Example
///
/// ```
/// use umbra::Context;
///
/// let context = Context::in_memory();
/// let projects = context.projects_model();
/// assert_eq!(projects.list_project_nodes(false).len(), 1);
/// assert!(context.models().len() >= 1);
/// ```
#[derive(Clone)]
pub struct Context {
    settings: Arc<dyn SettingsStore>,
    resources: ResourceResolver,
    models: Arc<ModelRegistry>,
}

impl Context {
    /// Creates a context over explicit collaborators.
    pub fn new(settings: Arc<dyn SettingsStore>, resources: ResourceResolver, models: Arc<ModelRegistry>) -> Self {
        Self {
            settings,
            resources,
            models,
        }
    }

    /// A context with in-memory preferences, no resource directory and a
    /// fresh registry.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Preferences::new()), ResourceResolver::new(), ModelRegistry::new())
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn resources(&self) -> &ResourceResolver {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceResolver {
        &mut self.resources
    }

    pub fn models(&self) -> &Arc<ModelRegistry> {
        &self.models
    }

    /// Creates a projects model registered with this context.
    pub fn projects_model(&self) -> Arc<ProjectsModel> {
        Arc::new(ProjectsModel::new(&self.models))
    }

    /// Creates a components manager persisting into this context's settings.
    pub fn components_manager(&self, host: Arc<dyn ComponentHost>) -> ComponentsManager {
        ComponentsManager::with_host(self.settings.clone(), host)
    }

    /// Creates a layouts manager over this context's settings.
    pub fn layouts_manager(&self) -> LayoutsManager {
        LayoutsManager::new(self.settings.clone())
    }

    /// The built-in grammars followed by those found in the resources.
    ///
    /// A resource grammar named like a built-in one replaces it.
    pub fn languages(&self) -> HighlightResult<Vec<Language>> {
        let mut languages = Language::builtins()?;
        for language in Language::load_all(&self.resources) {
            if let Some(existing) = languages.iter_mut().find(|l| l.name() == language.name()) {
                *existing = language;
            } else {
                languages.push(language);
            }
        }
        Ok(languages)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::in_memory()
    }
}
