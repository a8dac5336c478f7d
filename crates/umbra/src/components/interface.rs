//! The plug-in side of a component.

use std::sync::Arc;

use crate::error::BoxError;

/// The application hosting the components.
pub trait ComponentHost: Send + Sync {
    /// Gives the host a chance to handle pending events between the steps
    /// of long operations.
    fn process_events(&self) {}

    /// Docks the widget of component `name` into the host.
    fn add_widget(&self, _name: &str) -> Result<(), BoxError> {
        Ok(())
    }

    /// Takes the widget of component `name` out of the host.
    fn remove_widget(&self, _name: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A host that does nothing between steps and has nowhere to dock widgets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl ComponentHost for NullHost {}

/// The code of a component.
///
/// The manager drives the lifecycle: on activation it calls
/// [`activate`](ComponentInterface::activate), then either
/// [`initialize`](ComponentInterface::initialize) or, for widget components,
/// [`initialize_ui`](ComponentInterface::initialize_ui) followed by
/// [`add_widget`](ComponentInterface::add_widget). Deactivation runs the
/// mirror image. Every hook but `activate` and `deactivate` defaults to a
/// no-op.
///
/// `activate` hands out the host itself, which a component may keep for the
/// rest of its active life; the widget hooks get it again to dock through
/// [`ComponentHost::add_widget`] and [`ComponentHost::remove_widget`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use umbra::components::{ComponentHost, ComponentInterface};
/// use umbra::error::BoxError;
///
/// struct Notes {
///     host: Option<Arc<dyn ComponentHost>>,
///     lines: Vec<String>,
/// }
///
/// impl ComponentInterface for Notes {
///     fn activate(&mut self, host: &Arc<dyn ComponentHost>) -> Result<(), BoxError> {
///         self.host = Some(host.clone());
///         self.lines.push("ready".into());
///         Ok(())
///     }
///
///     fn deactivate(&mut self) -> Result<(), BoxError> {
///         self.host = None;
///         self.lines.clear();
///         Ok(())
///     }
///
///     fn add_widget(&mut self, host: &dyn ComponentHost) -> Result<(), BoxError> {
///         host.add_widget("notes")
///     }
///
///     fn remove_widget(&mut self, host: &dyn ComponentHost) -> Result<(), BoxError> {
///         host.remove_widget("notes")
///     }
/// }
/// ```
pub trait ComponentInterface: Send {
    fn activate(&mut self, host: &Arc<dyn ComponentHost>) -> Result<(), BoxError>;

    fn deactivate(&mut self) -> Result<(), BoxError>;

    fn initialize(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn uninitialize(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn initialize_ui(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn uninitialize_ui(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn add_widget(&mut self, _host: &dyn ComponentHost) -> Result<(), BoxError> {
        Ok(())
    }

    fn remove_widget(&mut self, _host: &dyn ComponentHost) -> Result<(), BoxError> {
        Ok(())
    }

    /// Reloads the component's backing code while it is deactivated.
    fn reload(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
