//! Lifecycle scenarios of the components manager.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use umbra::components::{ComponentHost, ComponentInterface, ComponentManifest, ComponentsManager};
use umbra::error::{BoxError, ComponentError};
use umbra::file::Preferences;

type Journal = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    journal: Journal,
}

impl ComponentInterface for Recorder {
    fn activate(&mut self, _host: &Arc<dyn ComponentHost>) -> Result<(), BoxError> {
        self.journal.lock().push(format!("activate {}", self.name));
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), BoxError> {
        self.journal.lock().push(format!("deactivate {}", self.name));
        Ok(())
    }

    fn reload(&mut self) -> Result<(), BoxError> {
        self.journal.lock().push(format!("reload {}", self.name));
        Ok(())
    }
}

#[derive(Default)]
struct CountingHost {
    steps: AtomicUsize,
}

impl ComponentHost for CountingHost {
    fn process_events(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }
}

struct Harness {
    manager: ComponentsManager,
    journal: Journal,
    host: Arc<CountingHost>,
}

impl Harness {
    fn new() -> Self {
        common::init_tracing();
        let host = Arc::new(CountingHost::default());
        Self {
            manager: ComponentsManager::with_host(Arc::new(Preferences::new()), host.clone()),
            journal: Arc::new(Mutex::new(Vec::new())),
            host,
        }
    }

    fn register(&self, manifest: ComponentManifest) {
        let name: &'static str = match manifest.name.as_str() {
            "A" => "A",
            "B" => "B",
            "C" => "C",
            other => panic!("unexpected component {other}"),
        };
        self.manager
            .register(
                manifest,
                Box::new(Recorder {
                    name,
                    journal: self.journal.clone(),
                }),
            )
            .unwrap();
    }

    /// A, and B requiring A.
    fn pair(&self) {
        self.register(ComponentManifest::new("A"));
        self.register(ComponentManifest::new("B").with_require(["A"]));
    }
}

#[test]
fn activate_without_dependencies() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A"));
    let activated = common::record(harness.manager.component_activated());

    harness.manager.activate("A").unwrap();
    assert!(harness.manager.is_activated("A"));
    assert_eq!(*activated.lock(), ["A"]);
}

#[test]
fn activate_with_missing_dependency() {
    let harness = Harness::new();
    harness.pair();

    let error = harness.manager.activate("B").unwrap_err();
    assert!(matches!(
        error,
        ComponentError::MissingDependency { ref name, ref dependency } if name == "B" && dependency == "A"
    ));
    assert!(harness.manager.list_activated().is_empty());
    assert!(harness.journal.lock().is_empty());
}

#[test]
fn deactivate_with_active_dependents() {
    let harness = Harness::new();
    harness.pair();
    harness.manager.activate("A").unwrap();
    harness.manager.activate("B").unwrap();

    assert_eq!(harness.manager.list_activated(), ["A", "B"]);
    assert_eq!(harness.manager.list_dependents("A").unwrap(), ["B"]);
    let error = harness.manager.deactivate("A").unwrap_err();
    assert!(matches!(
        error,
        ComponentError::IfDependentsActive { ref dependents, .. } if dependents == &["B".to_string()]
    ));
    assert!(harness.manager.is_activated("A"));
}

#[test]
fn reload_cycles_dependents() {
    let harness = Harness::new();
    harness.pair();
    harness.manager.activate_components(&["A", "B"]).unwrap();
    harness.journal.lock().clear();

    let events = Arc::new(Mutex::new(Vec::new()));
    let deactivated = events.clone();
    harness
        .manager
        .component_deactivated()
        .connect(move |name| deactivated.lock().push(format!("deactivated {name}")));
    let activated = events.clone();
    harness
        .manager
        .component_activated()
        .connect(move |name| activated.lock().push(format!("activated {name}")));
    let reloaded = common::record(harness.manager.component_reloaded());

    harness.manager.reload("A").unwrap();
    assert_eq!(
        *events.lock(),
        ["deactivated B", "deactivated A", "activated A", "activated B"]
    );
    assert_eq!(
        *harness.journal.lock(),
        ["deactivate B", "deactivate A", "reload A", "activate A", "activate B"]
    );
    assert_eq!(*reloaded.lock(), ["A"]);
    assert!(harness.host.steps.load(Ordering::Relaxed) >= 4);
}

#[test]
fn reload_blocked_by_non_deactivatable() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A").with_deactivatable(false));
    harness.register(ComponentManifest::new("B").with_require(["A"]));
    harness.manager.activate_components(&["A", "B"]).unwrap();
    harness.journal.lock().clear();

    let error = harness.manager.reload("A").unwrap_err();
    assert!(matches!(error, ComponentError::NotReloadable { ref blocker, .. } if blocker == "A"));
    assert_eq!(harness.manager.list_activated(), ["A", "B"]);
    assert!(harness.journal.lock().is_empty());
}

#[test]
fn dependency_cycle_detected() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A").with_require(["B"]));
    harness.register(ComponentManifest::new("B").with_require(["A"]));

    assert!(matches!(
        harness.manager.list_dependents("A"),
        Err(ComponentError::CycleDetected(_))
    ));
    assert!(matches!(
        harness.manager.list_dependents("B"),
        Err(ComponentError::CycleDetected(_))
    ));
    assert!(matches!(
        harness.manager.activate_components(&["A", "B"]),
        Err(ComponentError::CycleDetected(_))
    ));
}

#[test]
fn transitive_dependents_come_leaf_first() {
    let harness = Harness::new();
    harness.pair();
    harness.register(ComponentManifest::new("C").with_require(["B"]));

    assert_eq!(harness.manager.list_dependents("A").unwrap(), ["C", "B"]);
    harness.manager.activate_components(&["C", "B", "A"]).unwrap();
    assert_eq!(
        *harness.journal.lock(),
        ["activate A", "activate B", "activate C"]
    );

    harness.journal.lock().clear();
    harness.manager.deactivate_components(&["A", "B", "C"]).unwrap();
    assert_eq!(
        *harness.journal.lock(),
        ["deactivate C", "deactivate B", "deactivate A"]
    );
}

#[test]
fn reload_only_reactivates_previously_active() {
    let harness = Harness::new();
    harness.pair();
    harness.manager.activate("A").unwrap();

    harness.manager.reload("A").unwrap();
    assert_eq!(harness.manager.list_activated(), ["A"]);
}

#[test]
fn activate_twice_is_rejected() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A"));
    harness.manager.activate("A").unwrap();
    let activated = common::record(harness.manager.component_activated());

    let error = harness.manager.activate("A").unwrap_err();
    assert!(matches!(error, ComponentError::AlreadyActivated(ref name) if name == "A"));
    assert_eq!(harness.manager.list_activated(), ["A"]);
    assert_eq!(*harness.journal.lock(), ["activate A"]);
    assert!(activated.lock().is_empty());
}

#[test]
fn deactivate_twice_is_rejected() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A"));
    harness.manager.activate("A").unwrap();
    harness.manager.deactivate("A").unwrap();
    let deactivated = common::record(harness.manager.component_deactivated());

    let error = harness.manager.deactivate("A").unwrap_err();
    assert!(matches!(error, ComponentError::AlreadyDeactivated(ref name) if name == "A"));
    assert!(harness.manager.list_activated().is_empty());
    assert_eq!(*harness.journal.lock(), ["activate A", "deactivate A"]);
    assert!(deactivated.lock().is_empty());
}

#[test]
fn deactivate_non_deactivatable_is_rejected() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A").with_deactivatable(false));
    harness.manager.activate("A").unwrap();
    harness.journal.lock().clear();

    let error = harness.manager.deactivate("A").unwrap_err();
    assert!(matches!(error, ComponentError::NotDeactivatable(ref name) if name == "A"));
    assert!(harness.manager.is_activated("A"));
    assert!(harness.journal.lock().is_empty());
}

#[test]
fn reload_blocked_by_non_deactivatable_dependent() {
    let harness = Harness::new();
    harness.register(ComponentManifest::new("A"));
    harness.register(ComponentManifest::new("B").with_require(["A"]).with_deactivatable(false));
    harness.register(ComponentManifest::new("C").with_require(["B"]));
    harness.manager.activate_components(&["A", "B", "C"]).unwrap();
    harness.journal.lock().clear();
    let reloaded = common::record(harness.manager.component_reloaded());

    let error = harness.manager.reload("A").unwrap_err();
    assert!(matches!(
        error,
        ComponentError::NotReloadable { ref name, ref blocker } if name == "A" && blocker == "B"
    ));
    assert_eq!(harness.manager.list_activated(), ["A", "B", "C"]);
    assert!(harness.journal.lock().is_empty());
    assert!(reloaded.lock().is_empty());
}
