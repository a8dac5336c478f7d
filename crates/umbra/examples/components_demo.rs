//! Registers a few components from manifests, drives their lifecycle and
//! prints the components graph.
//!
//! Run with `RUST_LOG=umbra=info` to see the lifecycle logs.

use std::sync::Arc;

use umbra::components::{ComponentHost, ComponentInterface, ComponentManifest};
use umbra::error::BoxError;
use umbra::model::{ItemModel, ModelIndex};
use umbra::{Context, GraphTreeDebug, ItemRole};

struct Service {
    name: String,
}

impl ComponentInterface for Service {
    fn activate(&mut self, _host: &Arc<dyn ComponentHost>) -> Result<(), BoxError> {
        tracing::info!("{} is up", self.name);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), BoxError> {
        tracing::info!("{} is down", self.name);
        Ok(())
    }
}

struct Host;

impl ComponentHost for Host {}

const MANIFESTS: &[&str] = &[
    "[Component]\nName = core.database\nTitle = Database\nCategory = QObject\nVersion = 1.0\nDeactivatable = False\n",
    "[Component]\nName = factory.preferencesManager\nTitle = Preferences Manager\nCategory = QWidget\nVersion = 1.0\nRequire = core.database\n",
    "[Component]\nName = addons.tcpServer\nTitle = Tcp Server\nVersion = 0.5\nRequire = factory.preferencesManager\n",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let context = Context::in_memory();
    let manager = context.components_manager(Arc::new(Host));
    for manifest in MANIFESTS {
        let manifest = ComponentManifest::parse(manifest)?;
        let name = manifest.name.clone();
        manager.register(manifest, Box::new(Service { name }))?;
    }

    let activated = manager.activate_startup_components()?;
    println!("activated: {}", activated.join(", "));
    println!("dependents of core.database: {:?}", manager.list_dependents("core.database")?);

    manager.reload("factory.preferencesManager")?;
    if let Err(error) = manager.reload("core.database") {
        println!("{error}");
    }
    manager.deactivate_components(&["addons.tcpServer"])?;
    println!("stored as deactivated: {:?}", manager.stored_deactivated_components());

    let model = manager.create_model(context.models());
    let top = ModelIndex::invalid();
    for row in 0..model.row_count(&top) {
        let group = model.index(row, 0, &top);
        println!("{}", model.data(&group, ItemRole::Display));
        for child in 0..model.row_count(&group) {
            let cells: Vec<String> = (0..model.column_count(&group))
                .map(|column| model.data_at(child, column, &group, ItemRole::Display).to_string())
                .collect();
            println!("  {}", cells.join(" | "));
        }
    }

    let tree = manager
        .graph()
        .with_read(|g| GraphTreeDebug::new().format_subtree(g, manager.root()))?;
    println!("{tree}");
    Ok(())
}
