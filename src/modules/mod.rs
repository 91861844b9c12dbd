pub mod attendees;
pub mod events;

use std::sync::Arc;

use passin_kernel::{settings::Settings, ModuleRegistry};

use crate::admission::AdmissionController;

/// Register all pass.in modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    admission: Arc<AdmissionController>,
    settings: &Settings,
) -> anyhow::Result<()> {
    registry.register(Arc::new(events::EventsModule::new(admission.clone())))?;
    registry.register(Arc::new(attendees::AttendeesModule::new(
        admission,
        settings.server.authority(),
    )))?;
    Ok(())
}
