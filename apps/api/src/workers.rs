use std::sync::Arc;

use tracing::{error, info};

use clinic_cell::services::provisioner::WorkspaceProvisioner;
use membership_cell::services::worker::MembershipWorker;
use shared_config::AppConfig;
use shared_events::{EventHandler, EventSubscriber};

/// Start the registration-chain consumers. Each worker gets its own
/// subscriber connection; a worker that cannot start is logged and the
/// API keeps serving.
pub fn spawn_event_workers(config: Arc<AppConfig>) {
    spawn_worker(config.clone(), WorkspaceProvisioner::new(&config));
    spawn_worker(config.clone(), MembershipWorker::new(&config));
}

fn spawn_worker<H: EventHandler + 'static>(config: Arc<AppConfig>, handler: H) {
    let name = handler.name();

    let subscriber = match EventSubscriber::new(&config) {
        Ok(subscriber) => subscriber,
        Err(e) => {
            error!("Failed to create subscriber for {}: {}", name, e);
            return;
        }
    };

    info!("Spawning event worker: {}", name);
    tokio::spawn(async move {
        if let Err(e) = subscriber.run(handler).await {
            error!("Event worker {} stopped: {}", name, e);
        }
    });
}
