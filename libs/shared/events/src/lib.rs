pub mod bus;

pub use bus::{EventBusError, EventHandler, EventPublisher, EventSubscriber};
pub use shared_models::events::{ClinicEvent, EVENT_CHANNEL};
