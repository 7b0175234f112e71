pub mod notifier;
pub mod registry;
pub mod socket;

pub use notifier::{CountChange, Notifier, TotalsSnapshot};
pub use registry::{ConnId, ConnectionRegistry, DashboardConnection, Payload, OUTBOX_CAPACITY};
