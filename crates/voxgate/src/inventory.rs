pub mod discovery;
pub mod persistence;
pub mod store;

pub use discovery::{parse_discovery_output, DiscoveryCommand};
pub use persistence::{load_entries, load_or_discover, save_entries};
pub use store::{ApplicationEntry, ApplicationInventory, InventorySnapshot};
