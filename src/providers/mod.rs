pub mod remote;
pub mod snapshot;

pub use remote::RemoteTableSource;
pub use snapshot::SnapshotStore;
