mod layout;
mod provider;
mod records;
mod store;

pub use layout::{default_dotnet_root, StateLayout};
pub use provider::{DirectoryManifestProvider, ManifestProvider, RawManifest};
pub use records::{read_workload_set_version, InstalledWorkloadStore};
pub use store::ManifestStore;
