pub mod alist_client;
pub mod lister;
pub mod manager;
pub mod model;
pub mod object_store;
pub mod path_normalizer;
pub mod probe;
pub mod registry;
pub mod remote;
pub mod url;

pub use manager::{StorageManager, StorageStatus};
pub use model::{DirectoryListing, FileDescriptor, Provider, StorageError};
pub use registry::ProviderRegistry;
