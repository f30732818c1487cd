pub mod import;
pub mod model;
pub mod postgres;
pub mod store;

pub use import::{ImportCoordinator, ImportSummary};
pub use model::{CatalogError, ImportRequest, MAINPAGE_HIDDEN, MAINPAGE_SHOWN, SHOW_HIDDEN, SHOW_VISIBLE};
pub use postgres::PgCatalogStore;
pub use store::CatalogStore;
