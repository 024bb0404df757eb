#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod dataset_loader;
pub mod error;
pub mod pagination;
pub mod remote;
pub mod sync;

pub use app_services::AppServices;
pub use catalog::{CatalogController, FilterOptions, PageView, SyncKind, SyncTicket};
pub use dataset_loader::{load_dataset, DatasetSource};
pub use error::{CatalogError, DatasetLoadError, SyncError};
pub use remote::{
    LeetCodeClient, ListFilter, PageRequest, QuestionListSource, QuestionPage, RemoteConfig,
    RemoteQuestion, UserProfile,
};
pub use sync::{SharedCatalog, SyncService};
