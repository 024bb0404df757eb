mod account;
mod dataset;
mod question;
mod selection;
mod sort;
mod state;
mod status;

pub use account::{Credentials, CredentialsError};
pub use dataset::{Dataset, DatasetError};
pub use question::{is_major_company, CompanyFrequency, Difficulty, Question, MAJOR_COMPANIES};
pub use selection::FilterSelection;
pub use sort::{ParseSortKeyError, SortConfig, SortDirection, SortEntry, SortKey, SortState};
pub use state::{CatalogState, StateKey};
pub use status::{PremiumCheck, StatusMap};
