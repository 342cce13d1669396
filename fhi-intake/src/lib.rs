//! fhi-intake library - operator side of family health intake
//!
//! - [`cache::LocalCache`]: on-device storage handle (records mirror, draft,
//!   server location)
//! - [`remote`]: record store client; failures come back as
//!   [`remote::Tier::Unavailable`], never as errors
//! - [`sync::SyncFacade`]: local-write-always, remote-best-effort entry point
//! - [`wizard::RecordBuilder`]: nine-step record editor with debounced drafts
//! - [`dashboard::DashboardStats`]: summary statistics over saved records

pub mod cache;
pub mod dashboard;
pub mod draft;
pub mod remote;
pub mod sync;
pub mod wizard;

pub use cache::LocalCache;
pub use dashboard::DashboardStats;
pub use remote::{HttpRecordStore, RemoteStore, Tier};
pub use sync::{ImportOutcome, SyncFacade};
pub use wizard::{DraftChoice, RecordBuilder, WizardStep};
