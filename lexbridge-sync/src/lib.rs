//! Session boundary between a lexbridge project and version control.
//!
//! A [`SyncSession`] locks the project, splits the monolithic project file
//! into its domain file forest, lets a [`SyncDriver`] exchange the forest
//! with others, and rebuilds the project file when changes came in. Changed
//! files are merged with [`merge_changed_file`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use lexbridge_sync::{BridgeConfig, SyncDriver, SyncOutcome, SyncResult, SyncSession};
//!
//! struct Offline;
//!
//! impl SyncDriver for Offline {
//!     fn synchronize(&mut self, _forest_dir: &Path) -> SyncResult<SyncOutcome> {
//!         Ok(SyncOutcome::default())
//!     }
//! }
//!
//! let config = BridgeConfig::load(Path::new("projects/Sena"))?;
//! let report = SyncSession::new(config).run(&mut Offline)?;
//! println!("{} objects", report.objects);
//! # Ok::<(), lexbridge_sync::SyncError>(())
//! ```

mod config;
mod error;
mod lock;
mod logging;
mod merge;
mod session;

pub use config::{BridgeConfig, CONFIG_FILE, PROJECT_EXTENSION};
pub use error::{SyncError, SyncResult};
pub use lock::LockMarker;
pub use logging::init_logging;
pub use merge::merge_changed_file;
pub use session::{project_registry, SessionReport, SyncDriver, SyncOutcome, SyncSession};
