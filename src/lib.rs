/*!
 * # YAVAT - Yet Another Video Annotation Tool
 *
 * A Rust library for interval annotation of videos with label/group
 * consistency checking.
 *
 * ## Features
 *
 * - Mark labeled time intervals with open/close toggling per label
 * - Organize labels into mutually-exclusive groups
 * - Directional predecessor-incompatibility rules between labels
 * - Full revalidation of the mark table after every mutation
 * - `HH:MM:SS,mmm` timecode codec with a non-panicking parse
 * - CSV-shaped import/export of label sets and mark tables
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: millisecond/timecode codec
 * - `label_registry`: label, group and incompatibility bookkeeping
 * - `interval_store`: the ordered mark table and toggle state
 * - `validator`: overlap and predecessor validation over the table
 * - `session`: orchestration and the import/export boundary
 * - `interchange`: CSV-shaped row types and the record codec
 * - `events`: change notification for dependent layers
 * - `app_config`: configuration management
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod events;
pub mod interchange;
pub mod interval_store;
pub mod label_registry;
pub mod session;
pub mod timecode;
pub mod validator;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, InterchangeError, RegistryError, StoreError};
pub use interchange::{IntervalRow, LabelRow};
pub use interval_store::{Interval, IntervalStore, MarkOutcome, TimeField};
pub use label_registry::LabelGroupRegistry;
pub use session::AnnotationSession;
pub use validator::{IntervalValidator, RowFlag, ValidationReport, ValidatorConfig};
