//! fileshare - a minimal file sharing web service.
//!
//! Files are uploaded over HTTP, stored on disk under generated names and
//! listed from a SQLite metadata store.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::{Database, FileRecord, MetadataStore, NewFileRecord};
pub use error::{FileShareError, Result};
pub use file::{FileShareService, FileStorage, UploadedFile};
pub use web::WebServer;
