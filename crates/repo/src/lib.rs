//! Storage layer for localization content.
//!
//! - `repository` defines the contract consumed by the transport layer.
//! - `kv` and `sql` implement it over redb and SeaORM with identical semantics.
//! - `factory` picks one of them from configuration.

pub mod domain;
pub mod errors;
pub mod factory;
pub mod kv;
pub mod repository;
pub mod sql;
#[cfg(test)]
pub mod test_support;

pub use domain::{LoadTranslationsOpts, Message, MessageStatus, Service, Translation};
pub use errors::{FactoryError, RepoResult, RepositoryError};
pub use factory::{new_repository, BackendKind};
pub use kv::KvRepository;
pub use repository::{Repo, ServiceRepository, TranslationRepository};
pub use sql::{SqlRepository, TxContext};
