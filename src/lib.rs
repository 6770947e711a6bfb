//! # chronofold
//!
//! Streaming group-and-reduce client for time series kept in document stores.
//!
//! A query goes to a [`SeriesSource`], which lazily yields raw documents. Each
//! document is converted into a [`TimeSeries`], keyed by a caller-supplied
//! function, and folded into its group with a caller-supplied merge operator.
//! The result is a lazy sequence with one merged series per distinct key, in
//! first-seen order.
//!
//! ## Features
//!
//! - **Generic series**: [`TimeSeries<K, V>`] with opaque attributes and a
//!   step-function pointwise merge
//! - **Pluggable conversion**: [`SeriesConverter`] with a ready-made
//!   [`DocumentConverter`]
//! - **Group-reduce engine**: left-fold per key, optional group bound,
//!   all-or-nothing failures
//! - **Per-call strategies**: key and merge functions are arguments, not client state
//!
//! ## Quick Start
//!
//! ```rust
//! use chronofold::{key, merge, ChronixClient, DocumentConverter, Query, RawFragment};
//! use chronofold_sources::{InMemorySource, InMemoryStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! store.add(RawFragment::new().with_points([(1, 10.0)]).with_field("name", "Load").with_field("host", "h1"));
//! store.add(RawFragment::new().with_points([(1, 20.0)]).with_field("name", "Load").with_field("host", "h1"));
//! store.add(RawFragment::new().with_points([(1, 5.0)]).with_field("name", "Load").with_field("host", "h2"));
//!
//! let client = ChronixClient::new(DocumentConverter::new(), InMemorySource);
//! let query = Query::new("name:*Load*").param("cf", "metric{max}");
//!
//! for series in client.stream(&store, &query, key::attributes(["name", "host"], "-"), merge::average())? {
//!     let series = series?;
//!     println!("{:?}: {:?}", series.attribute("host"), series.points());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! This crate does **not** talk to any particular store. Sources live behind
//! the [`SeriesSource`] trait; `chronofold-sources` provides an in-memory store
//! and a JSON-lines reader.

#![deny(missing_docs)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod attribute;
pub mod client;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod key;
pub mod merge;
pub mod query;
pub mod source;
pub mod timeseries;

pub use attribute::AttributeValue;
pub use client::{ChronixClient, ClientStream};
pub use config::{ClientConfig, DEFAULT_PAGE_SIZE, EngineConfig};
pub use convert::{DocumentConverter, SeriesConverter};
pub use engine::{GroupReduce, GroupStats, SeriesOf};
pub use error::{BoxError, ChronixError, ConversionError, GroupError, SourceError};
pub use fragment::RawFragment;
pub use query::Query;
pub use source::SeriesSource;
pub use timeseries::TimeSeries;
