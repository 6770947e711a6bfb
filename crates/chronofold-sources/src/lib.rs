//! # chronofold-sources
//!
//! Raw series sources for [`chronofold`].
//!
//! - [`InMemorySource`] queries an [`InMemoryStore`] through a paged cursor
//!   over a point-in-time snapshot.
//! - [`JsonLinesSource`] streams documents out of a JSON-lines export file.
//!
//! Both understand the same small filter language, see [`filter`].
//!
//! ```rust
//! use chronofold::{key, merge, ChronixClient, DocumentConverter, Query, RawFragment};
//! use chronofold_sources::{InMemorySource, InMemoryStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::with_documents([
//!     RawFragment::new().with_points([(1, 10.0)]).with_field("name", "Load").with_field("host", "h1"),
//!     RawFragment::new().with_points([(1, 20.0)]).with_field("name", "Load").with_field("host", "h1"),
//! ]);
//!
//! let client = ChronixClient::new(DocumentConverter::new(), InMemorySource);
//! let series = client.collect(
//!     &store,
//!     &Query::new("name:*Load*"),
//!     key::attributes(["name", "host"], "-"),
//!     merge::average(),
//! )?;
//! assert_eq!(series[0].points(), &[(1, 15.0)]);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod filter;
pub mod json_lines;
pub mod memory;

pub use filter::Filter;
pub use json_lines::{JsonLinesCursor, JsonLinesSource};
pub use memory::{InMemorySource, InMemoryStore, PagedCursor};
