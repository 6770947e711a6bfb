//! The seam between the client and the document store.

use crate::error::SourceError;
use crate::query::Query;

/// Supplies raw fragments matching a query.
///
/// This trait is the only thing the client knows about the backing store. A
/// source decides transport, query language, and paging; the client only
/// requires a finite sequence that is produced as it is pulled. Connections are
/// owned by the caller and are never opened or closed here.
///
/// # Example
///
/// ```rust
/// use chronofold::{Query, RawFragment, SeriesSource, SourceError};
///
/// struct Fixed(Vec<RawFragment>);
///
/// impl SeriesSource for Fixed {
///     type Connection = ();
///     type Fragment = RawFragment;
///     type Iter = std::iter::Map<
///         std::vec::IntoIter<RawFragment>,
///         fn(RawFragment) -> Result<RawFragment, SourceError>,
///     >;
///
///     fn fetch(&self, _: &(), _: &Query, _page_size: usize) -> Result<Self::Iter, SourceError> {
///         let wrap: fn(RawFragment) -> Result<RawFragment, SourceError> = Ok;
///         Ok(self.0.clone().into_iter().map(wrap))
///     }
/// }
/// ```
pub trait SeriesSource {
    /// Caller-owned handle to the backend.
    type Connection: ?Sized;
    /// Raw record type produced.
    type Fragment;
    /// Lazy fragment iterator.
    type Iter: Iterator<Item = Result<Self::Fragment, SourceError>>;

    /// Starts fetching fragments matching `query`, `page_size` at a time.
    ///
    /// Errors returned here mean the request was rejected up front. Errors
    /// while iterating surface through the iterator.
    fn fetch(
        &self,
        connection: &Self::Connection,
        query: &Query,
        page_size: usize,
    ) -> Result<Self::Iter, SourceError>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for &S {
    type Connection = S::Connection;
    type Fragment = S::Fragment;
    type Iter = S::Iter;

    fn fetch(
        &self,
        connection: &Self::Connection,
        query: &Query,
        page_size: usize,
    ) -> Result<Self::Iter, SourceError> {
        (**self).fetch(connection, query, page_size)
    }
}
