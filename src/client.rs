//! Client facade composing a source, a converter, and the engine.

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::ClientConfig;
use crate::convert::SeriesConverter;
use crate::engine::{self, Converted, GroupReduce, SeriesOf};
use crate::error::{BoxError, ChronixError};
use crate::query::Query;
use crate::source::SeriesSource;

/// Lazy result of [`ChronixClient::stream`].
pub type ClientStream<'a, S, C, G, KF, MF> = GroupReduce<
    Converted<<S as SeriesSource>::Iter, &'a C>,
    <C as SeriesConverter>::Time,
    <C as SeriesConverter>::Value,
    G,
    KF,
    MF,
>;

/// Streams grouped, merged time series out of a document store.
///
/// The client holds the converter and the source. Key and merge functions are
/// passed per call so no grouping policy is shared between queries.
///
/// # Example
///
/// ```rust
/// use chronofold::{merge, key, ChronixClient, DocumentConverter, Query};
/// use chronofold_sources::{InMemorySource, InMemoryStore};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryStore::new();
/// let client = ChronixClient::new(DocumentConverter::new(), InMemorySource);
///
/// let series: Vec<_> = client
///     .stream(&store, &Query::all(), key::attribute("host"), merge::average())?
///     .collect::<Result<_, _>>()?;
/// assert!(series.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChronixClient<C, S> {
    converter: C,
    source: S,
    config: ClientConfig,
}

impl<C, S> ChronixClient<C, S>
where
    C: SeriesConverter,
    S: SeriesSource<Fragment = C::Fragment>,
{
    /// Creates a client with the default configuration.
    pub fn new(converter: C, source: S) -> Self {
        Self::with_config(converter, source, ClientConfig::default())
    }

    /// Creates a client with an explicit configuration.
    pub fn with_config(converter: C, source: S, config: ClientConfig) -> Self {
        Self {
            converter,
            source,
            config,
        }
    }

    /// The client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The converter applied to every fragment.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Sends `query` to the source and groups what comes back.
    ///
    /// Fails immediately only if the source rejects the query. All other
    /// failures surface from the returned iterator.
    pub fn stream<G, KF, MF>(
        &self,
        connection: &S::Connection,
        query: &Query,
        key_fn: KF,
        merge_fn: MF,
    ) -> Result<ClientStream<'_, S, C, G, KF, MF>, ChronixError>
    where
        G: Eq + Hash + Debug,
        KF: FnMut(&SeriesOf<C>) -> Result<G, BoxError>,
        MF: FnMut(&SeriesOf<C>, &SeriesOf<C>) -> Result<SeriesOf<C>, BoxError>,
    {
        #[cfg(feature = "logging")]
        log::debug!("chronix: {query} (page size {})", self.config.page_size);

        let fragments = self
            .source
            .fetch(connection, query, self.config.page_size)?;
        Ok(engine::stream(
            fragments,
            &self.converter,
            key_fn,
            merge_fn,
            &self.config.engine,
        ))
    }

    /// Like [`stream`](Self::stream), but drains the result into a vector.
    pub fn collect<G, KF, MF>(
        &self,
        connection: &S::Connection,
        query: &Query,
        key_fn: KF,
        merge_fn: MF,
    ) -> Result<Vec<SeriesOf<C>>, ChronixError>
    where
        G: Eq + Hash + Debug,
        KF: FnMut(&SeriesOf<C>) -> Result<G, BoxError>,
        MF: FnMut(&SeriesOf<C>, &SeriesOf<C>) -> Result<SeriesOf<C>, BoxError>,
    {
        let series = self
            .stream(connection, query, key_fn, merge_fn)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(series)
    }

    /// Like [`stream`](Self::stream), but converts fragments on the rayon pool.
    #[cfg(feature = "parallel")]
    #[allow(clippy::type_complexity)]
    pub fn stream_parallel<G, KF, MF>(
        &self,
        connection: &S::Connection,
        query: &Query,
        key_fn: KF,
        merge_fn: MF,
    ) -> Result<
        GroupReduce<engine::ParConverted<S::Iter, &C>, C::Time, C::Value, G, KF, MF>,
        ChronixError,
    >
    where
        C: Sync,
        C::Fragment: Send,
        SeriesOf<C>: Send,
        G: Eq + Hash + Debug,
        KF: FnMut(&SeriesOf<C>) -> Result<G, BoxError>,
        MF: FnMut(&SeriesOf<C>, &SeriesOf<C>) -> Result<SeriesOf<C>, BoxError>,
    {
        let fragments = self
            .source
            .fetch(connection, query, self.config.page_size)?;
        Ok(engine::stream_parallel(
            fragments,
            &self.converter,
            key_fn,
            merge_fn,
            &self.config.engine,
        ))
    }
}
