//! The group-reduce engine.
//!
//! Turns a lazy sequence of raw fragments into a lazy sequence holding at most
//! one merged series per distinct group key.
//!
//! A fragment belonging to a group may arrive anywhere in the input, so no
//! group is final until the source is exhausted. The engine therefore drains
//! the whole source on the first pull and only then yields groups, in the order
//! their keys were first seen. For a key seen with series `s1, s2, s3` in that
//! order, the emitted series is `merge(merge(s1, s2), s3)`.
//!
//! Errors are all-or-nothing: the first failure discards every accumulated
//! group, is yielded once, and ends the sequence.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::EngineConfig;
use crate::convert::SeriesConverter;
use crate::error::{BoxError, GroupError, SourceError};
use crate::timeseries::TimeSeries;

/// Series type produced by converter `C`.
pub type SeriesOf<C> =
    TimeSeries<<C as SeriesConverter>::Time, <C as SeriesConverter>::Value>;

/// Counters for one group-reduce run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Series consumed from the input.
    pub series: usize,
    /// Distinct groups produced.
    pub groups: usize,
    /// Merge operations applied.
    pub merges: usize,
}

enum State<I, T> {
    Pending(I),
    Ready(std::vec::IntoIter<T>),
    Done,
}

/// Lazy iterator over grouped and merged series.
///
/// Nothing is pulled from the input until the first call to `next`.
pub struct GroupReduce<I, K, V, G, KF, MF> {
    state: State<I, TimeSeries<K, V>>,
    key_fn: KF,
    merge_fn: MF,
    config: EngineConfig,
    stats: GroupStats,
    _key: std::marker::PhantomData<fn() -> G>,
}

impl<I, K, V, G, KF, MF> GroupReduce<I, K, V, G, KF, MF>
where
    I: Iterator<Item = Result<TimeSeries<K, V>, GroupError>>,
    G: Eq + Hash + Debug,
    KF: FnMut(&TimeSeries<K, V>) -> Result<G, BoxError>,
    MF: FnMut(&TimeSeries<K, V>, &TimeSeries<K, V>) -> Result<TimeSeries<K, V>, BoxError>,
{
    /// Groups an already converted series stream.
    ///
    /// Use [`stream`] to start from raw fragments.
    pub fn new(
        series: impl IntoIterator<IntoIter = I>,
        key_fn: KF,
        merge_fn: MF,
        config: &EngineConfig,
    ) -> Self {
        Self {
            state: State::Pending(series.into_iter()),
            key_fn,
            merge_fn,
            config: config.clone(),
            stats: GroupStats::default(),
            _key: std::marker::PhantomData,
        }
    }

    /// Counters for this run. All zero until the input has been drained.
    pub fn stats(&self) -> GroupStats {
        self.stats
    }

    /// Returns `true` once the input has been drained (successfully or not).
    pub fn is_drained(&self) -> bool {
        !matches!(self.state, State::Pending(_))
    }

    fn drain(&mut self, input: I) -> Result<Vec<TimeSeries<K, V>>, GroupError> {
        #[cfg(feature = "logging")]
        log::debug!(
            "group-reduce: draining input (max groups: {:?})",
            self.config.max_groups
        );

        let mut slots: HashMap<G, usize> = HashMap::new();
        let mut groups: Vec<TimeSeries<K, V>> = Vec::new();
        let mut stats = GroupStats::default();

        for (position, item) in input.enumerate() {
            let series = item?;
            stats.series += 1;

            let key = (self.key_fn)(&series)
                .map_err(|source| GroupError::KeyFunction { position, source })?;

            if let Some(&slot) = slots.get(&key) {
                let merged = (self.merge_fn)(&groups[slot], &series).map_err(|source| {
                    GroupError::Merge {
                        key: format!("{key:?}"),
                        source,
                    }
                })?;
                groups[slot] = merged;
                stats.merges += 1;
                continue;
            }

            if let Some(limit) = self.config.max_groups
                && groups.len() >= limit
            {
                #[cfg(feature = "logging")]
                log::warn!("group-reduce: group limit {limit} exceeded by key {key:?}");
                return Err(GroupError::CapacityExceeded { limit });
            }
            slots.insert(key, groups.len());
            groups.push(series);
        }

        stats.groups = groups.len();
        self.stats = stats;

        #[cfg(feature = "logging")]
        log::debug!(
            "group-reduce: {} series folded into {} groups ({} merges)",
            stats.series,
            stats.groups,
            stats.merges
        );

        Ok(groups)
    }
}

impl<I, K, V, G, KF, MF> Iterator for GroupReduce<I, K, V, G, KF, MF>
where
    I: Iterator<Item = Result<TimeSeries<K, V>, GroupError>>,
    G: Eq + Hash + Debug,
    KF: FnMut(&TimeSeries<K, V>) -> Result<G, BoxError>,
    MF: FnMut(&TimeSeries<K, V>, &TimeSeries<K, V>) -> Result<TimeSeries<K, V>, BoxError>,
{
    type Item = Result<TimeSeries<K, V>, GroupError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending(input) => match self.drain(input) {
                    Ok(groups) => self.state = State::Ready(groups.into_iter()),
                    Err(err) => return Some(Err(err)),
                },
                State::Ready(mut groups) => {
                    let next = groups.next();
                    self.state = State::Ready(groups);
                    return next.map(Ok);
                }
                State::Done => return None,
            }
        }
    }
}

/// Converts raw fragments one at a time as they are pulled.
pub struct Converted<I, C> {
    fragments: I,
    converter: C,
}

impl<I, C> Converted<I, C> {
    /// Wraps a fragment iterator.
    pub fn new(fragments: I, converter: C) -> Self {
        Self {
            fragments,
            converter,
        }
    }
}

impl<I, C> Iterator for Converted<I, C>
where
    C: SeriesConverter,
    I: Iterator<Item = Result<C::Fragment, SourceError>>,
{
    type Item = Result<SeriesOf<C>, GroupError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.fragments.next()? {
            Ok(fragment) => self.converter.convert(fragment).map_err(GroupError::from),
            Err(err) => Err(GroupError::from(err)),
        };
        Some(item)
    }
}

/// Groups and merges raw fragments.
///
/// Each fragment is converted with `converter`, keyed with `key_fn`, and folded
/// into its group with `merge_fn`. The returned iterator is lazy; see the
/// module documentation for ordering and failure semantics.
///
/// # Example
///
/// ```rust
/// use chronofold::{engine, merge, DocumentConverter, EngineConfig, RawFragment};
///
/// let fragments = vec![
///     Ok(RawFragment::new().with_points([(1, 10.0)]).with_field("host", "h1")),
///     Ok(RawFragment::new().with_points([(1, 20.0)]).with_field("host", "h1")),
/// ];
///
/// let grouped: Vec<_> = engine::stream(
///     fragments,
///     DocumentConverter::new(),
///     chronofold::key::attribute("host"),
///     merge::average(),
///     &EngineConfig::default(),
/// )
/// .collect::<Result<_, _>>()
/// .unwrap();
///
/// assert_eq!(grouped.len(), 1);
/// assert_eq!(grouped[0].points(), &[(1, 15.0)]);
/// ```
#[allow(clippy::type_complexity)]
pub fn stream<S, C, G, KF, MF>(
    source: S,
    converter: C,
    key_fn: KF,
    merge_fn: MF,
    config: &EngineConfig,
) -> GroupReduce<Converted<S::IntoIter, C>, C::Time, C::Value, G, KF, MF>
where
    S: IntoIterator<Item = Result<C::Fragment, SourceError>>,
    C: SeriesConverter,
    G: Eq + Hash + Debug,
    KF: FnMut(&SeriesOf<C>) -> Result<G, BoxError>,
    MF: FnMut(&SeriesOf<C>, &SeriesOf<C>) -> Result<SeriesOf<C>, BoxError>,
{
    GroupReduce::new(
        Converted::new(source.into_iter(), converter),
        key_fn,
        merge_fn,
        config,
    )
}

#[cfg(feature = "parallel")]
pub use parallel::{stream_parallel, ParConverted};

#[cfg(feature = "parallel")]
mod parallel {
    use rayon::prelude::*;

    use super::{GroupReduce, SeriesOf};
    use crate::config::{DEFAULT_PAGE_SIZE, EngineConfig};
    use crate::convert::SeriesConverter;
    use crate::error::{BoxError, GroupError, SourceError};
    use std::fmt::Debug;
    use std::hash::Hash;

    /// Converts raw fragments in batches on the rayon pool.
    ///
    /// Output order matches input order. A source error ends the batch it
    /// occurs in and is yielded after the fragments converted before it.
    pub struct ParConverted<I, C: SeriesConverter> {
        fragments: I,
        converter: C,
        batch: usize,
        buffer: std::vec::IntoIter<Result<SeriesOf<C>, GroupError>>,
    }

    impl<I, C: SeriesConverter> ParConverted<I, C> {
        /// Wraps a fragment iterator, converting `batch` fragments at a time.
        pub fn new(fragments: I, converter: C, batch: usize) -> Self {
            Self {
                fragments,
                converter,
                batch: batch.max(1),
                buffer: Vec::new().into_iter(),
            }
        }
    }

    impl<I, C> Iterator for ParConverted<I, C>
    where
        C: SeriesConverter + Sync,
        C::Fragment: Send,
        SeriesOf<C>: Send,
        I: Iterator<Item = Result<C::Fragment, SourceError>>,
    {
        type Item = Result<SeriesOf<C>, GroupError>;

        fn next(&mut self) -> Option<Self::Item> {
            if let Some(item) = self.buffer.next() {
                return Some(item);
            }

            let mut fragments = Vec::with_capacity(self.batch);
            let mut failure = None;
            for item in self.fragments.by_ref().take(self.batch) {
                match item {
                    Ok(fragment) => fragments.push(fragment),
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
            if fragments.is_empty() && failure.is_none() {
                return None;
            }

            #[cfg(feature = "logging")]
            log::trace!("group-reduce: converting batch of {}", fragments.len());

            let converter = &self.converter;
            let mut converted: Vec<_> = fragments
                .into_par_iter()
                .map(|fragment| converter.convert(fragment).map_err(GroupError::from))
                .collect();
            if let Some(err) = failure {
                converted.push(Err(GroupError::from(err)));
            }
            self.buffer = converted.into_iter();
            self.buffer.next()
        }
    }

    /// Like [`stream`](super::stream), but converts fragments on the rayon pool.
    ///
    /// Batches hold `config.conversion_batch` fragments (default 200). Keying
    /// and merging stay sequential, so results are identical to `stream`.
    #[allow(clippy::type_complexity)]
    pub fn stream_parallel<S, C, G, KF, MF>(
        source: S,
        converter: C,
        key_fn: KF,
        merge_fn: MF,
        config: &EngineConfig,
    ) -> GroupReduce<ParConverted<S::IntoIter, C>, C::Time, C::Value, G, KF, MF>
    where
        S: IntoIterator<Item = Result<C::Fragment, SourceError>>,
        C: SeriesConverter + Sync,
        C::Fragment: Send,
        SeriesOf<C>: Send,
        G: Eq + Hash + Debug,
        KF: FnMut(&SeriesOf<C>) -> Result<G, BoxError>,
        MF: FnMut(&SeriesOf<C>, &SeriesOf<C>) -> Result<SeriesOf<C>, BoxError>,
    {
        let batch = config.conversion_batch.unwrap_or(DEFAULT_PAGE_SIZE);
        GroupReduce::new(
            ParConverted::new(source.into_iter(), converter, batch),
            key_fn,
            merge_fn,
            config,
        )
    }
}
