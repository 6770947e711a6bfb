//! In-memory document store with a paged query cursor.

use std::io::Write;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chronofold::{Query, RawFragment, SeriesSource, SourceError};

use crate::filter::Filter;

/// A shared, append-only collection of raw documents.
///
/// Readers work on point-in-time snapshots: a query sees the documents that
/// were present when it was fetched, even if more are added while it is being
/// consumed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: ArcSwap<Vec<RawFragment>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = RawFragment>) -> Self {
        Self {
            documents: ArcSwap::from_pointee(documents.into_iter().collect()),
        }
    }

    /// Adds one document.
    pub fn add(&self, document: RawFragment) {
        self.add_all([document]);
    }

    /// Adds several documents atomically.
    pub fn add_all(&self, documents: impl IntoIterator<Item = RawFragment>) {
        let documents: Vec<RawFragment> = documents.into_iter().collect();
        self.documents.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + documents.len());
            next.extend(current.iter().cloned());
            next.extend(documents.iter().cloned());
            next
        });
    }

    /// Removes every document.
    pub fn clear(&self) {
        self.documents.store(Arc::new(Vec::new()));
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.load().len()
    }

    /// Returns `true` if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current snapshot of all documents.
    pub fn snapshot(&self) -> Arc<Vec<RawFragment>> {
        self.documents.load_full()
    }

    /// Writes every document as one JSON object per line.
    ///
    /// Returns the number of documents written. The output is readable by
    /// [`JsonLinesSource`](crate::JsonLinesSource).
    ///
    /// JSON has no NaN or infinity, so a document holding a non-finite value
    /// fails the export with [`SourceError::Backend`].
    pub fn export_json_lines<W: Write>(&self, mut writer: W) -> Result<usize, SourceError> {
        let snapshot = self.snapshot();
        for (index, document) in snapshot.iter().enumerate() {
            if let Some(value) = document
                .values
                .iter()
                .flatten()
                .find(|value| !value.is_finite())
            {
                return Err(SourceError::Backend(format!(
                    "document {index} holds non-finite value {value}, which JSON cannot represent"
                )));
            }
            serde_json::to_writer(&mut writer, document)
                .map_err(|err| SourceError::Backend(err.to_string()))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(snapshot.len())
    }
}

/// Queries an [`InMemoryStore`].
///
/// The store is the connection; the source itself holds no state. The
/// `cf` server-side aggregation hint is accepted and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemorySource;

impl InMemorySource {
    /// Creates the source.
    pub fn new() -> Self {
        Self
    }
}

impl SeriesSource for InMemorySource {
    type Connection = InMemoryStore;
    type Fragment = RawFragment;
    type Iter = PagedCursor;

    fn fetch(
        &self,
        connection: &InMemoryStore,
        query: &Query,
        page_size: usize,
    ) -> Result<PagedCursor, SourceError> {
        let filter = Filter::parse(query.filter())?;
        Ok(PagedCursor {
            snapshot: connection.snapshot(),
            filter,
            offset: 0,
            page_size: page_size.max(1),
            page: Vec::new().into_iter(),
            pages_fetched: 0,
        })
    }
}

/// Cursor over the documents matching a query.
///
/// Matching documents are copied out of the snapshot one page at a time, so
/// at most `page_size` of them are buffered.
#[derive(Debug)]
pub struct PagedCursor {
    snapshot: Arc<Vec<RawFragment>>,
    filter: Filter,
    offset: usize,
    page_size: usize,
    page: std::vec::IntoIter<RawFragment>,
    pages_fetched: usize,
}

impl PagedCursor {
    /// Number of non-empty pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> bool {
        let mut page = Vec::with_capacity(self.page_size);
        while page.len() < self.page_size && self.offset < self.snapshot.len() {
            let document = &self.snapshot[self.offset];
            self.offset += 1;
            if self.filter.matches(document) {
                page.push(document.clone());
            }
        }
        if page.is_empty() {
            return false;
        }

        self.pages_fetched += 1;
        #[cfg(feature = "logging")]
        log::trace!(
            "in-memory source: page {} with {} documents (offset {})",
            self.pages_fetched,
            page.len(),
            self.offset
        );

        self.page = page.into_iter();
        true
    }
}

impl Iterator for PagedCursor {
    type Item = Result<RawFragment, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(document) = self.page.next() {
            return Some(Ok(document));
        }
        if self.fetch_page() {
            self.page.next().map(Ok)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn document(host: &str, value: f64) -> RawFragment {
        RawFragment::new()
            .with_points([(1, value)])
            .with_field("name", "Load")
            .with_field("host", host)
    }

    #[test]
    fn test_store_add_and_clear() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        store.add(document("h1", 1.0));
        store.add_all([document("h2", 2.0), document("h3", 3.0)]);
        assert_eq!(store.len(), 3);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_cursor_pages() {
        let store = InMemoryStore::with_documents((0..5).map(|i| document("h1", f64::from(i))));
        let mut cursor = InMemorySource
            .fetch(&store, &Query::all(), 2)
            .unwrap();

        let mut values = Vec::new();
        for item in cursor.by_ref() {
            values.push(item.unwrap().values.unwrap()[0]);
        }
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cursor.pages_fetched(), 3);
    }

    #[test]
    fn test_cursor_applies_filter() {
        let store = InMemoryStore::with_documents([
            document("h1", 1.0),
            document("h2", 2.0),
            document("h1", 3.0),
        ]);
        let hosts: Vec<_> = InMemorySource
            .fetch(&store, &Query::new("host:h1"), 200)
            .unwrap()
            .map(|item| item.unwrap().values.unwrap()[0])
            .collect();
        assert_eq!(hosts, vec![1.0, 3.0]);
    }

    #[test]
    fn test_cursor_reads_snapshot() {
        let store = InMemoryStore::with_documents([document("h1", 1.0)]);
        let cursor = InMemorySource.fetch(&store, &Query::all(), 1).unwrap();
        store.add(document("h2", 2.0));
        assert_eq!(cursor.count(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_invalid_query_rejected_up_front() {
        let store = InMemoryStore::new();
        let err = InMemorySource
            .fetch(&store, &Query::new("no-colon"), 10)
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidQuery { .. }));
    }

    #[test]
    fn test_export_json_lines() {
        let store = InMemoryStore::with_documents([document("h1", 1.0), document("h2", 2.0)]);
        let mut out = Vec::new();
        assert_eq!(store.export_json_lines(&mut out).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        let first: RawFragment = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first, document("h1", 1.0));
    }

    #[test]
    fn test_export_rejects_non_finite_values() {
        let store = InMemoryStore::with_documents([
            document("h1", 1.0),
            document("h2", f64::NAN),
            document("h3", f64::INFINITY),
        ]);
        let mut out = Vec::new();
        match store.export_json_lines(&mut out) {
            Err(SourceError::Backend(message)) => assert!(message.contains("document 1")),
            other => panic!("Expected backend error, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_paging_preserves_store_order(count in 0u32..50, page_size in 1usize..12) {
            let store = InMemoryStore::with_documents(
                (0..count).map(|i| document("h1", f64::from(i))),
            );
            let mut cursor = InMemorySource.fetch(&store, &Query::all(), page_size).unwrap();
            let values: Vec<f64> = cursor
                .by_ref()
                .map(|item| item.unwrap().values.unwrap()[0])
                .collect();

            prop_assert_eq!(values, (0..count).map(f64::from).collect::<Vec<_>>());
            prop_assert_eq!(cursor.pages_fetched(), (count as usize).div_ceil(page_size));
        }
    }
}
