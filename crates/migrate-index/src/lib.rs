pub mod index;
pub mod store;

pub use index::{CorpusMatch, SimilarityIndex};
pub use store::{CorpusStore, FsCorpusStore, MemoryCorpusStore};
