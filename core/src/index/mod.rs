pub mod lexical;

pub use lexical::{CorpusIndex, LexicalCatalog};
