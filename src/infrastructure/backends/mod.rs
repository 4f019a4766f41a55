mod rag;

pub use rag::*;
