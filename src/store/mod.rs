//! Vector store module.
//!
//! This module provides:
//! - `VectorIndex`: abstract interface over a remote vector collection API
//! - `PineconeIndex`: HTTP client for the Pinecone managed service
//! - `VectorStore`: the gateway combining an index with an embedding model

mod gateway;
mod index;
mod pinecone;


pub use gateway::{RetrievedDocument, Retriever, VectorStore};
pub use index::{IndexDescription, ScoredPoint, VectorIndex, VectorPoint};
pub use pinecone::PineconeIndex;
