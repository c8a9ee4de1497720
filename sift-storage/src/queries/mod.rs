pub mod embedding_ops;
pub mod entity_crud;
pub mod lexical_search;
pub mod vector_search;
