// Adapters layer: concrete implementations of the domain ports (page sources, storage).

pub mod pdf;
pub mod storage;

pub use pdf::YearbookTextLoader;
pub use storage::LocalStorage;
