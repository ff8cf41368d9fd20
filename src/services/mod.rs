pub mod export;
pub mod gallery;
