pub mod config;
pub mod provider;
pub mod storage;

// Re-export engine types for convenience
pub use facematch_engine::{
    EmbeddingVector, EnrollError, GalleryStore, MatchConfig, MatchDecision, MatchingEngine,
};

use anyhow::Result;

/// The engine as wired by the CLI: detector reports in, files on disk.
pub type FileEngine = MatchingEngine<provider::ReportProvider, storage::FileGallery>;

pub fn build_engine(cfg: &config::Config) -> Result<FileEngine> {
    let provider = provider::ReportProvider::new(cfg.min_detection_score);
    let gallery = storage::FileGallery::new(&cfg.store_prefix);
    Ok(MatchingEngine::new(cfg.matching.clone(), provider, gallery)?)
}
