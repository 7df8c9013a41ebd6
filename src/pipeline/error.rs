use thiserror::Error;

use crate::search::SearchError;

/// Errors that abort a pipeline run.
///
/// Most failure modes are recovered inside their stage (scoring degradation,
/// keyword fallback, budget overflow); only retrieval itself failing aborts
/// the query.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Search(#[from] SearchError),
}
