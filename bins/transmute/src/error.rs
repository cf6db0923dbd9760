#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Engine(#[from] transmute_engine::EngineError),

    #[error("report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("{0} of {1} kinds failed")]
    KindsFailed(usize, usize),
}
