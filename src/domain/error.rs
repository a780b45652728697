use super::todo::TodoId;

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("Todo not found with id: {0}")]
    NotFound(TodoId),
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type TodoResult<T> = Result<T, TodoError>;
