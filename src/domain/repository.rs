use async_trait::async_trait;
use chrono::{DateTime, Utc};
use super::todo::{NewTodo, Todo, TodoId, TodoInput};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn migrate(&self) -> anyhow::Result<()>;
    async fn find_all(&self) -> anyhow::Result<Vec<Todo>>;
    async fn find_by_id(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    async fn find_by_completed(&self, completed: bool) -> anyhow::Result<Vec<Todo>>;
    async fn begin(&self) -> anyhow::Result<Box<dyn TodoUnitOfWork>>;
}

// Every method issues its write as the first statement so the write lock is
// taken up front. Dropping without `commit` rolls back.
#[async_trait]
pub trait TodoUnitOfWork: Send {
    async fn insert(&mut self, todo: NewTodo) -> anyhow::Result<Todo>;
    async fn update(&mut self, id: TodoId, input: TodoInput, now: DateTime<Utc>) -> anyhow::Result<Option<Todo>>;
    async fn delete(&mut self, id: TodoId) -> anyhow::Result<bool>;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}
