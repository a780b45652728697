use crate::domain::error::{TodoError, TodoResult};
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoInput};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list_all(&self) -> TodoResult<Vec<Todo>>;
    async fn list_by_completion(&self, completed: bool) -> TodoResult<Vec<Todo>>;
    async fn get_by_id(&self, id: TodoId) -> TodoResult<Todo>;
    async fn create(&self, input: TodoInput) -> TodoResult<Todo>;
    async fn update(&self, id: TodoId, input: TodoInput) -> TodoResult<Todo>;
    async fn delete(&self, id: TodoId) -> TodoResult<()>;
}

/// Each mutation commits its own unit of work; early returns roll back.
#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn list_all(&self) -> TodoResult<Vec<Todo>> {
        Ok(self.repo.find_all().await?)
    }

    async fn list_by_completion(&self, completed: bool) -> TodoResult<Vec<Todo>> {
        Ok(self.repo.find_by_completed(completed).await?)
    }

    async fn get_by_id(&self, id: TodoId) -> TodoResult<Todo> {
        self.repo.find_by_id(id).await?.ok_or(TodoError::NotFound(id))
    }

    async fn create(&self, input: TodoInput) -> TodoResult<Todo> {
        let now = Utc::now();
        let new_todo = NewTodo {
            title: input.title,
            description: input.description,
            completed: input.completed.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };

        let mut uow = self.repo.begin().await?;
        let todo = uow.insert(new_todo).await?;
        uow.commit().await?;

        tracing::info!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, input: TodoInput) -> TodoResult<Todo> {
        let mut uow = self.repo.begin().await?;
        // the store keeps updated_at at max(now, previous)
        let todo = uow.update(id, input, Utc::now()).await?.ok_or(TodoError::NotFound(id))?;
        uow.commit().await?;

        tracing::info!(id = %todo.id, completed = todo.completed, "todo updated");
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> TodoResult<()> {
        let mut uow = self.repo.begin().await?;
        if !uow.delete(id).await? {
            return Err(TodoError::NotFound(id));
        }
        uow.commit().await?;

        tracing::info!(%id, "todo deleted");
        Ok(())
    }
}
