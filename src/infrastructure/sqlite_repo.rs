use std::{path::Path, str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite, Transaction,
};

use crate::domain::{
    repository::{TodoRepository, TodoUnitOfWork},
    todo::{NewTodo, Todo, TodoId, TodoInput},
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "SELECT id, title, description, completed, created_at, updated_at FROM todos";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = is_in_memory(database_url);
        if !in_memory {
            prepare_parent_dir(database_url)?;
        }
        let mut options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url `{database_url}`"))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `sqlite::memory:` opens its own database, so the
        // pool keeps exactly one connection alive for the process lifetime.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to `{database_url}`"))?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&*self.pool).await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_todo).transpose()
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE completed = ?1 ORDER BY id"))
            .bind(completed)
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn begin(&self) -> Result<Box<dyn TodoUnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl TodoUnitOfWork for SqliteUnitOfWork {
    async fn insert(&mut self, todo: NewTodo) -> Result<Todo> {
        let result = sqlx::query(
            "INSERT INTO todos (title, description, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(format_timestamp(todo.created_at))
        .bind(format_timestamp(todo.updated_at))
        .execute(&mut *self.tx)
        .await?;
        Ok(todo.with_id(TodoId(result.last_insert_rowid())))
    }

    async fn update(&mut self, id: TodoId, input: TodoInput, now: DateTime<Utc>) -> Result<Option<Todo>> {
        // must stay the first statement of the transaction
        let row = sqlx::query(
            "UPDATE todos
             SET title = ?2, description = ?3, completed = COALESCE(?4, completed), updated_at = MAX(?5, updated_at)
             WHERE id = ?1
             RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(id.0)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(format_timestamp(now))
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_todo).transpose()
    }

    async fn delete(&mut self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let SqliteUnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}

fn row_to_todo(row: SqliteRow) -> Result<Todo> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// Fixed-width UTC text so that string order is time order in SQL.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("malformed timestamp `{raw}` in todos table"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn prepare_parent_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create database directory {}", parent.display()))?;
        }
    }
    Ok(())
}
