use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::{SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    family_member::{FamilyMember, FamilyMemberPatch, MemberId, NewFamilyMember},
    repository::{FamilyMemberRepository, TodoRepository},
    seed,
    todo::{NewTodo, Todo, TodoId, TodoPatch},
};

const TODO_COLUMNS: &str = "id, title, completed, assigned_to, assigned_to_color, due_date, priority, category, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, name, color, created_at";

/// Both tables live in one database; timestamps are stored as epoch microseconds.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        prepare_sqlite_file(database_url)?;
        let options = SqlitePoolOptions::new();
        // Every in-memory connection is its own database, so keep exactly one alive.
        let options = if is_memory(database_url) {
            options.max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            options.max_connections(5)
        };
        let pool = options.connect(database_url).await.with_context(|| format!("connecting to {database_url}"))?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS family_members (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                assigned_to TEXT NOT NULL,
                assigned_to_color TEXT NOT NULL,
                due_date TEXT,
                priority TEXT NOT NULL DEFAULT 'normal',
                category TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// Inserts the default members and todos into whichever table is empty.
    pub async fn seed_defaults(&self) -> Result<()> {
        let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM family_members").fetch_one(&*self.pool).await?;
        if members == 0 {
            let now = Utc::now().timestamp_micros();
            for member in seed::new_family_members() {
                sqlx::query("INSERT INTO family_members (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)")
                    .bind(&member.id)
                    .bind(&member.name)
                    .bind(&member.color)
                    .bind(now)
                    .execute(&*self.pool)
                    .await?;
            }
            tracing::info!("seeded family members");
        }

        let todos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos").fetch_one(&*self.pool).await?;
        if todos == 0 {
            let now = Utc::now().timestamp_micros();
            // Reverse so the insertion-order tie-break lists them in seed order.
            for todo in seed::todos().into_iter().rev() {
                sqlx::query(&format!("INSERT INTO todos ({TODO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"))
                    .bind(&todo.id.0)
                    .bind(&todo.title)
                    .bind(todo.completed)
                    .bind(&todo.assigned_to)
                    .bind(&todo.assigned_to_color)
                    .bind(todo.due_date)
                    .bind(todo.priority.as_str())
                    .bind(&todo.category)
                    .bind(now)
                    .execute(&*self.pool)
                    .await?;
            }
            tracing::info!("seeded todos");
        }
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for SqliteRepository {
    async fn create(&self, input: NewTodo) -> Result<Todo> {
        let now = Utc::now();
        let mut id = TodoId::from_millis(now.timestamp_millis());
        let sql = format!(
            "INSERT INTO todos ({TODO_COLUMNS}) VALUES (?1, ?2, 0, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(id) DO NOTHING
             RETURNING {TODO_COLUMNS}"
        );
        loop {
            let row = sqlx::query(&sql)
                .bind(&id.0)
                .bind(&input.title)
                .bind(&input.assigned_to)
                .bind(&input.assigned_to_color)
                .bind(input.due_date)
                .bind(input.priority.as_str())
                .bind(&input.category)
                .bind(now.timestamp_micros())
                .fetch_optional(&*self.pool)
                .await?;
            match row {
                Some(row) => return row_to_todo(&row),
                None => id = id.successor().context("timestamp id overflow")?,
            }
        }
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn list(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, rowid DESC"))
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!(
            "UPDATE todos SET
                title = COALESCE(?2, title),
                completed = COALESCE(?3, completed),
                assigned_to = COALESCE(?4, assigned_to),
                assigned_to_color = COALESCE(?5, assigned_to_color),
                due_date = COALESCE(?6, due_date),
                priority = COALESCE(?7, priority),
                category = COALESCE(?8, category),
                updated_at = MAX(?9, updated_at + 1)
             WHERE id = ?1
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(id.0)
        .bind(patch.title)
        .bind(patch.completed)
        .bind(patch.assigned_to)
        .bind(patch.assigned_to_color)
        .bind(patch.due_date)
        .bind(patch.priority.map(|p| p.as_str()))
        .bind(patch.category)
        .bind(Utc::now().timestamp_micros())
        .fetch_optional(&*self.pool)
        .await?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn delete(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("DELETE FROM todos WHERE id = ?1 RETURNING {TODO_COLUMNS}"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.as_ref().map(row_to_todo).transpose()
    }

    async fn count_assigned_to(&self, name: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE assigned_to = ?1")
            .bind(name)
            .fetch_one(&*self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl FamilyMemberRepository for SqliteRepository {
    async fn create(&self, input: NewFamilyMember) -> Result<Option<FamilyMember>> {
        let row = sqlx::query(&format!(
            "INSERT INTO family_members ({MEMBER_COLUMNS}) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO NOTHING
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(input.id)
        .bind(input.name)
        .bind(input.color)
        .bind(Utc::now().timestamp_micros())
        .fetch_optional(&*self.pool)
        .await?;
        row.as_ref().map(row_to_member).transpose()
    }

    async fn get(&self, id: MemberId) -> Result<Option<FamilyMember>> {
        let row = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM family_members WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.as_ref().map(row_to_member).transpose()
    }

    async fn list(&self) -> Result<Vec<FamilyMember>> {
        let rows = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM family_members ORDER BY created_at ASC, rowid ASC"))
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(row_to_member).collect()
    }

    async fn update(&self, id: MemberId, patch: FamilyMemberPatch) -> Result<Option<FamilyMember>> {
        let row = sqlx::query(&format!(
            "UPDATE family_members SET name = COALESCE(?2, name), color = COALESCE(?3, color)
             WHERE id = ?1
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(id.0)
        .bind(patch.name)
        .bind(patch.color)
        .fetch_optional(&*self.pool)
        .await?;
        row.as_ref().map(row_to_member).transpose()
    }

    async fn delete(&self, id: MemberId) -> Result<Option<FamilyMember>> {
        let row = sqlx::query(&format!("DELETE FROM family_members WHERE id = ?1 RETURNING {MEMBER_COLUMNS}"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.as_ref().map(row_to_member).transpose()
    }
}

fn row_to_todo(row: &SqliteRow) -> Result<Todo> {
    let priority: String = row.try_get("priority")?;
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        title: row.try_get("title")?,
        completed: row.try_get("completed")?,
        assigned_to: row.try_get("assigned_to")?,
        assigned_to_color: row.try_get("assigned_to_color")?,
        due_date: row.try_get::<Option<NaiveDate>, _>("due_date")?,
        priority: priority.parse()?,
        category: row.try_get("category")?,
        created_at: from_micros(row.try_get("created_at")?)?,
        updated_at: from_micros(row.try_get("updated_at")?)?,
    })
}

fn row_to_member(row: &SqliteRow) -> Result<FamilyMember> {
    Ok(FamilyMember {
        id: MemberId(row.try_get("id")?),
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        created_at: from_micros(row.try_get("created_at")?)?,
    })
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).with_context(|| format!("timestamp out of range: {micros}"))
}

fn is_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Creates the database file and its parent directory for file-backed URLs.
fn prepare_sqlite_file(database_url: &str) -> Result<()> {
    if is_memory(database_url) { return Ok(()); }
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        // On Windows, absolute paths may look like /C:/path; strip the leading slash
        let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
            &path[1..]
        } else {
            path
        };
        use std::{fs, fs::OpenOptions, path::Path};
        let p = Path::new(path);
        if let Some(parent) = p.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
        if !p.exists() {
            let _ = OpenOptions::new().create(true).append(true).open(p)?;
        }
    }
    Ok(())
}
