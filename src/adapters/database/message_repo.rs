use crate::adapters::database::records::MessageRecord;
use crate::domain::grid::{QueryPlan, Search, SortDirection};
use crate::domain::message::Message;
use crate::error::Result;
use sqlx::SqliteConnection;
use time::OffsetDateTime;

const COLUMNS: &str = "id, author, message, created, updated, deleted";

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Stores a new live message.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, message))]
    pub(crate) async fn create(&self, conn: &mut SqliteConnection, author: &str, message: &str) -> Result<Message> {
        let now = OffsetDateTime::now_utc();

        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            r"
            INSERT INTO messages (author, message, created, updated, deleted)
            VALUES (?, ?, ?, ?, 0)
            RETURNING {COLUMNS}
            "
        ))
        .bind(author)
        .bind(message)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// Fetches a message unless it is missing or soft-deleted.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_live(&self, conn: &mut SqliteConnection, id: i64) -> Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            "SELECT {COLUMNS} FROM messages WHERE id = ? AND deleted = 0"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Rewrites the editable fields of a live message and bumps `updated`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, message))]
    pub(crate) async fn update_live(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        author: &str,
        message: &str,
    ) -> Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            r"
            UPDATE messages SET author = ?, message = ?, updated = ?
            WHERE id = ? AND deleted = 0
            RETURNING {COLUMNS}
            "
        ))
        .bind(author)
        .bind(message)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Flags a live message as deleted. Returns `false` if there was nothing to delete.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn soft_delete(&self, conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE messages SET deleted = 1 WHERE id = ? AND deleted = 0").bind(id).execute(conn).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Counts live messages, optionally narrowed by a substring search.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn count(&self, conn: &mut SqliteConnection, search: Option<&Search>) -> Result<u64> {
        let (where_clause, binds) = where_clause(search);
        let sql = format!("SELECT COUNT(*) FROM messages {where_clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for pattern in binds {
            query = query.bind(pattern);
        }
        let count = query.fetch_one(conn).await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Fetches one page of live messages as described by `plan`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn fetch_page(&self, conn: &mut SqliteConnection, plan: &QueryPlan) -> Result<Vec<Message>> {
        let (where_clause, binds) = where_clause(plan.search.as_ref());
        let order_clause = order_clause(plan);
        let sql = format!("SELECT {COLUMNS} FROM messages {where_clause} {order_clause} LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, MessageRecord>(&sql);
        for pattern in binds {
            query = query.bind(pattern);
        }
        // SQLite reads a negative LIMIT as "no limit".
        let limit = plan.limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let offset = i64::try_from(plan.offset).unwrap_or(i64::MAX);
        let records = query.bind(limit).bind(offset).fetch_all(conn).await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}

/// Renders the filter. Live rows only; an empty disjunction adds no condition.
fn where_clause(search: Option<&Search>) -> (String, Vec<String>) {
    let mut conditions = vec!["deleted = 0".to_string()];
    let mut binds = Vec::new();

    if let Some(search) = search.filter(|s| !s.fields.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.needle));
        let any: Vec<String> = search
            .fields
            .iter()
            .map(|field| {
                binds.push(pattern.clone());
                format!(r"{} LIKE ? ESCAPE '\'", field.name())
            })
            .collect();
        conditions.push(format!("({})", any.join(" OR ")));
    }

    (format!("WHERE {}", conditions.join(" AND ")), binds)
}

/// `id` closes every ordering so pages never overlap.
fn order_clause(plan: &QueryPlan) -> String {
    let keys: Vec<String> = plan
        .sort
        .iter()
        .map(|key| {
            let dir = match key.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("{} {dir}", key.field.name())
        })
        .chain(std::iter::once("id ASC".to_string()))
        .collect();
    format!("ORDER BY {}", keys.join(", "))
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
