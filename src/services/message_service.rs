use crate::adapters::database::DbPool;
use crate::adapters::database::message_repo::MessageRepository;
use crate::domain::grid::{GridPage, GridRequest, project_row};
use crate::domain::message::{Message, MessageForm};
use crate::error::{AppError, Result};
use validator::Validate;

#[derive(Clone, Debug)]
pub struct MessageService {
    pool: DbPool,
    repo: MessageRepository,
}

impl MessageService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: MessageRepository) -> Self {
        Self { pool, repo }
    }

    /// Answers one data-grid request.
    ///
    /// Both counts and the page are read inside a single transaction so they agree with each other.
    ///
    /// # Errors
    /// Returns `AppError::Database` if any of the reads fail.
    #[tracing::instrument(err(level = "warn"), skip(self, request), fields(draw = %request.draw))]
    pub async fn grid_page(&self, request: &GridRequest) -> Result<GridPage> {
        let mut tx = self.pool.begin().await?;

        let total = self.repo.count(&mut tx, None).await?;
        let search = request.search_filter();
        let filtered = match &search {
            Some(search) => self.repo.count(&mut tx, Some(search)).await?,
            None => total,
        };

        let plan = request.plan(filtered);
        let messages = self.repo.fetch_page(&mut tx, &plan).await?;
        tx.commit().await?;

        let rows = messages
            .iter()
            .zip(1..)
            .map(|(message, j)| project_row(message, request.start.saturating_add(j)))
            .collect();

        tracing::debug!(total, filtered, offset = plan.offset, "grid page served");
        Ok(GridPage { total, filtered, rows })
    }

    /// Validates the form and stores a new message.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the form is invalid.
    /// Returns `AppError::Database` if the message cannot be stored.
    #[tracing::instrument(err(level = "debug"), skip(self, form))]
    pub async fn create(&self, form: &MessageForm) -> Result<Message> {
        form.validate()?;

        let mut tx = self.pool.begin().await?;
        let message = self.repo.create(&mut tx, &form.author, &form.message).await?;
        tx.commit().await?;

        tracing::info!(message_id = message.id, "message added");
        Ok(message)
    }

    /// Looks up a live message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the id is unknown or the message was deleted.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn find_live(&self, id: i64) -> Result<Message> {
        let mut conn = self.pool.acquire().await?;
        self.repo.find_live(&mut conn, id).await?.ok_or(AppError::NotFound)
    }

    /// Validates the form and rewrites a live message.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the form is invalid.
    /// Returns `AppError::NotFound` if the id is unknown or the message was deleted.
    #[tracing::instrument(err(level = "debug"), skip(self, form))]
    pub async fn update(&self, id: i64, form: &MessageForm) -> Result<Message> {
        form.validate()?;

        let mut tx = self.pool.begin().await?;
        let message = self.repo.update_live(&mut tx, id, &form.author, &form.message).await?.ok_or(AppError::NotFound)?;
        tx.commit().await?;

        tracing::info!(message_id = message.id, "message updated");
        Ok(message)
    }

    /// Marks a live message as deleted.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the id is unknown or the message was already deleted.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !self.repo.soft_delete(&mut tx, id).await? {
            return Err(AppError::NotFound);
        }
        tx.commit().await?;

        tracing::info!(message_id = id, "message deleted");
        Ok(())
    }
}
