use super::entities::{poll, user_poll, Poll, UserPoll};
use crate::domain::{self, NewPoll, PollPointer, VotePlan};
use quickvote_errors::AppError;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone)]
pub struct PollRepository {
    db: DatabaseConnection,
}

fn db_error(err: DbErr) -> AppError {
    tracing::error!("Database error: {}", err);
    AppError::Database(err.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

fn from_json<T: DeserializeOwned>(
    poll_id: &str,
    field: &str,
    value: &serde_json::Value,
) -> Result<T, AppError> {
    serde_json::from_value(value.clone()).map_err(|e| {
        tracing::error!("Corrupt {} on poll {}: {}", field, poll_id, e);
        AppError::Database(format!("corrupt {field} column"))
    })
}

fn to_domain(row: &poll::Model) -> Result<domain::Poll, AppError> {
    Ok(domain::Poll {
        id: row.id.clone(),
        title: row.title.clone(),
        options: from_json(&row.id, "options", &row.options)?,
        votes: from_json(&row.id, "votes", &row.votes)?,
        voters: from_json(&row.id, "voters", &row.voters)?,
        category: row.category.clone(),
        user_id: row.user_id.clone(),
        created_at: row.created_at,
    })
}

impl PollRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes the poll and its owner pointer in one transaction.
    pub async fn create(&self, new_poll: NewPoll) -> Result<domain::Poll, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let poll = new_poll.into_poll(id, chrono::Utc::now());

        let txn = self.db.begin().await.map_err(db_error)?;

        poll::ActiveModel {
            id: Set(poll.id.clone()),
            title: Set(poll.title.clone()),
            options: Set(to_json(&poll.options)?),
            votes: Set(to_json(&poll.votes)?),
            voters: Set(to_json(&poll.voters)?),
            category: Set(poll.category.clone()),
            user_id: Set(poll.user_id.clone()),
            created_at: Set(poll.created_at),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        user_poll::ActiveModel {
            user_id: Set(poll.user_id.clone()),
            poll_id: Set(poll.id.clone()),
            category: Set(poll.category.clone()),
            created_at: Set(poll.created_at),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;
        Ok(poll)
    }

    pub async fn find_by_id(&self, poll_id: &str) -> Result<Option<domain::Poll>, AppError> {
        let row = Poll::find_by_id(poll_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_error)?;
        row.as_ref().map(to_domain).transpose()
    }

    pub async fn find_pointer(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> Result<Option<PollPointer>, AppError> {
        let row = UserPoll::find_by_id((user_id.to_string(), poll_id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| PollPointer {
            poll_id: r.poll_id,
            category: r.category,
            created_at: r.created_at,
        }))
    }

    pub async fn find_by_owner(&self, user_id: &str) -> Result<Vec<domain::Poll>, AppError> {
        let poll_ids: Vec<String> = UserPoll::find()
            .filter(user_poll::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|p| p.poll_id)
            .collect();

        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        Poll::find()
            .filter(poll::Column::Id.is_in(poll_ids))
            .order_by_desc(poll::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .iter()
            .map(to_domain)
            .collect()
    }

    /// Row-locks the poll, plans the vote against the locked state and writes
    /// `votes` and `voters` in a single UPDATE.
    pub async fn cast_vote(
        &self,
        poll_id: &str,
        voter: &str,
        choice: usize,
    ) -> Result<(VotePlan, domain::Poll), AppError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let row = Poll::find_by_id(poll_id.to_string())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(AppError::NotFound)?;

        let mut poll = to_domain(&row)?;
        let plan = poll.plan_vote(voter, choice)?;

        if plan.writes() {
            poll.apply_vote(voter, plan);
            let mut active: poll::ActiveModel = row.into();
            active.votes = Set(to_json(&poll.votes)?);
            active.voters = Set(to_json(&poll.voters)?);
            active.update(&txn).await.map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;
        Ok((plan, poll))
    }

    pub async fn delete(&self, poll_id: &str, user_id: &str) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        UserPoll::delete_many()
            .filter(user_poll::Column::UserId.eq(user_id))
            .filter(user_poll::Column::PollId.eq(poll_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        Poll::delete_by_id(poll_id.to_string())
            .exec(&txn)
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;
        Ok(())
    }
}
