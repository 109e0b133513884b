//! Daily notification sweep. Reads match results the pipeline already
//! persisted — never rescores — and pushes one message per user summarizing
//! the day's unseen matches.

pub mod handlers;
pub mod push;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::json;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::matching::MatchResultRow;
use crate::notify::push::{PushMessage, PushSender};
use crate::pipeline::MATCH_THRESHOLD;

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub users_considered: usize,
    pub users_notified: usize,
    pub delivery_failures: usize,
}

#[derive(Debug, Clone, FromRow)]
struct PushRecipient {
    user_id: Uuid,
    push_token: String,
}

/// Runs the sweep for every user with notifications enabled and a registered
/// push token. One user's failure never aborts the sweep for the rest.
pub async fn run_daily_sweep(
    db: &PgPool,
    push: &dyn PushSender,
) -> Result<SweepSummary, AppError> {
    let recipients: Vec<PushRecipient> = sqlx::query_as(
        r#"
        SELECT user_id, push_token FROM push_tokens
        WHERE notifications_enabled = true AND push_token <> ''
        "#,
    )
    .fetch_all(db)
    .await?;

    let users_considered = recipients.len();
    let mut users_notified = 0;
    let mut delivery_failures = 0;

    for recipient in recipients {
        match sweep_one_user(db, push, &recipient).await {
            Ok(UserSweepOutcome::Notified { delivered }) => {
                users_notified += 1;
                if !delivered {
                    delivery_failures += 1;
                }
            }
            Ok(UserSweepOutcome::NothingToSend) => {}
            Err(e) => error!("sweep failed for user {}: {e}", recipient.user_id),
        }
    }

    info!(
        "Notification sweep: {users_considered} users considered, \
         {users_notified} notified, {delivery_failures} delivery failures"
    );

    Ok(SweepSummary {
        users_considered,
        users_notified,
        delivery_failures,
    })
}

enum UserSweepOutcome {
    Notified { delivered: bool },
    NothingToSend,
}

async fn sweep_one_user(
    db: &PgPool,
    push: &dyn PushSender,
    recipient: &PushRecipient,
) -> Result<UserSweepOutcome, AppError> {
    let rows: Vec<MatchResultRow> = sqlx::query_as(
        r#"
        SELECT * FROM job_match_results
        WHERE user_id = $1 AND notification_date = CURRENT_DATE
        "#,
    )
    .bind(recipient.user_id)
    .fetch_all(db)
    .await?;

    let viewed: Vec<Uuid> =
        sqlx::query_scalar("SELECT job_id FROM viewed_jobs WHERE user_id = $1")
            .bind(recipient.user_id)
            .fetch_all(db)
            .await?;
    let viewed: HashSet<Uuid> = viewed.into_iter().collect();

    let notifiable = filter_notifiable(&rows, &viewed);
    if notifiable.is_empty() {
        return Ok(UserSweepOutcome::NothingToSend);
    }

    let message = compose_match_message(notifiable.len());
    let delivery = push.send(&recipient.push_token, &message).await;
    let (sent_ok, error_message) = match &delivery {
        Ok(()) => (true, None),
        Err(e) => {
            // Logged, not retried: a fresh job-post trigger resets the flag,
            // and tomorrow's sweep is the retry path.
            error!("push delivery failed for user {}: {e}", recipient.user_id);
            (false, Some(e.to_string()))
        }
    };

    // Rows are marked sent regardless of delivery outcome
    let job_ids: Vec<Uuid> = notifiable.iter().map(|r| r.job_id).collect();
    sqlx::query(
        "UPDATE job_match_results SET notification_sent = true WHERE user_id = $1 AND job_id = ANY($2)",
    )
    .bind(recipient.user_id)
    .bind(&job_ids)
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO notification_log
            (user_id, notification_date, matches_count, sent_ok, error_message, created_at)
        VALUES ($1, CURRENT_DATE, $2, $3, $4, now())
        ON CONFLICT (user_id, notification_date) DO UPDATE
        SET matches_count = EXCLUDED.matches_count,
            sent_ok = EXCLUDED.sent_ok,
            error_message = EXCLUDED.error_message
        "#,
    )
    .bind(recipient.user_id)
    .bind(notifiable.len() as i32)
    .bind(sent_ok)
    .bind(error_message)
    .execute(db)
    .await?;

    Ok(UserSweepOutcome::Notified { delivered: sent_ok })
}

/// Keeps rows still worth notifying: unsent, at or above threshold, and not
/// already viewed by the user.
fn filter_notifiable<'a>(
    rows: &'a [MatchResultRow],
    viewed: &HashSet<Uuid>,
) -> Vec<&'a MatchResultRow> {
    rows.iter()
        .filter(|r| {
            !r.notification_sent
                && r.match_score >= MATCH_THRESHOLD as i32
                && !viewed.contains(&r.job_id)
        })
        .collect()
}

/// Singular/plural wording for the day's single digest message.
fn compose_match_message(count: usize) -> PushMessage {
    let (title, body) = if count == 1 {
        (
            "New job match".to_string(),
            "A job matching your profile was just posted. Tap to view it.".to_string(),
        )
    } else {
        (
            "New job matches".to_string(),
            format!("{count} jobs matching your profile were just posted. Tap to view them."),
        )
    };
    PushMessage {
        title,
        body,
        data: json!({ "screen": "matches" }),
    }
}
