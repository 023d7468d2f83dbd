// handlers.rs
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::models::VoteForm;
use crate::pages;
use crate::store::PollStore;

/// List the eligible questions, newest first
pub async fn index<S>(State(store): State<Arc<S>>) -> Result<Response, AppError>
where
    S: PollStore + 'static,
{
    let questions = store.latest_questions(Utc::now()).await?;
    Ok(Html(pages::index_page(&questions)).into_response())
}

/// Show a question's choices with a vote form
pub async fn detail<S>(
    State(store): State<Arc<S>>,
    Path(question_id): Path<i64>,
) -> Result<Response, AppError>
where
    S: PollStore + 'static,
{
    let detail = store
        .eligible_question(question_id, Utc::now())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Html(pages::detail_page(&detail.question, &detail.choices, None)).into_response())
}

/// Show a question's vote tallies
pub async fn results<S>(
    State(store): State<Arc<S>>,
    Path(question_id): Path<i64>,
) -> Result<Response, AppError>
where
    S: PollStore + 'static,
{
    let detail = store
        .eligible_question(question_id, Utc::now())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Html(pages::results_page(&detail.question, &detail.choices)).into_response())
}

/// Record a vote, then redirect to the results page
pub async fn vote<S>(
    State(store): State<Arc<S>>,
    Path(question_id): Path<i64>,
    Form(form): Form<VoteForm>,
) -> Result<Response, AppError>
where
    S: PollStore + 'static,
{
    let detail = store
        .eligible_question(question_id, Utc::now())
        .await?
        .ok_or(AppError::NotFound)?;

    let recorded = match form.choice {
        Some(choice_id) => store.record_vote(question_id, choice_id).await?,
        None => false,
    };

    if recorded {
        tracing::info!(question_id, "vote recorded");
        Ok(Redirect::to(&format!("/polls/{question_id}/results/")).into_response())
    } else {
        let body = pages::detail_page(
            &detail.question,
            &detail.choices,
            Some("You didn't select a choice."),
        );
        Ok(Html(body).into_response())
    }
}

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
