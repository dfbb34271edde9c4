use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    errors::AppError,
    http::handlers::resource_location,
    middleware::RaterId,
    models::{
        NewRating, RatingAggregate, RatingValue,
        rating::{RatingPayload, RatingResponse},
    },
    state::AppState,
};

pub async fn submit_rating_handler(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Extension(RaterId(rater_id)): Extension<RaterId>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: RatingPayload = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid rating value".into()))?;

    let rating = RatingValue::new(payload.rating).ok_or_else(|| {
        AppError::BadRequest(
            "Rating must be one of: 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0".into(),
        )
    })?;

    ensure_movie_exists(&state, &title).await?;

    let (stored, created) = state
        .store
        .upsert_rating(NewRating {
            movie_title: title.clone(),
            rater_id,
            rating,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to submit rating for {}: {}", title, e);
            e
        })?;

    let body = Json(RatingResponse::from(stored));

    if created {
        let location = resource_location(&state.base_url, &["movies", &title, "ratings"]);
        Ok((StatusCode::CREATED, [(header::LOCATION, location)], body).into_response())
    } else {
        Ok((StatusCode::OK, body).into_response())
    }
}

pub async fn get_rating_aggregate_handler(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<RatingAggregate>, AppError> {
    ensure_movie_exists(&state, &title).await?;

    let aggregate = state
        .store
        .get_rating_aggregate(&title)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get rating aggregate for {}: {}", title, e);
            e
        })?;

    Ok(Json(aggregate))
}

async fn ensure_movie_exists(state: &AppState, title: &str) -> Result<(), AppError> {
    match state.store.get_movie_by_title(title).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => Err(AppError::NotFound("Movie not found".into())),
        Err(e) => {
            tracing::error!("Failed to check movie existence for {}: {}", title, e);
            Err(e)
        }
    }
}
