use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    errors::AppError,
    http::handlers::resource_location,
    models::{Movie, MoviePage, NewMovie, movie::MovieQuery},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMoviePayload {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub distributor: Option<String>,
    pub budget: Option<i64>,
    pub mpa_rating: Option<String>,
}

impl CreateMoviePayload {
    pub fn validate(self) -> Result<NewMovie, AppError> {
        let title = required(self.title, "title")?;
        let genre = required(self.genre, "genre")?;
        let release_date = required(self.release_date, "releaseDate")?;

        let release_date = NaiveDate::parse_from_str(&release_date, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest("Invalid release date format, expected YYYY-MM-DD".into())
        })?;

        Ok(NewMovie {
            title,
            release_date,
            genre,
            distributor: self.distributor,
            budget: self.budget,
            mpa_rating: self.mpa_rating,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid request body: {} is required", field)))
}

pub async fn create_movie_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Movie>), AppError> {
    // The body is JSON whatever Content-Type the client sent.
    let payload: CreateMoviePayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;
    let new_movie = payload.validate()?;

    let movie = state.store.create_movie(new_movie).await.map_err(|e| {
        tracing::error!("Error creating movie: {}", e);
        e
    })?;

    // The response does not wait for the box office lookup.
    state.enrichment.submit(movie.title.clone());

    tracing::info!("Movie created: {} (ID: {})", movie.title, movie.id);

    let location = resource_location(&state.base_url, &["movies", &movie.title]);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(movie),
    ))
}

pub async fn search_movies_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<MoviePage>, AppError> {
    // Search parameters are all optional, so an unreadable query string means no filters.
    let query = match query {
        Ok(Query(pairs)) => MovieQuery::from_pairs(pairs),
        Err(e) => {
            tracing::warn!("Ignoring unreadable search query: {}", e.body_text());
            MovieQuery::default()
        }
    };

    let page = state
        .store
        .search_movies(&query.filters(), query.limit(), query.cursor())
        .await
        .map_err(|e| {
            tracing::error!("Failed to search movies: {}", e);
            e
        })?;

    Ok(Json(page))
}
