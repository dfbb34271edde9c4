#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use chrono::Utc;
use movie_catalog::{
    build_app,
    db::MovieStore,
    errors::AppError,
    models::{
        BoxOffice, Movie, MovieFilters, MoviePage, NewMovie, NewRating, Rating, RatingAggregate,
        Revenue, movie::decode_cursor,
    },
    services::{BoxOfficeError, BoxOfficeProvider, EnrichmentQueue},
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const AUTH_TOKEN: &str = "test-token";
pub const BASE_URL: &str = "http://movies.test";

/// Keeps rows in insertion order; searches walk it newest first.
#[derive(Default)]
pub struct InMemoryStore {
    movies: Mutex<Vec<Movie>>,
    ratings: Mutex<Vec<Rating>>,
    unhealthy: AtomicBool,
}

impl InMemoryStore {
    pub fn movie(&self, title: &str) -> Option<Movie> {
        self.movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.title == title)
            .cloned()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.lock().unwrap().len()
    }

    pub fn rating(&self, title: &str, rater_id: &str) -> Option<Rating> {
        self.ratings
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.movie_title == title && r.rater_id == rater_id)
            .cloned()
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }
}

fn matches(movie: &Movie, filters: &MovieFilters) -> bool {
    let eq_ci = |value: Option<&String>, wanted: &Option<String>| match wanted {
        Some(w) => value.is_some_and(|v| v.eq_ignore_ascii_case(w)),
        None => true,
    };

    filters
        .title
        .as_ref()
        .is_none_or(|q| movie.title.to_lowercase().contains(&q.to_lowercase()))
        && eq_ci(Some(&movie.genre), &filters.genre)
        && filters
            .year
            .is_none_or(|y| movie.release_date.format("%Y").to_string() == y.to_string())
        && eq_ci(movie.distributor.as_ref(), &filters.distributor)
        && filters
            .max_budget
            .is_none_or(|max| movie.budget.is_some_and(|b| b <= max))
        && filters
            .mpa_rating
            .as_ref()
            .is_none_or(|r| movie.mpa_rating.as_ref() == Some(r))
}

#[async_trait]
impl MovieStore for InMemoryStore {
    async fn create_movie(&self, new_movie: NewMovie) -> Result<Movie, AppError> {
        let mut movies = self.movies.lock().unwrap();
        if movies.iter().any(|m| m.title == new_movie.title) {
            return Err(AppError::Conflict(
                "Movie with this title already exists".into(),
            ));
        }

        let now = Utc::now();
        let movie = Movie {
            id: Uuid::new_v4(),
            title: new_movie.title,
            release_date: new_movie.release_date,
            genre: new_movie.genre,
            distributor: new_movie.distributor,
            budget: new_movie.budget,
            mpa_rating: new_movie.mpa_rating,
            box_office: None,
            created_at: now,
            updated_at: now,
        };
        movies.push(movie.clone());
        Ok(movie)
    }

    async fn get_movie_by_title(&self, title: &str) -> Result<Movie, AppError> {
        self.movie(title)
            .ok_or_else(|| AppError::NotFound("Movie not found".into()))
    }

    async fn update_movie_box_office(
        &self,
        title: &str,
        box_office: &BoxOffice,
    ) -> Result<(), AppError> {
        let mut movies = self.movies.lock().unwrap();
        if let Some(movie) = movies.iter_mut().find(|m| m.title == title) {
            movie.box_office = Some(box_office.clone());
            movie.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn upsert_rating(&self, new_rating: NewRating) -> Result<(Rating, bool), AppError> {
        let mut ratings = self.ratings.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = ratings
            .iter_mut()
            .find(|r| r.movie_title == new_rating.movie_title && r.rater_id == new_rating.rater_id)
        {
            existing.rating = new_rating.rating.get();
            existing.updated_at = now;
            return Ok((existing.clone(), false));
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            movie_title: new_rating.movie_title,
            rater_id: new_rating.rater_id,
            rating: new_rating.rating.get(),
            created_at: now,
            updated_at: now,
        };
        ratings.push(rating.clone());
        Ok((rating, true))
    }

    async fn get_rating_aggregate(&self, movie_title: &str) -> Result<RatingAggregate, AppError> {
        let values: Vec<f64> = self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.movie_title == movie_title)
            .map(|r| r.rating)
            .collect();

        if values.is_empty() {
            return Ok(RatingAggregate::new(None, 0));
        }

        let count = values.len() as i64;
        let average = values.iter().sum::<f64>() / values.len() as f64;
        Ok(RatingAggregate::new(Some(average), count))
    }

    async fn search_movies(
        &self,
        filters: &MovieFilters,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<MoviePage, AppError> {
        let offset = decode_cursor(cursor);
        let rows: Vec<Movie> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|m| matches(m, filters))
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0).saturating_add(1))
            .cloned()
            .collect();

        Ok(MoviePage::from_overfetch(rows, offset, limit))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(AppError::ServiceUnavailable("store offline".into()));
        }
        Ok(())
    }
}

/// Box-office provider that answers every title the same way and counts calls.
pub struct StubProvider {
    worldwide: Option<i64>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn returning(worldwide: i64) -> Self {
        Self {
            worldwide: Some(worldwide),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn not_found() -> Self {
        Self {
            worldwide: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoxOfficeProvider for StubProvider {
    async fn get_movie_data(&self, _title: &str) -> Result<BoxOffice, BoxOfficeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.worldwide {
            Some(worldwide) => Ok(BoxOffice {
                revenue: Revenue {
                    worldwide,
                    opening_weekend_usa: worldwide / 10,
                },
                currency: "USD".into(),
                source: "BoxOfficeAPI".into(),
                last_updated: Utc::now(),
            }),
            None => Err(BoxOfficeError::NotFound),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<StubProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_provider(StubProvider::returning(1_000_000))
    }

    pub fn with_provider(provider: StubProvider) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let provider = Arc::new(provider);
        let enrichment = EnrichmentQueue::start(store.clone(), provider.clone(), 16, 2);
        let state = AppState::new(store.clone(), enrichment, AUTH_TOKEN, BASE_URL);

        Self {
            router: build_app(state),
            store,
            provider,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    pub async fn create_movie(&self, body: Value) -> (StatusCode, HeaderMap, Value) {
        self.send(
            Request::post("/movies")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {AUTH_TOKEN}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn rate(
        &self,
        path_title: &str,
        rater: &str,
        rating: Value,
    ) -> (StatusCode, HeaderMap, Value) {
        self.send(
            Request::post(format!("/movies/{path_title}/ratings"))
                .header("content-type", "application/json")
                .header("x-rater-id", rater)
                .body(Body::from(serde_json::json!({ "rating": rating }).to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// Polls until enrichment has written box-office data for `title`.
    pub async fn wait_for_box_office(&self, title: &str) -> Option<BoxOffice> {
        for _ in 0..100 {
            if let Some(box_office) = self.store.movie(title).and_then(|m| m.box_office) {
                return Some(box_office);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }
}

pub fn movie_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "genre": "Drama",
        "releaseDate": "2020-01-15",
    })
}
