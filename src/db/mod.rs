pub mod movie;
pub mod rating;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    errors::AppError,
    models::{
        BoxOffice, Movie, MovieFilters, MoviePage, NewMovie, NewRating, Rating, RatingAggregate,
    },
};

const MAX_CONNECTIONS: u32 = 100;
const MIN_IDLE_CONNECTIONS: u32 = 10;
const CONNECTION_MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistence operations the HTTP layer and the enrichment worker rely on.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, AppError>;

    async fn get_movie_by_title(&self, title: &str) -> Result<Movie, AppError>;

    /// Overwrites the stored box-office snapshot. Unknown titles are ignored.
    async fn update_movie_box_office(
        &self,
        title: &str,
        box_office: &BoxOffice,
    ) -> Result<(), AppError>;

    async fn upsert_rating(&self, rating: NewRating) -> Result<(Rating, bool), AppError>;

    async fn get_rating_aggregate(&self, movie_title: &str) -> Result<RatingAggregate, AppError>;

    async fn search_movies(
        &self,
        filters: &MovieFilters,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<MoviePage, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the bounded pool and applies pending migrations.
    pub async fn connect(db_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(MIN_IDLE_CONNECTIONS)
            .max_lifetime(CONNECTION_MAX_LIFETIME)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(db_url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Database migrations completed successfully");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn create_movie(&self, new_movie: NewMovie) -> Result<Movie, AppError> {
        movie::create_movie(new_movie, self.pool.clone()).await
    }

    async fn get_movie_by_title(&self, title: &str) -> Result<Movie, AppError> {
        movie::get_movie_by_title(title, self.pool.clone()).await
    }

    async fn update_movie_box_office(
        &self,
        title: &str,
        box_office: &BoxOffice,
    ) -> Result<(), AppError> {
        movie::update_movie_box_office(title, box_office, self.pool.clone()).await
    }

    async fn upsert_rating(&self, new_rating: NewRating) -> Result<(Rating, bool), AppError> {
        rating::upsert_rating(new_rating, self.pool.clone()).await
    }

    async fn get_rating_aggregate(&self, movie_title: &str) -> Result<RatingAggregate, AppError> {
        rating::get_rating_aggregate(movie_title, self.pool.clone()).await
    }

    async fn search_movies(
        &self,
        filters: &MovieFilters,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<MoviePage, AppError> {
        movie::search_movies(filters, limit, cursor, self.pool.clone()).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("Database unreachable: {}", e)))?;
        Ok(())
    }
}
