use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Movie, NewMovie, movie::MovieRow},
};

use super::MOVIE_COLUMNS;

pub async fn create_movie(movie: NewMovie, postgres: PgPool) -> Result<Movie, AppError> {
    let id = Uuid::new_v4();

    // The UNIQUE constraint on title is the source of truth for duplicates.
    let row = sqlx::query_as::<_, MovieRow>(&format!(
        "INSERT INTO movies (id, title, release_date, genre, distributor, budget, mpa_rating)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {MOVIE_COLUMNS}"
    ))
    .bind(id)
    .bind(&movie.title)
    .bind(movie.release_date)
    .bind(&movie.genre)
    .bind(&movie.distributor)
    .bind(movie.budget)
    .bind(&movie.mpa_rating)
    .fetch_one(&postgres)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Movie with this title already exists".into())
        }
        other => AppError::DatabaseError(format!("Failed to create movie: {}", other)),
    })?;

    tracing::info!("Created movie: {} (ID: {})", row.title, row.id);

    Ok(row.into())
}
