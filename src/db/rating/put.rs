use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{NewRating, Rating},
};

#[derive(FromRow)]
struct UpsertedRating {
    #[sqlx(flatten)]
    rating: Rating,
    inserted: bool,
}

/// Inserts or replaces the rating for (movie title, rater id).
///
/// Returns the stored rating and `true` when a new row was created. On update the
/// existing id and `created_at` are kept and only the value moves.
pub async fn upsert_rating(
    rating: NewRating,
    postgres: PgPool,
) -> Result<(Rating, bool), AppError> {
    // xmax is zero only for a freshly inserted tuple.
    let upserted = sqlx::query_as::<_, UpsertedRating>(
        "INSERT INTO ratings (id, movie_title, rater_id, rating)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (movie_title, rater_id)
        DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
        RETURNING id, movie_title, rater_id, rating, created_at, updated_at, (xmax = 0) AS inserted",
    )
    .bind(Uuid::new_v4())
    .bind(&rating.movie_title)
    .bind(&rating.rater_id)
    .bind(rating.rating.get())
    .fetch_one(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to upsert rating: {}", e)))?;

    tracing::info!(
        "{} rating {} for '{}' by {}",
        if upserted.inserted { "Created" } else { "Updated" },
        upserted.rating.rating,
        upserted.rating.movie_title,
        upserted.rating.rater_id
    );

    Ok((upserted.rating, upserted.inserted))
}
