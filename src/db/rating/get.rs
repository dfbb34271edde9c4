use sqlx::PgPool;

use crate::{errors::AppError, models::RatingAggregate};

pub async fn get_rating_aggregate(
    movie_title: &str,
    postgres: PgPool,
) -> Result<RatingAggregate, AppError> {
    let (average, count) = sqlx::query_as::<_, (Option<f64>, i64)>(
        "SELECT AVG(rating)::float8, COUNT(*)
        FROM ratings
        WHERE movie_title = $1",
    )
    .bind(movie_title)
    .fetch_one(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to aggregate ratings: {}", e)))?;

    Ok(RatingAggregate::new(average, count))
}
