use sqlx::PgPool;

use crate::{errors::AppError, models::BoxOffice};

pub async fn update_movie_box_office(
    title: &str,
    box_office: &BoxOffice,
    postgres: PgPool,
) -> Result<(), AppError> {
    let data =
        serde_json::to_string(box_office).map_err(|e| AppError::Serialization(e.to_string()))?;

    let result = sqlx::query(
        "UPDATE movies
        SET box_office_data = $1, updated_at = now()
        WHERE title = $2",
    )
    .bind(&data)
    .bind(title)
    .execute(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to update box office: {}", e)))?;

    if result.rows_affected() == 0 {
        tracing::debug!("No movie titled '{}' to attach box office data to", title);
    }

    Ok(())
}
