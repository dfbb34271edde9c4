use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    errors::AppError,
    models::{
        Movie, MovieFilters, MoviePage,
        movie::{MovieRow, decode_cursor},
    },
};

use super::MOVIE_COLUMNS;

pub async fn get_movie_by_title(title: &str, postgres: PgPool) -> Result<Movie, AppError> {
    let row = sqlx::query_as::<_, MovieRow>(&format!(
        "SELECT {MOVIE_COLUMNS}
        FROM movies
        WHERE title = $1"
    ))
    .bind(title)
    .fetch_optional(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch movie: {}", e)))?;

    match row {
        Some(row) => Ok(row.into()),
        None => Err(AppError::NotFound("Movie not found".into())),
    }
}

pub async fn search_movies(
    filters: &MovieFilters,
    limit: i64,
    cursor: Option<&str>,
    postgres: PgPool,
) -> Result<MoviePage, AppError> {
    let offset = decode_cursor(cursor);

    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE TRUE"
    ));
    push_filters(&mut query, filters);
    push_page(&mut query, offset, limit);

    tracing::debug!("Searching movies: {}", query.sql());

    let rows = query
        .build_query_as::<MovieRow>()
        .fetch_all(&postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to search movies: {}", e)))?;

    let movies = rows.into_iter().map(Movie::from).collect();

    Ok(MoviePage::from_overfetch(movies, offset, limit))
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &MovieFilters) {
    if let Some(title) = &filters.title {
        query
            .push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }

    // Genre and distributor are matched as LIKE patterns supplied by the caller.
    if let Some(genre) = &filters.genre {
        query.push(" AND genre ILIKE ").push_bind(genre.clone());
    }

    if let Some(year) = filters.year {
        query
            .push(" AND EXTRACT(YEAR FROM release_date)::int = ")
            .push_bind(year);
    }

    if let Some(distributor) = &filters.distributor {
        query
            .push(" AND distributor ILIKE ")
            .push_bind(distributor.clone());
    }

    if let Some(max_budget) = filters.max_budget {
        query.push(" AND budget <= ").push_bind(max_budget);
    }

    if let Some(mpa_rating) = &filters.mpa_rating {
        query.push(" AND mpa_rating = ").push_bind(mpa_rating.clone());
    }
}

// One extra row tells us whether another page exists.
fn push_page(query: &mut QueryBuilder<'_, Postgres>, offset: i64, limit: i64) {
    query
        .push(" ORDER BY created_at DESC, id DESC OFFSET ")
        .push_bind(offset)
        .push(" LIMIT ")
        .push_bind(limit.saturating_add(1));
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_in_title_search_are_literal() {
        assert_eq!(escape_like("100%_real\\"), "100\\%\\_real\\\\");
        assert_eq!(escape_like("Alien"), "Alien");
    }

    #[test]
    fn only_present_filters_are_added() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM movies WHERE TRUE");
        push_filters(
            &mut query,
            &MovieFilters {
                year: Some(1999),
                max_budget: Some(5_000_000),
                ..Default::default()
            },
        );
        let sql = query.sql();
        assert!(sql.contains("EXTRACT(YEAR FROM release_date)::int = $1"));
        assert!(sql.contains("budget <= $2"));
        assert!(!sql.contains("title ILIKE"));
        assert!(!sql.contains("mpa_rating"));
    }

    #[test]
    fn page_clause_accepts_the_largest_limit() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM movies WHERE TRUE");
        push_page(&mut query, i64::MAX, i64::MAX);
        assert!(
            query
                .sql()
                .ends_with("ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2")
        );
    }
}
