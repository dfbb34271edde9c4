use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub worldwide: i64,
    pub opening_weekend_usa: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxOffice {
    pub revenue: Revenue,
    pub currency: String,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub distributor: Option<String>,
    pub budget: Option<i64>,
    pub mpa_rating: Option<String>,
    pub box_office: Option<BoxOffice>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `movies` table; the box-office blob is still raw text here.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub distributor: Option<String>,
    pub budget: Option<i64>,
    pub mpa_rating: Option<String>,
    pub box_office_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        // A blob that no longer parses is dropped instead of failing the read.
        let box_office = row
            .box_office_data
            .as_deref()
            .and_then(|raw| serde_json::from_str::<BoxOffice>(raw).ok());

        Movie {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
            genre: row.genre,
            distributor: row.distributor,
            budget: row.budget,
            mpa_rating: row.mpa_rating,
            box_office,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A validated create request, ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub distributor: Option<String>,
    pub budget: Option<i64>,
    pub mpa_rating: Option<String>,
}

/// Search filters. Every field is optional and present ones are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilters {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub distributor: Option<String>,
    pub max_budget: Option<i64>,
    pub mpa_rating: Option<String>,
}

/// Raw search parameters as they arrive on the query string.
#[derive(Debug, Default)]
pub struct MovieQuery {
    pub q: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
    pub distributor: Option<String>,
    pub budget: Option<String>,
    pub mpa_rating: Option<String>,
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

impl MovieQuery {
    /// Repeated keys keep their first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = MovieQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut query.q,
                "genre" => &mut query.genre,
                "year" => &mut query.year,
                "distributor" => &mut query.distributor,
                "budget" => &mut query.budget,
                "mpaRating" => &mut query.mpa_rating,
                "limit" => &mut query.limit,
                "cursor" => &mut query.cursor,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn filters(&self) -> MovieFilters {
        MovieFilters {
            title: non_empty(&self.q),
            genre: non_empty(&self.genre),
            year: self
                .year
                .as_deref()
                .and_then(|y| y.parse::<i32>().ok())
                .filter(|y| *y != 0),
            distributor: non_empty(&self.distributor),
            max_budget: self
                .budget
                .as_deref()
                .and_then(|b| b.parse::<i64>().ok())
                .filter(|b| *b != 0),
            mpa_rating: non_empty(&self.mpa_rating),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub items: Vec<Movie>,
    pub next_cursor: Option<String>,
}

impl MoviePage {
    /// Builds a page from up to `limit + 1` rows fetched at `offset`.
    pub fn from_overfetch(mut rows: Vec<Movie>, offset: i64, limit: i64) -> Self {
        let limit_len = usize::try_from(limit).unwrap_or(0);
        let next_cursor = if rows.len() > limit_len {
            rows.truncate(limit_len);
            Some(encode_cursor(offset.saturating_add(limit)))
        } else {
            None
        };

        MoviePage {
            items: rows,
            next_cursor,
        }
    }
}

const CURSOR_PREFIX: &str = "offset_";

pub fn encode_cursor(offset: i64) -> String {
    format!("{CURSOR_PREFIX}{offset}")
}

/// Anything that is not a well-formed, non-negative cursor reads as the first page.
pub fn decode_cursor(cursor: Option<&str>) -> i64 {
    cursor
        .and_then(|c| c.strip_prefix(CURSOR_PREFIX))
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| *n >= 0)
        .unwrap_or(0)
}
