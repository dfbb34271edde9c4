use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ALLOWED_RATINGS: [f64; 10] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub movie_title: String,
    pub rater_id: String,
    pub rating: f64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// A rating value known to be one of [`ALLOWED_RATINGS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingValue(f64);

impl RatingValue {
    pub fn new(value: f64) -> Option<Self> {
        ALLOWED_RATINGS
            .iter()
            .any(|allowed| *allowed == value)
            .then_some(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub movie_title: String,
    pub rater_id: String,
    pub rating: RatingValue,
}

#[derive(Debug, Deserialize)]
pub struct RatingPayload {
    pub rating: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub movie_title: String,
    pub rater_id: String,
    pub rating: f64,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        RatingResponse {
            movie_title: rating.movie_title,
            rater_id: rating.rater_id,
            rating: rating.rating,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingAggregate {
    pub average: f64,
    pub count: i64,
}

impl RatingAggregate {
    pub fn empty() -> Self {
        RatingAggregate {
            average: 0.0,
            count: 0,
        }
    }

    /// `average` is the raw mean; it is rounded to one decimal place here.
    pub fn new(average: Option<f64>, count: i64) -> Self {
        match average {
            Some(avg) if count > 0 => RatingAggregate {
                average: round_to_tenth(avg),
                count,
            },
            _ => Self::empty(),
        }
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
