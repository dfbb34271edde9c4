pub mod movie;
pub mod rating;

pub use movie::{BoxOffice, Movie, MovieFilters, MoviePage, NewMovie, Revenue};
pub use rating::{NewRating, Rating, RatingAggregate, RatingValue};
