pub mod get;
pub mod patch;
pub mod post;

pub use get::{get_movie_by_title, search_movies};
pub use patch::update_movie_box_office;
pub use post::create_movie;

pub(crate) const MOVIE_COLUMNS: &str = "id, title, release_date, genre, distributor, budget, \
     mpa_rating, box_office_data, created_at, updated_at";
