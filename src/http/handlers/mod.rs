pub mod health;
pub mod movie;
pub mod rating;

pub use health::health_check_handler;
pub use movie::{create_movie_handler, search_movies_handler};
pub use rating::{get_rating_aggregate_handler, submit_rating_handler};

use reqwest::Url;

/// Absolute URL for a resource below the advertised base URL, with each segment
/// percent-encoded. Falls back to a root-relative path if the base does not parse.
pub(crate) fn resource_location(base_url: &str, segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse(base_url) else {
        return format!("/{}", segments.join("/"));
    };

    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }

    url.to_string()
}
