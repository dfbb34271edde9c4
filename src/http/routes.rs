use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        create_movie_handler, get_rating_aggregate_handler, health_check_handler,
        search_movies_handler, submit_rating_handler,
    },
    middleware::rater_id_middleware,
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    let rating_routes = Router::new()
        .route("/movies/{title}/ratings", post(submit_rating_handler))
        .route("/movies/{title}/rating", get(get_rating_aggregate_handler))
        .route_layer(axum_middleware::from_fn(rater_id_middleware));

    Router::new()
        .route("/healthz", get(health_check_handler))
        .route(
            "/movies",
            get(search_movies_handler).post(create_movie_handler),
        )
        .merge(rating_routes)
        .with_state(state)
}
