use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, Request, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    middlewares::{jwt_auth_middleware, optional_jwt_auth_middleware},
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);

    let app = Router::new()
        .route("/", get(crate::controllers::home::index))
        .route("/auth/register", post(crate::controllers::auth::register))
        .route("/auth/login", post(crate::controllers::auth::login))
        .route("/auth/logout", post(crate::controllers::auth::logout));

    let books_public_route = Router::new()
        .route("/search/{query}", get(crate::controllers::books::search))
        .route("/{id}/ratings", get(crate::controllers::ratings::index))
        .route("/{id}/reviews", get(crate::controllers::reviews::index));

    // The detail view is public but personalizes when a session is present.
    let books_detail_route = Router::new()
        .route("/{id}", get(crate::controllers::books::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_jwt_auth_middleware,
        ));

    let books_user_route = Router::new()
        .route("/user/favorites", get(crate::controllers::library::favorites))
        .route("/user/reviews", get(crate::controllers::library::reviews))
        .route("/user/ratings", get(crate::controllers::library::ratings))
        .route(
            "/{id}/favorite",
            post(crate::controllers::favorites::toggle),
        )
        .route(
            "/{id}/rate",
            post(crate::controllers::ratings::store)
                .put(crate::controllers::ratings::update)
                .delete(crate::controllers::ratings::destroy),
        )
        .route(
            "/{id}/review",
            post(crate::controllers::reviews::store)
                .put(crate::controllers::reviews::update)
                .delete(crate::controllers::reviews::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let me_route = Router::new()
        .route("/", get(crate::controllers::me::index))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = match request.headers().get(REQUEST_ID_HEADER) {
                    Some(val) => val.to_str().unwrap_or(""),
                    None => "",
                };
                let user_agent = match request.headers().get(header::USER_AGENT) {
                    Some(val) => val.to_str().unwrap_or(""),
                    None => "",
                };

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.nest(
        "/books",
        books_public_route
            .merge(books_detail_route)
            .merge(books_user_route),
    )
    .nest("/me", me_route)
    .layer(CompressionLayer::new())
    .layer(request_id_middleware)
    .with_state(state)
}
