use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use application::{MessageDto, ParticipantDto, SendMessageRequest};
use config::ServerConfig;
use domain::{FeedLimit, RawField};

use crate::{error::ApiError, identity::caller_identity, payload::BodyFields, state::AppState};

#[derive(Debug, Deserialize)]
struct FeedQuery {
    limit: Option<String>,
}

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/participants", post(join).get(list_participants))
        .route("/messages", post(send_message).get(list_messages))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn join(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let name = match BodyFields::parse(&body)?.field("name") {
        RawField::Text(name) => name,
        RawField::Missing => {
            return Err(ApiError::validation(vec!["\"name\" is required".to_string()]))
        }
        RawField::NotText => {
            return Err(ApiError::validation(vec![
                "\"name\" must be a string".to_string(),
            ]))
        }
    };
    state.registry.join(&name).await?;
    Ok(StatusCode::CREATED)
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let participants = state.registry.list().await?;
    Ok(Json(participants.iter().map(ParticipantDto::from).collect()))
}

async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let viewer = caller_identity(&headers);
    let limit = FeedLimit::parse(query.limit.as_deref());
    let feed = state.ledger.query_visible(viewer.as_deref(), limit).await?;
    Ok(Json(feed.iter().map(MessageDto::from).collect()))
}

async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let sender = caller_identity(&headers);
    let fields = BodyFields::parse(&body)?;
    state
        .ledger
        .send(
            sender.as_deref(),
            SendMessageRequest {
                to: fields.field("to"),
                text: fields.field("text"),
                kind: fields.field_or("type", "kind"),
            },
        )
        .await?;
    Ok(StatusCode::CREATED)
}
