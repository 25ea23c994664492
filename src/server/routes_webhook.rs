use crate::error::Error;
use crate::events::{JellyfinWebhook, PlexWebhook, StopEvent};
use crate::relay::Outcome;
use crate::server::{text_response, AppContext, AppError};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Multipart field that carries the Plex event JSON.
const PLEX_PAYLOAD_FIELD: &str = "payload";

/// Webhook sources recognised from the request's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookSource {
    Plex,
    Jellyfin,
}

/// Plex posts multipart forms, Jellyfin posts JSON.
pub fn detect_source(headers: &HeaderMap) -> Option<WebhookSource> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("multipart/form-data") {
        Some(WebhookSource::Plex)
    } else if content_type.contains("application/json") {
        Some(WebhookSource::Jellyfin)
    } else {
        None
    }
}

/// `POST /` routes by content type.
pub async fn handle_auto(State(ctx): State<AppContext>, request: Request) -> Response {
    match detect_source(request.headers()) {
        Some(WebhookSource::Plex) => {
            tracing::debug!("Detected Plex webhook based on Content-Type");
            let multipart = Multipart::from_request(request, &ctx).await;
            handle_plex(State(ctx), multipart).await.into_response()
        }
        Some(WebhookSource::Jellyfin) => {
            tracing::debug!("Detected Jellyfin webhook based on Content-Type");
            match Bytes::from_request(request, &ctx).await {
                Ok(body) => handle_jellyfin(State(ctx), body).await.into_response(),
                Err(e) => {
                    AppError(Error::BadRequest(format!("Error reading request body: {e}")))
                        .into_response()
                }
            }
        }
        None => {
            tracing::warn!("Unable to determine webhook type from request");
            text_response(StatusCode::BAD_REQUEST, "Unable to determine webhook type")
        }
    }
}

pub async fn handle_plex(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected multipart body: {}", e);
        Error::BadRequest("Error parsing form".into())
    })?;

    let payload = read_plex_payload(&mut multipart).await?;

    let webhook: PlexWebhook = serde_json::from_str(&payload).map_err(|e| {
        tracing::debug!("Error unmarshaling Plex payload: {}", e);
        Error::BadRequest("Error parsing payload".into())
    })?;

    tracing::debug!(event = %webhook.event, "Received Plex webhook");
    dispatch(ctx, StopEvent::PlexStop(webhook)).await
}

async fn read_plex_payload(multipart: &mut Multipart) -> Result<String, Error> {
    let form_error = |e: axum::extract::multipart::MultipartError| {
        tracing::debug!("Error parsing multipart form: {}", e);
        Error::BadRequest("Error parsing form".into())
    };

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        if field.name() == Some(PLEX_PAYLOAD_FIELD) {
            let payload = field.text().await.map_err(form_error)?;
            if !payload.is_empty() {
                return Ok(payload);
            }
        }
    }

    Err(Error::BadRequest("No payload found".into()))
}

pub async fn handle_jellyfin(
    State(ctx): State<AppContext>,
    body: Bytes,
) -> Result<Response, AppError> {
    let webhook: JellyfinWebhook = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Error unmarshaling Jellyfin payload: {}", e);
        Error::BadRequest("Error parsing payload".into())
    })?;

    tracing::debug!(
        event = %webhook.event,
        notification_type = %webhook.notification_type,
        "Received Jellyfin webhook"
    );
    dispatch(ctx, StopEvent::JellyfinStop(webhook)).await
}

/// Run the event on its own task so a disconnecting sender cannot cancel
/// the history query or the descriptor writes.
async fn dispatch(ctx: AppContext, event: StopEvent) -> Result<Response, AppError> {
    let relay = ctx.relay.clone();
    let outcome = tokio::spawn(async move { relay.process(event).await })
        .await
        .map_err(|e| Error::Internal(format!("Event task failed: {e}")))??;

    if let Outcome::Processed { written, skipped } = &outcome {
        tracing::debug!(written = written.len(), skipped, "Event processed");
    }

    Ok(text_response(StatusCode::OK, "OK"))
}
