//! TTS Handlers
//!
//! 服务端不做语音合成。POST 只校验文本并回显估算结果，
//! 校验通过时返回 501 与可用的客户端替代方案。

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::speech::{SpeechText, EMPTY_TEXT_MESSAGE};
use crate::infrastructure::http::dto::{
    ReceivedRequest, TtsInfoResponse, TtsRequest, TtsUnavailableResponse,
};
use crate::infrastructure::http::error::{ApiError, INVALID_JSON_MESSAGE};
use crate::infrastructure::http::state::AppState;

/// POST /api/tts
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TtsUnavailableResponse>), ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected TTS request body");
        ApiError::BadRequest(INVALID_JSON_MESSAGE.to_string())
    })?;

    let text = req
        .text()
        .ok_or_else(|| ApiError::BadRequest(EMPTY_TEXT_MESSAGE.to_string()))?;
    let text = SpeechText::new(text)?;
    let settings = req.settings();

    let received = ReceivedRequest::new(&text, &settings, req.voice_name, &state.estimator);
    tracing::info!(
        chars = received.characters,
        words = received.words,
        rate = received.rate,
        "TTS request validated, server-side synthesis unavailable"
    );

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(TtsUnavailableResponse::new(received)),
    ))
}

/// GET /api/tts - 服务元数据
pub async fn tts_info(State(state): State<Arc<AppState>>) -> Json<TtsInfoResponse> {
    Json(TtsInfoResponse::new(
        state.estimator.base_wpm(),
        state.engine_available,
    ))
}
