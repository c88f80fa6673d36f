use crate::engine::AnalysisResult;
use crate::error::AnalysisError;
use gis_protocol::ChatResponse;

/// Full response for a completed analysis.
pub fn package_result(result: &AnalysisResult, message: impl Into<String>) -> ChatResponse {
    ChatResponse {
        message: message.into(),
        count: Some(result.count),
        features_geojson: result.features_geojson(),
        buffer_geojson: Some(result.buffer_geojson()),
        params: Some(result.params.clone()),
    }
}

/// Message-only response for a failed question.
///
/// User-input errors keep their text; anything else is logged and replaced.
pub fn package_error(err: &AnalysisError) -> ChatResponse {
    if !err.is_user_facing() {
        log::error!("Query failed: {err}");
    }
    ChatResponse::message_only(err.user_message())
}
