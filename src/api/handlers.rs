// src/api/handlers.rs
//! Request handlers. Query strings are taken as raw pairs so repeated
//! `keyword` parameters keep their order.

use super::errors::ApiError;
use super::types::{SimilarKeywordsResponse, SimilarityScoreResponse, VectorQueryRequest, WordVectorResponse};
use crate::core::query::QueryEngine;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;
use tracing::debug;

pub type EngineState = State<Arc<QueryEngine>>;
type Params = Query<Vec<(String, String)>>;

pub async fn similar_keywords(
    State(engine): EngineState,
    Query(params): Params,
) -> Result<Json<SimilarKeywordsResponse>, ApiError> {
    let keywords = values(&params, "keyword");
    if keywords.is_empty() {
        return Err(ApiError::BadRequest("missing parameter 'keyword'".to_string()));
    }
    let num = parse_num(&params)?;
    debug!(?keywords, ?num, "similar keywords request");
    let keywords = run_blocking(move || engine.similar_keywords(&keywords, num)).await?;
    Ok(Json(SimilarKeywordsResponse { keywords }))
}

pub async fn similar_keywords_from_vector(
    State(engine): EngineState,
    body: Result<Json<VectorQueryRequest>, JsonRejection>,
) -> Result<Json<SimilarKeywordsResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let keywords = run_blocking(move || {
        engine.similar_keywords_from_vector(&request.vector, request.num_keywords)
    })
    .await?;
    Ok(Json(SimilarKeywordsResponse { keywords }))
}

pub async fn word_vector(
    State(engine): EngineState,
    Query(params): Params,
) -> Result<Json<WordVectorResponse>, ApiError> {
    let keywords = values(&params, "keyword");
    if keywords.is_empty() {
        return Err(ApiError::BadRequest("missing parameter 'keyword'".to_string()));
    }
    let vector = run_blocking(move || engine.word_vector(&keywords)).await?;
    Ok(Json(WordVectorResponse { vector }))
}

pub async fn similarity_score(
    State(engine): EngineState,
    Query(params): Params,
) -> Result<Json<SimilarityScoreResponse>, ApiError> {
    let keyword1 = single(&params, "keyword1")?;
    let keyword2 = single(&params, "keyword2")?;
    let score = run_blocking(move || engine.similarity_score(&keyword1, &keyword2)).await?;
    Ok(Json(SimilarityScoreResponse { score }))
}

/// Runs engine work off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn values(params: &[(String, String)], name: &str) -> Vec<String> {
    params.iter().filter(|(k, _)| k == name).map(|(_, v)| v.clone()).collect()
}

fn single(params: &[(String, String)], name: &str) -> Result<String, ApiError> {
    match values(params, name).as_slice() {
        [value] => Ok(value.clone()),
        [] => Err(ApiError::BadRequest(format!("missing parameter '{name}'"))),
        _ => Err(ApiError::BadRequest(format!("parameter '{name}' given more than once"))),
    }
}

/// `num` is optional. Given more than once it is ignored and the default applies.
fn parse_num(params: &[(String, String)]) -> Result<Option<i64>, ApiError> {
    match values(params, "num").as_slice() {
        [raw] => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("parameter 'num' is not an integer: '{raw}'"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_num() {
        assert_eq!(parse_num(&pairs(&[])).unwrap(), None);
        assert_eq!(parse_num(&pairs(&[("num", "7")])).unwrap(), Some(7));
        assert_eq!(parse_num(&pairs(&[("num", "-3")])).unwrap(), Some(-3));
        assert_eq!(parse_num(&pairs(&[("num", "1"), ("num", "2")])).unwrap(), None);
        assert!(matches!(parse_num(&pairs(&[("num", "ten")])), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_single_rejects_missing_and_repeated() {
        let params = pairs(&[("keyword1", "a"), ("keyword2", "b"), ("keyword2", "c")]);
        assert_eq!(single(&params, "keyword1").unwrap(), "a");
        assert!(single(&params, "keyword2").is_err());
        assert!(single(&params, "keyword3").is_err());
    }
}
