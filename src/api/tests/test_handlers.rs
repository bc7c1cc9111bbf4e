#[cfg(test)]
mod handlers_tests {
    use crate::api::router;
    use crate::core::indexing::{build_forest, BuildParams, SearchBudget};
    use crate::core::query::{QueryEngine, QueryOptions};
    use crate::core::store::{InMemoryVectorStore, IndexedStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn engine() -> Arc<QueryEngine> {
        let mut store = InMemoryVectorStore::new(2).unwrap();
        for (word, v) in [
            ("苹果", [1.0, 0.0]),
            ("香蕉", [0.0, 1.0]),
            ("水果", [1.0, 1.0]),
            ("汽车", [-1.0, 0.2]),
        ] {
            store.insert(word, &v).unwrap();
        }
        let params = BuildParams { num_trees: 2, leaf_capacity: Some(1), seed: 5 };
        let forest = Arc::new(build_forest(&store, params).unwrap());
        let indexed = IndexedStore::new(store.into_vocabulary(), Arc::clone(&forest)).unwrap();
        let options = QueryOptions { search_budget: SearchBudget::Unbounded, ..QueryOptions::default() };
        Arc::new(QueryEngine::new(forest, Arc::new(indexed), options).unwrap())
    }

    fn app() -> Router {
        router(engine(), "")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_similar_keywords_percent_encoded() {
        // keyword=苹果&num=2
        let (status, body) = get(app(), "/get.similar.keywords/?keyword=%E8%8B%B9%E6%9E%9C&num=2").await;
        assert_eq!(status, StatusCode::OK);
        let keywords = body["keywords"].as_array().unwrap();
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0]["word"], "苹果");
        assert_eq!(keywords[1]["word"], "水果");
        assert!((keywords[0]["similarity"].as_f64().unwrap() - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_routes_work_without_trailing_slash() {
        let (status, _) = get(app(), "/get.similar.keywords?keyword=%E8%8B%B9%E6%9E%9C").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_similar_keywords_errors() {
        let (status, body) = get(app(), "/get.similar.keywords/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("keyword"));

        let (status, _) = get(app(), "/get.similar.keywords/?keyword=%E8%8B%B9%E6%9E%9C&num=many").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(app(), "/get.similar.keywords/?keyword=unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_from_vector() {
        let (status, body) =
            post_json(app(), "/get.similar.keywords.from.vector/", r#"{"numKeywords":1,"vector":[0.0,2.0]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keywords"][0]["word"], "香蕉");
        assert_eq!(body["keywords"].as_array().unwrap().len(), 1);

        let (status, _) = post_json(app(), "/get.similar.keywords.from.vector/", r#"{"vector":[1.0]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(app(), "/get.similar.keywords.from.vector/", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(app(), "/get.similar.keywords.from.vector/", r#"{"vector":[0.0,0.0]}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_word_vector_sums() {
        // keyword=苹果&keyword=香蕉
        let (status, body) =
            get(app(), "/get.word.vector/?keyword=%E8%8B%B9%E6%9E%9C&keyword=%E9%A6%99%E8%95%89").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "vector": [1.0, 1.0] }));

        let (status, _) = get(app(), "/get.word.vector/?keyword=%E8%8B%B9%E6%9E%9C&keyword=nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_similarity_score() {
        // keyword1=苹果&keyword2=水果
        let (status, body) =
            get(app(), "/get.similarity.score/?keyword1=%E8%8B%B9%E6%9E%9C&keyword2=%E6%B0%B4%E6%9E%9C").await;
        assert_eq!(status, StatusCode::OK);
        let score = body["score"].as_f64().unwrap();
        assert!((score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);

        let (status, _) = get(app(), "/get.similarity.score/?keyword1=%E8%8B%B9%E6%9E%9C").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_prefix_and_cors() {
        let app = router(engine(), "/wordvec");
        let request = Request::get("/wordvec/get.similarity.score?keyword1=%E8%8B%B9%E6%9E%9C&keyword2=%E9%A6%99%E8%95%89")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");

        let response = app
            .oneshot(Request::get("/get.similarity.score?keyword1=a&keyword2=b").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
