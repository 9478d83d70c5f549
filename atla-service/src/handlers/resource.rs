//! Generic CRUD handlers
//!
//! One set of handlers serves every [`Resource`]; routes are mounted with
//! [`resource_routes`], which instantiates them for a concrete resource and
//! repository.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::error::{ApiError, ApiOperation};
use super::response::{ItemResponse, ListResponse, MessageResponse};
use crate::listing::{self, ListQuery, QueryParams, Validator};
use crate::models::Resource;
use crate::repository::Repository;

/// Message returned when a request body cannot be decoded
pub const INVALID_PAYLOAD: &str = "Invalid request payload";

/// Shared state for one resource's routes
#[derive(Debug)]
pub struct ResourceState<Repo> {
    pub repo: Arc<Repo>,
    /// Page size applied when the request has no `page_size`
    pub default_page_size: i64,
}

impl<Repo> ResourceState<Repo> {
    pub fn new(repo: Repo, default_page_size: i64) -> Self {
        Self {
            repo: Arc::new(repo),
            default_page_size,
        }
    }
}

impl<Repo> Clone for ResourceState<Repo> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            default_page_size: self.default_page_size,
        }
    }
}

/// `/{plural}` and `/{plural}/{id}` for resource `R`
pub fn resource_routes<R, Repo>(state: ResourceState<Repo>) -> Router
where
    R: Resource,
    Repo: Repository<R> + 'static,
{
    let collection = format!("/{}", R::PLURAL);
    let member = format!("/{}/{{id}}", R::PLURAL);

    Router::new()
        .route(&collection, get(list::<R, Repo>).post(create::<R, Repo>))
        .route(
            &member,
            get(show::<R, Repo>)
                .put(update::<R, Repo>)
                .patch(update::<R, Repo>)
                .delete(remove::<R, Repo>),
        )
        .with_state(state)
}

/// Parse a path id; anything that is not a positive integer is not found
pub(crate) fn parse_id(raw: &str, entity_type: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::not_found(entity_type, raw)),
    }
}

/// `GET /{plural}`
///
/// Validation runs before the repository is touched; any field error is a
/// 422 and no query is issued.
#[instrument(skip(state, raw), fields(resource = R::PLURAL))]
pub async fn list<R, Repo>(
    State(state): State<ResourceState<Repo>>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<ListResponse<R::Entity>, ApiError>
where
    R: Resource,
    Repo: Repository<R>,
{
    let params = QueryParams::new(raw);
    let mut v = Validator::new();
    let query = ListQuery::from_params(&params, state.default_page_size, &mut v);
    let filters = R::filters(&params, &mut v);

    let directive = listing::prepare(&query, &R::safelist(), &filters, v)
        .map_err(|errors| ApiError::failed_validation(ApiOperation::List, errors))?;

    let page = state.repo.list(&directive).await?;
    let metadata = directive.metadata(page.total_records);

    tracing::debug!(
        sort = %directive.sort,
        rows = page.rows.len(),
        total_records = page.total_records,
        "Listed {}", R::PLURAL
    );

    Ok(ListResponse::new(R::PLURAL, page.rows, metadata))
}

/// `GET /{plural}/{id}`
#[instrument(skip(state), fields(resource = R::SINGULAR))]
pub async fn show<R, Repo>(
    State(state): State<ResourceState<Repo>>,
    Path(id): Path<String>,
) -> Result<ItemResponse<R::Entity>, ApiError>
where
    R: Resource,
    Repo: Repository<R>,
{
    let id = parse_id(&id, R::SINGULAR)?;
    let entity = state
        .repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::SINGULAR, id))?;

    Ok(ItemResponse::ok(R::SINGULAR, entity))
}

/// `POST /{plural}`
#[instrument(skip(state, payload), fields(resource = R::SINGULAR))]
pub async fn create<R, Repo>(
    State(state): State<ResourceState<Repo>>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<ItemResponse<R::Entity>, ApiError>
where
    R: Resource,
    Repo: Repository<R>,
{
    let Json(draft) = payload.map_err(|rejection| {
        tracing::debug!("Rejected {} payload: {}", R::SINGULAR, rejection);
        ApiError::bad_request(ApiOperation::Create, INVALID_PAYLOAD)
    })?;

    let mut v = Validator::new();
    R::validate_draft(&draft, &mut v);
    v.finish()
        .map_err(|errors| ApiError::failed_validation(ApiOperation::Create, errors))?;

    let entity = state.repo.create(draft).await?;
    Ok(ItemResponse::created(R::SINGULAR, entity))
}

/// `PUT|PATCH /{plural}/{id}`
///
/// Fields missing from the body keep their stored value. A concurrent edit
/// between the read and the write is a 409.
#[instrument(skip(state, payload), fields(resource = R::SINGULAR))]
pub async fn update<R, Repo>(
    State(state): State<ResourceState<Repo>>,
    Path(id): Path<String>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<ItemResponse<R::Entity>, ApiError>
where
    R: Resource,
    Repo: Repository<R>,
{
    let id = parse_id(&id, R::SINGULAR)?;
    let mut entity = state
        .repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::SINGULAR, id).with_operation(ApiOperation::Update))?;

    let Json(patch) = payload.map_err(|rejection| {
        tracing::debug!("Rejected {} payload: {}", R::SINGULAR, rejection);
        ApiError::bad_request(ApiOperation::Update, INVALID_PAYLOAD)
    })?;

    R::apply_patch(&mut entity, patch);

    let mut v = Validator::new();
    R::validate(&entity, &mut v);
    v.finish()
        .map_err(|errors| ApiError::failed_validation(ApiOperation::Update, errors))?;

    let updated = state.repo.update(&entity).await?;
    Ok(ItemResponse::ok(R::SINGULAR, updated))
}

/// `DELETE /{plural}/{id}`
#[instrument(skip(state), fields(resource = R::SINGULAR))]
pub async fn remove<R, Repo>(
    State(state): State<ResourceState<Repo>>,
    Path(id): Path<String>,
) -> Result<MessageResponse, ApiError>
where
    R: Resource,
    Repo: Repository<R>,
{
    let id = parse_id(&id, R::SINGULAR)?;
    if !state.repo.delete(id).await? {
        return Err(ApiError::not_found(R::SINGULAR, id).with_operation(ApiOperation::Delete));
    }

    Ok(MessageResponse::success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::listing::{ListDirective, SortDirection};
    use crate::models::{Character, CharacterSort, Characters, NewCharacter};
    use crate::repository::{Page, RepositoryError, RepositoryResult};

    const NATIONS: [&str; 3] = ["Water Tribe", "Earth Kingdom", "Fire Nation"];

    #[derive(Default)]
    struct MemoryCharacters {
        rows: Mutex<Vec<Character>>,
        list_calls: AtomicUsize,
        /// Touch each row right after it is read, as another client would
        concurrent_writer: AtomicBool,
    }

    impl MemoryCharacters {
        /// `count` characters whose ages collide in pairs, so sorting by age
        /// relies on the id tie-break
        fn seeded(count: i64) -> Self {
            let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
            let rows = (1..=count)
                .map(|id| Character {
                    id,
                    name: format!("Character {id:02}"),
                    age: i32::try_from(10 + id / 2).unwrap(),
                    gender: "Female".to_string(),
                    status: "Alive".to_string(),
                    nation: NATIONS[(id % 3) as usize].to_string(),
                    created_at: at,
                    updated_at: at,
                })
                .collect();
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }

        fn compare(field: CharacterSort, a: &Character, b: &Character) -> Ordering {
            match field {
                CharacterSort::Id => a.id.cmp(&b.id),
                CharacterSort::Name => a.name.cmp(&b.name),
                CharacterSort::Age => a.age.cmp(&b.age),
            }
        }
    }

    impl Repository<Characters> for MemoryCharacters {
        async fn list(
            &self,
            directive: &ListDirective<CharacterSort>,
        ) -> RepositoryResult<Page<Character>> {
            self.list_calls.fetch_add(1, AtomicOrdering::SeqCst);
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| {
                let primary = Self::compare(directive.sort.field, a, b);
                let primary = match directive.sort.direction {
                    SortDirection::Ascending => primary,
                    SortDirection::Descending => primary.reverse(),
                };
                primary.then(a.id.cmp(&b.id))
            });

            let total = rows.len() as i64;
            let page: Vec<Character> = rows
                .into_iter()
                .skip(directive.pagination.offset as usize)
                .take(directive.pagination.limit as usize)
                .collect();

            if page.is_empty() {
                return Ok(Page::empty());
            }
            Ok(Page {
                rows: page,
                total_records: total,
            })
        }

        async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Character>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(stored) = rows.iter_mut().find(|c| c.id == id) else {
                return Ok(None);
            };
            let found = stored.clone();
            if self.concurrent_writer.load(AtomicOrdering::SeqCst) {
                stored.updated_at += chrono::Duration::seconds(5);
            }
            Ok(Some(found))
        }

        async fn create(&self, draft: NewCharacter) -> RepositoryResult<Character> {
            let mut rows = self.rows.lock().unwrap();
            let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
            let character = Character {
                id: rows.len() as i64 + 1,
                name: draft.name,
                age: draft.age,
                gender: draft.gender,
                status: draft.status,
                nation: draft.nation,
                created_at: at,
                updated_at: at,
            };
            rows.push(character.clone());
            Ok(character)
        }

        async fn update(&self, entity: &Character) -> RepositoryResult<Character> {
            let mut rows = self.rows.lock().unwrap();
            let stored = rows
                .iter_mut()
                .find(|c| c.id == entity.id && c.updated_at == entity.updated_at)
                .ok_or_else(|| RepositoryError::conflict("character", entity.id))?;
            *stored = entity.clone();
            stored.updated_at += chrono::Duration::seconds(1);
            Ok(stored.clone())
        }

        async fn delete(&self, id: i64) -> RepositoryResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|c| c.id != id);
            Ok(rows.len() < before)
        }
    }

    fn app(repo: MemoryCharacters) -> (Router, ResourceState<MemoryCharacters>) {
        let state = ResourceState::new(repo, 20);
        (resource_routes::<Characters, _>(state.clone()), state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn ids(body: &Value) -> Vec<i64> {
        body["characters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_second_page_sorted_by_age_descending() {
        let (app, _) = app(MemoryCharacters::seeded(45));
        let (status, body) = get_json(app, "/characters?page=2&page_size=20&sort=-age").await;

        assert_eq!(status, StatusCode::OK);
        let rows = body["characters"].as_array().unwrap();
        assert_eq!(rows.len(), 20);

        let ages: Vec<i64> = rows.iter().map(|c| c["age"].as_i64().unwrap()).collect();
        assert!(ages.windows(2).all(|w| w[0] >= w[1]));

        // equal ages come back in ascending id order
        for pair in rows.windows(2) {
            if pair[0]["age"] == pair[1]["age"] {
                assert!(pair[0]["id"].as_i64() < pair[1]["id"].as_i64());
            }
        }

        assert_eq!(
            body["metadata"],
            json!({
                "current_page": 2,
                "page_size": 20,
                "first_page": 1,
                "last_page": 3,
                "total_records": 45
            })
        );
    }

    #[tokio::test]
    async fn test_descending_reverses_ascending() {
        let (asc_app, _) = app(MemoryCharacters::seeded(10));
        let (desc_app, _) = app(MemoryCharacters::seeded(10));

        let (_, asc) = get_json(asc_app, "/characters?sort=name").await;
        let (_, desc) = get_json(desc_app, "/characters?sort=-name").await;

        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }

    #[tokio::test]
    async fn test_defaults_sort_by_id() {
        let (app, _) = app(MemoryCharacters::seeded(25));
        let (_, body) = get_json(app, "/characters").await;
        assert_eq!(ids(&body), (1..=20).collect::<Vec<_>>());
        assert_eq!(body["metadata"]["last_page"], 2);
    }

    #[tokio::test]
    async fn test_invalid_sort_never_reaches_repository() {
        let (app, state) = app(MemoryCharacters::seeded(5));
        let (status, body) = get_json(app, "/characters?sort=nation").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"], json!({"sort": "invalid sort value"}));
        assert_eq!(state.repo.list_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_field_errors_reported_together() {
        let (app, state) = app(MemoryCharacters::seeded(5));
        let (status, body) = get_json(app, "/characters?page=0&page_size=500&age=old").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"],
            json!({
                "age": "must be an integer value",
                "page": "must be greater than zero",
                "page_size": "must be a maximum of 100"
            })
        );
        assert_eq!(state.repo.list_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let (app, _) = app(MemoryCharacters::seeded(5));
        let (status, body) = get_json(app, "/characters?page=4").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"characters": [], "metadata": {}}));
    }

    #[tokio::test]
    async fn test_show_and_missing_ids() {
        let (app, _) = app(MemoryCharacters::seeded(3));

        let (status, body) = get_json(app.clone(), "/characters/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["character"]["id"], 2);
        assert!(body["character"]["createdAt"].is_string());

        for uri in ["/characters/99", "/characters/0", "/characters/-3", "/characters/abc"] {
            let (status, body) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_create() {
        let (app, _) = app(MemoryCharacters::default());
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/characters",
                r#"{"name":"Iroh","age":62,"gender":"Male","status":"Alive","nation":"Fire Nation"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["character"]["name"], "Iroh");
        assert_eq!(body["character"]["id"], 1);
    }

    #[tokio::test]
    async fn test_create_validation_and_bad_json() {
        let (app, state) = app(MemoryCharacters::default());

        let (status, body) = send(
            app.clone(),
            json_request("POST", "/characters", r#"{"name":"","age":20000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["name"], "must be provided");
        assert_eq!(body["errors"]["age"], "must not be more than 10000");

        let (status, body) = send(app, json_request("POST", "/characters", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INVALID_PAYLOAD);

        assert!(state.repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_absent_fields() {
        let (app, state) = app(MemoryCharacters::seeded(2));
        let (status, body) = send(app, json_request("PUT", "/characters/1", r#"{"status":"Deceased"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["character"]["status"], "Deceased");
        assert_eq!(body["character"]["name"], "Character 01");

        let stored = state.repo.rows.lock().unwrap()[0].clone();
        assert_eq!(stored.status, "Deceased");
        assert!(stored.updated_at > stored.created_at);
    }

    #[tokio::test]
    async fn test_update_validation_and_missing() {
        let (app, _) = app(MemoryCharacters::seeded(1));

        let (status, body) = send(
            app.clone(),
            json_request("PATCH", "/characters/1", r#"{"nation":""}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"], json!({"nation": "must be provided"}));

        let (status, _) = send(app, json_request("PUT", "/characters/7", r#"{"age":3}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stale_update_is_a_conflict() {
        let repo = MemoryCharacters::seeded(1);
        repo.concurrent_writer.store(true, AtomicOrdering::SeqCst);
        let (app, state) = app(repo);

        let (status, body) = send(app, json_request("PUT", "/characters/1", r#"{"age":13}"#)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["operation"], "update");
        assert_eq!(body["entity_id"], "1");
        assert_ne!(state.repo.rows.lock().unwrap()[0].age, 13);
    }

    #[tokio::test]
    async fn test_delete() {
        let (app, state) = app(MemoryCharacters::seeded(2));

        let request = || Request::delete("/characters/2").body(Body::empty()).unwrap();
        let (status, body) = send(app.clone(), request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "success"}));
        assert_eq!(state.repo.rows.lock().unwrap().len(), 1);

        let (status, _) = send(app, request()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12", "quote").unwrap(), 12);
        assert!(parse_id("0", "quote").is_err());
        assert!(parse_id("1.5", "quote").is_err());
        assert!(parse_id("99999999999999999999", "quote").is_err());
    }
}
