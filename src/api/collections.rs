//! Collection endpoints
//!
//! Listing shows only the caller's collections; any authenticated caller may
//! read a collection by id; only its owner may change or delete it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::collection::{Collection, CollectionQuery, CreateCollection, UpdateCollection},
    AppState,
};

use super::{AuthenticatedUser, JsonBody, PaginatedResponse};

/// List the caller's collections
#[utoipa::path(
    get,
    path = "/collections",
    tag = "collections",
    security(("bearer_auth" = [])),
    params(CollectionQuery),
    responses(
        (status = 200, description = "Collections owned by the caller", body = CollectionPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_collections(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<CollectionQuery>,
) -> AppResult<Json<PaginatedResponse<Collection>>> {
    let (collections, total) = state
        .services
        .collections
        .list(&user.identity(), &query)
        .await?;
    Ok(Json(PaginatedResponse::new(collections, total, query.page())))
}

/// Get collection by ID
#[utoipa::path(
    get,
    path = "/collections/{id}",
    tag = "collections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection details", body = Collection),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn get_collection(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Collection>> {
    let collection = state.services.collections.get_by_id(id).await?;
    Ok(Json(collection))
}

/// Create a collection owned by the caller
#[utoipa::path(
    post,
    path = "/collections",
    tag = "collections",
    security(("bearer_auth" = [])),
    request_body = CreateCollection,
    responses(
        (status = 201, description = "Collection created", body = Collection),
        (status = 400, description = "Invalid input or unknown book"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_collection(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(data): JsonBody<CreateCollection>,
) -> AppResult<(StatusCode, Json<Collection>)> {
    let collection = state
        .services
        .collections
        .create(&user.identity(), data)
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// Replace a collection (owner only)
#[utoipa::path(
    put,
    path = "/collections/{id}",
    tag = "collections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Collection ID")),
    request_body = CreateCollection,
    responses(
        (status = 200, description = "Collection updated", body = Collection),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn replace_collection(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    JsonBody(data): JsonBody<CreateCollection>,
) -> AppResult<Json<Collection>> {
    let collection = state
        .services
        .collections
        .replace(&user.identity(), id, data)
        .await?;
    Ok(Json(collection))
}

/// Partially update a collection (owner only)
#[utoipa::path(
    patch,
    path = "/collections/{id}",
    tag = "collections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Collection ID")),
    request_body = UpdateCollection,
    responses(
        (status = 200, description = "Collection updated", body = Collection),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn update_collection(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    JsonBody(data): JsonBody<UpdateCollection>,
) -> AppResult<Json<Collection>> {
    let collection = state
        .services
        .collections
        .update(&user.identity(), id, data)
        .await?;
    Ok(Json(collection))
}

/// Delete a collection (owner only)
#[utoipa::path(
    delete,
    path = "/collections/{id}",
    tag = "collections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Collection ID")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state
        .services
        .collections
        .delete(&user.identity(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
