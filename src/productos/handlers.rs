use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    productos::{
        dto::{BusquedaResponse, DeletedResponse, EscaneoRequest, EscaneoResponse, ProductoRequest},
        repo::Producto,
    },
    state::AppState,
};

/// Read-only catalog and scan endpoints; open to the storefront and the
/// scanning client.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/productos/catalogo", get(catalogo))
        .route("/productos/activos", get(catalogo))
        .route("/productos/buscar/:codigo", get(buscar))
        .route("/productos/escaneo", post(escaneo))
}

/// Admin management endpoints; all behind the bearer-token gate.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/productos", get(listar).post(crear))
        .route("/productos/pendientes", get(pendientes))
        .route(
            "/productos/:id",
            get(obtener).put(actualizar).delete(eliminar),
        )
}

#[instrument(skip(state))]
pub async fn catalogo(State(state): State<AppState>) -> Result<Json<Vec<Producto>>, ApiError> {
    let productos = Producto::list_active(&state.db).await?;
    Ok(Json(productos))
}

#[instrument(skip(state))]
pub async fn buscar(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<BusquedaResponse>, ApiError> {
    let codigo = codigo.trim();
    if codigo.is_empty() {
        return Err(ApiError::Validation("Barcode is required".into()));
    }

    match Producto::find_by_barcode(&state.db, codigo).await? {
        Some(product) => Ok(Json(BusquedaResponse {
            success: true,
            product,
        })),
        None => Err(ApiError::NotFound(
            "No product found with that barcode".into(),
        )),
    }
}

/// Scan flow: an already-known barcode answers 200 with the existing row,
/// an unknown one inserts a pending row and answers 201. A concurrent
/// insert of the same code loses the race on the unique constraint and is
/// resolved by re-reading, so no duplicate row can ever be admitted.
#[instrument(skip(state, payload))]
pub async fn escaneo(
    State(state): State<AppState>,
    Json(payload): Json<EscaneoRequest>,
) -> Result<(StatusCode, Json<EscaneoResponse>), ApiError> {
    let codigo = payload
        .codigo_barras
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Barcode is required".into()))?;

    if let Some(product) = Producto::find_by_barcode(&state.db, &codigo).await? {
        return Ok((
            StatusCode::OK,
            Json(EscaneoResponse {
                success: true,
                message: "Barcode already registered".into(),
                product,
                exists: true,
            }),
        ));
    }

    match Producto::create_from_scan(&state.db, &codigo).await {
        Ok(product) => {
            info!(product_id = product.id, %codigo, "pending product created from scan");
            Ok((
                StatusCode::CREATED,
                Json(EscaneoResponse {
                    success: true,
                    message: "Barcode saved".into(),
                    product,
                    exists: false,
                }),
            ))
        }
        Err(ApiError::DuplicateBarcode) => {
            // lost the race against a concurrent scan of the same code
            warn!(%codigo, "concurrent scan insert, returning existing row");
            let product = Producto::find_by_barcode(&state.db, &codigo)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal(anyhow::anyhow!("row vanished after duplicate insert"))
                })?;
            Ok((
                StatusCode::OK,
                Json(EscaneoResponse {
                    success: true,
                    message: "Barcode already registered".into(),
                    product,
                    exists: true,
                }),
            ))
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip(state, _user))]
pub async fn pendientes(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Producto>>, ApiError> {
    let productos = Producto::list_pending(&state.db).await?;
    Ok(Json(productos))
}

#[instrument(skip(state, _user))]
pub async fn listar(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Producto>>, ApiError> {
    let productos = Producto::list_all(&state.db).await?;
    Ok(Json(productos))
}

#[instrument(skip(state, user, payload))]
pub async fn crear(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProductoRequest>,
) -> Result<(StatusCode, Json<Producto>), ApiError> {
    let input = payload.validate()?;
    let product = Producto::create(&state.db, &input).await?;
    info!(product_id = product.id, admin = %user.0.email, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, user, payload))]
pub async fn actualizar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ProductoRequest>,
) -> Result<Json<Producto>, ApiError> {
    let input = payload.validate()?;
    match Producto::update(&state.db, id, &input).await? {
        Some(product) => {
            info!(product_id = id, admin = %user.0.email, "product updated");
            Ok(Json(product))
        }
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}

#[instrument(skip(state, user))]
pub async fn eliminar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<DeletedResponse>, ApiError> {
    match Producto::delete(&state.db, id).await? {
        Some(product) => {
            info!(product_id = id, admin = %user.0.email, "product deleted");
            Ok(Json(DeletedResponse {
                message: "Product deleted".into(),
                product,
            }))
        }
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}

#[instrument(skip(state, _user))]
pub async fn obtener(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Producto>, ApiError> {
    match Producto::find_by_id(&state.db, id).await? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}
