use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::{is_unique_violation, ApiError};

pub const ESTADO_ACTIVO: &str = "activo";
pub const ESTADO_PENDIENTE: &str = "pendiente";

/// Product record in the `productos` table. Most columns are nullable
/// because a scan creates a row carrying only the barcode; an administrator
/// completes the rest later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Producto {
    pub id: i32,
    pub nombre: Option<String>,
    pub precio_unidad: Option<Decimal>,
    pub stock_actual: Option<i32>,
    pub unidad_medida: Option<String>,
    pub descripcion: Option<String>,
    pub url_imagen: Option<String>,
    pub codigo_barras: Option<String>,
    pub estado: String,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_actualizacion: OffsetDateTime,
}

/// Fully validated fields for a manual create or a full-replacement update.
#[derive(Debug, Clone)]
pub struct ProductoInput {
    pub nombre: String,
    pub precio_unidad: Decimal,
    pub stock_actual: i32,
    pub unidad_medida: String,
    pub descripcion: String,
    pub url_imagen: String,
    pub codigo_barras: String,
    pub estado: String,
}

const COLS: &str = "id, nombre, precio_unidad, stock_actual, unidad_medida, \
                    descripcion, url_imagen, codigo_barras, estado, fecha_actualizacion";

fn duplicate_or_db(e: sqlx::Error) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::DuplicateBarcode
    } else {
        ApiError::Database(e)
    }
}

impl Producto {
    /// Every product, newest id first. Admin listing.
    pub async fn list_all(db: &PgPool) -> Result<Vec<Producto>, ApiError> {
        let rows = sqlx::query_as::<_, Producto>(&format!(
            "SELECT {COLS} FROM productos ORDER BY id DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Completed products for the public catalog, alphabetical.
    pub async fn list_active(db: &PgPool) -> Result<Vec<Producto>, ApiError> {
        let rows = sqlx::query_as::<_, Producto>(&format!(
            "SELECT {COLS} FROM productos WHERE estado = $1 ORDER BY nombre ASC"
        ))
        .bind(ESTADO_ACTIVO)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Scan-created products awaiting completion, most recent first.
    pub async fn list_pending(db: &PgPool) -> Result<Vec<Producto>, ApiError> {
        let rows = sqlx::query_as::<_, Producto>(&format!(
            "SELECT {COLS} FROM productos WHERE estado = $1 ORDER BY fecha_actualizacion DESC"
        ))
        .bind(ESTADO_PENDIENTE)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<Producto>, ApiError> {
        let row = sqlx::query_as::<_, Producto>(&format!(
            "SELECT {COLS} FROM productos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_barcode(db: &PgPool, codigo: &str) -> Result<Option<Producto>, ApiError> {
        let row = sqlx::query_as::<_, Producto>(&format!(
            "SELECT {COLS} FROM productos WHERE codigo_barras = $1"
        ))
        .bind(codigo)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Full insert from the admin form. The unique constraint on
    /// `codigo_barras` is the sole duplicate gate.
    pub async fn create(db: &PgPool, input: &ProductoInput) -> Result<Producto, ApiError> {
        let row = sqlx::query_as::<_, Producto>(&format!(
            r#"
            INSERT INTO productos
                (nombre, precio_unidad, stock_actual, unidad_medida,
                 descripcion, url_imagen, codigo_barras, estado, fecha_actualizacion)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            RETURNING {COLS}
            "#
        ))
        .bind(&input.nombre)
        .bind(input.precio_unidad)
        .bind(input.stock_actual)
        .bind(&input.unidad_medida)
        .bind(&input.descripcion)
        .bind(&input.url_imagen)
        .bind(&input.codigo_barras)
        .bind(&input.estado)
        .fetch_one(db)
        .await
        .map_err(duplicate_or_db)?;
        Ok(row)
    }

    /// Minimal insert used by the scanning flow: barcode only, pending
    /// state, current timestamp.
    pub async fn create_from_scan(db: &PgPool, codigo: &str) -> Result<Producto, ApiError> {
        let row = sqlx::query_as::<_, Producto>(&format!(
            r#"
            INSERT INTO productos (codigo_barras, estado, fecha_actualizacion)
            VALUES ($1, $2, now())
            RETURNING {COLS}
            "#
        ))
        .bind(codigo)
        .bind(ESTADO_PENDIENTE)
        .fetch_one(db)
        .await
        .map_err(duplicate_or_db)?;
        Ok(row)
    }

    /// Full field replacement plus timestamp refresh. `None` when the id
    /// does not exist.
    pub async fn update(
        db: &PgPool,
        id: i32,
        input: &ProductoInput,
    ) -> Result<Option<Producto>, ApiError> {
        let row = sqlx::query_as::<_, Producto>(&format!(
            r#"
            UPDATE productos
            SET nombre = $2, precio_unidad = $3, stock_actual = $4,
                unidad_medida = $5, descripcion = $6, url_imagen = $7,
                codigo_barras = $8, estado = $9, fecha_actualizacion = now()
            WHERE id = $1
            RETURNING {COLS}
            "#
        ))
        .bind(id)
        .bind(&input.nombre)
        .bind(input.precio_unidad)
        .bind(input.stock_actual)
        .bind(&input.unidad_medida)
        .bind(&input.descripcion)
        .bind(&input.url_imagen)
        .bind(&input.codigo_barras)
        .bind(&input.estado)
        .fetch_optional(db)
        .await
        .map_err(duplicate_or_db)?;
        Ok(row)
    }

    /// Remove a row, handing back what was deleted. `None` when absent.
    pub async fn delete(db: &PgPool, id: i32) -> Result<Option<Producto>, ApiError> {
        let row = sqlx::query_as::<_, Producto>(&format!(
            "DELETE FROM productos WHERE id = $1 RETURNING {COLS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn producto_serializes_rfc3339_timestamp() {
        let p = Producto {
            id: 1,
            nombre: Some("Arroz".into()),
            precio_unidad: Some(Decimal::new(450, 2)),
            stock_actual: Some(12),
            unidad_medida: Some("kg".into()),
            descripcion: None,
            url_imagen: None,
            codigo_barras: Some("7750100000000".into()),
            estado: ESTADO_ACTIVO.into(),
            fecha_actualizacion: datetime!(2024-05-01 12:00:00 UTC),
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("2024-05-01T12:00:00Z"));
        assert!(json.contains("\"precio_unidad\":\"4.50\""));
    }

    #[test]
    fn producto_roundtrips_through_json() {
        let p = Producto {
            id: 9,
            nombre: None,
            precio_unidad: None,
            stock_actual: None,
            unidad_medida: None,
            descripcion: None,
            url_imagen: None,
            codigo_barras: Some("123".into()),
            estado: ESTADO_PENDIENTE.into(),
            fecha_actualizacion: datetime!(2024-05-01 12:00:00 UTC),
        };
        let json = serde_json::to_string(&p).unwrap();
        let back: Producto = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 9);
        assert_eq!(back.codigo_barras.as_deref(), Some("123"));
        assert_eq!(back.estado, ESTADO_PENDIENTE);
    }
}
