use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::productos::repo::{Producto, ProductoInput, ESTADO_ACTIVO, ESTADO_PENDIENTE};

/// Body for manual create and full-replacement update. Fields are optional
/// so missing ones answer 400 with a message instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct ProductoRequest {
    pub nombre: Option<String>,
    pub precio_unidad: Option<Decimal>,
    pub stock_actual: Option<i32>,
    pub unidad_medida: Option<String>,
    pub descripcion: Option<String>,
    pub url_imagen: Option<String>,
    pub codigo_barras: Option<String>,
    pub estado: Option<String>,
}

impl ProductoRequest {
    /// Required: nombre, precio_unidad, stock_actual, unidad_medida,
    /// codigo_barras. Optional descripcion/url_imagen default to empty,
    /// estado defaults to "activo".
    pub fn validate(self) -> Result<ProductoInput, ApiError> {
        let missing = || ApiError::Validation("All required fields must be provided".into());

        let nombre = self
            .nombre
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(missing)?;
        let precio_unidad = self.precio_unidad.ok_or_else(missing)?;
        let stock_actual = self.stock_actual.ok_or_else(missing)?;
        let unidad_medida = self
            .unidad_medida
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(missing)?;
        let codigo_barras = self
            .codigo_barras
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(missing)?;

        let estado = match self.estado {
            None => ESTADO_ACTIVO.to_string(),
            Some(e) if e == ESTADO_ACTIVO || e == ESTADO_PENDIENTE => e,
            Some(other) => {
                return Err(ApiError::Validation(format!("Unknown estado '{other}'")))
            }
        };

        Ok(ProductoInput {
            nombre,
            precio_unidad,
            stock_actual,
            unidad_medida,
            descripcion: self.descripcion.unwrap_or_default(),
            url_imagen: self.url_imagen.unwrap_or_default(),
            codigo_barras,
            estado,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EscaneoRequest {
    pub codigo_barras: Option<String>,
}

/// Answer for the scan flow; `exists` tells the scanner whether the code
/// was already registered.
#[derive(Debug, Serialize)]
pub struct EscaneoResponse {
    pub success: bool,
    pub message: String,
    pub product: Producto,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct BusquedaResponse {
    pub success: bool,
    pub product: Producto,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub product: Producto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> ProductoRequest {
        ProductoRequest {
            nombre: Some("Leche Gloria".into()),
            precio_unidad: Some(Decimal::new(380, 2)),
            stock_actual: Some(24),
            unidad_medida: Some("lata".into()),
            descripcion: None,
            url_imagen: None,
            codigo_barras: Some("7751271001234".into()),
            estado: None,
        }
    }

    #[test]
    fn validate_defaults_estado_and_optionals() {
        let input = full_request().validate().unwrap();
        assert_eq!(input.estado, ESTADO_ACTIVO);
        assert_eq!(input.descripcion, "");
        assert_eq!(input.url_imagen, "");
        assert_eq!(input.nombre, "Leche Gloria");
    }

    #[test]
    fn validate_rejects_missing_required_fields() {
        let mut req = full_request();
        req.nombre = None;
        assert!(matches!(
            req.validate().unwrap_err(),
            ApiError::Validation(_)
        ));

        let mut req = full_request();
        req.codigo_barras = Some("   ".into());
        assert!(matches!(
            req.validate().unwrap_err(),
            ApiError::Validation(_)
        ));

        let mut req = full_request();
        req.precio_unidad = None;
        assert!(matches!(
            req.validate().unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn validate_rejects_unknown_estado() {
        let mut req = full_request();
        req.estado = Some("agotado".into());
        assert!(matches!(
            req.validate().unwrap_err(),
            ApiError::Validation(_)
        ));

        let mut req = full_request();
        req.estado = Some(ESTADO_PENDIENTE.into());
        assert_eq!(req.validate().unwrap().estado, ESTADO_PENDIENTE);
    }
}
