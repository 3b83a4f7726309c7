use std::time::Duration;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::session::{Session, SessionStore};
use crate::productos::repo::Producto;

/// Fixed retry schedule for the catalog fetch: three extra attempts after
/// the initial failure, spaced 1s / 2s / 4s.
pub const CATALOG_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401/403 from a protected route, or no stored token at all. The UI
    /// reacts by dropping the session and returning to the login view.
    #[error("session rejected or missing")]
    Unauthorized,

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub email: String,
    pub rol: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub message: String,
    pub user: UserInfo,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct RegisterData {
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
pub struct ScanData {
    pub success: bool,
    pub message: String,
    pub product: Producto,
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
struct BusquedaData {
    product: Producto,
}

#[derive(Debug, Deserialize)]
struct DeletedData {
    product: Producto,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Product form as the admin UI submits it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductoForm {
    pub nombre: String,
    pub precio_unidad: Decimal,
    pub stock_actual: i32,
    pub unidad_medida: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_imagen: Option<String>,
    pub codigo_barras: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EscaneoBody<'a> {
    codigo_barras: &'a str,
}

/// HTTP client for the API, carrying the persisted session. Each call is
/// independent and synchronous end to end; there is no request
/// de-duplication or cancellation.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn bearer(&self) -> Result<String, ClientError> {
        self.session.token().ok_or(ClientError::Unauthorized)
    }

    async fn fail(resp: reqwest::Response) -> ClientError {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return ClientError::Unauthorized;
        }
        let message = resp
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_else(|_| status.to_string());
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&CredentialsBody { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json::<RegisterData>().await?.user)
    }

    /// Log in and persist the returned token + email locally.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&CredentialsBody { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        let data = resp.json::<LoginData>().await?;
        if let Err(e) = self.session.save(&Session {
            token: data.token.clone(),
            email: data.user.email.clone(),
        }) {
            warn!(error = %e, "could not persist session");
        }
        info!(email = %data.user.email, "logged in");
        Ok(data)
    }

    /// Client-side logout: forget the stored token. The token itself stays
    /// valid server-side until it expires.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// Public catalog, retried on failure per [`CATALOG_RETRY_DELAYS`].
    pub async fn catalogo(&self) -> Result<Vec<Producto>, ClientError> {
        let mut attempt = 0;
        loop {
            match self.fetch_catalogo().await {
                Ok(products) => return Ok(products),
                Err(e) => match CATALOG_RETRY_DELAYS.get(attempt) {
                    Some(delay) => {
                        warn!(error = %e, attempt, "catalog fetch failed, retrying");
                        tokio::time::sleep(*delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    async fn fetch_catalogo(&self) -> Result<Vec<Producto>, ClientError> {
        let resp = self.http.get(self.url("/api/productos/catalogo")).send().await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Barcode lookup; `None` when no product carries that code.
    pub async fn buscar(&self, codigo: &str) -> Result<Option<Producto>, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/productos/buscar/{codigo}")))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(Some(resp.json::<BusquedaData>().await?.product))
    }

    /// Scan flow: registers an unknown code as a pending product, or hands
    /// back the existing record with `exists: true`.
    pub async fn escaneo(&self, codigo_barras: &str) -> Result<ScanData, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/productos/escaneo"))
            .json(&EscaneoBody { codigo_barras })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn pendientes(&self) -> Result<Vec<Producto>, ClientError> {
        self.get_protected("/api/productos/pendientes").await
    }

    pub async fn listar(&self) -> Result<Vec<Producto>, ClientError> {
        self.get_protected("/api/productos").await
    }

    pub async fn obtener(&self, id: i32) -> Result<Producto, ClientError> {
        self.get_protected(&format!("/api/productos/{id}")).await
    }

    pub async fn crear(&self, form: &ProductoForm) -> Result<Producto, ClientError> {
        let token = self.bearer()?;
        let resp = self
            .http
            .post(self.url("/api/productos"))
            .bearer_auth(token)
            .json(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn actualizar(&self, id: i32, form: &ProductoForm) -> Result<Producto, ClientError> {
        let token = self.bearer()?;
        let resp = self
            .http
            .put(self.url(&format!("/api/productos/{id}")))
            .bearer_auth(token)
            .json(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn eliminar(&self, id: i32) -> Result<Producto, ClientError> {
        let token = self.bearer()?;
        let resp = self
            .http
            .delete(self.url(&format!("/api/productos/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json::<DeletedData>().await?.product)
    }

    async fn get_protected<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_schedule_is_one_two_four_seconds() {
        assert_eq!(CATALOG_RETRY_DELAYS.len(), 3);
        assert_eq!(CATALOG_RETRY_DELAYS[0], Duration::from_secs(1));
        assert_eq!(CATALOG_RETRY_DELAYS[1], Duration::from_secs(2));
        assert_eq!(CATALOG_RETRY_DELAYS[2], Duration::from_secs(4));
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let store = SessionStore::new(std::env::temp_dir().join("bodega-api-url-test"));
        let client = ApiClient::new("http://localhost:3000/", store);
        assert_eq!(
            client.url("/api/productos/catalogo"),
            "http://localhost:3000/api/productos/catalogo"
        );
    }

    #[test]
    fn protected_call_without_session_is_unauthorized() {
        let path = std::env::temp_dir().join(format!(
            "bodega-api-nosession-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let client = ApiClient::new("http://localhost:3000", SessionStore::new(path));
        assert!(matches!(client.bearer(), Err(ClientError::Unauthorized)));
    }

    #[test]
    fn producto_form_omits_empty_optionals() {
        let form = ProductoForm {
            nombre: "Arroz".into(),
            precio_unidad: Decimal::new(450, 2),
            stock_actual: 10,
            unidad_medida: "kg".into(),
            descripcion: None,
            url_imagen: None,
            codigo_barras: "123".into(),
            estado: None,
        };
        let json = serde_json::to_string(&form).unwrap();
        assert!(!json.contains("descripcion"));
        assert!(!json.contains("estado"));
        assert!(json.contains("codigo_barras"));
    }
}
