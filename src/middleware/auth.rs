use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::{Actor, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    /// Tokens without a role claim belong to students.
    pub fn actor(&self) -> Option<Actor> {
        let user_id = Uuid::parse_str(&self.sub).ok()?;
        let role = match self.role.as_deref() {
            Some(r) => r.parse().ok()?,
            None => Role::Student,
        };
        Some(Actor::new(user_id, role))
    }
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn authenticate(req: &Request) -> Result<Actor, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))?;

    data.claims
        .actor()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "invalid_token"))
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match authenticate(&req) {
        Ok(actor) => {
            req.extensions_mut().insert(actor);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_roles(mut req: Request, next: Next, allowed: &[Role]) -> Response {
    let actor = match authenticate(&req) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    if !allowed.is_empty() && !allowed.iter().any(|r| actor.has_role(*r)) {
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    req.extensions_mut().insert(actor);
    next.run(req).await
}

pub async fn require_expert(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Expert]).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Admin]).await
}
