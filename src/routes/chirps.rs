/// Chirp Routes

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::chirps::clean_chirp;
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::models::{Chirp, SortOrder};
use crate::store::ChirpStore;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(ValidationError::InvalidFormat(field.to_string())))
}

fn chirp_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("Chirp not found".to_string()))
}

/// POST /api/chirps
///
/// # Errors
/// - 400: empty body or longer than 140 characters
/// - 401: missing or invalid session token
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp(&form.body)?;
    let chirp = chirps.create_chirp(user.user_id, &body).await?;

    tracing::info!(user_id = %user.user_id, chirp_id = %chirp.id, "Chirp created");

    Ok(HttpResponse::Created().json(ChirpResponse::from(chirp)))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let author_id = match query.author_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_id(raw, "author_id")?),
        _ => None,
    };

    let listed: Vec<ChirpResponse> = chirps
        .list_chirps(author_id, query.sort)
        .await?
        .into_iter()
        .map(ChirpResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(listed))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_id(&path, "chirp_id")?;
    let chirp = chirps.find_chirp(chirp_id).await?.ok_or_else(chirp_not_found)?;

    Ok(HttpResponse::Ok().json(ChirpResponse::from(chirp)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: missing or invalid session token
/// - 403: the caller did not write the chirp
/// - 404: no such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_id(&path, "chirp_id")?;
    let chirp = chirps.find_chirp(chirp_id).await?.ok_or_else(chirp_not_found)?;

    if chirp.user_id != user.user_id {
        return Err(AppError::Forbidden(
            "Only the author can delete a chirp".to_string(),
        ));
    }

    // a concurrent delete may have won; the outcome is the same
    chirps.delete_chirp(chirp_id).await?;

    tracing::info!(user_id = %user.user_id, chirp_id = %chirp_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
