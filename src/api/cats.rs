//! Handlers for the `/cats` resource.
//!
//! Every handler logs the request, validates or looks up, runs one statement,
//! logs the outcome and shapes the response. Successful responses are JSON
//! (or 204); failures are plain text via [`ApiError`].

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catfarm_core::models::{Cat, CatFilter, CreateCatInput, UpdateCatInput};
use catfarm_core::Database;
use tracing::info;

use super::error::ApiError;
use super::input::{parse_query, Payload, PayloadRejection};

/// POST /cats
pub async fn create_cat(
    State(db): State<Database>,
    Payload(input): Payload,
) -> Result<Response, ApiError> {
    info!("Create cat requested");

    let input = CreateCatInput::from_input(&input).map_err(|err| {
        info!("Create cat failed - {}", err);
        ApiError::Validation(format!("Bad Request - {}", err))
    })?;

    let cat_id = db.create_cat(&input)?;

    let Some(cat) = db.get_cat(cat_id)? else {
        info!(cat_id, "Cat creation failed - something went wrong");
        return Err(ApiError::PersistenceFailure("Something went wrong".into()));
    };

    info!(cat_id, "Cat {} created", cat_id);
    Ok((StatusCode::CREATED, Json(cat)).into_response())
}

/// GET /cats?status=&name=
pub async fn list_cats(
    State(db): State<Database>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    info!("Index cats requested");

    let input = parse_query(query.as_deref().unwrap_or_default().as_bytes());
    let filter = CatFilter::from_input(&input).map_err(|err| {
        info!("Index cats failed with a bad request - {}", err);
        ApiError::Validation(format!("Bad Request - {}", err))
    })?;

    let cats = db.list_cats(&filter)?;

    info!(count = cats.len(), "Index cats successful");
    Ok(Json(cats).into_response())
}

/// GET /cats/{cat_id}
pub async fn get_cat(
    State(db): State<Database>,
    Path(cat_id): Path<String>,
) -> Result<Response, ApiError> {
    info!(%cat_id, "Get cat requested");

    let cat = find_cat(&db, &cat_id, "Get")?;

    info!(%cat_id, "Get cat successful");
    Ok(Json(cat).into_response())
}

/// PUT /cats/{cat_id}
///
/// Input is validated before the cat is looked up, so a bad body on an
/// unknown id is a 400 rather than a 404. A body that cannot be decoded is
/// reported the same way as one that fails validation.
pub async fn update_cat(
    State(db): State<Database>,
    Path(cat_id): Path<String>,
    payload: Result<Payload, PayloadRejection>,
) -> Result<Response, ApiError> {
    info!(%cat_id, "Update cat requested");

    let patch = payload
        .map_err(|PayloadRejection(err)| err)
        .and_then(|Payload(input)| UpdateCatInput::from_input(&input))
        .map_err(|err| {
            info!(%cat_id, "Update cat failed - {}", err);
            ApiError::Validation(format!("Bad Request for id {} - {}", cat_id, err))
        })?;

    let cat = find_cat(&db, &cat_id, "Update")?;

    let updated = if db.update_cat(cat.id, &patch)? {
        db.get_cat(cat.id)?
    } else {
        None
    };

    let Some(updated) = updated else {
        info!(%cat_id, "Cat update failed - something went wrong");
        return Err(ApiError::PersistenceFailure(format!(
            "Cat update for id {} failed - something went wrong",
            cat_id
        )));
    };

    info!(%cat_id, "Cat updated");
    Ok(Json(updated).into_response())
}

/// DELETE /cats/{cat_id}
pub async fn delete_cat(
    State(db): State<Database>,
    Path(cat_id): Path<String>,
) -> Result<Response, ApiError> {
    info!(%cat_id, "Delete cat requested");

    let cat = find_cat(&db, &cat_id, "Delete")?;

    if !db.delete_cat(cat.id)? {
        info!(%cat_id, "Cat delete failed - something went wrong");
        return Err(ApiError::PersistenceFailure(format!(
            "Cat delete for id {} failed - something went wrong",
            cat_id
        )));
    }

    info!(%cat_id, "Cat deleted");
    Ok((
        StatusCode::NO_CONTENT,
        format!("Deleted - Cat {} removed", cat_id),
    )
        .into_response())
}

/// POST /cats/{cat_id}/feed
///
/// Only a hungry cat may be fed; feeding always leaves it content.
pub async fn feed_cat(
    State(db): State<Database>,
    Path(cat_id): Path<String>,
) -> Result<Response, ApiError> {
    info!(%cat_id, "Feed cat requested");

    let cat = find_cat(&db, &cat_id, "Feed")?;

    if !cat.is_hungry() {
        info!(%cat_id, status = %cat.status, "Cat is not hungry");
        return Err(ApiError::ActionPrecondition(format!(
            "Cat {} is not hungry. Please do not feed it.",
            cat_id
        )));
    }

    if !db.feed_cat(cat.id)? {
        info!(%cat_id, "Cat feeding failed - something went wrong");
        return Err(ApiError::PersistenceFailure(format!(
            "Cat feeding for id {} failed - something went wrong",
            cat_id
        )));
    }

    info!(%cat_id, "Cat has been fed");
    Ok((
        StatusCode::NO_CONTENT,
        format!("No Content - Cat {} recorded as fed", cat_id),
    )
        .into_response())
}

/// Look up a cat by its path id. An id that is not an integer matches no row,
/// so a spelling such as `1.0` is 404 even though SQLite's column
/// affinity would coerce it to a stored id.
fn find_cat(db: &Database, cat_id: &str, action: &str) -> Result<Cat, ApiError> {
    let found = match cat_id.parse::<i64>() {
        Ok(id) => db.get_cat(id)?,
        Err(_) => None,
    };

    found.ok_or_else(|| {
        info!(%cat_id, "{} cat failed - id not found", action);
        ApiError::NotFound(cat_id.to_string())
    })
}
