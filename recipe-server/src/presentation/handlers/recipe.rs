use crate::application::recipe_service::RecipeService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    PatchRecipeRequest, RecipeDetailResponse, RecipeImageResponse, RecipeListQuery,
    RecipeRequest, RecipeResponse,
};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, patch, post, put, web};
use futures_util::TryStreamExt;
use tracing::{info, warn};
use uuid::Uuid;

const IMAGE_FIELD: &str = "image";

pub fn scope() -> Scope {
    web::scope("/recipes")
        .service(list_recipes)
        .service(create_recipe)
        .service(get_recipe)
        .service(replace_recipe)
        .service(update_recipe)
        .service(delete_recipe)
        .service(upload_image)
}

#[get("")]
async fn list_recipes(
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    query: web::Query<RecipeListQuery>,
) -> Result<HttpResponse, DomainError> {
    let filter = query.filter()?;
    let found = recipes.list_recipes(user.id, filter).await?;
    let body: Vec<RecipeResponse> = found.into_iter().map(RecipeResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[post("")]
async fn create_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    payload: web::Json<RecipeRequest>,
) -> Result<HttpResponse, DomainError> {
    let recipe = recipes.create_recipe(user.id, payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        caller = %user.email,
        recipe_id = %recipe.id,
        "recipe create request served"
    );

    Ok(HttpResponse::Created().json(RecipeDetailResponse::from(recipe)))
}

#[get("/{id}")]
async fn get_recipe(
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let recipe = recipes.get_recipe(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RecipeDetailResponse::from(recipe)))
}

#[put("/{id}")]
async fn replace_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<Uuid>,
    payload: web::Json<RecipeRequest>,
) -> Result<HttpResponse, DomainError> {
    let recipe_id = path.into_inner();
    let recipe = recipes
        .replace_recipe(user.id, recipe_id, payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        caller = %user.email,
        recipe_id = %recipe_id,
        "recipe replace request served"
    );

    Ok(HttpResponse::Ok().json(RecipeDetailResponse::from(recipe)))
}

#[patch("/{id}")]
async fn update_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<Uuid>,
    payload: web::Json<PatchRecipeRequest>,
) -> Result<HttpResponse, DomainError> {
    let recipe_id = path.into_inner();
    let recipe = recipes
        .update_recipe(user.id, recipe_id, payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        caller = %user.email,
        recipe_id = %recipe_id,
        "recipe update request served"
    );

    Ok(HttpResponse::Ok().json(RecipeDetailResponse::from(recipe)))
}

#[delete("/{id}")]
async fn delete_recipe(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let recipe_id = path.into_inner();
    recipes.delete_recipe(user.id, recipe_id).await?;

    info!(
        request_id = %request_id(&req),
        caller = %user.email,
        recipe_id = %recipe_id,
        "recipe delete request served"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[post("/{id}/upload-image")]
async fn upload_image(
    req: HttpRequest,
    user: AuthenticatedUser,
    recipes: web::Data<RecipeService>,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> Result<HttpResponse, DomainError> {
    let recipe_id = path.into_inner();
    let (filename, bytes) = read_image_field(&mut payload, recipes.max_upload_bytes()).await?;
    let recipe = recipes
        .upload_image(user.id, recipe_id, &filename, &bytes)
        .await?;

    info!(
        request_id = %request_id(&req),
        recipe_id = %recipe_id,
        size = bytes.len(),
        "recipe image uploaded"
    );

    Ok(HttpResponse::Ok().json(RecipeImageResponse {
        id: recipe.id,
        image: recipe.image,
    }))
}

/// Pulls the `image` part out of the form, enforcing the size limit while
/// streaming.
async fn read_image_field(
    payload: &mut Multipart,
    max_bytes: usize,
) -> Result<(String, Vec<u8>), DomainError> {
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition().cloned();
        let name = disposition.as_ref().and_then(|cd| cd.get_name());
        if name != Some(IMAGE_FIELD) {
            // drain so the next part can be read
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        }

        let filename = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(DomainError::Validation(format!(
                    "image must be at most {} bytes",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok((filename, bytes));
    }

    Err(DomainError::Validation(format!(
        "multipart field '{}' is required",
        IMAGE_FIELD
    )))
}

fn multipart_error(err: MultipartError) -> DomainError {
    warn!("multipart read error: {}", err);
    DomainError::Validation(format!("invalid multipart body: {}", err))
}
