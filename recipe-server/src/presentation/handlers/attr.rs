//! Handlers shared by the tag and ingredient endpoints.

use crate::application::attr_service::AttrService;
use crate::domain::attr::RecipeAttr;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AttrListQuery, AttrRequest, PatchAttrRequest};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, web};
use tracing::info;
use uuid::Uuid;

pub fn scope<T: RecipeAttr>(path: &str) -> Scope {
    web::scope(path)
        .service(
            web::resource("")
                .route(web::get().to(list::<T>))
                .route(web::post().to(create::<T>)),
        )
        .service(
            web::resource("/{id}")
                .route(web::get().to(retrieve::<T>))
                .route(web::patch().to(update::<T>))
                .route(web::delete().to(destroy::<T>)),
        )
}

async fn list<T: RecipeAttr>(
    user: AuthenticatedUser,
    service: web::Data<AttrService<T>>,
    query: web::Query<AttrListQuery>,
) -> Result<HttpResponse, DomainError> {
    let items = service.list(user.id, query.assigned_only()?).await?;
    Ok(HttpResponse::Ok().json(items))
}

async fn create<T: RecipeAttr>(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<AttrService<T>>,
    payload: web::Json<AttrRequest>,
) -> Result<HttpResponse, DomainError> {
    let item = service.create(user.id, &payload.name).await?;

    info!(
        request_id = %request_id(&req),
        kind = T::KIND.label(),
        id = %item.id(),
        caller = %user.email,
        "attribute create request served"
    );

    Ok(HttpResponse::Created().json(item))
}

async fn retrieve<T: RecipeAttr>(
    user: AuthenticatedUser,
    service: web::Data<AttrService<T>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let item = service.get(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

async fn update<T: RecipeAttr>(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<AttrService<T>>,
    path: web::Path<Uuid>,
    payload: web::Json<PatchAttrRequest>,
) -> Result<HttpResponse, DomainError> {
    let id = path.into_inner();
    let item = match payload.name.as_deref() {
        Some(name) => service.rename(user.id, id, name).await?,
        None => service.get(user.id, id).await?,
    };

    info!(
        request_id = %request_id(&req),
        kind = T::KIND.label(),
        id = %id,
        caller = %user.email,
        "attribute update request served"
    );

    Ok(HttpResponse::Ok().json(item))
}

async fn destroy<T: RecipeAttr>(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<AttrService<T>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let id = path.into_inner();
    service.delete(user.id, id).await?;

    info!(
        request_id = %request_id(&req),
        kind = T::KIND.label(),
        id = %id,
        caller = %user.email,
        "attribute delete request served"
    );

    Ok(HttpResponse::NoContent().finish())
}
