use crate::application::attr_service::AttrService;
use crate::application::auth_service::AuthService;
use crate::application::recipe_service::RecipeService;
use crate::data::attr_repository::PostgresAttrRepository;
use crate::data::recipe_repository::PostgresRecipeRepository;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::ingredient::Ingredient;
use crate::domain::tag::Tag;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::infrastructure::storage::MediaStorage;
use crate::presentation::handlers;
use crate::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger, NormalizePath};
use actix_web::{App, HttpResponse, HttpServer, Responder, Scope, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Everything the handlers pull out of app data.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub tags: AttrService<Tag>,
    pub ingredients: AttrService<Ingredient>,
    pub recipes: RecipeService,
}

impl Services {
    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        let tags = AttrService::new(Arc::new(PostgresAttrRepository::<Tag>::new(pool.clone())));
        let ingredients = AttrService::new(Arc::new(
            PostgresAttrRepository::<Ingredient>::new(pool.clone()),
        ));
        let recipes = RecipeService::new(
            Arc::new(PostgresRecipeRepository::new(pool.clone())),
            tags.clone(),
            ingredients.clone(),
            MediaStorage::new(config.media_root.clone()),
            config.max_upload_bytes,
        );
        let auth = AuthService::new(
            Arc::new(PostgresUserRepository::new(pool)),
            JwtKeys::new(config.jwt_secret.clone(), config.jwt_ttl_hours),
        );

        Self {
            auth,
            tags,
            ingredients,
            recipes,
        }
    }
}

/// Registers app data and the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig, services: &Services) {
    cfg.app_data(web::Data::new(services.auth.clone()))
        .app_data(web::Data::new(services.tags.clone()))
        .app_data(web::Data::new(services.ingredients.clone()))
        .app_data(web::Data::new(services.recipes.clone()))
        .service(api_scope(services.auth.keys().clone()));
}

fn api_scope(keys: JwtKeys) -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(health))
        .service(handlers::user::scope(keys.clone()))
        .service(
            web::scope("/recipe")
                .wrap(JwtAuthMiddleware::new(keys))
                .service(handlers::attr::scope::<Tag>("/tags"))
                .service(handlers::attr::scope::<Ingredient>("/ingredients"))
                .service(handlers::recipe::scope()),
        )
}

pub async fn start_rest_server(config: AppConfig, services: Services) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        media_root = %services.recipes.media_root().display(),
        "HTTP server starting"
    );

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .configure(|cfg| configure(cfg, &services))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
