use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::dto::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateMeRequest, UserResponse,
};
use crate::presentation::middleware::JwtAuthMiddleware;
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, post, web};
use tracing::info;

pub fn scope(keys: JwtKeys) -> Scope {
    web::scope("/user")
        .service(create_user)
        .service(token)
        .service(
            web::resource("/me")
                .wrap(JwtAuthMiddleware::new(keys))
                .route(web::get().to(me))
                .route(web::patch().to(update_me)),
        )
}

#[post("/create")]
async fn create_user(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let user = service
        .register(&payload.email, &payload.password, &payload.name)
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        email = %user.email,
        "user registered"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[post("/token")]
async fn token(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let jwt = service.login(&payload.email, &payload.password).await?;

    info!(request_id = %request_id(&req), email = %payload.email, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: jwt,
        expires_in: service.keys().expires_in(),
        token_type: "Bearer".to_string(),
    }))
}

async fn me(
    user: AuthenticatedUser,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, DomainError> {
    let user = service.get_user(user.id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn update_me(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<AuthService>,
    payload: web::Json<UpdateMeRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let updated = service
        .update_me(user.id, payload.name, payload.password)
        .await?;

    info!(request_id = %request_id(&req), user_id = %user.id, "profile updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
