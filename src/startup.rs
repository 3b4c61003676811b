use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::configuration::Settings;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    current_session, health_check, login, refresh_token, register_candidate, register_company,
};
use crate::store::{
    PgCandidateRepository, PgCompanyRepository, PgCredentialStore, PgRefreshTokenLedger,
};

/// Wires the Postgres-backed stores into an `AuthService`
pub fn build_auth_service(pool: PgPool, settings: &Settings) -> AuthService {
    AuthService::new(
        Arc::new(PgCredentialStore::new(pool.clone(), settings.password.clone())),
        Arc::new(PgCompanyRepository::new(pool.clone())),
        Arc::new(PgCandidateRepository::new(pool.clone())),
        Arc::new(PgRefreshTokenLedger::new(pool)),
        settings.jwt.clone(),
    )
}

pub fn run(listener: TcpListener, service: AuthService) -> Result<Server, std::io::Error> {
    let jwt_config = service.config().clone();
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/auth")
                    .route("/login", web::post().to(login))
                    .route("/registercompany", web::post().to(register_company))
                    .route("/registercandidate", web::post().to(register_candidate))
                    .route("/refreshtoken", web::post().to(refresh_token))
                    .service(
                        web::resource("/me")
                            .route(web::get().to(current_session))
                            .wrap(JwtMiddleware::new(jwt_config.clone())),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
