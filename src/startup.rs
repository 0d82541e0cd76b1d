use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::AuthSettings;
use crate::error::{AppError, ValidationError};
use crate::metrics::MetricsCollector;
use crate::middleware::RequestMetrics;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, refresh,
    revoke, update_user,
};
use crate::store::Stores;

pub fn run(
    listener: TcpListener,
    stores: Stores,
    auth_settings: AuthSettings,
    metrics: Arc<dyn MetricsCollector>,
) -> Result<Server, std::io::Error> {
    let users = web::Data::from(stores.users);
    let refresh_tokens = web::Data::from(stores.refresh_tokens);
    let chirps = web::Data::from(stores.chirps);
    let auth_settings = web::Data::new(auth_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())

            // Shared state
            .app_data(users.clone())
            .app_data(refresh_tokens.clone())
            .app_data(chirps.clone())
            .app_data(auth_settings.clone())

            // Malformed bodies and queries use the same error shape as everything else
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::InvalidFormat(err.to_string())).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::InvalidFormat(err.to_string())).into()
            }))

            .service(
                web::scope("/api")
                    .wrap(RequestMetrics::new(metrics.clone()))
                    .route("/healthz", web::get().to(health_check))
                    .service(
                        web::resource("/users")
                            .route(web::post().to(create_user))
                            .route(web::put().to(update_user)),
                    )
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .service(
                        web::resource("/chirps")
                            .route(web::get().to(list_chirps))
                            .route(web::post().to(create_chirp)),
                    )
                    .service(
                        web::resource("/chirps/{chirp_id}")
                            .route(web::get().to(get_chirp))
                            .route(web::delete().to(delete_chirp)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
