pub mod health;
pub mod places;
pub mod users;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(places::places_routes)
            .configure(users::users_routes)
    );
}
