mod models;
mod routes;
mod db;
mod services;
mod utils;
mod middleware;
use actix_web::{App, HttpServer, web};

use services::mailer::Mailer;
use services::media_host::CloudinaryClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let http = reqwest::Client::new();
    let cloudinary = CloudinaryClient::from_env(http.clone())
        .expect("Cloudinary credentials must be set in .env file");
    let mailer = Mailer::from_env(http);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5000);

    println!("🚀 Starting server on http://127.0.0.1:{}", port);

    let db = web::Data::new(db);

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(web::Data::new(cloudinary.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .configure(routes::configure_routes)
    })
        .bind(("127.0.0.1", port))?
        .run()
        .await
}
