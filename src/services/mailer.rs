use std::env;

/// Transport mail externe (endpoint Google Apps Script, variable EMAILER).
/// L'envoi est best-effort: tout échec est loggé avec le code en fallback
/// console, jamais propagé à l'appelant — un transport mail capricieux ne
/// doit pas bloquer une inscription.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl Mailer {
    pub fn new(http: reqwest::Client, endpoint: Option<String>) -> Self {
        Self { http, endpoint }
    }

    pub fn from_env(http: reqwest::Client) -> Self {
        let endpoint = env::var("EMAILER").ok();
        if endpoint.is_none() {
            eprintln!("⚠️  WARNING: EMAILER not set, OTP codes will only appear in the console");
        }
        Self::new(http, endpoint)
    }

    /// Envoie un email; en cas d'échec, affiche le code OTP en console
    pub async fn send(&self, email: &str, subject: &str, message: &str, plain_otp: &str) {
        let result = match &self.endpoint {
            Some(url) => {
                self.http
                    .post(url)
                    .json(&serde_json::json!({
                        "email": email,
                        "subject": subject,
                        "message": message,
                    }))
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
            None => Err("EMAILER not configured".to_string()),
        };

        match result {
            Ok(()) => println!("✅ Email sent to {}", email),
            Err(e) => {
                eprintln!("⚠️  Email service failed: {}", e);
                println!("========================================");
                println!("🔐 FALLBACK OTP FOR {}: {}", email, plain_otp);
                println!("========================================");
            }
        }
    }
}
