#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{redirect::Policy, Client, StatusCode};
use uuid::Uuid;

use alumni_directory::auth::hash_password;
use alumni_directory::config::AppConfig;
use alumni_directory::database::models::{NewEmployer, NewUser, SectionInput, User};
use alumni_directory::database::{employers, sections, users, Database};
use alumni_directory::{app, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// The app served in-process on a free port, backed by its own schema
pub struct TestApp {
    pub base_url: String,
    pub db: Database,
    schema: String,
}

impl TestApp {
    /// Returns `None` when no database is configured, so callers can skip.
    pub async fn spawn() -> Result<Option<Self>> {
        let _ = dotenvy::dotenv();
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                // Expected in CI without Postgres
                eprintln!("DATABASE_URL not set; skipping database test");
                return Ok(None);
            }
        };

        let schema = format!("test_{}", Uuid::new_v4().simple());
        let db = Database::connect_isolated(&url, &schema)
            .await
            .context("failed to connect to test database")?;
        db.migrate().await.context("failed to migrate test schema")?;

        let mut config = AppConfig::from_env();
        config.security.session_cookie_name = "alumni_session".to_string();
        config.security.cookie_secure = false;
        config.security.bcrypt_cost = 4;
        config.directory.per_page = 3;
        config.server.public_url = "http://directory.test".to_string();

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app(AppState::new(db.clone(), config));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let app = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            db,
            schema,
        };
        app.wait_ready(Duration::from_secs(5)).await?;
        Ok(Some(app))
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Client that keeps cookies and does not follow redirects
    pub fn client(&self) -> Result<Client> {
        Ok(Client::builder().cookie_store(true).redirect(Policy::none()).build()?)
    }

    /// Log in with [`PASSWORD`] and return the session-carrying client
    pub async fn login(&self, email: &str) -> Result<Client> {
        let client = self.client()?;
        let res = client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::SEE_OTHER, "login failed: {}", res.status());
        Ok(client)
    }

    pub async fn teardown(self) -> Result<()> {
        self.db.drop_schema(&self.schema).await?;
        self.db.close().await;
        Ok(())
    }
}

/// Seed values for a user row; flags default to an approved, active member
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub email: String,
    pub prenom: String,
    pub nom: String,
    pub annee_diplome: Option<i32>,
    pub section_id: Option<i32>,
    pub is_admin: bool,
    pub is_approved: bool,
    pub is_active: bool,
    pub opt_out_contact: bool,
    pub opt_out_directory: bool,
}

impl SeedUser {
    pub fn new(prenom: &str, nom: &str) -> Self {
        Self {
            email: format!("{}.{}@example.org", prenom, nom).to_lowercase(),
            prenom: prenom.to_string(),
            nom: nom.to_string(),
            annee_diplome: None,
            section_id: None,
            is_admin: false,
            is_approved: true,
            is_active: true,
            opt_out_contact: false,
            opt_out_directory: false,
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.annee_diplome = Some(year);
        self
    }

    pub fn section(mut self, section_id: i32) -> Self {
        self.section_id = Some(section_id);
        self
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn opted_out(mut self) -> Self {
        self.opt_out_directory = true;
        self
    }

    pub fn no_contact(mut self) -> Self {
        self.opt_out_contact = true;
        self
    }

    pub fn unapproved(mut self) -> Self {
        self.is_approved = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

pub async fn seed_user(db: &Database, seed: SeedUser) -> Result<User> {
    let user = users::create(
        db.pool(),
        &NewUser {
            email: seed.email.clone(),
            password_hash: hash_password(PASSWORD, 4)?,
            prenom: seed.prenom.clone(),
            nom: seed.nom.clone(),
            annee_diplome: seed.annee_diplome,
            section_id: seed.section_id,
            is_admin: seed.is_admin,
            is_approved: seed.is_approved,
        },
    )
    .await?;

    sqlx::query(
        "UPDATE users SET is_active = $2, opt_out_contact = $3, opt_out_directory = $4, is_approved = $5 WHERE id = $1",
    )
    .bind(user.id)
    .bind(seed.is_active)
    .bind(seed.opt_out_contact)
    .bind(seed.opt_out_directory)
    .bind(seed.is_approved)
    .execute(db.pool())
    .await?;

    Ok(users::find_by_id(db.pool(), user.id).await?.context("seeded user vanished")?)
}

pub async fn seed_section(db: &Database, nom: &str) -> Result<i32> {
    let section = sections::create(
        db.pool(),
        &SectionInput {
            nom: nom.to_string(),
            description: None,
        },
    )
    .await?;
    Ok(section.id)
}

pub async fn seed_employer(db: &Database, nom: &str, secteur: Option<&str>) -> Result<i32> {
    let employer = employers::create(
        db.pool(),
        &NewEmployer {
            nom: nom.to_string(),
            secteur: secteur.map(str::to_string),
            ville: None,
        },
    )
    .await?;
    Ok(employer.id)
}

/// Unwrap the `{ success, data }` envelope
pub async fn data(res: reqwest::Response) -> Result<serde_json::Value> {
    let status = res.status();
    let body = res.json::<serde_json::Value>().await?;
    anyhow::ensure!(body["success"] == true, "unexpected body ({}): {}", status, body);
    Ok(body["data"].clone())
}

/// `name=value` pair of the session cookie set by a response, for replaying
/// it from a client without a cookie store
pub fn session_cookie(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("alumni_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
