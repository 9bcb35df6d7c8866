use anyhow::{bail, Context};
use clap::Args;

use crate::auth::{hash_password, password::MIN_PASSWORD_LENGTH};
use crate::config::AppConfig;
use crate::database::{models::NewUser, sections, users, Database};
use crate::handlers::forms::is_valid_email;

#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    #[arg(long, help = "Login e-mail")]
    pub email: String,

    #[arg(long, help = "First name")]
    pub prenom: String,

    #[arg(long, help = "Last name")]
    pub nom: String,

    #[arg(long, help = "Initial password")]
    pub password: String,

    #[arg(long, help = "Section the administrator belongs to")]
    pub section_id: Option<i32>,
}

impl CreateAdminArgs {
    fn check(&self) -> anyhow::Result<()> {
        if !is_valid_email(self.email.trim()) {
            bail!("invalid e-mail address: {}", self.email);
        }
        if self.prenom.trim().is_empty() || self.nom.trim().is_empty() {
            bail!("first and last name are required");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            bail!("password must be at least {} characters", MIN_PASSWORD_LENGTH);
        }
        Ok(())
    }
}

pub async fn handle(args: CreateAdminArgs, config: &AppConfig) -> anyhow::Result<()> {
    args.check()?;

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    if let Some(section_id) = args.section_id {
        if !sections::exists(db.pool(), section_id).await? {
            bail!("section {} does not exist", section_id);
        }
    }

    let password_hash = hash_password(&args.password, config.security.bcrypt_cost)?;
    let user = users::create(
        db.pool(),
        &NewUser {
            email: args.email.trim().to_lowercase(),
            password_hash,
            prenom: args.prenom.trim().to_string(),
            nom: args.nom.trim().to_string(),
            annee_diplome: None,
            section_id: args.section_id,
            is_admin: true,
            is_approved: true,
        },
    )
    .await
    .with_context(|| format!("could not create administrator {}", args.email))?;

    tracing::info!("Created administrator {}", user.id);
    println!("Created administrator {} <{}> (id {})", user.prenom, user.email, user.id);

    db.close().await;
    Ok(())
}
