pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "alumni-directory")]
#[command(about = "Alumni association directory: web service and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run migrations, then serve HTTP (default)")]
    Serve,

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Create an approved administrator account")]
    CreateAdmin(commands::admin::CreateAdminArgs),
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate => commands::migrate::handle(&config).await,
        Commands::CreateAdmin(args) => commands::admin::handle(args, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["alumni-directory"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn create_admin_arguments() {
        let cli = Cli::try_parse_from([
            "alumni-directory",
            "create-admin",
            "--email",
            "admin@example.org",
            "--prenom",
            "Ada",
            "--nom",
            "Lovelace",
            "--password",
            "s3cret-pass",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateAdmin(args)) => {
                assert_eq!(args.email, "admin@example.org");
                assert_eq!(args.section_id, None);
            }
            _ => panic!("expected create-admin"),
        }
    }
}
