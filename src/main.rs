use anyhow::Result;
use clap::Parser;
use inspecciones::{auth, cli, config, wizard};

use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "inspecciones=debug" } else { "inspecciones=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;

    match cli.command {
        Commands::New => {
            wizard::run(&config).await?;
        }

        Commands::Config {
            set_token,
            set_base_url,
            show,
        } => {
            if let Some(token) = set_token {
                config.set_token(token)?;
                println!("✔ Token guardado");
            }
            if let Some(base_url) = set_base_url {
                config.set_base_url(base_url)?;
                println!("✔ URL base guardada");
            }
            if show {
                println!("URL base: {}", config.base_url);
                println!("Timeout: {}s", config.timeout_seconds);
                println!(
                    "Token: {}",
                    if config.token.is_some() { "configurado" } else { "sin configurar" }
                );
                println!("Archivo: {}", Config::config_path()?.display());
            }
        }

        Commands::Whoami => {
            let token = config.get_token()?;
            let mut session = auth::AuthSession::new();
            let claims = session.login(&token)?;
            println!("Usuario: {}", claims.name.as_deref().unwrap_or(&claims.sub));
            if let Some(role) = &claims.role {
                println!("Rol: {}", role);
            }
            if claims.is_expired() {
                println!("⚠ El token está vencido");
            }
        }
    }

    Ok(())
}
