use std::sync::Arc;

use auth::Role;
use auth::TokenAuthenticator;
use auth::TokenCodec;
use identity_service::config::BootstrapConfig;
use identity_service::config::Config;
use identity_service::credential::models::PasswordPolicy;
use identity_service::credential::models::ProvisionCredentialCommand;
use identity_service::credential::models::Username;
use identity_service::credential::ports::AuthServicePort;
use identity_service::credential::service::AuthenticationService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_expiration_hours = config.jwt.expiration_hours,
        password_min_length = config.password.min_length,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_codec = Arc::new(TokenCodec::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_ttl()?,
    )?);
    let token_authenticator = Arc::new(TokenAuthenticator::new(Arc::clone(&token_codec)));
    let credential_store = Arc::new(PostgresCredentialStore::new(pg_pool));

    let auth_service = Arc::new(AuthenticationService::new(
        credential_store,
        config.password.password_hasher()?,
        token_codec,
        PasswordPolicy::new(config.password.min_length),
    ));

    if let Some(bootstrap) = &config.bootstrap {
        bootstrap_admin(auth_service.as_ref(), bootstrap).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, token_authenticator);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

/// Seed the administrator account; an existing account is left untouched.
async fn bootstrap_admin(
    auth_service: &impl AuthServicePort,
    bootstrap: &BootstrapConfig,
) -> Result<(), anyhow::Error> {
    let outcome = auth_service
        .provision(ProvisionCredentialCommand {
            username: Username::new(bootstrap.username.as_str())?,
            full_name: bootstrap.full_name.clone(),
            role: Role::Admin,
            initial_password: bootstrap.password.clone(),
        })
        .await?;

    if outcome.succeeded {
        tracing::info!(username = %bootstrap.username, "Bootstrap administrator provisioned");
    } else {
        tracing::info!(
            username = %bootstrap.username,
            reason = %outcome.reason,
            "Bootstrap administrator not provisioned"
        );
    }

    Ok(())
}
