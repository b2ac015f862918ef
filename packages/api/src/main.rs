use api::{create_app, state::AppState};
use lambda_http::{run, tracing, Error};
use shared::config::Config;
use std::env::{set_var, var_os};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let config = Config::from_env()?;
    let app = create_app(AppState::from_config(&config).await);

    if var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");
        return run(app).await;
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
