use backchannel_service::{
    BackChannelLogoutState, BackChannelSettings, LogoutService, build_components, init_tracing,
};
use color_eyre::eyre::Result;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = BackChannelSettings::load()?;
    let components = build_components(&settings).await?;

    let state = BackChannelLogoutState::new(components.use_case)
        .with_logout_path(settings.application.logout_path.as_str());

    let listener = TcpListener::bind(&settings.application.address).await?;
    tracing::info!("Starting back-channel logout service...");

    LogoutService::new(state).run_standalone(listener).await?;

    Ok(())
}
