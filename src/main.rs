use anyhow::Context;
use passin_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load pass.in settings")?;
    passin_telemetry::init(&settings.telemetry)?;

    passin_app::bootstrap::run(settings).await
}
