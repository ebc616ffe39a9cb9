// Squad builder entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Open the local session database
// 4. Build the backend API client
// 5. Load the roster pool for the builder session
// 6. Restore any in-progress selection from a previous run
// 7. Log a pool summary and exit

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use squad_builder::api::HttpApi;
use squad_builder::config;
use squad_builder::db::SessionDb;
use squad_builder::roster::Gender;
use squad_builder::session::BuilderSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing().context("failed to initialize tracing")?;
    info!("squad builder starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "config loaded: {} men / {} women, max {} per team, api {}",
        config.rules.men_quota,
        config.rules.women_quota,
        config.rules.max_per_team,
        config.api.base_url
    );

    // 3. Open the local session database
    let db = SessionDb::open(&config.db_path).context("failed to open session database")?;
    info!("session database opened at {}", config.db_path);

    // 4. Build the backend API client
    let api = Arc::new(HttpApi::new(&config.api).context("failed to build API client")?);

    // 5. Load the roster pool (optional contest id as the first argument)
    let contest_id = std::env::args().nth(1);
    let mut session = BuilderSession::load(api, config.rules, contest_id.as_deref())
        .await
        .context("failed to load roster pool")?;
    info!(
        "pool loaded: {} men, {} women",
        session.pool().of_gender(Gender::Male).count(),
        session.pool().of_gender(Gender::Female).count()
    );

    // 6. Restore any in-progress selection
    match session.restore_from(&db) {
        Ok(true) => info!("restored in-progress selection from previous session"),
        Ok(false) => info!("starting a fresh selection"),
        Err(e) => return Err(e.context("failed to restore session")),
    }

    // 7. Pool summary
    for group in session.grouped_active() {
        info!(
            "team {}: {} players, {} selected",
            group.name,
            group.players.len(),
            session
                .store()
                .team_count(session.store().active_gender(), group.name)
        );
    }
    info!(
        "selection: {}/{} men, {}/{} women, step {}",
        session.store().selected(Gender::Male).len(),
        config.rules.men_quota,
        session.store().selected(Gender::Female).len(),
        config.rules.women_quota,
        session.store().step().number()
    );

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("squad_builder=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}
