use atla_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let app = router(AppState::new(config.clone(), pool));

    Server::new(config).serve(app).await?;

    Ok(())
}
