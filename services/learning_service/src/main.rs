use std::error::Error;

use learning_service::catalog::CatalogSeed;
use learning_service::context::{Context, StorageBackend};
use learning_service::engine::LearningEngine;
use learning_service::server::{LearningServiceImpl, LearningServiceServer};
use learning_service::store::{DdbStore, MemoryStore, Store};
use service_core::ddb::Adapter;
use service_core::telemetry::logging::{init_subscriber, make_subscriber};
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = make_subscriber("learning_service", "info,learning_service=debug");
    init_subscriber(subscriber)?;

    let ctx = Context::from_env()?;

    match (ctx.backend, ctx.tables.clone()) {
        (StorageBackend::DynamoDb, Some(tables)) => {
            let adapter = Adapter::from_env(ctx.dynamodb_endpoint.as_deref()).await?;
            serve(&ctx, DdbStore::new(adapter, tables)).await
        }
        _ => serve(&ctx, memory_store(&ctx).await?).await,
    }
}

async fn memory_store(ctx: &Context) -> Result<MemoryStore, Box<dyn Error>> {
    let store = match &ctx.catalog_seed_path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let store = MemoryStore::from_seed(CatalogSeed::from_json(&json)?).await?;
            tracing::info!(path = %path.display(), "Loaded catalog seed.");
            store
        }
        None => {
            tracing::warn!("No catalog seed configured, starting with an empty catalog.");
            MemoryStore::default()
        }
    };

    Ok(store)
}

async fn serve<S: Store + 'static>(ctx: &Context, store: S) -> Result<(), Box<dyn Error>> {
    let service = LearningServiceImpl::new(LearningEngine::new(store), ctx.jwt_secret.as_bytes());
    tracing::info!(addr = %ctx.listen_addr, backend = ?ctx.backend, "Starting learning service.");

    Server::builder()
        .add_service(LearningServiceServer::new(service))
        .serve(ctx.listen_addr)
        .await?;

    Ok(())
}
