//! Walks a small friendship graph on the in-memory store and prints what each
//! user sees.
//!
//! $ cargo run --bin graph_demo

use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use userdata::application_impl::*;
use userdata::application_port::*;
use userdata::domain_model::*;
use userdata::domain_port::*;
use userdata::infra_memory::*;
use userdata::server::{EventHandler, UserProvisioningHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new("userdata=debug");

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // region prepare services
    let store = MemoryStore::new();
    let user_repo: Arc<dyn UserRepo> = Arc::new(MemoryUserRepo::new(store.clone()));
    let friendship_repo: Arc<dyn FriendshipRepo> =
        Arc::new(MemoryFriendshipRepo::new(store.clone()));
    let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(store.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
        user_repo.clone(),
        tx_manager.clone(),
        clock.clone(),
        Currency::Rub,
    ));
    let relationship_service = RealRelationshipService::new(
        user_repo.clone(),
        friendship_repo.clone(),
        tx_manager,
        clock,
    );
    let directory_service = RealDirectoryService::new(user_repo, friendship_repo);
    // endregion

    // region provision through the event handler, duplicates included
    let handler = UserProvisioningHandler::new(user_service.clone());
    for name in ["anna", "boris", "clara", "dima", "anna"] {
        let payload = serde_json::to_vec(&UserEvent {
            username: name.to_string(),
        })?;
        let outcome = handler.handle(&payload).await?;
        println!("event {:<6} -> {:?}", name, outcome);
    }
    println!("users stored: {}", store.user_count().await);
    // endregion

    // region relations
    relationship_service
        .create_friendship_request("anna", "boris")
        .await?;
    relationship_service
        .accept_friendship_request("boris", "anna")
        .await?;
    relationship_service
        .create_friendship_request("anna", "clara")
        .await?;
    relationship_service
        .create_friendship_request("dima", "anna")
        .await?;

    match relationship_service
        .create_friendship_request("clara", "anna")
        .await
    {
        Err(e) => println!("reverse request refused: {}", e),
        Ok(_) => println!("reverse request unexpectedly accepted"),
    }
    // endregion

    for viewer in ["anna", "boris", "clara", "dima"] {
        println!("--- {} ---", viewer);
        for user in directory_service.all_users(viewer, None).await? {
            println!("  {:<6} {:?}", user.username, user.friend_state);
        }
        let friends = directory_service.friends(viewer, None).await?;
        let names: Vec<&str> = friends.iter().map(|u| u.username.as_str()).collect();
        println!("  friends: {:?}", names);
    }

    let page = directory_service
        .all_users_paged("anna", PageRequest::new(1, 2), None)
        .await?;
    println!(
        "anna page 1: {} of {} pages, {} users total",
        page.items.len(),
        page.total_pages(),
        page.total_elements
    );

    Ok(())
}
