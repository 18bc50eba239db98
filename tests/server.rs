use userdata::domain_model::Currency;
use userdata::logger::LogFormat;
use userdata::server::Server;
use userdata::settings::*;

fn memory_settings() -> Settings {
    Settings {
        log: Log {
            filter: "info".into(),
            format: LogFormat::Pretty,
        },
        store: Store {
            backend: "memory".into(),
            dsn: None,
            max_connections: 1,
        },
        kafka: Kafka {
            bootstrap_servers: "localhost:9092".into(),
            topic: "users".into(),
            group_id: "userdata".into(),
            workers: 0,
            dead_letter_topic: None,
        },
        consumer: Consumer::default(),
        userdata: Userdata {
            default_currency: Currency::Kzt,
        },
    }
}

#[tokio::test]
async fn memory_server_serves_and_shuts_down() {
    let server = Server::try_new(&memory_settings()).await.unwrap();

    server.user_service.provision("alice").await.unwrap();
    server.user_service.provision("bob").await.unwrap();
    server
        .relationship_service
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();

    let alice = server.user_service.current_user("alice").await.unwrap();
    assert_eq!(alice.currency, Some(Currency::Kzt));
    let users = server.directory_service.all_users("bob", None).await.unwrap();
    assert_eq!(users.len(), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_backend_is_rejected() {
    let mut settings = memory_settings();
    settings.store.backend = "postgres".into();

    assert!(Server::try_new(&settings).await.is_err());
}

#[tokio::test]
async fn mysql_backend_requires_dsn() {
    let mut settings = memory_settings();
    settings.store.backend = "mysql".into();

    assert!(Server::try_new(&settings).await.is_err());
}
