use std::sync::Arc;

use classroom_drills::api::classrooms::Classroom;
use classroom_drills::logging::init_tracing;
use classroom_drills::storage::{LocalStore, SqliteStore};
use classroom_drills::{
    ApiClient, ClassroomPreferences, ClientConfig, ClientError, NotificationCenter,
    NotificationPoller,
};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env();
    let _log_guard = init_tracing(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "drill-notify exited with error");
        std::process::exit(1);
    }
}

async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let store: Arc<dyn LocalStore> = Arc::new(SqliteStore::open(&config.storage_path)?);
    let client = ApiClient::new(config.clone(), Arc::clone(&store))?;

    if !client.tokens().is_authenticated() {
        let username = std::env::var("DRILL_USERNAME").ok();
        let password = std::env::var("DRILL_PASSWORD").ok();
        match (username, password) {
            (Some(username), Some(password)) => {
                client.login(&username, &password).await?;
            }
            _ => {
                return Err(ClientError::Config(
                    "no stored session; set DRILL_USERNAME and DRILL_PASSWORD".to_string(),
                ))
            }
        }
    }

    let profile = client.profile().await?;
    tracing::info!(user = %profile.username, teacher = profile.is_teacher(), "session ready");

    let preferences = ClassroomPreferences::new(Arc::clone(&store));
    preferences.load_for_user(&profile.id.to_string());

    let classrooms: Vec<Classroom> = client.list_classrooms().await?;
    for classroom in preferences.sort_classrooms(&classrooms) {
        let color = preferences
            .classroom_color(classroom.id)
            .unwrap_or_else(|| "-".to_string());
        tracing::info!(id = classroom.id, name = %classroom.name, %color, "classroom");
    }

    let center = Arc::new(NotificationCenter::new(client));
    let mut unread = center.subscribe();
    let poller = NotificationPoller::spawn(Arc::clone(&center), config.notification_poll_interval);

    loop {
        tokio::select! {
            changed = unread.changed() => {
                if changed.is_err() {
                    break;
                }
                let count = *unread.borrow_and_update();
                tracing::info!(unread = count, "unread notifications");
                for n in center.unread() {
                    tracing::info!(id = n.id, title = %n.title, "{}", n.message);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    poller.stop().await;
    Ok(())
}
