//! townsync Player - joins a town and logs what happens in it.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use townsync_player::{
    create_connection, spawn_event_loop, ClientConfig, TownController, TownEvent, TownEventKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "townsync_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        server_url = %config.server_url,
        town_id = %config.town_id,
        user_name = %config.user_name,
        "Starting townsync Player"
    );

    let connection = create_connection(config.join_url());
    let town = Arc::new(Mutex::new(TownController::new(
        &config,
        connection.port.clone(),
    )));

    let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<Option<String>>();
    let connect = {
        let mut town = town.lock().await;
        register_logging(&mut town);
        town.subscribe(TownEventKind::Disconnect, move |event| {
            if let TownEvent::Disconnect { reason } = event {
                let _ = closed_tx.send(reason.clone());
            }
        });
        town.connect()
    };

    let event_loop = spawn_event_loop(Arc::clone(&town), connection.events);

    if let Err(e) = connect.await {
        tracing::error!(error = %e, "Could not join town");
        let _ = event_loop.await;
        return Err(e.into());
    }

    {
        let town = town.lock().await;
        tracing::info!(
            friendly_name = town.friendly_name().unwrap_or_default(),
            players = town.players().len(),
            areas = town.areas().len(),
            "Joined town"
        );
    }

    tokio::select! {
        reason = closed_rx.recv() => {
            tracing::info!(reason = ?reason.flatten(), "Town session ended");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted; leaving town");
            town.lock().await.disconnect();
        }
    }

    let _ = event_loop.await;
    let _ = connection.task.await;
    Ok(())
}

fn register_logging(town: &mut TownController) {
    town.subscribe(TownEventKind::PlayersChanged, |event| {
        if let TownEvent::PlayersChanged(players) = event {
            tracing::info!(count = players.len(), "Players changed");
        }
    });
    town.subscribe(TownEventKind::ChatMessage, |event| {
        if let TownEvent::ChatMessage(message) = event {
            tracing::info!(author = %message.author, body = %message.body, "Chat");
        }
    });
    town.subscribe(TownEventKind::TownSettingsUpdated, |event| {
        if let TownEvent::TownSettingsUpdated {
            friendly_name,
            is_publicly_listed,
        } = event
        {
            tracing::info!(%friendly_name, is_publicly_listed, "Town settings updated");
        }
    });
    town.subscribe(TownEventKind::InteractableAreasChanged, |_| {
        tracing::debug!("Interactable areas changed");
    });
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Local overrides win
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
