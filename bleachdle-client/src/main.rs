use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bleachdle_client::{
    backend::HttpBackend,
    config::ClientConfig,
    controller::GameController,
    host::{AlertForwarder, Command, HELP, render_indicators, render_page},
    transition::{NavigationOutcome, PageNavigator},
};
use bleachdle_core::{Clock, GameSession, GameVariant, SystemClock};

/// The game bound to the page currently shown
struct ActiveGame {
    controller: GameController<HttpBackend>,
    variant: GameVariant,
}

struct App {
    config: ClientConfig,
    backend: Arc<HttpBackend>,
    clock: Arc<dyn Clock>,
    alerts: mpsc::UnboundedSender<String>,
    navigator: PageNavigator<HttpBackend>,
    game: Option<ActiveGame>,
}

impl App {
    fn bind(&mut self, variant: Option<GameVariant>) {
        if let Some(old) = self.game.take() {
            old.controller.shutdown();
        }

        self.game = variant.map(|variant| {
            let mut session =
                GameSession::new(variant.clone(), self.config.session_options(), self.clock.clone());
            session.add_event_handler(Box::new(AlertForwarder::new(self.alerts.clone())));
            info!("Bound {} game session {}", variant.kind.as_str(), session.id());
            ActiveGame {
                controller: GameController::new(session, self.backend.clone()),
                variant,
            }
        });
    }

    async fn open(&mut self, href: &str) {
        match self.navigator.follow_link(href).await {
            NavigationOutcome::Swapped { path, variant } => {
                self.bind(variant);
                println!("== {} ==", path);
                println!("{}", render_indicators(&self.navigator.indicators()));
                if self.game.is_none() {
                    println!("This page has no game. Try :go /character");
                }
            }
            NavigationOutcome::Failed { alert } => println!("! {}", alert),
            NavigationOutcome::NotIntercepted => println!("{} is not a page of this site", href),
        }
    }

    async fn print_page(&self) {
        if let Some(game) = &self.game {
            print!("{}", render_page(&game.controller.view().await, &game.variant));
        }
    }

    /// Returns false once the player asked to quit
    async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Help => println!("{}", HELP),
            Command::Go(path) => {
                self.open(&path).await;
                self.print_page().await;
            }
            Command::Query(query) => {
                let Some(game) = &self.game else {
                    println!("This page has no game");
                    return Ok(true);
                };
                game.controller.type_query(&query).await;
                self.print_page().await;
            }
            Command::Pick(index) => {
                let Some(game) = &self.game else {
                    println!("This page has no game");
                    return Ok(true);
                };
                match game.controller.pick_suggestion(index).await {
                    Some(_) => {
                        game.controller.wait_for_reveals().await;
                        self.print_page().await;
                    }
                    None => println!("No suggestion {}", index + 1),
                }
            }
            Command::Dismiss => {
                if let Some(game) = &self.game {
                    game.controller.session().lock().await.dismiss_search();
                }
                self.print_page().await;
            }
            Command::Close => {
                if let Some(game) = &self.game {
                    game.controller.session().lock().await.close_congratulations();
                }
                self.print_page().await;
            }
            Command::Dump => {
                if let Some(game) = &self.game {
                    let view = game.controller.view().await;
                    println!("{}", serde_json::to_string_pretty(&view)?);
                }
            }
        }
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Bleachdle client...");

    let config = ClientConfig::from_env()?;
    info!("Using backend at {}", config.base_url);

    let backend = Arc::new(HttpBackend::new(&config)?);
    let (alerts, mut alert_rx) = mpsc::unbounded_channel();

    let mut app = App {
        navigator: PageNavigator::new(backend.clone(), config.base_url.clone()),
        config,
        backend,
        clock: Arc::new(SystemClock::new()),
        alerts,
        game: None,
    };

    let start_path = app.config.start_path.clone();
    app.open(&start_path).await;
    app.print_page().await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            Some(alert) = alert_rx.recv() => println!("! {}", alert),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let keep_going = match line.parse::<Command>() {
                    Ok(command) => app.handle(command).await?,
                    Err(e) => {
                        warn!("{}", e);
                        true
                    }
                };
                if !keep_going {
                    break;
                }
            }
        }
    }

    info!("Bleachdle client stopped.");
    Ok(())
}
