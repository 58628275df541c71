use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use console_core::{
    load_settings,
    screens::{categories_screen, users_screen, CatalogScreen, LoginScreen, OrdersScreen, ServicesScreen},
    Authenticator, Decision, FileSessionStore, ModalConfirmationGate, NotificationChannel,
    ResourceClient, RestResource, Settings,
};
use shared::domain::{
    Category, CategoryId, Order, OrderId, Service, ServiceId, User, UserId,
};

#[derive(Parser, Debug)]
struct Cli {
    /// API root, e.g. http://127.0.0.1:3000/api. Overrides console.toml.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Admin services table with category names resolved.
    Services {
        #[arg(long)]
        search: Option<String>,
    },
    /// Public catalog of active services.
    Catalog {
        #[arg(long)]
        search: Option<String>,
    },
    Categories {
        #[arg(long)]
        search: Option<String>,
    },
    Orders {
        #[arg(long)]
        search: Option<String>,
    },
    Users {
        #[arg(long)]
        search: Option<String>,
    },
    /// Deletes one record after the usual confirmation.
    Delete {
        /// service, category, order or user
        resource: String,
        id: i64,
        /// Answer the confirmation prompt with yes.
        #[arg(long)]
        yes: bool,
    },
    /// Signs in and stores the session file.
    Login,
    /// Clears the stored session.
    Logout,
}

struct Backend {
    services: Arc<dyn ResourceClient<Service>>,
    categories: Arc<dyn ResourceClient<Category>>,
    orders: Arc<dyn ResourceClient<Order>>,
    users: Arc<dyn ResourceClient<User>>,
    gate: Arc<ModalConfirmationGate>,
    notifier: Arc<NotificationChannel>,
    auth: Arc<Authenticator>,
}

impl Backend {
    fn connect(settings: &Settings) -> Result<Self> {
        let http = settings.http_client()?;
        let services: Arc<dyn ResourceClient<Service>> = Arc::new(
            RestResource::<Service>::with_client(http.clone(), &settings.base_url)?,
        );
        let categories: Arc<dyn ResourceClient<Category>> = Arc::new(
            RestResource::<Category>::with_client(http.clone(), &settings.base_url)?,
        );
        let orders: Arc<dyn ResourceClient<Order>> = Arc::new(
            RestResource::<Order>::with_client(http.clone(), &settings.base_url)?,
        );
        let users: Arc<dyn ResourceClient<User>> = Arc::new(RestResource::<User>::with_client(
            http,
            &settings.base_url,
        )?);
        let auth = Arc::new(Authenticator::new(
            users.clone(),
            Arc::new(FileSessionStore::new(&settings.session_file)),
        ));
        Ok(Self {
            services,
            categories,
            orders,
            users,
            gate: Arc::new(ModalConfirmationGate::new()),
            notifier: Arc::new(NotificationChannel::with_ttl(settings.notification_ttl())),
            auth,
        })
    }

    /// Restores the stored session or signs in with the flags.
    async fn ensure_session(&self, cli: &Cli) -> Result<()> {
        if self.auth.restore().await.is_some() {
            return Ok(());
        }
        let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
            bail!("not signed in; run `console login --email .. --password ..` first");
        };
        let session = self.auth.login(email, password).await?;
        println!(
            "Signed in as {} ({})",
            session.user.name,
            session.user.role.label()
        );
        Ok(())
    }

    fn report(&self) {
        if let Some(note) = self.notifier.current() {
            println!("[{:?}] {}", note.severity, note.message);
        }
    }
}

/// Answers the modal prompt the way the flags said to, since a terminal has
/// no dialog to click.
fn spawn_gate_resolver(gate: Arc<ModalConfirmationGate>, approve: bool) {
    let mut prompts = gate.subscribe();
    tokio::spawn(async move {
        loop {
            if prompts.changed().await.is_err() {
                break;
            }
            let prompt = prompts.borrow_and_update().clone();
            let Some(prompt) = prompt else { continue };
            println!("{}: {}", prompt.title, prompt.message);
            let decision = if approve {
                Decision::Confirmed
            } else {
                println!("Dismissed (pass --yes to confirm).");
                Decision::Dismissed
            };
            gate.resolve(decision).await;
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    let backend = Backend::connect(&settings)?;

    match &cli.command {
        Command::Services { search } => {
            backend.ensure_session(&cli).await?;
            let screen = ServicesScreen::new(
                backend.services.clone(),
                backend.categories.clone(),
                backend.gate.clone(),
                backend.notifier.clone(),
            );
            screen.activate().await;
            if let Some(term) = search {
                screen.search(term).await;
            }
            for row in screen.rows().await {
                println!(
                    "{:>4}  {:<24}  {:<16}  {:>8.2}  {:<9}  {}",
                    row.service.id,
                    row.service.name,
                    row.category_name,
                    row.service.price,
                    row.service.classification.label(),
                    if row.service.active { "active" } else { "inactive" },
                );
            }
            backend.report();
        }
        Command::Catalog { search } => {
            let screen = CatalogScreen::new(
                backend.services.clone(),
                backend.categories.clone(),
                backend.notifier.clone(),
            );
            screen.activate().await;
            if let Some(term) = search {
                screen.search(term).await;
            }
            for entry in screen.entries().await {
                println!(
                    "{:<24}  {:<16}  {:<9}  {:>8.2}",
                    entry.service.name,
                    entry.category_name,
                    entry.tier_label(),
                    entry.service.price,
                );
            }
            backend.report();
        }
        Command::Categories { search } => {
            backend.ensure_session(&cli).await?;
            let screen = categories_screen(
                backend.categories.clone(),
                backend.gate.clone(),
                backend.notifier.clone(),
            );
            screen.activate().await;
            if let Some(term) = search {
                screen.search(term).await;
            }
            for category in screen.visible().await {
                println!(
                    "{:>4}  {:<20}  {:<14}  {}",
                    category.id, category.name, category.icon, category.description,
                );
            }
            backend.report();
        }
        Command::Orders { search } => {
            backend.ensure_session(&cli).await?;
            let screen = OrdersScreen::new(
                backend.orders.clone(),
                backend.users.clone(),
                backend.services.clone(),
                backend.gate.clone(),
                backend.notifier.clone(),
            );
            screen.activate().await;
            if let Some(term) = search {
                screen.search(term).await;
            }
            for row in screen.rows().await {
                println!(
                    "{:>4}  {:<20}  {:<24}  {}  {:>8.2}  {}",
                    row.order.id,
                    row.user_name,
                    row.service_name,
                    row.order.event_date,
                    row.order.total_price,
                    row.order.status.label(),
                );
            }
            backend.report();
        }
        Command::Users { search } => {
            backend.ensure_session(&cli).await?;
            let screen = users_screen(
                backend.users.clone(),
                backend.gate.clone(),
                backend.notifier.clone(),
            );
            screen.activate().await;
            if let Some(term) = search {
                screen.search(term).await;
            }
            for user in screen.visible().await {
                println!(
                    "{:>4}  {:<20}  {:<28}  {:<13}  {}",
                    user.id,
                    user.name,
                    user.email,
                    user.role.label(),
                    if user.active { "active" } else { "inactive" },
                );
            }
            backend.report();
        }
        Command::Delete { resource, id, yes } => {
            backend.ensure_session(&cli).await?;
            spawn_gate_resolver(backend.gate.clone(), *yes);
            match resource.to_lowercase().as_str() {
                "service" => {
                    let screen = ServicesScreen::new(
                        backend.services.clone(),
                        backend.categories.clone(),
                        backend.gate.clone(),
                        backend.notifier.clone(),
                    );
                    screen.activate().await;
                    screen.delete(ServiceId(*id)).await;
                }
                "category" => {
                    let screen = categories_screen(
                        backend.categories.clone(),
                        backend.gate.clone(),
                        backend.notifier.clone(),
                    );
                    screen.activate().await;
                    screen.delete(CategoryId(*id)).await;
                }
                "order" => {
                    let screen = OrdersScreen::new(
                        backend.orders.clone(),
                        backend.users.clone(),
                        backend.services.clone(),
                        backend.gate.clone(),
                        backend.notifier.clone(),
                    );
                    screen.activate().await;
                    screen.delete(OrderId(*id)).await;
                }
                "user" => {
                    let screen = users_screen(
                        backend.users.clone(),
                        backend.gate.clone(),
                        backend.notifier.clone(),
                    );
                    screen.activate().await;
                    screen.delete(UserId(*id)).await;
                }
                other => bail!("unknown resource {other:?}; expected service, category, order or user"),
            }
            backend.report();
        }
        Command::Login => {
            let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
                bail!("login needs --email and --password");
            };
            let screen = LoginScreen::new(backend.auth.clone(), backend.notifier.clone());
            screen.update_email(email).await;
            screen.update_password(password).await;
            let signed_in = screen.submit().await;
            backend.report();
            if !signed_in {
                bail!("login failed");
            }
        }
        Command::Logout => {
            backend.auth.logout().await;
            println!("Signed out");
        }
    }

    Ok(())
}
