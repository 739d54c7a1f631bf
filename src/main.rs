/// Headless application entry point: wires the screens and prints them
use std::sync::Arc;
use std::time::Duration;
use swapi_planets::domain::{ErrorState, Outcome, Planet};
use swapi_planets::paging::FeedSnapshot;
use swapi_planets::{
    AppConfig, HttpClient, PlanetDetailsViewModel, PlanetListViewModel, PlanetRepository,
    StarWarsClient,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const SCREEN_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded successfully");

    // Initialize client and repository
    let http_client = HttpClient::new(config.http_timeout, &config.user_agent)?;
    let client = StarWarsClient::new(http_client, config.base_url.clone());
    info!("Catalog client targeting {}", client.base_url());
    let repository = PlanetRepository::new(Arc::new(client));

    // Planet list screen
    let list = PlanetListViewModel::new(repository.clone(), config.page_size);
    let mut feed = list.feed();
    let snapshot = tokio::time::timeout(
        SCREEN_TIMEOUT,
        feed.wait_for(|s| !s.items.is_empty() || s.load_states.error().is_some()),
    )
    .await??
    .clone();
    render_list(&snapshot, &config.images_base_url);

    let Some(first) = list.on_item_visible(0) else {
        return Ok(());
    };

    // Planet details screen
    let details = PlanetDetailsViewModel::new(repository);
    let mut state = details.subscribe();
    details.load_planet_details(first.id());
    let outcome = tokio::time::timeout(SCREEN_TIMEOUT, state.wait_for(|o| o.is_terminal()))
        .await??
        .clone();
    render_details(&outcome, &config.images_base_url);

    Ok(())
}

fn render_list(snapshot: &FeedSnapshot<Planet>, images_base_url: &str) {
    for planet in &snapshot.items {
        println!(
            "{:>4}  {:<20} {:<24} {}",
            planet.id(),
            planet.name,
            planet.climate,
            planet.thumbnail_url(images_base_url)
        );
    }
    if let Some(e) = snapshot.load_states.error() {
        error!("Planet list failed: {}", e);
        println!("[error] {}  (retry to reload)", e);
    }
}

fn render_details(outcome: &Outcome<Planet>, images_base_url: &str) {
    match outcome {
        Outcome::Success { data: planet, .. } => {
            println!();
            println!("{}", planet.name);
            println!("  image:           {}", planet.image_url(images_base_url));
            println!("  rotation period: {}", planet.rotation_period);
            println!("  orbital period:  {}", planet.orbital_period);
            println!("  diameter:        {}", planet.diameter);
            println!("  climate:         {}", planet.climate);
            println!("  gravity:         {}", planet.gravity);
            println!("  terrain:         {}", planet.terrain);
            println!("  surface water:   {}", planet.surface_water);
            println!("  population:      {}", planet.population);
        }
        Outcome::Error(e) => render_error_panel(e),
        Outcome::Idle | Outcome::Loading => {}
    }
}

fn render_error_panel(e: &ErrorState) {
    error!("Planet details failed: {}", e);
    println!();
    println!(
        "[{}] {}",
        e.error_type.map(|k| k.as_str()).unwrap_or("Error"),
        e.title.as_deref().unwrap_or("Something went wrong")
    );
    println!("  {}", e.message);
    if let Some(code) = e.code {
        println!("  status code: {}", code);
    }
}
