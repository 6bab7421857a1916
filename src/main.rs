use clap::{Parser, Subcommand};
use social_images::batch::BatchSocialImageGenerator;
use social_images::branding::SubforemBrandingGenerator;
use social_images::config::{self, resolve_source};
use social_images::imaging::RustBackend;
use social_images::output;
use social_images::services::{
    LoggingCacheBuster, ResourceStore, Services, StoreError, TracingReporter,
};
use social_images::social::SocialImageBuilder;
use social_images::store::JsonStore;
use social_images::types::{Resource, SubforemId, User};
use social_images::upload::LocalUploader;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(clap::Args, Clone)]
struct IdArgs {
    /// Record id in the store
    #[arg(long)]
    id: u64,
}

#[derive(Parser)]
#[command(name = "social-images")]
#[command(about = "Generate social share images and subforem branding images")]
#[command(long_about = "\
Generate social share images and subforem branding images

Social cards are 1000x500 PNGs drawn on a template: title, author name and
avatar, publish date, and the subforem logo. A user or organization run
renders every qualifying article; an article run renders just that article.

Card text needs a TrueType font set as [assets].font in config.toml. The
stock config has none, so cards are drawn without title, author or date
until one is configured.

Branding derives four images from one subforem logo: a 100px resized logo,
a 100px favicon, a 1000x500 main social image, and a 512px logo png.

Records are read from and written back to a JSON store:

  {
    \"default_subforem_id\": 1,
    \"subforems\": [{ \"id\": 1, \"logo_png\": \"https://...\" }],
    \"users\": [{ \"id\": 10, \"name\": \"Ada\", \"username\": \"ada\" }],
    \"organizations\": [],
    \"articles\": [{ \"id\": 100, \"title\": \"Hello\", \"user_id\": 10 }]
  }

Run 'social-images gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml; relative asset paths resolve here
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// JSON store with subforems, users, organizations and articles
    #[arg(long, default_value = "store.json", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the social image of one article
    Article(IdArgs),
    /// Generate social images for a user's personal articles without a cover
    User(IdArgs),
    /// Generate social images for an organization's articles without a cover
    Organization(IdArgs),
    /// Generate a user's profile social image
    Profile(IdArgs),
    /// Derive the branding images of a subforem from its logo
    Branding {
        /// Subforem id
        #[arg(long)]
        subforem: u64,
        /// Logo URL or path
        #[arg(long)]
        logo: String,
        /// Custom background for the main social image (defaults to the template)
        #[arg(long)]
        background: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

/// What a social image run is started for.
enum BatchTarget {
    Resource(Resource),
    Profile(User),
}

impl BatchTarget {
    fn heading(&self) -> String {
        match self {
            BatchTarget::Resource(resource) => {
                format!("{} {}: {}", resource.kind(), resource.id(), resource.title())
            }
            BatchTarget::Profile(user) => format!("profile {}: {}", user.id, user.name),
        }
    }
}

fn batch_target(command: &Command, store: &JsonStore) -> Result<Option<BatchTarget>, StoreError> {
    let target = match command {
        Command::Article(args) => BatchTarget::Resource(Resource::Article(store.article(args.id)?)),
        Command::User(args) => BatchTarget::Resource(Resource::User(store.user(args.id)?)),
        Command::Organization(args) => {
            BatchTarget::Resource(Resource::Organization(store.organization(args.id)?))
        }
        Command::Profile(args) => BatchTarget::Profile(store.user(args.id)?),
        Command::Branding { .. } | Command::GenConfig => return Ok(None),
    };
    Ok(Some(target))
}

/// `RUST_LOG` wins over the configured filter.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    init_logging(&config.logging.filter);

    let store = JsonStore::load(&cli.store)?;
    let uploader = LocalUploader::new(
        cli.config.join(&config.upload.directory),
        &config.upload.public_base_url,
    );
    let cache_buster = LoggingCacheBuster;
    let reporter = TracingReporter;
    let services = Services {
        settings: &store,
        subforems: &store,
        resources: &store,
        uploader: &uploader,
        cache_buster: &cache_buster,
        reporter: &reporter,
    };
    let backend = RustBackend::new(config.fetch.timeout())?;

    if let Command::Branding {
        subforem,
        logo,
        background,
    } = &cli.command
    {
        let template = resolve_source(&cli.config, &config.assets.template);
        let generator = SubforemBrandingGenerator::new(&backend, services, template);
        let report = generator.generate(SubforemId(*subforem), logo, background.as_deref())?;
        output::print_branding_report(&report);
    } else if let Some(target) = batch_target(&cli.command, &store)? {
        if !config.draws_text() {
            warn!("no [assets].font configured: cards will have no title, author or date");
        }
        let builder = SocialImageBuilder::new(
            &backend,
            services,
            config.card_assets(&cli.config),
            &config.social.default_brand_color,
        );
        let mut batch =
            BatchSocialImageGenerator::new(builder, services, &config.assets.backup_avatar);
        let report = match &target {
            BatchTarget::Resource(resource) => batch.generate(resource),
            BatchTarget::Profile(user) => batch.generate_profile(user),
        };
        output::print_batch_report(&target.heading(), &report);
    }

    store.save(&cli.store)?;
    Ok(())
}
