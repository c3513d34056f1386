//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser (tracking numbers as positional
//! arguments), the [`Commands`] enum for the `serve` subcommand, and their associated
//! argument structs. Every flag has an environment variable equivalent
//! for container deployments. User-facing help text is French, matching
//! the audience of the upstream La Poste API.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "facteur",
    version,
    about = "Suivi de colis La Poste en ligne de commande",
    after_help = "\x1b[1mExemples:\x1b[0m\n  \
        facteur 4P36275770836                        Suivi simple\n  \
        facteur 4P36275770836 --full                 Informations complètes\n  \
        facteur 4P36275770836 6T11111111110          Plusieurs numéros\n  \
        facteur 4P36275770836 --raw                  Résultat brut de l'API (JSON)\n  \
        facteur 4P36275770836 --api-key=\"ma-clef\"    Appel direct à l'API La Poste\n  \
        facteur serve --port 3000                    Démarrer le serveur relais\n\n  \
        Docs: https://github.com/rigwild/facteur"
)]
pub struct Cli {
    /// Numéros de suivi
    #[arg(value_name = "NUMERO")]
    pub tracking_numbers: Vec<String>,

    #[command(flatten)]
    pub track: TrackArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Démarrer le serveur relais (cache la clef d'API et l'IP des appelants)
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct TrackArgs {
    /// Afficher les informations complètes de suivi
    #[arg(long)]
    pub full: bool,

    /// Récupérer le résultat brut de l'API au format JSON
    #[arg(long, conflicts_with = "full")]
    pub raw: bool,

    /// Désactiver l'affichage des couleurs
    #[arg(long = "no-color", alias = "no-colors")]
    pub no_color: bool,

    /// Clef d'API suivi La Poste (appel direct, sans passer par le relais)
    #[arg(long, env = "FACTEUR_API_KEY", value_name = "TOKEN")]
    pub api_key: Option<String>,

    /// Adresse du serveur à interroger (relais auto-hébergé ou tests)
    #[arg(long, env = "FACTEUR_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Alias français de --help
    #[arg(long = "aide", hide = true)]
    pub aide: bool,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExemples:\x1b[0m\n  \
        facteur serve --api-key \"ma-clef\"             Relais sur le port 3000\n  \
        facteur serve -p 8080 --pretty                Mode développement local\n  \
        PORT=80 FACTEUR_API_KEY=clef facteur serve    Configuration par l'environnement")]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Clef d'API suivi La Poste (jamais exposée aux appelants)
    #[arg(long, env = "FACTEUR_API_KEY", value_name = "TOKEN")]
    pub api_key: String,

    /// Adresse de l'API amont (tests uniquement)
    #[arg(long, env = "FACTEUR_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
