use clap::Parser;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = facteur::cli::Cli::parse();
    if let Err(e) = facteur::cmd::dispatch(cli).await {
        eprintln!("Erreur : {e}");
        std::process::exit(1);
    }
}
