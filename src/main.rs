use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = debtplan::api::Cli::parse();
    if let Err(e) = debtplan::api::run_cli(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
