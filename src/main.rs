use log::{error, info};

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = deepchat::ChatConfig::from_env();
    if config.provider.api_key.is_none()
    {   info!("DEEPSEEK_API_KEY not set; chat requests will fail until it is");
    }

    if let Err(e) = deepchat::server::serve(config).await
    {   error!("Server error: {}", e);
        std::process::exit(1);
    }
}
