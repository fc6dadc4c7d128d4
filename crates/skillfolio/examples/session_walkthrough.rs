//! Restore or start a session, load the board, and print what it shows.
//!
//! ```bash
//! SKILLFOLIO_BASE_URL=http://localhost:5000/api \
//! SKILLFOLIO_EMAIL=ana@example.com SKILLFOLIO_PASSWORD=secret \
//! cargo run --example session_walkthrough --features trace
//! ```

use skillfolio::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skillfolio::init_tracing();

    let config = ClientConfig::from_env()?;
    let config = if config.token_path.is_none() {
        config.merge(
            ClientConfig::builder()
                .token_path(std::env::temp_dir().join("skillfolio-token"))
                .build(),
        )
    } else {
        config
    };

    let client = SkillfolioClient::from_config(config)?;
    let session = client.session();

    if session.initialize().await != SessionState::Authenticated {
        let email = std::env::var("SKILLFOLIO_EMAIL")?;
        let password = std::env::var("SKILLFOLIO_PASSWORD")?;
        let identity = session.login(&Credentials::new(email, password)).await?;
        println!("Logged in as {}", identity.display_name());
    } else if let Some(identity) = session.current_user() {
        println!("Welcome back, {}", identity.display_name());
    }

    let mut board = SkillBoard::new(session.clone());
    board.load().await?;

    let view = board.summary();
    let summary = view.summary();
    println!("{} skills", summary.total_skills);
    for level in SkillLevel::ALL {
        println!("  {level}: {}", summary.count_for_level(level));
    }
    for (category, count) in summary.top_categories(3) {
        println!("  {category}: {count}");
    }

    if let Some(category) = board.categories().first().cloned() {
        board.set_filter(FilterState::new(FilterMode::Category, category.clone()));
        println!("In {category}:");
        for skill in board.visible() {
            println!("  #{} {} ({})", skill.id, skill.name, skill.level);
        }
    }

    Ok(())
}
