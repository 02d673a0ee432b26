use clap::Parser;
use gumbira::config::StandingsArgs;
use gumbira::standings::{Medal, ranked, short_team_name};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = StandingsArgs::parse();
    let config = args.source.resolve()?;
    let service = config.service()?;

    let standings = service.standings(&config.roster).await?;
    if let Some(warning) = &standings.warning {
        eprintln!("warning: {}", warning);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&standings.data)?);
        return Ok(());
    }

    println!(
        "{:>3}  {:<14} {:>6} {:>6} {:>4} {:>4} {:>4}  {}",
        "#", "Team", "Points", "Played", "G", "S", "B", ""
    );
    for (rank, standing) in ranked(&standings.data) {
        let medal = Medal::for_rank(rank).map_or("", |m| m.as_str());
        println!(
            "{:>3}  {:<14} {:>6} {:>6} {:>4} {:>4} {:>4}  {}",
            rank,
            short_team_name(&standing.team),
            standing.total_points,
            standing.competitions_played,
            standing.gold_count,
            standing.silver_count,
            standing.bronze_count,
            medal
        );
    }

    Ok(())
}
