use clap::Subcommand;
use starepatrol_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's breaks
    Today,
    /// All-time breaks
    All,
    /// Most recent breaks, newest first
    Recent {
        /// Number of breaks to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let stats = db.stats_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Recent { limit } => {
            let breaks = db.recent_breaks(limit)?;
            println!("{}", serde_json::to_string_pretty(&breaks)?);
        }
    }
    Ok(())
}
