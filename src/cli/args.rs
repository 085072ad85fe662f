use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "miqat", version, author, about = "Prayer times, live countdown and Qibla in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live dashboard with countdown to the next prayer (default)
    Watch,
    /// Show today's prayer times and countdown to next prayer
    Times {
        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the next prayer and the time left, on one line
    Next,
    /// Show the Qibla bearing for the current location
    Qibla,
    /// Search for a place by name and save it as your location
    Locate {
        /// City or place name, e.g. "London"
        query: Vec<String>,
    },
    /// Toggle the reminder for a prayer
    Remind {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: String,
    },
    /// Cached timings management
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Remove all cached timings
    Clear,
}
