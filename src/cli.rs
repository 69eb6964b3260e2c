use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "imeibot")]
#[command(author, version, about = "Telegram bot for IMEI lookups through imeicheck.net", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Print the imeicheck.net services available to the account
    Services,

    /// Run a single IMEI check and print the formatted result
    Check {
        /// 15-character IMEI
        imei: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
