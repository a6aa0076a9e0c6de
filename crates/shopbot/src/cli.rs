use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shopbot")]
#[command(author, version, about = "Telegram storefront bot with a catalog REST API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot together with the REST API
    Run {
        /// Port for the REST API (overrides API_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run only the REST API
    Api {
        /// Port for the REST API (overrides API_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_default_run() {
        let cli = Cli::try_parse_from(["shopbot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_api_port_override() {
        let cli = Cli::try_parse_from(["shopbot", "api", "--port", "9000"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Api { port: Some(9000) }));
    }

    #[test]
    fn test_migrate() {
        let cli = Cli::try_parse_from(["shopbot", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }
}
