use dotenv::dotenv;

use clap::{Arg, Command};

use nc_news::{app::*, error::*};

fn cli() -> Command {
  Command::new("nc-news")
    .about("News articles, topics, comments and users over HTTP")
    .arg(Arg::new("config")
      .short('c')
      .long("config")
      .value_name("FILE")
      .help("Config file, replaces conf/<RUN_MODE> and APP_* overrides"))
    .subcommand(Command::new("serve").about("Run the API server (default)"))
}

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let cli = cli().get_matches();

  let config = AppConfig::new_clap(&cli)?;

  match cli.subcommand_name() {
    // default to 'serve' command.
    Some("serve") | None => serve::execute(config)?,
    Some(cmd) => return Err(anyhow::anyhow!("Unknown command: {}", cmd).into()),
  }
  log::info!("Main finished");
  Ok(())
}
