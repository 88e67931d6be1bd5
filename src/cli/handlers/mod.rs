mod replay;
pub use replay::cmd_replay;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::model::config::NavConfig;
use crate::model::link::{EventId, ParsedLink};
use crate::parse::link::{app_link, event_route, match_link};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let mut config = config_io::load_config(cli.config.as_deref(), &cwd)?;
    if let Some(path) = cli.state_file {
        config.storage.state_file = path;
    }

    match cli.command {
        Commands::Parse(args) => cmd_parse(args, &config, cli.json),
        Commands::Link(args) => cmd_link(args, &config, cli.json),
        Commands::Replay(args) => cmd_replay(args, &config, cli.web, cli.json),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_parse(
    args: ParseArgs,
    config: &NavConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheme = config.links.app_scheme.as_deref();
    if json {
        let out: Vec<LinkMatchJson> = args
            .urls
            .iter()
            .map(|url| link_match_to_json(url, &match_link(url, scheme)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for url in &args.urls {
            println!("{}", format_link_match(url, &match_link(url, scheme)));
        }
    }
    Ok(())
}

fn cmd_link(args: LinkArgs, config: &NavConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let event_id: EventId = args.event_id.parse()?;
    let link = ParsedLink {
        event_id,
        invite_token: args.token.filter(|t| !t.is_empty()),
    };
    let scheme = args
        .scheme
        .or_else(|| config.links.app_scheme.clone())
        .ok_or("no scheme: pass --scheme or set links.app_scheme")?;

    let route = event_route(&link);
    let app = app_link(&scheme, &link);
    if json {
        let out = serde_json::json!({ "route": route, "app_link": app });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("route     {}", route);
        println!("app link  {}", app);
    }
    Ok(())
}
