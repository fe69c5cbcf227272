use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs::new(matches.get_one::<String>("session-secret").cloned());

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        db: matches
            .get_one("db")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --db"))?,
    };

    Ok((action, globals))
}
