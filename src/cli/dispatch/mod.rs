use crate::cli::{actions::Action, globals::DatabaseArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let required = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .cloned()
            .with_context(|| format!("missing required argument: --{name}"))
    };

    let database = DatabaseArgs {
        host: required("db-host")?,
        port: matches.get_one::<u16>("db-port").copied().unwrap_or(5432),
        name: required("db-name")?,
        username: required("db-user")?,
        password: SecretString::from(required("db-pass")?),
    };

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        database,
        bot_username: matches.get_one::<String>("bot-username").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "verilink",
            "--db-host",
            "localhost",
            "--db-user",
            "app",
            "--db-pass",
            "secret",
            "--bot-username",
            "verify_bot",
        ]);

        let action = handler(&matches).unwrap();

        let Action::Server {
            port,
            database,
            bot_username,
        } = action;

        assert_eq!(port, 8080);
        assert_eq!(database.host, "localhost");
        assert_eq!(database.port, 5432);
        assert_eq!(database.name, "postgres");
        assert_eq!(database.username, "app");
        assert_eq!(database.password.expose_secret(), "secret");
        assert_eq!(bot_username.as_deref(), Some("verify_bot"));
    }
}
