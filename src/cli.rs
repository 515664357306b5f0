use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use serde::Serialize;

use calendar_access::{
    CalendarService, CalendarSettings,
    directory::{Directories, StaticDirectory, User, UserDirectory},
    i18n::MessageBundle,
    storage::{Config, SqliteStore},
};

pub const USAGE: &str = "Usage: calendar-access [--catalog USER | --settings USER ID | --create USER FILE | --update USER FILE | --delete USER ID | --visibility USER ID on|off]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Catalog { user: String },
    Settings { user: String, id: i64 },
    Create { user: String, file: PathBuf },
    Update { user: String, file: PathBuf },
    Delete { user: String, id: i64 },
    Visibility { user: String, id: i64, visible: bool },
    Help,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I>(args: I) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let flag = match args.next() {
        Some(flag) => flag,
        None => return Ok(CliMode::Help),
    };
    let mut next = |what: &str| {
        args.next()
            .ok_or_else(|| format!("Missing {} for {}", what, flag))
    };

    let mode = match flag.as_str() {
        "--catalog" => CliMode::Catalog { user: next("USER")? },
        "--settings" => CliMode::Settings {
            user: next("USER")?,
            id: parse_id(&next("ID")?)?,
        },
        "--create" => CliMode::Create {
            user: next("USER")?,
            file: PathBuf::from(next("FILE")?),
        },
        "--update" => CliMode::Update {
            user: next("USER")?,
            file: PathBuf::from(next("FILE")?),
        },
        "--delete" => CliMode::Delete {
            user: next("USER")?,
            id: parse_id(&next("ID")?)?,
        },
        "--visibility" => {
            let user = next("USER")?;
            let id = parse_id(&next("ID")?)?;
            let visible = match next("on|off")?.as_str() {
                "on" => true,
                "off" => false,
                other => return Err(format!("Invalid visibility '{}'. Use on or off.", other)),
            };
            CliMode::Visibility { user, id, visible }
        }
        "--help" => CliMode::Help,
        _ => return Err(format!("Unknown argument: {}", flag)),
    };
    Ok(mode)
}

fn parse_id(value: &str) -> Result<i64, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid calendar id '{}'", value))
}

pub fn run(mode: CliMode, config: &Config) -> anyhow::Result<()> {
    if mode == CliMode::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let store = SqliteStore::open(&config.storage.database)
        .with_context(|| format!("opening {}", config.storage.database.display()))?;
    let directory = Arc::new(
        StaticDirectory::load(&config.directory.fixture)
            .with_context(|| format!("loading {}", config.directory.fixture.display()))?,
    );
    let localizer = MessageBundle::new().with_overrides(&config.messages);
    let service = CalendarService::new(
        store,
        Directories::from_shared(directory.clone()),
        Box::new(localizer),
    );
    let require_user = |key: &str| -> anyhow::Result<User> {
        directory
            .find_user_by_key(key)
            .with_context(|| format!("Unknown user '{}'", key))
    };

    match mode {
        CliMode::Catalog { user } => print_json(&service.get_all_calendars(&require_user(&user)?)?),
        CliMode::Settings { user, id } => {
            print_json(&service.get_calendar_settings(&require_user(&user)?, id)?)
        }
        CliMode::Create { user, file } => {
            let settings = read_settings(&file)?;
            let user = directory.find_user_by_key(&user);
            print_json(&service.create_calendar(user.as_ref(), &settings)?)
        }
        CliMode::Update { user, file } => {
            let settings = read_settings(&file)?;
            print_json(&service.update_calendar(&require_user(&user)?, &settings)?)
        }
        CliMode::Delete { user, id } => {
            service.delete_calendar(&require_user(&user)?, id)?;
            println!("Deleted calendar {}", id);
            Ok(())
        }
        CliMode::Visibility { user, id, visible } => {
            service.update_calendar_visibility(id, &require_user(&user)?, visible)?;
            println!("Calendar {} is now {}", id, if visible { "visible" } else { "hidden" });
            Ok(())
        }
        CliMode::Help => Ok(()),
    }
}

fn read_settings(path: &Path) -> anyhow::Result<CalendarSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
