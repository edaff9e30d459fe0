//! Line-oriented commands typed at the terminal.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use client_core::{translator::Language, view::Sidebar, SyncEngine};
use shared::domain::{StoryId, UserId};

pub const HELP: &str = "\
join [room] [password]     join a room (a new one when omitted)
leave                      leave the current room
story <title>              add a story
select <story> | next      select a story
estimate <story> <value>   give (or clear) your estimate
reveal <story> | round <story>
trash|restore|delete <story>
name|email <value> | avatar <n> | password <value>
exclude | autoreveal | kick <user>
import <file>              import stories from a file
status | log | state
sidebar help|settings|actionlog | backlog | lang en|de
quit";

#[derive(Debug, Clone, PartialEq)]
pub enum PromptCommand {
    Join {
        room: Option<String>,
        password: Option<String>,
    },
    Leave,
    AddStory(String),
    Select(StoryId),
    SelectNext,
    Estimate(StoryId, f64),
    Reveal(StoryId),
    NewRound(StoryId),
    Trash(StoryId),
    Restore(StoryId),
    Delete(StoryId),
    Username(String),
    Email(String),
    Avatar(u32),
    Password(String),
    ToggleExcluded,
    ToggleAutoReveal,
    Kick(UserId),
    Import(PathBuf),
    Status,
    Log,
    State,
    Sidebar(Sidebar),
    Backlog,
    Language(Language),
    Help,
    Quit,
}

impl PromptCommand {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let story = |arg: Option<&str>| {
            arg.map(StoryId::from)
                .ok_or_else(|| anyhow!("{word} needs a story id"))
        };
        let text = |rest: &str| {
            if rest.is_empty() {
                Err(anyhow!("{word} needs a value"))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "join" => Self::Join {
                room: args.next().map(str::to_string),
                password: args.next().map(str::to_string),
            },
            "leave" => Self::Leave,
            "story" => Self::AddStory(text(rest)?),
            "select" => Self::Select(story(args.next())?),
            "next" => Self::SelectNext,
            "estimate" => {
                let story_id = story(args.next())?;
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("estimate needs a value"))?
                    .parse::<f64>()
                    .context("estimate value must be a number")?;
                Self::Estimate(story_id, value)
            }
            "reveal" => Self::Reveal(story(args.next())?),
            "round" => Self::NewRound(story(args.next())?),
            "trash" => Self::Trash(story(args.next())?),
            "restore" => Self::Restore(story(args.next())?),
            "delete" => Self::Delete(story(args.next())?),
            "name" => Self::Username(text(rest)?),
            "email" => Self::Email(text(rest)?),
            "avatar" => Self::Avatar(
                text(rest)?
                    .parse::<u32>()
                    .context("avatar must be a number")?,
            ),
            "password" => Self::Password(rest.to_string()),
            "exclude" => Self::ToggleExcluded,
            "autoreveal" => Self::ToggleAutoReveal,
            "kick" => Self::Kick(
                args.next()
                    .map(UserId::from)
                    .ok_or_else(|| anyhow!("kick needs a user id"))?,
            ),
            "import" => Self::Import(PathBuf::from(text(rest)?)),
            "status" => Self::Status,
            "log" => Self::Log,
            "state" => Self::State,
            "sidebar" => Self::Sidebar(
                Sidebar::from_key(&text(rest)?).ok_or_else(|| anyhow!("unknown sidebar {rest}"))?,
            ),
            "backlog" => Self::Backlog,
            "lang" => Self::Language(
                Language::from_code(&text(rest)?)
                    .ok_or_else(|| anyhow!("unknown language {rest}"))?,
            ),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command {other}; type help"),
        };
        Ok(command)
    }
}

/// Runs everything except `Quit`, and the read-only commands whose output the
/// caller renders.
pub fn execute(command: PromptCommand, engine: &mut SyncEngine) {
    match command {
        PromptCommand::Join { room, password } => {
            engine.join_room(room.as_deref(), password.as_deref())
        }
        PromptCommand::Leave => engine.leave_room(),
        PromptCommand::AddStory(title) => engine.add_story(&title, ""),
        PromptCommand::Select(story_id) => engine.select_story(story_id),
        PromptCommand::SelectNext => engine.select_next_story(),
        PromptCommand::Estimate(story_id, value) => engine.give_story_estimate(story_id, value),
        PromptCommand::Reveal(story_id) => engine.reveal(story_id),
        PromptCommand::NewRound(story_id) => engine.new_estimation_round(story_id),
        PromptCommand::Trash(story_id) => engine.trash_story(story_id),
        PromptCommand::Restore(story_id) => engine.restore_story(story_id),
        PromptCommand::Delete(story_id) => engine.delete_story(story_id),
        PromptCommand::Username(username) => engine.set_username(&username),
        PromptCommand::Email(email) => engine.set_email(&email),
        PromptCommand::Avatar(avatar) => engine.set_avatar(avatar),
        PromptCommand::Password(password) => engine.set_password(&password),
        PromptCommand::ToggleExcluded => engine.toggle_excluded(),
        PromptCommand::ToggleAutoReveal => engine.toggle_auto_reveal(),
        PromptCommand::Kick(user_id) => engine.kick(user_id),
        PromptCommand::Import(path) => engine.import_file(path),
        PromptCommand::Status => engine.fetch_status(),
        PromptCommand::Sidebar(sidebar) => engine.toggle_sidebar(sidebar),
        PromptCommand::Backlog => engine.toggle_backlog(),
        PromptCommand::Language(language) => engine.set_language(language),
        PromptCommand::Log | PromptCommand::State | PromptCommand::Help | PromptCommand::Quit => {}
    }
}

#[cfg(test)]
#[path = "tests/prompt_tests.rs"]
mod tests;
