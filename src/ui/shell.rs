use crate::api::client::ReplyService;
use crate::api::models::{CallInitiator, Contact, Theme};
use crate::error::{ChatError, Result};
use crate::session::ChatSession;
use crate::ui::View;
use crate::ui::profile::{avatar_source, profile_lines};
use crate::ui::sidebar::{contact_rows, format_contacts};
use crate::utils::image_data_url;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
/open <contact>        switch chat (alex, elly, office, friend, notes)
/contacts              list chats
/delete <n>            delete message [n]
/clear                 delete every message in this chat
/image <path> [text]   send a picture with an optional caption
/call | /ring          start a call (you call them | they call you)
/hangup                end the call
/rename <name>         rename this contact
/avatar <path|url>     change this contact's picture
/profile               show this contact's profile
/theme [name]          show or set the theme (cute, light, dark)
/help                  this text
/quit                  leave
anything else is sent as a message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Open(Contact),
    Contacts,
    Delete(usize),
    Clear,
    Image { path: PathBuf, caption: String },
    Call(CallInitiator),
    HangUp,
    Rename(String),
    Avatar(String),
    Profile,
    Theme(Option<Theme>),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> std::result::Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let need_arg = |what: &str| {
        if arg.is_empty() { Err(format!("usage: /{name} <{what}>")) } else { Ok(arg.to_string()) }
    };
    let command = match name {
        "open" => Command::Open(need_arg("contact")?.parse().map_err(|e: ChatError| e.to_string())?),
        "contacts" => Command::Contacts,
        "delete" => Command::Delete(
            need_arg("n")?
                .parse()
                .map_err(|_| format!("not a message number: {arg}"))?,
        ),
        "clear" => Command::Clear,
        "image" => {
            let arg = need_arg("path")?;
            let (path, caption) = match arg.split_once(char::is_whitespace) {
                Some((path, caption)) => (path, caption.trim()),
                None => (arg.as_str(), ""),
            };
            Command::Image { path: PathBuf::from(path), caption: caption.to_string() }
        }
        "call" => Command::Call(CallInitiator::You),
        "ring" => Command::Call(CallInitiator::Them),
        "hangup" => Command::HangUp,
        "rename" => Command::Rename(need_arg("name")?),
        "avatar" => Command::Avatar(need_arg("path|url")?),
        "profile" => Command::Profile,
        "theme" if arg.is_empty() => Command::Theme(None),
        "theme" => Command::Theme(Some(arg.parse().map_err(|e: ChatError| e.to_string())?)),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command /{other}, try /help")),
    };
    Ok(Some(command))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Runs the interactive shell on stdin until `/quit` or end of input.
///
/// Input stays live while replies are in flight; each reply is applied to the
/// chat it was sent from as soon as it arrives.
pub async fn run<S: ReplyService, V: View>(session: &mut ChatSession<S, V>, start: Contact) -> Result<()> {
    session.switch_to(start);
    println!("Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => dispatch(session, command)?,
                    Ok(None) => {}
                    Err(e) => println!("* {e}"),
                }
                prompt();
            }
            Some(update) = session.next_reply() => {
                session.apply_reply(update)?;
                prompt();
            }
        }
    }
    if session.pending_replies() > 0 {
        println!("* waiting for replies...");
        session.settle().await?;
    }
    Ok(())
}

fn dispatch<S: ReplyService, V: View>(session: &mut ChatSession<S, V>, command: Command) -> Result<()> {
    let current = session.current();
    match command {
        Command::Send(text) => {
            session.send(current, &text, None)?;
        }
        Command::Image { path, caption } => match image_data_url(&path) {
            Ok(data) => {
                if caption.is_empty() {
                    println!("* Add a short caption so they know what the picture is.");
                }
                session.send(current, &caption, Some(data))?;
            }
            Err(e) => println!("* could not read {}: {e}", path.display()),
        },
        Command::Open(contact) => session.switch_to(contact),
        Command::Contacts => print_lines(&format_contacts(&contact_rows(session.state(), current))),
        Command::Delete(index) => {
            if !session.delete_message(index)? {
                println!("* no message [{index}]");
            }
        }
        Command::Clear => session.clear_chat(current)?,
        Command::Call(initiator) => session.start_call(initiator),
        Command::HangUp => {
            session.end_call()?;
        }
        Command::Rename(name) => match session.rename(current, &name) {
            Err(ChatError::InvalidName) => println!("* {}", ChatError::InvalidName),
            other => other?,
        },
        Command::Avatar(src) => match avatar_source(&src) {
            Ok(avatar) => session.set_avatar(current, avatar)?,
            Err(e) => println!("* could not read {src}: {e}"),
        },
        Command::Profile => print_lines(&profile_lines(current, &session.state().contacts)),
        Command::Theme(None) => println!("theme: {}", session.theme().name()),
        Command::Theme(Some(theme)) => session.set_theme(theme)?,
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}
