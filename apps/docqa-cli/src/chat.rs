use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use docqa_core::config::Settings;
use docqa_core::error::Error;
use docqa_rag::{format_sources, Session};

use crate::commands::{build_session, print_report, spinner, BUILD_FAILED};
use crate::uploads::collect_uploads;

#[derive(Debug, PartialEq, Eq)]
enum ChatCommand {
    Ask(String),
    SetK(usize),
    ToggleSources,
    Rebuild(Vec<PathBuf>),
    Help,
    Quit,
    Invalid(String),
}

impl ChatCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Self::Ask(line.to_string());
        };
        let mut parts = rest.split_whitespace();
        match parts.next() {
            Some("q" | "quit" | "exit") => Self::Quit,
            Some("sources") => Self::ToggleSources,
            Some("help") => Self::Help,
            Some("k") => match parts.next().map(str::parse::<usize>) {
                Some(Ok(k)) => Self::SetK(k),
                _ => Self::Invalid("usage: :k N".to_string()),
            },
            Some("rebuild") => {
                let paths: Vec<PathBuf> = parts.map(PathBuf::from).collect();
                if paths.is_empty() {
                    Self::Invalid("usage: :rebuild <paths...>".to_string())
                } else {
                    Self::Rebuild(paths)
                }
            }
            _ => Self::Invalid(format!("unknown command '{line}', try :help")),
        }
    }
}

const HELP: &str = "\
Type a question, or one of:
  :k N                 passages to retrieve
  :sources             toggle raw retrieved text
  :rebuild <paths...>  replace the knowledge base
  :quit";

/// Interactive session over an in-memory index. Nothing is persisted.
pub fn run(settings: Settings, paths: &[PathBuf]) -> Result<()> {
    let mut session = Session::new(settings)?;
    let mut k = session.default_k();
    let mut show_sources = false;

    if paths.is_empty() {
        println!("{}", Error::NoIndex);
    } else {
        rebuild(&mut session, paths);
    }
    println!("{HELP}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        print!("> ");
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match ChatCommand::parse(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Invalid(msg) => println!("{msg}"),
            ChatCommand::SetK(n) => {
                k = session.clamp_k(n);
                println!("k = {k}");
            }
            ChatCommand::ToggleSources => {
                show_sources = !show_sources;
                println!("sources {}", if show_sources { "on" } else { "off" });
            }
            ChatCommand::Rebuild(paths) => rebuild(&mut session, &paths),
            ChatCommand::Ask(question) => ask(&session, &question, k, show_sources),
        }
    }
    Ok(())
}

fn rebuild(session: &mut Session, paths: &[PathBuf]) {
    let result = collect_uploads(paths)
        .and_then(|uploads| build_session(session, &uploads).map_err(anyhow::Error::from));
    match result {
        Ok(report) => print_report(&report),
        Err(e) => {
            println!("{BUILD_FAILED}");
            println!("{e:#}");
            if session.has_index() {
                println!("Keeping the previous knowledge base.");
            }
        }
    }
}

fn ask(session: &Session, question: &str, k: usize, show_sources: bool) {
    let pb = spinner("Retrieving relevant passages...");
    let result = session.ask(question, k);
    pb.finish_and_clear();
    match result {
        Ok(answer) => {
            println!("{}", answer.text.trim_end());
            if show_sources {
                println!();
                print!("{}", format_sources(&answer.hits));
            }
        }
        Err(e) => println!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_questions() {
        assert_eq!(ChatCommand::parse("  What is this?\n"), ChatCommand::Ask("What is this?".into()));
        assert_eq!(ChatCommand::parse(""), ChatCommand::Ask(String::new()));
        assert_eq!(ChatCommand::parse(":k 6"), ChatCommand::SetK(6));
        assert_eq!(ChatCommand::parse(":sources"), ChatCommand::ToggleSources);
        assert_eq!(ChatCommand::parse(":quit"), ChatCommand::Quit);
        assert_eq!(
            ChatCommand::parse(":rebuild a.pdf docs"),
            ChatCommand::Rebuild(vec![PathBuf::from("a.pdf"), PathBuf::from("docs")])
        );
    }

    #[test]
    fn malformed_commands_are_reported() {
        assert!(matches!(ChatCommand::parse(":k"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse(":k many"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse(":rebuild"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse(":frobnicate"), ChatCommand::Invalid(_)));
    }
}
