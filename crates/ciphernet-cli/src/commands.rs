//! Command execution.
//!
//! Each invocation starts a [`Runtime`], loads the persisted session and
//! performs one command. Results meant for the user go to `out`; notices go
//! through the driver.

use std::io::Write;

use ciphernet_app::{App, Direction, Driver, Runtime};
use ciphernet_core::{Advisor, Contact, Environment, LocalIdentity, MessageEnvelope, SharedSecret};
use ciphernet_store::KeyValueStore;

use crate::{
    CliError,
    cli::{Command, ContactsCommand},
};

/// Notice count before an intent, to tell whether the intent was refused.
struct Checkpoint(u64);

impl Checkpoint {
    fn take(app: &App) -> Self {
        Self(app.notice_count())
    }

    fn accepted(self, app: &App) -> Result<(), CliError> {
        if app.notice_count() == self.0 {
            return Ok(());
        }
        match app.notice() {
            Some(notice) if notice.is_error() => Err(CliError::Rejected(notice.text.clone())),
            _ => Ok(()),
        }
    }
}

fn signed_in(app: &App) -> Result<&LocalIdentity, CliError> {
    app.account().ok_or(CliError::NotSignedIn)
}

fn resolve(app: &App, query: &str) -> Result<Contact, CliError> {
    app.find_contact(query)
        .cloned()
        .ok_or_else(|| CliError::UnknownContact { query: query.to_string() })
}

/// Parse newline-delimited envelopes, skipping blank lines.
///
/// # Errors
///
/// The first line that is not an envelope.
pub fn parse_envelopes(text: &str) -> Result<Vec<MessageEnvelope>, CliError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            MessageEnvelope::from_json(line)
                .map_err(|source| CliError::Envelope { line: n + 1, source })
        })
        .collect()
}

/// Newline-delimited JSON form of `envelopes`.
///
/// # Errors
///
/// Propagates encoding failures.
pub fn format_envelopes(envelopes: &[MessageEnvelope]) -> Result<String, CliError> {
    let mut text = String::new();
    for envelope in envelopes {
        text.push_str(&envelope.to_json()?);
        text.push('\n');
    }
    Ok(text)
}

/// Select the contact matching `query` and apply `secret` if given.
/// Returns the contact's display name.
async fn open_conversation<D, S, E, A>(
    runtime: &mut Runtime<D, S, E, A>,
    query: &str,
    secret: Option<SharedSecret>,
) -> Result<String, CliError>
where
    D: Driver,
    S: KeyValueStore,
    E: Environment,
    A: Advisor,
{
    signed_in(runtime.app())?;
    let contact = resolve(runtime.app(), query)?;

    runtime.select_contact(&contact.id).await?;
    if let Some(secret) = secret {
        runtime.set_passphrase(secret).await?;
    }
    Ok(contact.name)
}

/// Load the session and run `command`.
///
/// # Errors
///
/// Runtime failures, refused intents, and I/O on files or `out`.
pub async fn execute<D, S, E, A, W>(
    runtime: &mut Runtime<D, S, E, A>,
    command: Command,
    secret: Option<SharedSecret>,
    out: &mut W,
) -> Result<(), CliError>
where
    D: Driver,
    S: KeyValueStore,
    E: Environment,
    A: Advisor,
    W: Write,
{
    runtime.start().await?;

    match command {
        Command::Register { username } => {
            let mark = Checkpoint::take(runtime.app());
            runtime.register(&username).await?;
            mark.accepted(runtime.app())?;
            writeln!(out, "{}", signed_in(runtime.app())?.id)?;
        },
        Command::Restore { username, id } => {
            let mark = Checkpoint::take(runtime.app());
            runtime.restore(&username, id.as_deref()).await?;
            mark.accepted(runtime.app())?;
            writeln!(out, "{}", signed_in(runtime.app())?.id)?;
        },
        Command::Whoami => {
            let account = signed_in(runtime.app())?;
            writeln!(out, "{}\t{}", account.username, account.id)?;
        },
        Command::Logout { wipe } => runtime.logout(wipe).await?,
        Command::Contacts(ContactsCommand::Add { name, id }) => {
            let mark = Checkpoint::take(runtime.app());
            runtime.add_contact(&name, &id).await?;
            mark.accepted(runtime.app())?;
        },
        Command::Contacts(ContactsCommand::List) => {
            for contact in runtime.app().contacts().iter() {
                writeln!(out, "{}\t{}", contact.name, contact.id)?;
            }
        },
        Command::Send { peer, message } => {
            let secret = secret.ok_or(CliError::MissingSecret)?;
            open_conversation(runtime, &peer, Some(secret)).await?;

            let mark = Checkpoint::take(runtime.app());
            runtime.send(&message).await?;
            mark.accepted(runtime.app())?;

            if let Some(entry) = runtime.app().conversation().last() {
                writeln!(out, "sent {}", entry.short_id)?;
            }
        },
        Command::Read { peer } => {
            let name = open_conversation(runtime, &peer, secret).await?;

            for entry in runtime.app().conversation() {
                let author = match entry.direction {
                    Direction::Outgoing => "me",
                    Direction::Incoming => name.as_str(),
                };
                writeln!(out, "[{}] {author}: {}", entry.short_id, entry.body.text())?;
            }
        },
        Command::Export { peer, output } => {
            signed_in(runtime.app())?;
            let contact = resolve(runtime.app(), &peer)?;
            let envelopes = runtime.app().export_conversation(&contact.id);
            let text = format_envelopes(&envelopes)?;

            match output {
                Some(path) => tokio::fs::write(&path, text).await?,
                None => out.write_all(text.as_bytes())?,
            }
            tracing::info!(peer = %contact.id, count = envelopes.len(), "exported conversation");
        },
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let envelopes = parse_envelopes(&text)?;

            let mark = Checkpoint::take(runtime.app());
            runtime.receive(envelopes).await?;
            mark.accepted(runtime.app())?;

            if let Some(report) = runtime.app().last_import() {
                writeln!(
                    out,
                    "added {}, duplicates {}, unrelated {}",
                    report.added, report.duplicates, report.unrelated
                )?;
            }
        },
        Command::Tip => {
            runtime.refresh_tip().await?;
            writeln!(out, "{}", runtime.app().tip())?;
        },
    }
    Ok(())
}
