use crate::cli::commands::ReplayArgs;
use crate::cli::output::*;
use crate::cli::script::{ScriptEvent, read_script};
use crate::io::store::{FileStore, MemoryStore};
use crate::model::config::NavConfig;
use crate::nav::collab::{RecordingShell, StaticDirectory};
use crate::nav::deep_link::ManualBridge;
use crate::nav::{Collaborators, NavController};

pub fn cmd_replay(
    args: ReplayArgs,
    config: &NavConfig,
    web: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let steps = read_script(&args.script)?;
    let directory = match &args.directory {
        Some(path) => StaticDirectory::from_json_file(path)?,
        None => StaticDirectory::unavailable(),
    };

    let durable = FileStore::open(&config.storage.state_file);
    tracing::debug!(path = %durable.path().display(), "durable store opened");

    let shell = RecordingShell::at(&args.start_path);
    let mut nav = NavController::new(
        config,
        Collaborators {
            router: Box::new(shell.clone()),
            session: Box::new(shell.clone()),
            directory: Box::new(directory),
            session_store: Box::new(MemoryStore::new()),
            durable_store: Box::new(durable),
        },
    );

    let mut bridge = if web {
        ManualBridge::web()
    } else {
        ManualBridge::native()
    };
    if let Some(url) = steps.iter().find_map(|step| match &step.event {
        ScriptEvent::Launch(url) => Some(url.clone()),
        _ => None,
    }) {
        bridge = bridge.with_launch_link(url);
    }
    nav.start(&mut bridge);

    for step in &steps {
        nav.advance_to(step.at);
        tracing::debug!(line = step.line, event = ?step.event, "replay step");
        match &step.event {
            ScriptEvent::Click(button) => {
                nav.click(*button);
            }
            ScriptEvent::Disconnect => {
                nav.disconnect();
            }
            ScriptEvent::AnimationEnd(button) => nav.animation_finished(*button),
            ScriptEvent::Route(path) => {
                shell.set_path(path);
                nav.route_changed(path);
            }
            ScriptEvent::Link(url) => {
                bridge.open(url);
                nav.poll_links();
            }
            // handed to the bridge before start
            ScriptEvent::Launch(_) => {}
            ScriptEvent::Session(connected) => nav.set_session(*connected),
            ScriptEvent::Type(text) => nav.search_input(text),
            ScriptEvent::Select(index) => {
                nav.select_result(*index);
            }
        }
    }
    nav.settle();

    let active_button = nav.active_button();
    let pending_invite = nav.pending_invite();
    let log = nav.take_log();
    nav.teardown(&mut bridge);

    if json {
        let out = ReplayJson {
            log,
            active_button,
            pending_invite,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for entry in &log {
        for line in format_log_entry(entry) {
            println!("{}", line);
        }
    }
    match active_button {
        Some(button) => println!("active: {}", button),
        None => println!("active: none"),
    }
    if let Some(invite) = &pending_invite {
        println!("pending invite: {}", format_invite(invite));
    }
    Ok(())
}
