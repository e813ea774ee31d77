//! Pulsar Custom Events - Demo Entry Point
//!
//! Builds a small scene, binds a few custom events and fires them:
//! - A button object carrying an `EventInvoker`
//! - A door object with an introspectable `Door` component
//! - An event list built in code, or loaded from a JSON file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use pulsar_events::editing;
use pulsar_events::invoker;
use pulsar_events::*;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "pulsar-events-demo")]
#[command(about = "Fire a custom event list against a demo scene")]
struct Cli {
    /// Configuration file path (TOML or JSON)
    #[arg(short, long, env = "PULSAR_EVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "PULSAR_EVENTS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Keep firing after a failing event
    #[arg(long)]
    continue_on_error: bool,

    /// Event list to fire instead of the built-in one
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Print the event list as JSON and exit
    #[arg(long)]
    dump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EventEnum)]
enum Swing {
    Inward,
    Outward,
}

#[derive(Debug, Default)]
struct Door {
    open: bool,
    locked: bool,
}

#[event_methods]
impl Door {
    /// Open the door unless it is locked.
    pub fn open(&mut self, speed: f32, swing: Swing) -> Result<()> {
        if self.locked {
            anyhow::bail!("door is locked");
        }
        self.open = true;
        info!(speed, swing = swing.member_name(), "Door opened");
        Ok(())
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn toggle_lock(&mut self) {
        self.locked = !self.locked;
        info!(locked = self.locked, "Door lock toggled");
    }
}

struct DemoScene {
    scene: SceneGraph,
    invoker: ComponentHandle,
    door: ComponentHandle,
    door_object: ObjectId,
}

fn build_scene() -> Result<DemoScene> {
    let mut scene = SceneGraph::new();

    let button = scene.spawn("Button");
    let invoker = scene
        .attach(button, EventInvoker::default())
        .context("Failed to attach invoker")?;

    let door_object = scene.spawn("Door");
    let door = scene
        .attach(door_object, Door::default())
        .context("Failed to attach door")?;

    Ok(DemoScene {
        scene,
        invoker,
        door,
        door_object,
    })
}

fn default_events(demo: &DemoScene) -> Result<EventSet> {
    let mut events = EventSet::new();
    events.add_event(
        BoundInvocation::new(demo.invoker, "test_method_one")
            .with_argument(7_i32)
            .with_argument(1.5_f32)
            .with_argument(true),
    );
    events.add_event(
        BoundInvocation::new(demo.invoker, "test_method_two")
            .with_argument(None::<AudioClip>)
            .with_argument(Some(MeshFilter(ObjectRef::from(demo.door_object)))),
    );

    // Bound the way the inspector does it: pick the component, then the method
    let mut open = BoundInvocation::new(demo.door, "");
    let door_type = demo
        .scene
        .component_type(&demo.door)
        .context("Door component missing")?;
    editing::select_method(&mut open, door_type, "open").context("Door has no `open` method")?;
    if let Some(slot) = open.parameters.get_mut(0) {
        slot.set(2.0_f32);
    }
    events.add_event(open);

    Ok(events)
}

fn describe_components(demo: &DemoScene) {
    for choice in editing::available_components(&demo.scene, demo.door_object) {
        let Some(info) = type_info_by_name(choice.type_name) else {
            continue;
        };
        for method in editing::method_choices(info) {
            let fields = editing::parameter_fields(&BoundInvocation::default(), method);
            let labels: Vec<_> = fields.iter().map(|f| f.label.as_str()).collect();
            info!(
                component = choice.type_name,
                method = %method.signature(),
                params = ?labels,
                "Bindable method"
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration, CLI flags win over the file
    let mut config = match &cli.config {
        Some(path) => EventsConfig::load(path).context("Failed to load configuration")?,
        None => EventsConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if cli.continue_on_error {
        config.failure_policy = FailurePolicy::Continue;
    }
    config.validate()?;

    // 2. Initialize logging
    pulsar_events::logging::init(&config.logging).context("Failed to initialize logging")?;
    pulsar_events::logging::log_config(&config);

    // 3. Build the scene and its events
    let mut demo = build_scene()?;
    let events = match &cli.events {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event list {}", path.display()))?;
            EventSet::from_json(&json).context("Failed to parse event list")?
        }
        None => default_events(&demo)?,
    };

    if cli.dump {
        println!("{}", events.to_json()?);
        return Ok(());
    }

    describe_components(&demo);

    // 4. Hand the events to the invoker and fire them
    let invoker = demo
        .scene
        .get_mut::<EventInvoker>(&demo.invoker)
        .context("Invoker component missing")?;
    invoker.events = Some(events);
    invoker.failure_policy = config.failure_policy;

    info!(count = invoker.events.as_ref().map_or(0, EventSet::len), "Firing custom events");
    let report = invoker::fire(&mut demo.scene, &demo.invoker)
        .context("Invoker component missing")?
        .context("Custom event failed")?;

    for (index, reason) in &report.skipped {
        warn!(index, %reason, "Event skipped");
    }
    for (index, error) in &report.failures {
        warn!(index, %error, "Event failed");
    }
    for (index, param) in &report.unsupported {
        warn!(index, param = param.name, type_name = param.type_name, "Parameter defaulted");
    }

    let door_open = demo.scene.get::<Door>(&demo.door).is_some_and(|d| d.open);
    info!(
        invoked = report.invoked,
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        door_open,
        "Done"
    );

    Ok(())
}
