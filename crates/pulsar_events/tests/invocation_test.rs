use pulsar_events::{
    event_methods, ArgumentSlot, BoundInvocation, ComponentHandle, DecodeError, EventEnum,
    EventInvoker, EventSet, FailurePolicy, InvocationError, InvokeOutcome, ObjectRef,
    OpaqueArgument, SceneGraph, SkipReason, SlotValue, UnsupportedParam,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EventEnum)]
enum FireMode {
    Single,
    Burst,
    Auto,
}

#[derive(Debug, Default, PartialEq, OpaqueArgument)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<String>,
    mode: Option<FireMode>,
}

#[event_methods]
impl Recorder {
    pub fn record(&mut self, number: i32, speed: f32, flag: bool) {
        self.calls.push(format!("record {number} {speed} {flag}"));
    }

    pub fn mark(&mut self, label: String) {
        self.calls.push(format!("mark {label}"));
    }

    pub fn fire(&mut self, mode: FireMode) {
        self.mode = Some(mode);
        self.calls.push(format!("fire {}", mode.member_name()));
    }

    pub fn teleport(&mut self, to: Vec3, label: String) {
        self.calls.push(format!("teleport {} {} {} {label}", to.x, to.y, to.z));
    }

    pub fn target(&mut self, object: Option<ObjectRef>) {
        let shown = object.map_or_else(|| "none".to_string(), |o| o.to_string());
        self.calls.push(format!("target {shown}"));
    }

    pub fn fail(&mut self, reason: String) -> anyhow::Result<()> {
        self.calls.push("fail".to_string());
        anyhow::bail!("{reason}")
    }

    pub fn count(&self) -> usize {
        self.calls.len()
    }

    pub fn set_mode(&mut self, mode: FireMode) {
        self.mode = Some(mode);
        self.calls.push("set_mode".to_string());
    }

    fn secret(&mut self, code: i32) {
        self.calls.push(format!("secret {code}"));
    }
}

fn setup() -> (SceneGraph, ComponentHandle) {
    let mut scene = SceneGraph::new();
    let object = scene.spawn("Recorder");
    let handle = scene
        .attach(object, Recorder::default())
        .expect("object exists");
    (scene, handle)
}

fn calls(scene: &SceneGraph, handle: &ComponentHandle) -> Vec<String> {
    scene
        .get::<Recorder>(handle)
        .expect("recorder attached")
        .calls
        .clone()
}

#[test]
fn test_invokes_with_stored_arguments() {
    let (mut scene, handle) = setup();
    let invocation = BoundInvocation::new(handle, "record")
        .with_argument(7_i32)
        .with_argument(1.5_f32)
        .with_argument(true);

    let outcome = invocation.invoke(&mut scene).unwrap();
    assert_eq!(outcome, InvokeOutcome::Invoked { unsupported: vec![] });
    assert_eq!(calls(&scene, &handle), vec!["record 7 1.5 true"]);
}

#[test]
fn test_unconfigured_entries_call_nothing() {
    let (mut scene, handle) = setup();

    let no_component = BoundInvocation {
        method_name: "record".to_string(),
        ..BoundInvocation::default()
    };
    assert_eq!(
        no_component.invoke(&mut scene).unwrap(),
        InvokeOutcome::Skipped(SkipReason::MissingComponent)
    );

    let no_method = BoundInvocation::new(handle, "");
    assert_eq!(
        no_method.invoke(&mut scene).unwrap(),
        InvokeOutcome::Skipped(SkipReason::MissingMethodName)
    );

    assert!(calls(&scene, &handle).is_empty());
}

#[test]
fn test_unknown_method_is_skipped() {
    let (mut scene, handle) = setup();
    let outcome = BoundInvocation::new(handle, "explode")
        .invoke(&mut scene)
        .unwrap();
    assert_eq!(
        outcome,
        InvokeOutcome::Skipped(SkipReason::MethodNotFound {
            type_name: "Recorder",
            method: "explode".to_string()
        })
    );
}

#[test]
fn test_dangling_component_is_skipped() {
    let (mut scene, handle) = setup();
    assert!(scene.despawn(handle.object));

    let outcome = BoundInvocation::new(handle, "record")
        .invoke(&mut scene)
        .unwrap();
    assert_eq!(outcome, InvokeOutcome::Skipped(SkipReason::ComponentNotFound(handle)));
}

#[test]
fn test_enum_argument_by_member_name() {
    let (mut scene, handle) = setup();
    BoundInvocation::new(handle, "fire")
        .with_argument(FireMode::Burst)
        .invoke(&mut scene)
        .unwrap();

    let recorder = scene.get::<Recorder>(&handle).unwrap();
    assert_eq!(recorder.mode, Some(FireMode::Burst));
    assert_eq!(recorder.calls, vec!["fire Burst"]);
}

#[test]
fn test_invalid_enum_member_fails() {
    let (mut scene, handle) = setup();
    let invocation = BoundInvocation::new(handle, "fire")
        .with_slot(ArgumentSlot::new(SlotValue::Text("Spread".to_string())));

    let err = invocation.invoke(&mut scene).unwrap_err();
    match err {
        InvocationError::Decode { method, index, source } => {
            assert_eq!(method, "fire");
            assert_eq!(index, 0);
            assert_eq!(
                source,
                DecodeError::EnumParse {
                    enum_name: "FireMode",
                    text: "Spread".to_string()
                }
            );
        }
        other => panic!("expected decode error, got {other:?}"),
    }
    assert!(calls(&scene, &handle).is_empty());
}

#[test]
fn test_unsupported_parameter_gets_default() {
    let (mut scene, handle) = setup();
    let invocation = BoundInvocation::new(handle, "teleport")
        .with_slot(ArgumentSlot::new(SlotValue::Int(99)))
        .with_argument("home".to_string());

    let outcome = invocation.invoke(&mut scene).unwrap();
    assert!(outcome.is_invoked());
    assert_eq!(
        outcome.unsupported(),
        &[UnsupportedParam {
            index: 0,
            name: "to",
            type_name: "Vec3"
        }]
    );
    assert_eq!(calls(&scene, &handle), vec!["teleport 0 0 0 home"]);
}

#[test]
fn test_report_lists_defaulted_parameters() {
    let (mut scene, handle) = setup();
    let events: EventSet = [
        BoundInvocation::new(handle, "mark").with_argument("start".to_string()),
        BoundInvocation::new(handle, "teleport").with_argument("away".to_string()),
    ]
    .into_iter()
    .collect();

    let report = events.invoke(&mut scene).unwrap();
    assert_eq!(report.invoked, 2);
    assert_eq!(report.unsupported.len(), 1);
    let (entry, param) = report.unsupported[0];
    assert_eq!(entry, 1);
    assert_eq!(param.name, "to");
    assert_eq!(param.type_name, "Vec3");
    assert!(!report.is_clean());
}

#[test]
fn test_missing_and_stale_slots_use_defaults() {
    let (mut scene, handle) = setup();
    let invocation = BoundInvocation::new(handle, "record")
        .with_slot(ArgumentSlot::new(SlotValue::Text("7".to_string())));

    invocation.invoke(&mut scene).unwrap();
    assert_eq!(calls(&scene, &handle), vec!["record 0 0 false"]);
}

#[test]
fn test_object_argument_identity() {
    let (mut scene, handle) = setup();
    let other = scene.spawn("Target");

    let events: EventSet = [
        BoundInvocation::new(handle, "target").with_argument(Some(ObjectRef::from(other))),
        BoundInvocation::new(handle, "target").with_argument(None::<ObjectRef>),
    ]
    .into_iter()
    .collect();
    events.invoke(&mut scene).unwrap();

    assert_eq!(
        calls(&scene, &handle),
        vec![format!("target #{}", other.0), "target none".to_string()]
    );
}

#[test]
fn test_private_and_non_unit_methods_are_invocable() {
    let (mut scene, handle) = setup();
    let events: EventSet = [
        BoundInvocation::new(handle, "secret").with_argument(4_i32),
        BoundInvocation::new(handle, "count"),
    ]
    .into_iter()
    .collect();

    let report = events.invoke(&mut scene).unwrap();
    assert_eq!(report.invoked, 2);
    assert_eq!(calls(&scene, &handle), vec!["secret 4"]);
}

#[test]
fn test_accessor_is_never_invoked() {
    let (mut scene, handle) = setup();
    let outcome = BoundInvocation::new(handle, "set_mode")
        .with_argument(FireMode::Auto)
        .invoke(&mut scene)
        .unwrap();

    assert!(!outcome.is_invoked());
    assert!(scene.get::<Recorder>(&handle).unwrap().mode.is_none());
}

#[test]
fn test_events_run_in_order_and_abort_on_error() {
    let (mut scene, handle) = setup();
    let mut events = EventSet::new();
    events.add_event(BoundInvocation::new(handle, "mark").with_argument("a".to_string()));
    events.add_event(BoundInvocation::new(handle, "fail").with_argument("boom".to_string()));
    events.add_event(BoundInvocation::new(handle, "mark").with_argument("c".to_string()));

    let err = events.invoke(&mut scene).unwrap_err();
    assert!(err.is_method_failure());
    assert_eq!(err.to_string(), "`fail` failed: boom");
    assert_eq!(calls(&scene, &handle), vec!["mark a", "fail"]);
}

#[test]
fn test_continue_policy_runs_everything() {
    let (mut scene, handle) = setup();
    let events: EventSet = [
        BoundInvocation::new(handle, "fail").with_argument("first".to_string()),
        BoundInvocation::new(handle, "nothing_here"),
        BoundInvocation::new(handle, "mark").with_argument("last".to_string()),
    ]
    .into_iter()
    .collect();

    let report = events
        .invoke_with_policy(&mut scene, FailurePolicy::Continue)
        .unwrap();
    assert_eq!(report.invoked, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 0);
    assert_eq!(calls(&scene, &handle), vec!["fail", "mark last"]);
}

#[test]
fn test_removed_event_no_longer_fires() {
    let (mut scene, handle) = setup();
    let first = BoundInvocation::new(handle, "mark").with_argument("one".to_string());
    let second = BoundInvocation::new(handle, "mark").with_argument("two".to_string());

    let mut events = EventSet::new();
    events.add_event(first.clone());
    events.add_event(second);
    assert!(events.remove_event(&first));
    events.invoke(&mut scene).unwrap();

    assert_eq!(calls(&scene, &handle), vec!["mark two"]);
}

#[test]
fn test_persisted_events_fire_after_reload() {
    let (mut scene, handle) = setup();
    let events: EventSet = [
        BoundInvocation::new(handle, "fire").with_argument(FireMode::Auto),
        BoundInvocation::new(handle, "record")
            .with_argument(3_i32)
            .with_argument(0.25_f32)
            .with_argument(false),
    ]
    .into_iter()
    .collect();

    let reloaded = EventSet::from_json(&events.to_json().unwrap()).unwrap();
    assert_eq!(reloaded, events);
    reloaded.invoke(&mut scene).unwrap();

    assert_eq!(calls(&scene, &handle), vec!["fire Auto", "record 3 0.25 false"]);
}

#[test]
fn test_invoker_component_fires_on_other_components() {
    let (mut scene, recorder) = setup();
    let events: EventSet = [BoundInvocation::new(recorder, "mark").with_argument("hit".to_string())]
        .into_iter()
        .collect();
    let button = scene.spawn("Button");
    let invoker = scene
        .attach(button, EventInvoker::new(events))
        .expect("button exists");

    let report = pulsar_events::invoker::fire(&mut scene, &invoker)
        .expect("invoker attached")
        .unwrap();
    assert!(report.is_clean());
    assert_eq!(calls(&scene, &recorder), vec!["mark hit"]);
}
