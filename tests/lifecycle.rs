//! Registration bookkeeping of a mounted field, checked against a host that
//! records every draw call.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use sparkfield::host::{EventSource, FrameScheduler, SurfaceProvider};
use sparkfield::prelude::*;
use sparkfield::{CommandRecorder, DrawCommand, FrameHandle, ListenerHandle};

#[derive(Default)]
struct RecordingState {
    size: Size,
    next_id: u64,
    frames: BTreeSet<FrameHandle>,
    listeners: BTreeSet<ListenerHandle>,
    attached: usize,
    detached: Vec<CommandRecorder>,
    canceled: Vec<FrameHandle>,
}

#[derive(Clone, Default)]
struct RecordingHost {
    state: Rc<RefCell<RecordingState>>,
    now: Rc<RefCell<Duration>>,
}

impl RecordingHost {
    fn new(size: Size) -> Self {
        let host = Self::default();
        host.state.borrow_mut().size = size;
        host
    }

    fn fire(&self) -> (Vec<FrameHandle>, Duration) {
        let mut now = self.now.borrow_mut();
        *now += Duration::from_millis(16);
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        (frames.into_iter().collect(), *now)
    }

    fn id(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl SurfaceProvider for RecordingHost {
    type Surface = CommandRecorder;

    fn measure(&self) -> Size {
        self.state.borrow().size
    }

    fn set_background(&mut self, _background: Color) {}

    fn create_surface(&mut self, _id: &str, size: Size) -> Option<CommandRecorder> {
        self.state.borrow_mut().attached += 1;
        Some(CommandRecorder::new(size.width, size.height))
    }

    fn detach_surface(&mut self, surface: CommandRecorder) {
        let mut state = self.state.borrow_mut();
        state.attached -= 1;
        state.detached.push(surface);
    }
}

impl FrameScheduler for RecordingHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.id());
        self.state.borrow_mut().frames.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        state.frames.remove(&handle);
        state.canceled.push(handle);
    }
}

impl EventSource for RecordingHost {
    fn listen(&mut self, _kind: EventKind) -> ListenerHandle {
        let handle = ListenerHandle(self.id());
        self.state.borrow_mut().listeners.insert(handle);
        handle
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        self.state.borrow_mut().listeners.remove(&handle);
    }
}

fn run_frames(host: &RecordingHost, sparkles: &mut Sparkles<RecordingHost>, n: usize) -> usize {
    let mut rendered = 0;
    for _ in 0..n {
        let (frames, now) = host.fire();
        for frame in frames {
            if sparkles.on_frame(frame, now) {
                rendered += 1;
            }
        }
    }
    rendered
}

#[test]
fn rendered_frame_draws_three_layers_per_particle() {
    let host = RecordingHost::new(Size::new(200, 200));
    let mut sparkles =
        Sparkles::mount_with_source(host.clone(), SparklesConfig::default(), &mut SeededSource::new(5)).unwrap();
    let count = sparkles.particles().len();
    assert_eq!(count, 180);

    // the first host frame at 16ms is inside the throttle interval
    assert_eq!(run_frames(&host, &mut sparkles, 1), 0);
    assert_eq!(run_frames(&host, &mut sparkles, 1), 1);

    let commands = sparkles.surface().unwrap().commands();
    assert_eq!(commands[0], DrawCommand::Clear);
    let fills = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
        .count();
    assert_eq!(fills, count * 3);
}

#[test]
fn teardown_stops_all_drawing() {
    let host = RecordingHost::new(Size::new(200, 120));
    let mut sparkles =
        Sparkles::mount_with_source(host.clone(), SparklesConfig::default(), &mut SeededSource::new(5)).unwrap();
    assert!(run_frames(&host, &mut sparkles, 30) > 0);

    let pending = sparkles.resources().unwrap().frame().unwrap();
    sparkles.unmount();

    let state = host.state.borrow();
    assert_eq!(state.canceled, vec![pending]);
    assert!(state.frames.is_empty());
    assert!(state.listeners.is_empty());
    assert_eq!(state.attached, 0);
    assert_eq!(state.detached.len(), 1);
    let draws_at_teardown = state.detached[0].commands().len();
    drop(state);

    for _ in 0..60 {
        let (frames, _) = host.fire();
        assert!(frames.is_empty());
    }
    assert_eq!(host.state.borrow().detached[0].commands().len(), draws_at_teardown);
}

#[test]
fn reconfigure_releases_old_resources_once() {
    let host = RecordingHost::new(Size::new(200, 120));
    let mut sparkles =
        Sparkles::mount_with_source(host.clone(), SparklesConfig::default(), &mut SeededSource::new(5)).unwrap();
    let old_frame = sparkles.resources().unwrap().frame().unwrap();

    sparkles
        .reconfigure_with_source(SparklesConfig::backdrop(), &mut SeededSource::new(6))
        .unwrap();

    {
        let state = host.state.borrow();
        assert_eq!(state.canceled, vec![old_frame]);
        assert_eq!(state.detached.len(), 1);
        assert_eq!(state.attached, 1);
        assert_eq!(state.listeners.len(), 1);
        assert_eq!(state.frames.len(), 1);
    }

    // a late delivery of the old registration draws nothing
    assert!(!sparkles.on_frame(old_frame, Duration::from_secs(10)));

    drop(sparkles);
    let state = host.state.borrow();
    assert_eq!(state.canceled.len(), 2);
    assert_eq!(state.detached.len(), 2);
    assert_eq!(state.attached, 0);
    assert!(state.listeners.is_empty());
}

#[test]
fn rejected_reconfigure_leaves_field_released() {
    let host = RecordingHost::new(Size::new(200, 120));
    let mut sparkles =
        Sparkles::mount_with_source(host.clone(), SparklesConfig::default(), &mut SeededSource::new(5)).unwrap();

    let bad = SparklesConfig::default().with_twinkle_range(0.9, 0.1);
    assert!(sparkles.reconfigure(bad).is_err());
    assert!(!sparkles.is_running());
    assert_eq!(host.state.borrow().detached.len(), 1);

    drop(sparkles);
    assert_eq!(host.state.borrow().detached.len(), 1);
    assert_eq!(host.state.borrow().canceled.len(), 1);
}

#[test]
fn teardown_during_unwinding_releases() {
    let host = RecordingHost::new(Size::new(100, 100));
    let inner = host.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _sparkles = Sparkles::mount(inner, SparklesConfig::default()).unwrap();
        panic!("render callback failed");
    }));
    assert!(result.is_err());

    let state = host.state.borrow();
    assert!(state.frames.is_empty());
    assert!(state.listeners.is_empty());
    assert_eq!(state.attached, 0);
}

#[test]
fn resize_burst_resizes_surface_once() {
    let host = RecordingHost::new(Size::new(100, 100));
    let mut sparkles =
        Sparkles::mount_with_source(host.clone(), SparklesConfig::default(), &mut SeededSource::new(5)).unwrap();

    host.state.borrow_mut().size = Size::new(400, 300);
    // ten notifications within 50ms
    for i in 0..10 {
        sparkles.on_resize(Duration::from_millis(500 + i * 5));
    }
    let applied = (0..100)
        .filter(|i| sparkles.poll(Duration::from_millis(500 + i * 10)))
        .count();
    assert_eq!(applied, 1);
    assert_eq!(sparkles.surface().unwrap().size(), (400, 300));

    // after the next rendered step every particle is inside the new bounds
    run_frames(&host, &mut sparkles, 5);
    for p in sparkles.particles() {
        assert!(p.position.x >= 0.0 && p.position.x < 400.0);
        assert!(p.position.y >= 0.0 && p.position.y < 300.0);
    }
}
