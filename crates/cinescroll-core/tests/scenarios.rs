//! End-to-end engine scenarios driven through a frame queue.

use std::cell::RefCell;
use std::rc::Rc;

use cinescroll_core::config::{CinematicConfig, PagedConfig};
use cinescroll_core::engine::{
    AxisMode, FrameQueue, Page, PageMetrics, ProgressSnapshot, ScrollEngine, SimulatedPage,
    WheelInput,
};

type Engine = ScrollEngine<SimulatedPage, FrameQueue>;

fn paged_engine(threshold: f64) -> Engine {
    let page = SimulatedPage::new(PageMetrics::new(3000.0, 1000.0, 500.0));
    let config = PagedConfig {
        enter_threshold: threshold,
        ..PagedConfig::default()
    };
    let mut engine = ScrollEngine::paged(page, FrameQueue::new(), &config);
    engine.init();
    engine
}

fn drain(engine: &mut Engine) -> Vec<ProgressSnapshot> {
    let mut out = Vec::new();
    while let Some(handle) = engine.scheduler_mut().take_due() {
        if let Some(snap) = engine.tick(handle) {
            out.push(snap);
        }
    }
    out
}

/// Scroll forward until horizontal mode engages
fn scroll_into_gallery(engine: &mut Engine) {
    for _ in 0..200 {
        engine.wheel(WheelInput::new(100.0));
        drain(engine);
        if engine.mode() == AxisMode::Horizontal {
            return;
        }
    }
    panic!("horizontal mode never engaged");
}

#[test]
fn forward_scroll_enters_and_backward_exits_horizontal_mode() {
    let mut engine = paged_engine(0.7);
    assert_eq!(engine.mode(), AxisMode::Vertical);

    scroll_into_gallery(&mut engine);
    assert!(engine.snapshot().progress >= 0.7 - 0.01);
    assert!(engine.horizontal().is_active);

    // Forward input now drives the gallery
    engine.wheel(WheelInput::new(200.0));
    drain(&mut engine);
    assert!(engine.horizontal().current > 0.0);

    engine.wheel(WheelInput::new(-10.0));
    assert_eq!(engine.mode(), AxisMode::Vertical);
    let horizontal = engine.horizontal();
    assert_eq!(horizontal.current, 0.0);
    assert_eq!(horizontal.target, 0.0);
    assert!(!horizontal.is_active);

    let frames = drain(&mut engine);
    assert!(frames.iter().all(|s| !s.horizontal_active));
}

#[test]
fn escape_returns_to_start() {
    let mut engine = paged_engine(0.7);
    scroll_into_gallery(&mut engine);

    while engine.horizontal().current < 150.0 {
        engine.wheel(WheelInput::new(200.0));
        drain(&mut engine);
    }
    assert!(engine.horizontal().current >= 150.0);

    engine.escape();
    assert_eq!(engine.mode(), AxisMode::Vertical);
    assert_eq!(engine.horizontal().current, 0.0);
    assert_eq!(engine.state().current, 0.0);
    assert_eq!(engine.state().target, 0.0);
    assert_eq!(engine.page().scroll_offset(), 0.0);

    // One sync frame even though nothing is moving
    let frames = drain(&mut engine);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].progress, 0.0);
    assert!(!frames[0].horizontal_active);
}

#[test]
fn lowered_threshold_engages_earlier() {
    let mut engine = paged_engine(0.7);
    engine.set_threshold(0.2).unwrap();
    scroll_into_gallery(&mut engine);
    assert!(engine.snapshot().progress < 0.7);
}

#[test]
fn zero_height_page_reports_zero_progress() {
    let page = SimulatedPage::new(PageMetrics::new(900.0, 900.0, 1440.0));
    let mut engine = ScrollEngine::paged(page, FrameQueue::new(), &PagedConfig::default());
    engine.init();

    for delta in [100.0, 5000.0, -300.0, 1e9] {
        engine.wheel(WheelInput::new(delta));
        for snap in drain(&mut engine) {
            assert_eq!(snap.progress, 0.0);
        }
    }
    assert_eq!(engine.state().current, 0.0);
}

#[test]
fn failing_subscriber_does_not_starve_others() {
    let page = SimulatedPage::new(PageMetrics::new(4000.0, 1000.0, 1600.0));
    let mut engine =
        ScrollEngine::cinematic(page, FrameQueue::new(), &CinematicConfig::default());
    engine.init();

    let first = Rc::new(RefCell::new(Vec::new()));
    let third = Rc::new(RefCell::new(Vec::new()));

    let f = first.clone();
    let _a = engine.subscribe(move |snap| f.borrow_mut().push(*snap));
    let _b = engine.subscribe(|_| panic!("subscriber blew up"));
    let t = third.clone();
    let _c = engine.subscribe(move |snap| t.borrow_mut().push(*snap));

    engine.wheel(WheelInput::new(100.0));
    let frames = drain(&mut engine);

    assert!(!frames.is_empty());
    assert_eq!(*first.borrow(), frames);
    assert_eq!(*third.borrow(), frames);
}

#[test]
fn unsubscribed_consumer_stops_receiving() {
    let page = SimulatedPage::new(PageMetrics::new(4000.0, 1000.0, 1600.0));
    let mut engine =
        ScrollEngine::cinematic(page, FrameQueue::new(), &CinematicConfig::default());
    engine.init();

    let hits = Rc::new(RefCell::new(0));
    let h = hits.clone();
    let sub = engine.subscribe(move |_| *h.borrow_mut() += 1);

    engine.wheel(WheelInput::new(100.0));
    let handle = engine.scheduler_mut().take_due().unwrap();
    engine.tick(handle);
    assert_eq!(*hits.borrow(), 1);

    sub.unsubscribe();
    sub.unsubscribe();
    drain(&mut engine);
    assert_eq!(*hits.borrow(), 1);
}
