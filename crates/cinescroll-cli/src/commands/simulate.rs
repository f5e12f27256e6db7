use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use tracing::{info, warn};

use cinescroll_core::{
    effects::{Effect, FadeReveal, GalleryTrack, Parallax},
    engine::{FrameQueue, PageMetrics, ProgressSnapshot, ScrollEngine, SimulatedPage, WheelInput},
    AppConfig, FrameLoop,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Broadcast progress only
    Cinematic,
    /// Own the page offset and page horizontally near the end
    Paged,
}

pub struct Options {
    pub mode: EngineKind,
    pub document_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
    pub script: Option<PathBuf>,
    pub wheel: Option<String>,
    pub json: bool,
    pub realtime: bool,
    pub effects: bool,
}

/// One line of a simulation script
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Wheel(f64),
    Escape,
    Threshold(f64),
    Frames(usize),
    Debug(bool),
    /// Run frames until the engine is idle
    Settle,
}

/// Parse a script: one step per line, `#` starts a comment
///
/// Steps: `wheel <dy>` (or a bare number), `escape`, `threshold <v>`,
/// `frames <n>`, `debug on|off`, `settle`.
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .filter_map(|(n, line)| {
            let line = line.split('#').next().unwrap_or("").trim();
            (!line.is_empty()).then_some((n + 1, line))
        })
        .map(|(n, line)| parse_step(line).with_context(|| format!("line {}: '{}'", n, line)))
        .collect()
}

/// Parse comma-separated steps, e.g. `120,120,frames 10,escape`
pub fn parse_inline(steps: &str) -> Result<Vec<Step>> {
    parse_script(&steps.replace(',', "\n"))
}

fn parse_step(line: &str) -> Result<Step> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let arg = parts.next();
    if parts.next().is_some() {
        bail!("too many arguments");
    }

    let number = |arg: Option<&str>| -> Result<f64> {
        let raw = arg.ok_or_else(|| anyhow!("missing argument"))?;
        let value: f64 = raw.parse().with_context(|| format!("not a number: {}", raw))?;
        if !value.is_finite() {
            bail!("not a finite number: {}", raw);
        }
        Ok(value)
    };

    let step = match head.to_ascii_lowercase().as_str() {
        "wheel" => Step::Wheel(number(arg)?),
        "escape" | "esc" => Step::Escape,
        "threshold" => Step::Threshold(number(arg)?),
        "frames" => {
            let raw = arg.ok_or_else(|| anyhow!("missing argument"))?;
            Step::Frames(raw.parse().with_context(|| format!("not a frame count: {}", raw))?)
        }
        "debug" => match arg {
            Some("on") => Step::Debug(true),
            Some("off") => Step::Debug(false),
            _ => bail!("expected 'on' or 'off'"),
        },
        "settle" => Step::Settle,
        other => match other.parse::<f64>() {
            Ok(dy) if dy.is_finite() && arg.is_none() => Step::Wheel(dy),
            _ => bail!("unknown step"),
        },
    };
    Ok(step)
}

fn format_frame(
    frame: u64,
    snap: &ProgressSnapshot,
    json: bool,
    effects: Option<&[Box<dyn Effect>]>,
) -> String {
    if json {
        let mut line = serde_json::json!({ "frame": frame, "snapshot": snap });
        if let Some(effects) = effects {
            let transforms: serde_json::Map<_, _> = effects
                .iter()
                .map(|e| (e.name().to_string(), serde_json::json!(e.apply(snap))))
                .collect();
            line["effects"] = serde_json::Value::Object(transforms);
        }
        return line.to_string();
    }

    let mut out = format!(
        "frame {:>4}  progress {:.4}  momentum {:>8.3}  h-progress {:.4}  {}",
        frame,
        snap.progress,
        snap.momentum,
        snap.horizontal_progress,
        if snap.horizontal_active { "horizontal" } else { "vertical" }
    );
    if let Some(effects) = effects {
        for effect in effects {
            let t = effect.apply(snap);
            out.push_str(&format!(
                "\n           {:<14} x {:>8.2}  y {:>8.2}  scale {:.3}  opacity {:.3}",
                effect.name(),
                t.translate_x,
                t.translate_y,
                t.scale,
                t.opacity
            ));
        }
    }
    out
}

fn sample_effects(viewport_width: f64) -> Vec<Box<dyn Effect>> {
    vec![
        Box::new(Parallax {
            depth: 0.4,
            travel: 600.0,
        }) as Box<dyn Effect>,
        Box::new(FadeReveal {
            start: 0.1,
            end: 0.3,
            rise: 40.0,
        }) as Box<dyn Effect>,
        Box::new(GalleryTrack {
            panels: 4,
            panel_width: viewport_width,
        }) as Box<dyn Effect>,
    ]
}

pub async fn run(config: &AppConfig, options: Options) -> Result<()> {
    let steps = match (&options.script, &options.wheel) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            parse_script(&text)?
        }
        (None, Some(inline)) => parse_inline(inline)?,
        (None, None) => bail!("Provide a script with --script or inline steps with --wheel"),
    };

    let metrics = PageMetrics::new(
        options.document_height,
        options.viewport_height,
        options.viewport_width,
    );
    let page = SimulatedPage::new(metrics);
    let mut engine = match options.mode {
        EngineKind::Cinematic => {
            ScrollEngine::cinematic(page, FrameQueue::new(), &config.cinematic)
        }
        EngineKind::Paged => ScrollEngine::paged(page, FrameQueue::new(), &config.paged),
    };
    engine.init();

    info!(
        mode = ?options.mode,
        max_scrollable = metrics.max_scrollable(),
        steps = steps.len(),
        "Starting simulation"
    );

    let frame_counter = Rc::new(Cell::new(0u64));
    let counter = frame_counter.clone();
    let json = options.json;
    let effects = options
        .effects
        .then(|| sample_effects(options.viewport_width));
    let _printer = engine.subscribe(move |snap| {
        counter.set(counter.get() + 1);
        println!("{}", format_frame(counter.get(), snap, json, effects.as_deref()));
    });

    let mut frame_loop = FrameLoop::new(engine, &config.frame);

    for step in steps {
        match step {
            Step::Wheel(dy) => {
                frame_loop.engine_mut().wheel(WheelInput::new(dy));
            }
            Step::Escape => frame_loop.engine_mut().escape(),
            Step::Threshold(value) => {
                if let Err(e) = frame_loop.engine_mut().set_threshold(value) {
                    warn!("Ignoring threshold step: {}", e);
                }
            }
            Step::Debug(enabled) => frame_loop.engine_mut().set_debug(enabled),
            Step::Frames(n) => {
                for _ in 0..n {
                    if options.realtime {
                        frame_loop.step().await;
                    } else if frame_loop.run_once().is_none() {
                        break;
                    }
                }
            }
            Step::Settle => {
                settle(&mut frame_loop, options.realtime).await;
            }
        }
    }
    settle(&mut frame_loop, options.realtime).await;

    let mut engine = frame_loop.into_engine();
    let state = engine.state();
    info!(
        frames = frame_counter.get(),
        current = state.current,
        target = state.target,
        "Simulation finished"
    );
    engine.dispose();

    Ok(())
}

async fn settle(frame_loop: &mut FrameLoop<SimulatedPage>, realtime: bool) {
    if realtime {
        frame_loop.run_until_idle().await;
    } else {
        frame_loop.run_immediate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let steps = parse_script(
            "# warm up\nwheel 120\n-40\n\nframes 5  # a few frames\nthreshold 0.5\ndebug on\nescape\nsettle\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Wheel(120.0),
                Step::Wheel(-40.0),
                Step::Frames(5),
                Step::Threshold(0.5),
                Step::Debug(true),
                Step::Escape,
                Step::Settle,
            ]
        );
    }

    #[test]
    fn test_parse_inline() {
        let steps = parse_inline("120, 120,frames 3,esc").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Wheel(120.0),
                Step::Wheel(120.0),
                Step::Frames(3),
                Step::Escape
            ]
        );
    }

    #[test]
    fn test_json_frames_are_single_lines() {
        let snap = ProgressSnapshot {
            progress: 0.25,
            momentum: 3.5,
            horizontal_progress: 0.0,
            horizontal_active: false,
        };
        let effects = sample_effects(1600.0);
        let line = format_frame(7, &snap, true, Some(&effects));
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["frame"], 7);
        assert_eq!(value["snapshot"]["progress"], 0.25);
        assert!(value["effects"]["parallax"].is_object());
    }

    #[test]
    fn test_text_frame_lists_effects() {
        let snap = ProgressSnapshot {
            progress: 0.5,
            momentum: 0.0,
            horizontal_progress: 0.0,
            horizontal_active: false,
        };
        let effects = sample_effects(1600.0);
        let text = format_frame(1, &snap, false, Some(&effects));
        assert!(text.starts_with("frame    1  progress 0.5000"));
        assert_eq!(text.lines().count(), 1 + effects.len());
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_script("wheel 10\nwheel abc\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(parse_script("frames -1").is_err());
        assert!(parse_script("debug maybe").is_err());
        assert!(parse_script("wheel inf").is_err());
        assert!(parse_script("jump 3").is_err());
    }
}
