//! Counter - hooks, keyed lists and layout in a terminal.
//!
//! `+`/`-` change the counter, `r` resets it, `q` or Esc quits.
//! Logs go to stderr; filter them with `RUST_LOG`.
//!
//! Run with: cargo run --example counter 2>counter.log

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use spark_scene::host::TEXT_TAG;
use spark_scene::renderer::paint;
use spark_scene::types::Size;
use spark_scene::{
    Component, Config, DefaultTheme, Direction, DiffRenderer, FrameBuffer, Justify, MemoryHost, NodeId, Overflow,
    Runtime, Setter, Style, ThemeOverride, element, text, view,
};
use tracing::info;

const ACCENT: u32 = 0x7aa2f7;
const MUTED: u32 = 0x565f89;

type Controls = Rc<RefCell<Option<Setter<i64>>>>;

fn counter(controls: Controls) -> Component {
    Component::from_closure("Counter", move |cx, _, _| {
        let (count, set) = cx.use_state(|| 0i64);
        *controls.borrow_mut() = Some(set);

        let history = cx.use_ref(Vec::<i64>::new);
        cx.use_effect(count, {
            let history = history.clone();
            move || {
                let mut history = history.borrow_mut();
                history.push(count);
                if history.len() > 5 {
                    history.remove(0);
                }
                None
            }
        });

        let rows = history
            .borrow()
            .iter()
            .rev()
            .map(|&value| {
                view()
                    .key(value)
                    .child(element("text").text(format!("was {value}")).style(Style::new().color(MUTED)))
                    .build()
            })
            .collect::<Vec<_>>();

        Some(
            view()
                .style(Style::new().padding(1.0).gap(1.0).width(40.0).overflow(Overflow::Hidden))
                .child(
                    view()
                        .style(Style::new().direction(Direction::Row).justify(Justify::SpaceBetween))
                        .child(text("spark-scene"))
                        .child(text(format!("count: {count}"))),
                )
                .child(view().children(rows))
                .child(text("+/- change, r reset, q quit"))
                .build(),
        )
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (width, height) = terminal::size()?;
    let mut host = MemoryHost::new();
    let root = host.create_root(Size::new(width as f32, height as f32));

    let theme = ThemeOverride::new().tag(TEXT_TAG, Style::new().color(ACCENT));
    let runtime = Runtime::new(host, Config::default()).with_theme(DefaultTheme::new(theme));

    let controls: Controls = Rc::new(RefCell::new(None));
    let handle = runtime.mount(root, counter(controls.clone()).node())?;

    let mut renderer = DiffRenderer::stdout();
    let mut buffer = FrameBuffer::new(width, height);
    terminal::enable_raw_mode()?;
    renderer.enter_fullscreen()?;

    let result = run(&runtime, root, &controls, &mut renderer, &mut buffer);

    renderer.exit_fullscreen()?;
    terminal::disable_raw_mode()?;
    handle.unmount()?;
    result
}

fn run(
    runtime: &Runtime<MemoryHost>,
    root: NodeId,
    controls: &Controls,
    renderer: &mut DiffRenderer,
    buffer: &mut FrameBuffer,
) -> Result<(), Box<dyn Error>> {
    let mut dirty = true;
    loop {
        if runtime.tick()? > 0 {
            dirty = true;
        }
        if dirty {
            runtime.with_host(|host| paint(host, root, buffer))?;
            renderer.render(buffer)?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(set) = controls.borrow().clone() else {
                    continue;
                };
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('+') | KeyCode::Up => set.update(|n| n + 1),
                    KeyCode::Char('-') | KeyCode::Down => set.update(|n| n - 1),
                    KeyCode::Char('r') => set.set(0),
                    _ => {}
                }
            }
            Event::Resize(width, height) => {
                info!(width, height, "resize");
                runtime.with_host_mut(|host| host.resize_root(root, Size::new(width as f32, height as f32)))?;
                runtime.resize(&root)?;
                *buffer = FrameBuffer::new(width, height);
                renderer.render_full(buffer)?;
                dirty = true;
            }
            _ => {}
        }
    }
    Ok(())
}
