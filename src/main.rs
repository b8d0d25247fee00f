//! locsearch - pick a location from history or a live search

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use locsearch::action::Action;
use locsearch::api::{Geocoder, IpLocator};
use locsearch::components::{Component, SearchScreen, SearchScreenProps};
use locsearch::effect::Effect;
use locsearch::history::{HistoryStore, default_history_path};
use locsearch::logging::{default_log_path, init_tracing};
use locsearch::reducer::reducer;
use locsearch::service::{
    AppLocationService, Collaborators, DeviceLocator, FixedLocator, SelectionSlot,
};
use locsearch::state::{AppState, Coordinates, SPINNER_TICK_MS};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

/// Location search TUI
#[derive(Parser, Debug)]
#[command(name = "locsearch")]
#[command(about = "Pick a location from recent history or a live geocoding search")]
struct Args {
    /// Initial search text
    #[arg(long, default_value = "")]
    query: String,

    /// History file (defaults to the user data directory)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Fixed "current location" as LAT,LON instead of IP geolocation
    #[arg(long, value_parser = parse_position)]
    position: Option<Coordinates>,

    /// Log file (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

fn parse_position(value: &str) -> Result<Coordinates, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{value}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{lon}': {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("position out of range: {lat},{lon}"));
    }
    Ok(Coordinates { lat, lon })
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum LocSearchComponentId {
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum LocSearchContext {
    Search,
}

impl EventRoutingState<LocSearchComponentId, LocSearchContext> for AppState {
    fn focused(&self) -> Option<LocSearchComponentId> {
        Some(LocSearchComponentId::Search)
    }

    fn modal(&self) -> Option<LocSearchComponentId> {
        None
    }

    fn binding_context(&self, id: LocSearchComponentId) -> LocSearchContext {
        match id {
            LocSearchComponentId::Search => LocSearchContext::Search,
        }
    }

    fn default_context(&self) -> LocSearchContext {
        LocSearchContext::Search
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        query,
        history,
        position,
        log_file,
        debug: debug_args,
    } = Args::parse();

    let log_path = log_file.unwrap_or_else(default_log_path);
    if let Err(err) = init_tracing(&log_path) {
        eprintln!(
            "warning: logging disabled, cannot write {}: {err}",
            log_path.display()
        );
    }

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::with_query(query))
        })
        .await
        .map_err(debug_error)?;

    let history = HistoryStore::new(history.unwrap_or_else(default_history_path));
    tracing::info!(history = %history.path().display(), "starting location search");

    let selection = SelectionSlot::default();
    let service = AppLocationService::new(Geocoder::new(), history, selection.clone());
    let locator: Arc<dyn DeviceLocator> = match position {
        Some(coords) => Arc::new(FixedLocator(coords)),
        None => Arc::new(IpLocator::new()),
    };
    let collaborators = Collaborators::new(Arc::new(service), locator);

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, collaborators).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    if let Some(place) = selection.take().await {
        println!("{}", serde_json::to_string(&place).map_err(io::Error::other)?);
    }

    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    collaborators: Collaborators,
) -> io::Result<DebugRunOutput<AppState>> {
    let screen = Rc::new(RefCell::new(SearchScreen::new()));
    let mut bus: EventBus<AppState, Action, LocSearchComponentId, LocSearchContext> =
        EventBus::new();
    let keybindings: Keybindings<LocSearchContext> = Keybindings::new();

    let screen_events = Rc::clone(&screen);
    bus.register(LocSearchComponentId::Search, move |event, state| {
        let props = SearchScreenProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = screen_events
            .borrow_mut()
            .handle_event(&event.kind, props)
            .into_iter()
            .collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                render(&mut screen.borrow_mut(), frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, &collaborators),
        )
        .await
}

fn render(
    screen: &mut SearchScreen,
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    render_ctx: RenderContext,
    event_ctx: &mut EventContext<LocSearchComponentId>,
) {
    event_ctx.set_component_area(LocSearchComponentId::Search, area);
    let props = SearchScreenProps {
        state,
        is_focused: render_ctx.is_focused(),
    };
    screen.render(frame, area, props);
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, collaborators: &Collaborators) {
    let key = effect.task_key();
    tracing::debug!(task = %key, ?effect, "spawning effect task");
    ctx.tasks()
        .spawn(TaskKey::new(key), effect.run(collaborators.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(
            parse_position("10.0, 20.5"),
            Ok(Coordinates {
                lat: 10.0,
                lon: 20.5
            })
        );
        assert!(parse_position("10.0").is_err());
        assert!(parse_position("north,20").is_err());
        assert!(parse_position("95,20").is_err());
    }

    #[test]
    fn test_cli_parses_position_and_query() {
        let args = Args::try_parse_from(["locsearch", "--query", "Par", "--position", "1,2"])
            .unwrap();
        assert_eq!(args.query, "Par");
        assert_eq!(args.position, Some(Coordinates { lat: 1.0, lon: 2.0 }));
    }
}
