use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex_explorer::action::Action;
use pokedex_explorer::api;
use pokedex_explorer::config::ExplorerConfig;
use pokedex_explorer::effect::{batch_task_key, page_task_key, Effect};
use pokedex_explorer::generation;
use pokedex_explorer::reducer::reducer;
use pokedex_explorer::state::{AppState, Screen};
use pokedex_explorer::ui::{ExplorerComponentId, ExplorerUi};

#[derive(Parser, Debug)]
#[command(name = "pokedex-explorer")]
#[command(about = "Browse the Pokedex by generation in the terminal")]
struct Args {
    /// API base URL (overrides POKEDEX_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Entries per list page (overrides POKEDEX_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<String>,

    /// Open a generation (1-8) directly instead of the selector
    #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=8))]
    generation: Option<u8>,

    /// Write logs to this file; logging is off without it
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum ExplorerContext {
    Generations,
    DexList,
    Search,
    Detail,
}

impl EventRoutingState<ExplorerComponentId, ExplorerContext> for AppState {
    fn focused(&self) -> Option<ExplorerComponentId> {
        if self.dex.search.active {
            return Some(ExplorerComponentId::Search);
        }
        if self.detail.is_some() {
            return Some(ExplorerComponentId::Detail);
        }
        match self.screen {
            Screen::Generations => Some(ExplorerComponentId::Generations),
            Screen::Pokedex => Some(ExplorerComponentId::DexList),
        }
    }

    fn modal(&self) -> Option<ExplorerComponentId> {
        if self.dex.search.active {
            Some(ExplorerComponentId::Search)
        } else if self.detail.is_some() {
            Some(ExplorerComponentId::Detail)
        } else {
            None
        }
    }

    fn binding_context(&self, id: ExplorerComponentId) -> ExplorerContext {
        match id {
            ExplorerComponentId::Generations => ExplorerContext::Generations,
            ExplorerComponentId::DexList => ExplorerContext::DexList,
            ExplorerComponentId::Search => ExplorerContext::Search,
            ExplorerComponentId::Detail => ExplorerContext::Detail,
        }
    }

    fn default_context(&self) -> ExplorerContext {
        ExplorerContext::Generations
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref(), args.verbose)?;

    let config = ExplorerConfig::from_env()
        .and_then(|config| config.with_overrides(args.api_url.clone(), args.page_size.clone()))
        .map_err(|err| io::Error::other(format!("configuration error: {err}")))?;
    tracing::info!(
        api = %config.api_base,
        page_size = config.page_size,
        generation = ?args.generation,
        "starting explorer"
    );
    api::install_client(&config);

    let debug = DebugSession::new(args.debug);
    let page_size = config.page_size;
    let start = args.generation.and_then(generation::generation).map(|gen| gen.number);
    let state = debug
        .load_state_or_else_async(move || async move {
            let state = match start {
                Some(number) => AppState::with_start(page_size, Some(number)),
                None => AppState::new(page_size),
            };
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

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
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("explorer stopped");
    Ok(())
}

/// Routes tracing output to `log_file`. Without one nothing is installed,
/// so the terminal UI never gets log lines painted over it.
fn init_tracing(log_file: Option<&PathBuf>, verbose: u8) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pokedex_explorer={level},warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
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
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(ExplorerUi::new()));
    let mut bus: EventBus<AppState, Action, ExplorerComponentId, ExplorerContext> =
        EventBus::new();
    let keybindings: Keybindings<ExplorerContext> = Keybindings::new();

    let ui_generations = Rc::clone(&ui);
    bus.register(ExplorerComponentId::Generations, move |event, state| {
        ui_generations
            .borrow_mut()
            .handle_generations_event(&event.kind, state)
    });

    let ui_list = Rc::clone(&ui);
    bus.register(ExplorerComponentId::DexList, move |event, state| {
        ui_list.borrow_mut().handle_list_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(ExplorerComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(ExplorerComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Char('q') if !state.dex.search.active => {
                HandlerResponse::action(Action::Quit)
            }
            _ => HandlerResponse::ignored(),
        },
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
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadPage {
            session,
            offset,
            limit,
        } => {
            ctx.tasks()
                .spawn(TaskKey::new(page_task_key(session)), async move {
                    match api::client().fetch_list_page(offset, limit).await {
                        Ok(page) => Action::PageDidLoad { session, page },
                        Err(error) => Action::PageDidError {
                            session,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::LoadBatch {
            session,
            seq,
            names,
        } => {
            ctx.tasks()
                .spawn(TaskKey::new(batch_task_key(session, seq)), async move {
                    match api::client().fetch_batch(&names).await {
                        Ok(details) => Action::BatchDidLoad { session, details },
                        Err(error) => Action::BatchDidError {
                            session,
                            names,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::CancelSession { session, batches } => {
            tracing::debug!(session, batches, "cancelling view tasks");
            ctx.tasks().cancel(&TaskKey::new(page_task_key(session)));
            for seq in 0..batches {
                ctx.tasks()
                    .cancel(&TaskKey::new(batch_task_key(session, seq)));
            }
        }
        Effect::LoadPokemon { name } => {
            ctx.tasks()
                .spawn(TaskKey::new("detail_pokemon"), async move {
                    match api::client().fetch_pokemon(&name).await {
                        Ok(detail) => Action::PokemonDidLoad { name, detail },
                        Err(error) => Action::PokemonDidError {
                            name,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::LoadSpecies { name } => {
            ctx.tasks()
                .spawn(TaskKey::new("detail_species"), async move {
                    match api::client().fetch_species(&name).await {
                        Ok(species) => Action::SpeciesDidLoad { name, species },
                        Err(error) => Action::SpeciesDidError {
                            name,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::LoadEvolutionChain { name, id } => {
            ctx.tasks()
                .spawn(TaskKey::new("detail_evolution"), async move {
                    match api::client().fetch_evolution_chain(id).await {
                        Ok(chain) => Action::EvolutionDidLoad { name, chain },
                        Err(error) => Action::EvolutionDidError {
                            name,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::LoadEvolutionStep { name, id } => {
            let key = format!("evo_step_{id}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::client().fetch_pokemon(&id.to_string()).await {
                    Ok(detail) => Action::EvolutionStepDidLoad { name, id, detail },
                    Err(error) => Action::EvolutionStepDidError {
                        name,
                        id,
                        error: error.to_string(),
                    },
                }
            });
        }
    }
}
