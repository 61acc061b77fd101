use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventContext, EventKind, HandlerResponse, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    centered_rect, BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::evolution::{self, EvolutionToken};
use crate::generation::GENERATIONS;
use crate::resolver::Visible;
use crate::state::{AppState, DetailTab, DetailView, DexView, PokemonDetail, PokemonStat, Screen};
use crate::types::{type_color, type_text_color};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_PANEL_ALT: Color = Color::Rgb(26, 40, 58);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(226, 98, 98);

/// Base stat ceiling used to scale stat bars.
pub const STAT_MAX: u16 = 255;
const STAT_BAR_WIDTH: usize = 24;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExplorerComponentId {
    Generations,
    DexList,
    Search,
    Detail,
}

pub struct ExplorerUi {
    generation_list: SelectList,
    dex_list: SelectList,
    status_bar: StatusBar,
}

impl Default for ExplorerUi {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorerUi {
    pub fn new() -> Self {
        Self {
            generation_list: SelectList::new(),
            dex_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<ExplorerComponentId>,
    ) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state, event_ctx);
        match state.screen {
            Screen::Generations => {
                event_ctx.component_areas.remove(&ExplorerComponentId::DexList);
                render_generations(frame, layout[1], state, event_ctx, &mut self.generation_list);
            }
            Screen::Pokedex => {
                event_ctx
                    .component_areas
                    .remove(&ExplorerComponentId::Generations);
                render_dex(frame, layout[1], state, event_ctx, &mut self.dex_list);
            }
        }
        render_footer(frame, layout[2], state, &mut self.status_bar);

        match state.detail.as_ref() {
            Some(detail) => render_detail(frame, area, state, detail, event_ctx),
            None => {
                event_ctx.component_areas.remove(&ExplorerComponentId::Detail);
            }
        }
    }

    pub fn handle_generations_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_generations_event(event, state, &mut self.generation_list)
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.dex_list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_detail_event(event, state)
    }
}

pub fn handle_generations_event(
    event: &EventKind,
    state: &AppState,
    generation_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Enter => vec![Action::GenerationOpen],
            crossterm::event::KeyCode::Char('j') => vec![Action::GenerationMove(1)],
            crossterm::event::KeyCode::Char('k') => vec![Action::GenerationMove(-1)],
            _ => {
                let items = generation_items();
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.generation_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(None),
                    behavior: SelectListBehavior {
                        show_scrollbar: false,
                        wrap_navigation: false,
                    },
                    on_select: Action::GenerationSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = generation_list
                    .handle_event(event, props)
                    .into_iter()
                    .collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::GenerationMove(*delta as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    dex_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Enter => vec![Action::DexActivate],
            crossterm::event::KeyCode::Esc if !state.dex.search.query.is_empty() => {
                vec![Action::SearchCancel]
            }
            crossterm::event::KeyCode::Esc | crossterm::event::KeyCode::Char('b') => {
                vec![Action::DexClose]
            }
            crossterm::event::KeyCode::Char('/') => vec![Action::SearchStart],
            crossterm::event::KeyCode::Char('m') => vec![Action::DexLoadMore],
            crossterm::event::KeyCode::Char('r') => vec![Action::DexRetry],
            crossterm::event::KeyCode::Char('[') => vec![Action::TypeFilterPrev],
            crossterm::event::KeyCode::Char(']') => vec![Action::TypeFilterNext],
            crossterm::event::KeyCode::Char('c') => vec![Action::TypeFilterClear],
            crossterm::event::KeyCode::PageDown => vec![Action::SelectionPage(1)],
            crossterm::event::KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            crossterm::event::KeyCode::Home | crossterm::event::KeyCode::Char('g') => {
                vec![Action::SelectionJumpTop]
            }
            crossterm::event::KeyCode::End | crossterm::event::KeyCode::Char('G') => {
                vec![Action::SelectionJumpBottom]
            }
            crossterm::event::KeyCode::Char('j') => vec![Action::SelectionMove(1)],
            crossterm::event::KeyCode::Char('k') => vec![Action::SelectionMove(-1)],
            _ => {
                let items = dex_items(&state.dex);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.dex.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: true,
                    style: list_style(None),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::DexSelect,
                    render_item: &|item| item.clone(),
                };
                let actions: Vec<_> = dex_list.handle_event(event, props).into_iter().collect();
                return handler_response(actions);
            }
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_detail_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    let Some(detail) = state.detail.as_ref() else {
        return HandlerResponse::ignored();
    };
    let on_evolution = detail.tab == DetailTab::Evolution;
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc
            | crossterm::event::KeyCode::Backspace
            | crossterm::event::KeyCode::Char('x') => vec![Action::DetailClose],
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::DetailPrev]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::DetailNext]
            }
            crossterm::event::KeyCode::Tab => vec![Action::DetailTabNext],
            crossterm::event::KeyCode::BackTab => vec![Action::DetailTabPrev],
            crossterm::event::KeyCode::Up | crossterm::event::KeyCode::Char('k')
                if on_evolution =>
            {
                vec![Action::EvolutionSelect(
                    detail.evolution_index.saturating_sub(1),
                )]
            }
            crossterm::event::KeyCode::Down | crossterm::event::KeyCode::Char('j')
                if on_evolution =>
            {
                vec![Action::EvolutionSelect(detail.evolution_index + 1)]
            }
            crossterm::event::KeyCode::Enter if on_evolution => vec![Action::EvolutionOpen],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<ExplorerComponentId>,
) {
    if state.dex.search.active {
        event_ctx.set_component_area(ExplorerComponentId::Search, area);
    } else {
        event_ctx.component_areas.remove(&ExplorerComponentId::Search);
    }
    let title_style = Style::default()
        .fg(ACCENT_TEAL)
        .add_modifier(Modifier::BOLD);

    let line = match state.screen {
        Screen::Generations => Line::from(vec![
            Span::styled("CHOOSE A GENERATION", title_style),
            Span::raw("  |  "),
            Span::styled(
                format!("{} generations + National Dex", GENERATIONS.len()),
                Style::default().fg(TEXT_DIM),
            ),
        ]),
        Screen::Pokedex => {
            let dex = &state.dex;
            let filter = dex
                .type_filter
                .as_deref()
                .map(|name| name.to_ascii_uppercase())
                .unwrap_or_else(|| "ALL".to_string());
            let search = if dex.search.active {
                format!("/{}_", dex.search.query)
            } else if dex.search.query.is_empty() {
                "/".to_string()
            } else {
                format!("/{}", dex.search.query)
            };
            let collected = match dex.scope {
                Some(scope) => format!(
                    "{}/{}",
                    dex.catalog.count_in_scope(scope),
                    scope.size()
                ),
                None => dex.catalog.len().to_string(),
            };
            let filter_style = if dex.search.has_query() {
                Style::default().fg(TEXT_DIM)
            } else {
                Style::default().fg(ACCENT_GOLD)
            };
            let range = dex
                .scope
                .map(|scope| format!("  #{} - #{}", scope.start, scope.end))
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(dex.title().to_ascii_uppercase(), title_style),
                Span::styled(range, Style::default().fg(TEXT_DIM)),
                Span::raw("  |  Collected: "),
                Span::styled(collected, Style::default().fg(ACCENT_GOLD)),
                Span::raw("  |  Type: "),
                Span::styled(filter, filter_style),
                Span::raw("  |  Search: "),
                Span::styled(search, Style::default().fg(ACCENT_TEAL)),
            ])
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POKEDEX EXPLORER");
    let paragraph = Paragraph::new(line)
        .block(block)
        .style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(paragraph, area);
}

fn render_generations(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<ExplorerComponentId>,
    generation_list: &mut SelectList,
) {
    event_ctx.set_component_area(ExplorerComponentId::Generations, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("GENERATIONS")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(state.detail.is_none()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = generation_items();
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.generation_index.min(items.len().saturating_sub(1)),
        is_focused: state.detail.is_none(),
        style: list_style(None),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: false,
        },
        on_select: Action::GenerationSelect,
        render_item: &|item| item.clone(),
    };
    generation_list.render(frame, inner, props);
}

fn generation_items() -> Vec<Line<'static>> {
    let mut items: Vec<Line<'static>> = GENERATIONS
        .iter()
        .map(|gen| {
            Line::from(vec![
                Span::styled(
                    format!("{:<28}", gen.title()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("#{:03}-#{:03}  ", gen.start, gen.end),
                    Style::default().fg(ACCENT_GOLD),
                ),
                Span::styled(gen.blurb, Style::default().fg(TEXT_DIM)),
            ])
        })
        .collect();
    items.push(Line::from(vec![
        Span::styled(
            format!("{:<28}", "National Dex"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("every pokemon, ", Style::default().fg(ACCENT_GOLD)),
        Span::styled("loaded a page at a time", Style::default().fg(TEXT_DIM)),
    ]));
    items
}

fn render_dex(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    event_ctx: &mut EventContext<ExplorerComponentId>,
    dex_list: &mut SelectList,
) {
    event_ctx.set_component_area(ExplorerComponentId::DexList, area);
    let dex = &state.dex;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(dex_list_title(dex))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(focus_border(
            state.detail.is_none() && !dex.search.active,
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(message) = dex_placeholder(state) {
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let items = dex_items(dex);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.dex.selected_index.min(items.len().saturating_sub(1)),
        is_focused: state.detail.is_none() && !dex.search.active,
        style: list_style(None),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::DexSelect,
        render_item: &|item| item.clone(),
    };
    dex_list.render(frame, inner, props);
}

fn dex_list_title(dex: &DexView) -> String {
    if dex.search.has_query() {
        format!("SEARCH ({})", dex.visible().len())
    } else {
        format!("POKEMON ({})", dex.visible().len())
    }
}

/// Full-panel message shown instead of the list, if any.
pub fn dex_placeholder(state: &AppState) -> Option<Text<'static>> {
    let dex = &state.dex;
    if let Some(error) = dex.list_error.as_deref() {
        return Some(Text::from(vec![
            Line::from(Span::styled(
                "Failed to load the Pokémon list.",
                Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(error.to_string(), Style::default().fg(TEXT_DIM))),
            Line::from(" "),
            Line::from(Span::styled(
                "Press r to retry",
                Style::default().fg(ACCENT_GOLD),
            )),
        ]));
    }
    if dex.is_initial_loading() {
        return Some(Text::from(Line::from(Span::styled(
            format!("{} Loading Pokédex...", spinner(state.tick)),
            Style::default().fg(ACCENT_TEAL),
        ))));
    }
    let visible = dex.visible();
    if !visible.is_empty() {
        return None;
    }
    let message = if let Some(query) = crate::resolver::normalize_query(&dex.search.query) {
        format!("No Pokémon found for \u{201c}{query}\u{201d}")
    } else if let Some(filter) = dex
        .type_filter
        .as_deref()
        .filter(|name| *name != crate::types::ALL_TYPES)
    {
        format!(
            "No Pokémon match the selected filters ({})",
            format_name(filter)
        )
    } else if state.is_busy() {
        format!("{} Collecting Pokémon...", spinner(state.tick))
    } else {
        "No Pokémon loaded yet".to_string()
    };
    Some(Text::from(Line::from(Span::styled(
        message,
        Style::default().fg(TEXT_DIM),
    ))))
}

pub fn dex_items(dex: &DexView) -> Vec<Line<'static>> {
    match dex.visible() {
        Visible::Search(summaries) => summaries
            .iter()
            .map(|summary| {
                Line::from(vec![
                    Span::raw(format!("{:<16}", format_name(&summary.name))),
                    Span::styled(format!("#{}", summary.id), Style::default().fg(ACCENT_GOLD)),
                ])
            })
            .collect(),
        Visible::Grid(details) => details.iter().map(|detail| grid_row(detail)).collect(),
    }
}

fn grid_row(detail: &PokemonDetail) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("#{:03} ", detail.id),
            Style::default().fg(ACCENT_GOLD),
        ),
        Span::raw(format!("{:<16}", format_name(&detail.name))),
    ];
    for name in &detail.types {
        spans.push(Span::raw(" "));
        spans.push(type_chip(name));
    }
    Line::from(spans)
}

fn list_style(bg: Option<Color>) -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn render_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    detail: &DetailView,
    event_ctx: &mut EventContext<ExplorerComponentId>,
) {
    let modal_area = centered_rect(
        area.width.saturating_sub(6).min(84),
        area.height.saturating_sub(4).min(28),
        area,
    );
    event_ctx.set_component_area(ExplorerComponentId::Detail, modal_area);
    frame.render_widget(Clear, modal_area);

    let navigation = state.navigation();
    let title = match detail.pokemon.data() {
        Some(pokemon) => format!(" #{:03} {} ", pokemon.id, format_name(&pokemon.name)),
        None => format!(" {} ", format_name(&detail.name)),
    };
    let nav_hint = format!(
        " {} prev | next {} ",
        if navigation.can_navigate_previous() { "<" } else { " " },
        if navigation.can_navigate_next() { ">" } else { " " },
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(Line::from(nav_hint).alignment(Alignment::Right))
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(focus_border(!state.dex.search.active));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    if let Some(error) = detail.error() {
        let text = Text::from(vec![
            Line::from(Span::styled(
                "Error loading Pokémon details",
                Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(error.to_string(), Style::default().fg(TEXT_DIM))),
        ]);
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let (Some(pokemon), false) = (detail.pokemon.data(), detail.species.is_loading()) else {
        frame.render_widget(
            Paragraph::new(format!("{} Loading...", spinner(state.tick)))
                .alignment(Alignment::Center)
                .style(Style::default().fg(ACCENT_TEAL)),
            inner,
        );
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(2),
            Constraint::Min(4),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(profile_text(pokemon, detail)).wrap(Wrap { trim: true }),
        layout[0],
    );

    let tabs = Tabs::new(vec!["Stats", "Abilities", "Evolution"])
        .select(detail.tab.index())
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, layout[1]);

    let body = match detail.tab {
        DetailTab::Stats => stats_text(pokemon),
        DetailTab::Abilities => abilities_text(pokemon),
        DetailTab::Evolution => evolution_text(detail, state.tick),
    };
    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), layout[2]);
}

fn profile_text(pokemon: &PokemonDetail, detail: &DetailView) -> Text<'static> {
    let mut types = Vec::new();
    for name in &pokemon.types {
        types.push(type_chip(name));
        types.push(Span::raw(" "));
    }
    let genus = detail
        .species
        .data()
        .and_then(|species| species.genus.clone())
        .unwrap_or_default();
    types.push(Span::styled(genus, Style::default().fg(TEXT_DIM)));

    Text::from(vec![
        Line::from(types),
        Line::from(vec![
            Span::raw("Height: "),
            Span::styled(
                format!("{:.1} m", pokemon.height as f32 / 10.0),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::raw("  Weight: "),
            Span::styled(
                format!("{:.1} kg", pokemon.weight as f32 / 10.0),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::raw("  Base Exp: "),
            Span::styled(
                pokemon.base_experience.to_string(),
                Style::default().fg(ACCENT_GOLD),
            ),
        ]),
        Line::from(Span::styled(
            pokemon.artwork.clone().unwrap_or_default(),
            Style::default().fg(TEXT_DIM).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            detail.description(),
            Style::default().fg(TEXT_MAIN),
        )),
    ])
}

pub fn stats_text(pokemon: &PokemonDetail) -> Text<'static> {
    if pokemon.stats.is_empty() {
        return Text::from("No stats available.");
    }
    let mut lines: Vec<Line<'static>> = pokemon
        .stats
        .iter()
        .map(|stat| {
            Line::from(vec![
                Span::raw(format!("{:<11}", stat_label(&stat.name))),
                Span::styled(
                    format!("{:>3} ", stat.value),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(stat_bar(stat), Style::default().fg(stat_color(stat.value))),
            ])
        })
        .collect();
    lines.push(Line::from(vec![
        Span::styled(
            format!("{:<11}", "Total"),
            Style::default().fg(ACCENT_TEAL),
        ),
        Span::styled(
            pokemon.stat_total().to_string(),
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    Text::from(lines)
}

/// Bar proportional to `value / STAT_MAX`, at least one cell for non-zero stats.
pub fn stat_bar(stat: &PokemonStat) -> String {
    let value = stat.value.min(STAT_MAX) as usize;
    let mut filled = value * STAT_BAR_WIDTH / STAT_MAX as usize;
    if value > 0 {
        filled = filled.max(1);
    }
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(STAT_BAR_WIDTH - filled)
    )
}

pub fn stat_label(name: &str) -> String {
    match name {
        "hp" => "HP".to_string(),
        "attack" => "Attack".to_string(),
        "defense" => "Defense".to_string(),
        "special-attack" => "Sp. Attack".to_string(),
        "special-defense" => "Sp. Defense".to_string(),
        "speed" => "Speed".to_string(),
        _ => format_name(name),
    }
}

fn stat_color(value: u16) -> Color {
    match value {
        0..=49 => ACCENT_RED,
        50..=89 => ACCENT_GOLD,
        _ => ACCENT_TEAL,
    }
}

fn abilities_text(pokemon: &PokemonDetail) -> Text<'static> {
    if pokemon.abilities.is_empty() {
        return Text::from("No abilities listed.");
    }
    let lines = pokemon
        .abilities
        .iter()
        .map(|ability| {
            let mut spans = vec![Span::raw(format_name(&ability.name))];
            if ability.hidden {
                spans.push(Span::styled(
                    "  (Hidden)",
                    Style::default().fg(TEXT_DIM).add_modifier(Modifier::ITALIC),
                ));
            }
            Line::from(spans)
        })
        .collect::<Vec<_>>();
    Text::from(lines)
}

fn evolution_text(detail: &DetailView, tick: u64) -> Text<'static> {
    if detail.chain.is_loading() {
        return Text::from(format!("{} Loading evolution chain...", spinner(tick)));
    }
    if detail.chain.data().is_none() {
        return Text::from("Evolution data not available");
    }
    let tokens = detail.tokens();
    let mut spans = Vec::new();
    let mut step_index = 0;
    for token in &tokens {
        match token {
            EvolutionToken::Separator => {
                spans.push(Span::styled(" → ", Style::default().fg(TEXT_DIM)));
            }
            EvolutionToken::Step { id, name } => {
                let label = match detail.steps.get(id) {
                    Some(step) if step.is_loading() => format!("{} {}", spinner(tick), format_name(name)),
                    _ => format_name(name),
                };
                let mut style = match detail.step_detail(*id) {
                    Some(step) => Style::default().fg(type_color(step.primary_type())),
                    None => Style::default().fg(TEXT_MAIN),
                };
                if step_index == detail.evolution_index {
                    style = style.bg(BG_HIGHLIGHT).add_modifier(Modifier::BOLD);
                }
                if *name == detail.name {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                spans.push(Span::styled(label, style));
                step_index += 1;
            }
        }
    }
    let count = evolution::steps(&tokens).len();
    Text::from(vec![
        Line::from(spans),
        Line::from(" "),
        Line::from(Span::styled(
            format!("{count} stage(s). j/k select, Enter open"),
            Style::default().fg(TEXT_DIM),
        )),
    ])
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = status_message(state);
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

pub fn status_message(state: &AppState) -> String {
    if state.screen != Screen::Pokedex {
        return String::new();
    }
    let dex = &state.dex;
    if dex.list_error.is_some() {
        return "Load failed".to_string();
    }
    if dex.paginator.in_flight || !dex.pending.is_empty() {
        return format!("{} Loading more...", spinner(state.tick));
    }
    if dex.scope.is_none() && dex.paginator.has_next() && !dex.search.has_query() {
        return "More available (m)".to_string();
    }
    String::new()
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.dex.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Clear"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }
    if let Some(detail) = state.detail.as_ref() {
        let mut left = vec![
            StatusBarHint::new("h/l", "Prev/Next"),
            StatusBarHint::new("Tab", "Section"),
        ];
        if detail.tab == DetailTab::Evolution {
            left.push(StatusBarHint::new("j/k", "Stage"));
            left.push(StatusBarHint::new("Enter", "Open"));
        }
        let center = vec![
            StatusBarHint::new("Esc", "Close"),
            StatusBarHint::new("q", "Quit"),
        ];
        return (left, center);
    }
    match state.screen {
        Screen::Generations => (
            vec![
                StatusBarHint::new("j/k", "Move"),
                StatusBarHint::new("Enter", "Open"),
            ],
            vec![StatusBarHint::new("q", "Quit")],
        ),
        Screen::Pokedex => {
            let mut left = vec![
                StatusBarHint::new("j/k", "Move"),
                StatusBarHint::new("Enter", "Details"),
                StatusBarHint::new("/", "Search"),
                StatusBarHint::new("[ ]", "Type"),
            ];
            if state.dex.scope.is_none() {
                left.push(StatusBarHint::new("m", "More"));
            }
            if state.dex.list_error.is_some() {
                left.push(StatusBarHint::new("r", "Retry"));
            }
            let center = vec![
                StatusBarHint::new("b", "Back"),
                StatusBarHint::new("q", "Quit"),
            ];
            (left, center)
        }
    }
}

fn type_chip(name: &str) -> Span<'static> {
    Span::styled(
        format!(" {} ", name.to_ascii_uppercase()),
        Style::default()
            .bg(type_color(name))
            .fg(type_text_color(name))
            .add_modifier(Modifier::BOLD),
    )
}

fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    }
}
