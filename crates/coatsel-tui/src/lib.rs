// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use coatsel_app::{
    Catalog, CompletedOrder, FormCommand, FormEvent, FormState, SelectionField, format_cents,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const COMPANY_PLACEHOLDER: &str = "Choose a company";
const SYSTEM_PLACEHOLDER: &str = "Choose a system";
const VENDOR_PLACEHOLDER: &str = "Choose a vendor";
const NEXT_LABEL: &str = "Next →";

/// What the form does after the runtime accepted a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Stay,
    Exit,
}

/// Collaborator that receives the order when the user presses `Next`.
pub trait FormRuntime {
    fn proceed(&mut self, order: &CompletedOrder) -> Result<NextStep>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Control {
    #[default]
    Company,
    System,
    Vendor(usize),
    Next,
}

impl Control {
    fn rank(self) -> usize {
        match self {
            Self::Company => 0,
            Self::System => 1,
            Self::Vendor(index) => 2 + index,
            Self::Next => usize::MAX,
        }
    }

    fn is_selector(self) -> bool {
        !matches!(self, Self::Next)
    }

    fn title(self) -> String {
        match self {
            Self::Company => "company".to_owned(),
            Self::System => "system".to_owned(),
            Self::Vendor(index) => format!("coating {}", index + 1),
            Self::Next => "next".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PickerUiState {
    control: Control,
    cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Heading,
    Label,
    Field,
    FocusedField,
    Disabled,
    Summary,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormLine {
    text: String,
    style: LineStyle,
}

impl FormLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), LineStyle::Blank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    focus: Control,
    picker: Option<PickerUiState>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: FormRuntime>(
    state: &mut FormState,
    catalog: &Catalog,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    info!("form started");

    let result = event_loop(&mut terminal, state, catalog, runtime);

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("form closed");
    result
}

fn event_loop<R: FormRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut FormState,
    catalog: &Catalog,
    runtime: &mut R,
) -> Result<()> {
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    loop {
        process_internal_events(state, catalog, &view_data, &internal_rx);

        terminal
            .draw(|frame| render(frame, state, catalog, &view_data))
            .context("draw frame")?;

        if !event::poll(Duration::from_millis(120)).context("poll event")? {
            continue;
        }
        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(state, catalog, runtime, &mut view_data, &internal_tx, key) {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

fn process_internal_events(
    state: &mut FormState,
    catalog: &Catalog,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(catalog, FormCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut FormState,
    catalog: &Catalog,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(catalog, FormCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: FormRuntime>(
    state: &mut FormState,
    catalog: &Catalog,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.picker.is_some() {
        handle_picker_key(state, catalog, view_data, internal_tx, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
            move_focus(state, catalog, view_data, 1);
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
            move_focus(state, catalog, view_data, -1);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            coerce_focus(state, catalog, view_data);
            if view_data.focus.is_selector() {
                open_picker(state, catalog, view_data);
            } else {
                return request_next(state, catalog, runtime, view_data, internal_tx);
            }
        }
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            coerce_focus(state, catalog, view_data);
            let control = view_data.focus;
            if control.is_selector() {
                let choice = ch.to_digit(10).unwrap_or(0) as usize;
                apply_choice(state, catalog, view_data, internal_tx, control, choice);
            }
        }
        _ => {}
    }
    false
}

fn handle_picker_key(
    state: &mut FormState,
    catalog: &Catalog,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut picker) = view_data.picker else {
        return;
    };
    let option_count = control_options(state, catalog, picker.control).len();

    match key.code {
        KeyCode::Esc => {
            view_data.picker = None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            picker.cursor = (picker.cursor + 1).min(option_count.saturating_sub(1));
            view_data.picker = Some(picker);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            picker.cursor = picker.cursor.saturating_sub(1);
            view_data.picker = Some(picker);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            picker.cursor = 0;
            view_data.picker = Some(picker);
        }
        KeyCode::Char('G') | KeyCode::End => {
            picker.cursor = option_count.saturating_sub(1);
            view_data.picker = Some(picker);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            view_data.picker = None;
            apply_choice(
                state,
                catalog,
                view_data,
                internal_tx,
                picker.control,
                picker.cursor,
            );
        }
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            view_data.picker = None;
            let choice = ch.to_digit(10).unwrap_or(0) as usize;
            apply_choice(state, catalog, view_data, internal_tx, picker.control, choice);
        }
        _ => {}
    }
}

fn open_picker(state: &FormState, catalog: &Catalog, view_data: &mut ViewData) {
    let control = view_data.focus;
    view_data.picker = Some(PickerUiState {
        control,
        cursor: current_choice(state, catalog, control),
    });
}

/// Option index (0 = placeholder) matching the control's current value.
fn current_choice(state: &FormState, catalog: &Catalog, control: Control) -> usize {
    let selection = &state.selection;
    let (current, names) = match control {
        Control::Company => (selection.company.as_deref(), catalog.companies()),
        Control::System => (
            selection.system.as_deref(),
            selection
                .company
                .as_deref()
                .map(|company| catalog.systems_of(company))
                .unwrap_or_default(),
        ),
        Control::Vendor(index) => (
            selection.vendors.get(index).and_then(Option::as_deref),
            catalog
                .vendors()
                .iter()
                .map(|vendor| vendor.name.as_str())
                .collect::<Vec<_>>(),
        ),
        Control::Next => return 0,
    };
    current
        .and_then(|current| names.iter().position(|name| *name == current))
        .map_or(0, |position| position + 1)
}

/// Display labels for a selector; index 0 is the placeholder.
fn control_options(state: &FormState, catalog: &Catalog, control: Control) -> Vec<String> {
    let (placeholder, mut labels) = match control {
        Control::Company => (
            COMPANY_PLACEHOLDER,
            catalog
                .companies()
                .into_iter()
                .map(str::to_owned)
                .collect::<Vec<_>>(),
        ),
        Control::System => (
            SYSTEM_PLACEHOLDER,
            state
                .selection
                .company
                .as_deref()
                .map(|company| {
                    catalog
                        .systems_of(company)
                        .into_iter()
                        .map(str::to_owned)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
        ),
        Control::Vendor(_) => (
            VENDOR_PLACEHOLDER,
            catalog
                .vendors()
                .iter()
                .map(|vendor| format!("{} - {}", vendor.name, format_cents(vendor.price_cents)))
                .collect::<Vec<_>>(),
        ),
        Control::Next => return Vec::new(),
    };
    labels.insert(0, placeholder.to_owned());
    labels
}

fn command_for_choice(
    state: &FormState,
    catalog: &Catalog,
    control: Control,
    choice: usize,
) -> Option<FormCommand> {
    let value = |names: Vec<&str>| -> Option<Option<String>> {
        match choice {
            0 => Some(None),
            n => names.get(n - 1).map(|name| Some((*name).to_owned())),
        }
    };
    match control {
        Control::Company => value(catalog.companies()).map(FormCommand::ChangeCompany),
        Control::System => {
            let company = state.selection.company.as_deref()?;
            value(catalog.systems_of(company)).map(FormCommand::ChangeSystem)
        }
        Control::Vendor(index) => value(
            catalog
                .vendors()
                .iter()
                .map(|vendor| vendor.name.as_str())
                .collect(),
        )
        .map(|vendor| FormCommand::ChooseVendor { index, vendor }),
        Control::Next => None,
    }
}

fn apply_choice(
    state: &mut FormState,
    catalog: &Catalog,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    control: Control,
    choice: usize,
) {
    let Some(command) = command_for_choice(state, catalog, control, choice) else {
        emit_status(
            state,
            catalog,
            view_data,
            internal_tx,
            format!("choice {choice} unavailable for {}", control.title()),
        );
        return;
    };

    debug!(?control, choice, "apply choice");
    let events = state.dispatch(catalog, command);
    let advance = choice > 0 && !events.iter().any(|event| matches!(event, FormEvent::Rejected(_)));
    if let Some(message) = describe_events(&events) {
        emit_status(state, catalog, view_data, internal_tx, message);
    }

    view_data.focus = control;
    coerce_focus(state, catalog, view_data);
    if advance {
        move_focus(state, catalog, view_data, 1);
    }
}

fn describe_events(events: &[FormEvent]) -> Option<String> {
    let mut parts = Vec::new();
    for event in events {
        match event {
            FormEvent::CompanyChanged(Some(company)) => parts.push(format!("company {company}")),
            FormEvent::CompanyChanged(None) => parts.push("company cleared".to_owned()),
            FormEvent::SystemChanged(Some(system)) => parts.push(format!("system {system}")),
            FormEvent::SystemChanged(None) => parts.push("system cleared".to_owned()),
            FormEvent::VendorChosen { index, vendor } => parts.push(match vendor {
                Some(vendor) => format!("coating {} -> {vendor}", index + 1),
                None => format!("coating {} cleared", index + 1),
            }),
            FormEvent::Invalidated(SelectionField::Vendors) => {
                parts.push("vendor choices reset".to_owned());
            }
            FormEvent::Invalidated(field) => parts.push(format!("{} reset", field.label())),
            FormEvent::Rejected(reason) => return Some(reason.clone()),
            FormEvent::NextRequested(_) | FormEvent::StatusUpdated(_) | FormEvent::StatusCleared => {}
        }
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn request_next<R: FormRuntime>(
    state: &mut FormState,
    catalog: &Catalog,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) -> bool {
    let events = state.dispatch(catalog, FormCommand::RequestNext);
    for event in events {
        let FormEvent::NextRequested(order) = event else {
            continue;
        };
        match runtime.proceed(&order) {
            Ok(NextStep::Exit) => return true,
            Ok(NextStep::Stay) => {
                emit_status(
                    state,
                    catalog,
                    view_data,
                    internal_tx,
                    format!("order sent: {}", format_cents(order.total_cents)),
                );
            }
            Err(error) => {
                warn!(%error, "next action failed");
                emit_status(
                    state,
                    catalog,
                    view_data,
                    internal_tx,
                    format!("next failed: {error}"),
                );
            }
        }
    }
    false
}

/// Controls currently shown and enabled, top to bottom.
fn visible_controls(state: &FormState, catalog: &Catalog) -> Vec<Control> {
    let mut controls = vec![Control::Company];
    if state.selection.company.is_none() {
        return controls;
    }
    controls.push(Control::System);
    let derived = state.derived(catalog);
    controls.extend((0..derived.coatings.len()).map(Control::Vendor));
    if derived.complete {
        controls.push(Control::Next);
    }
    controls
}

fn coerce_focus(state: &FormState, catalog: &Catalog, view_data: &mut ViewData) {
    let controls = visible_controls(state, catalog);
    if controls.contains(&view_data.focus) {
        return;
    }
    let rank = view_data.focus.rank();
    view_data.focus = controls
        .iter()
        .rev()
        .find(|control| control.rank() <= rank)
        .copied()
        .unwrap_or_default();
}

fn move_focus(state: &FormState, catalog: &Catalog, view_data: &mut ViewData, delta: isize) {
    coerce_focus(state, catalog, view_data);
    let controls = visible_controls(state, catalog);
    let current = controls
        .iter()
        .position(|control| *control == view_data.focus)
        .unwrap_or(0) as isize;
    let len = controls.len() as isize;
    let next = (current + delta).rem_euclid(len) as usize;
    view_data.focus = controls[next];
}

fn field_line(label: &str, focused: bool) -> FormLine {
    let marker = if focused { ">" } else { " " };
    let style = if focused {
        LineStyle::FocusedField
    } else {
        LineStyle::Field
    };
    FormLine::new(format!("{marker} [ {label} ▾ ]"), style)
}

fn form_lines(state: &FormState, catalog: &Catalog, view_data: &ViewData) -> Vec<FormLine> {
    let selection = &state.selection;
    let focus = view_data.focus;
    let mut lines = vec![
        FormLine::new("Select Company", LineStyle::Label),
        field_line(
            selection.company.as_deref().unwrap_or(COMPANY_PLACEHOLDER),
            focus == Control::Company,
        ),
    ];

    if selection.company.is_some() {
        lines.push(FormLine::blank());
        lines.push(FormLine::new("Select System", LineStyle::Label));
        lines.push(field_line(
            selection.system.as_deref().unwrap_or(SYSTEM_PLACEHOLDER),
            focus == Control::System,
        ));
    }

    let derived = state.derived(catalog);
    if selection.system.is_some() {
        lines.push(FormLine::blank());
        lines.push(FormLine::new("Required Coatings:", LineStyle::Heading));
        for (index, coating) in derived.coatings.iter().enumerate() {
            lines.push(FormLine::new(coating.clone(), LineStyle::Label));
            let choice = current_choice(state, catalog, Control::Vendor(index));
            let options = control_options(state, catalog, Control::Vendor(index));
            let label = options
                .get(choice)
                .map_or(VENDOR_PLACEHOLDER, String::as_str);
            lines.push(field_line(label, focus == Control::Vendor(index)));
        }
    }

    if derived.complete {
        lines.push(FormLine::blank());
        lines.push(FormLine::new("Total Pricing:", LineStyle::Heading));
        lines.push(FormLine::new(
            format!(
                "Total price for all coatings: {}",
                format_cents(derived.total_cents)
            ),
            LineStyle::Summary,
        ));
    }

    lines.push(FormLine::blank());
    let next = if !derived.complete {
        FormLine::new(format!("  ( {NEXT_LABEL} )"), LineStyle::Disabled)
    } else if focus == Control::Next {
        FormLine::new(format!("> ( {NEXT_LABEL} )"), LineStyle::FocusedField)
    } else {
        FormLine::new(format!("  ( {NEXT_LABEL} )"), LineStyle::Field)
    };
    lines.push(next);
    lines
}

fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Heading => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        LineStyle::Label => Style::default().fg(Color::Gray),
        LineStyle::Field | LineStyle::Blank => Style::default().fg(Color::White),
        LineStyle::FocusedField => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        LineStyle::Disabled => Style::default().fg(Color::DarkGray),
        LineStyle::Summary => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    }
}

fn render_picker_text(options: &[String], cursor: usize) -> String {
    options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let marker = if index == cursor { ">" } else { " " };
            format!("{marker} {index}  {option}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
form: j/k or up/down or tab/shift+tab move | enter/space open or press next | 0-9 choose (0 clears) | q quit\n\
picker: j/k or up/down move | g/G first/last | enter choose | 0-9 choose | esc cancel\n\
help: esc or ? close"
}

fn status_text(state: &FormState, view_data: &ViewData) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    if view_data.help_visible {
        return "esc close help".to_owned();
    }
    if view_data.picker.is_some() {
        return "j/k move | enter choose | 0-9 pick | esc cancel".to_owned();
    }
    "j/k move | enter open | 0-9 choose | ? help | ctrl+q quit".to_owned()
}

fn render(frame: &mut ratatui::Frame<'_>, state: &FormState, catalog: &Catalog, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(frame.area());

    let lines = form_lines(state, catalog, view_data)
        .into_iter()
        .map(|line| Line::styled(line.text, line_style(line.style)))
        .collect::<Vec<_>>();
    let body = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title("Coating Selector")
            .borders(Borders::ALL),
    );
    frame.render_widget(body, layout[0]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[1]);

    if let Some(picker) = view_data.picker {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let options = control_options(state, catalog, picker.control);
        let list = Paragraph::new(render_picker_text(&options, picker.cursor)).block(
            Block::default()
                .title(picker.control.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(list, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 40, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
